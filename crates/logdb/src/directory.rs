use std::collections::HashMap;

use crate::id::Id;

/// A back-reference from an entry to an index value-list it currently
/// appears in, used to prune the entry's old membership in O(#indexes)
/// without scanning the directory or any index.
#[derive(Clone)]
pub(crate) struct BackRef {
    pub index_name: String,
    pub handle: usize,
}

/// The in-memory descriptor of a live record.
pub(crate) struct Entry {
    pub offset: u64,
    pub length: u64,
    pub back_refs: Vec<BackRef>,
}

/// Two-level mapping `species -> id -> entry`, describing the latest record
/// for each `(species, id)` pair. Older records for the same id remain in
/// the file but are unreachable once superseded.
#[derive(Default)]
pub(crate) struct Directory {
    by_species: HashMap<Id, HashMap<Id, Entry>>,
}

impl Directory {
    pub(crate) fn get(&self, species: &Id, id: &Id) -> Option<&Entry> {
        self.by_species.get(species)?.get(id)
    }

    /// Inserts or replaces the entry for `(species, id)`, returning the
    /// entry it superseded, if any.
    pub(crate) fn put(&mut self, species: &Id, id: &Id, entry: Entry) -> Option<Entry> {
        self.by_species.entry(species.clone()).or_default().insert(id.clone(), entry)
    }

    pub(crate) fn get_mut(&mut self, species: &Id, id: &Id) -> Option<&mut Entry> {
        self.by_species.get_mut(species)?.get_mut(id)
    }

    pub(crate) fn remove(&mut self, species: &Id, id: &Id) -> Option<Entry> {
        let table = self.by_species.get_mut(species)?;
        let removed = table.remove(id);
        if table.is_empty() {
            self.by_species.remove(species);
        }
        removed
    }

    /// All `(id, entry)` pairs for one species, in unspecified order. Used
    /// by `Index` registration (backfill) and by compaction.
    pub(crate) fn species_entries(&self, species: &Id) -> impl Iterator<Item = (&Id, &Entry)> {
        self.by_species.get(species).into_iter().flat_map(|m| m.iter())
    }

    pub(crate) fn all_entries_mut(&mut self) -> impl Iterator<Item = (&Id, &Id, &mut Entry)> {
        self.by_species
            .iter_mut()
            .flat_map(|(species, table)| table.iter_mut().map(move |(id, entry)| (species, id, entry)))
    }
}
