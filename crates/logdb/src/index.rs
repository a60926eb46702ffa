use std::collections::HashMap;

use crate::error::Error;
use crate::id::Id;

/// An indexer with its type erased: given the raw stored bytes for an
/// entity of its species, returns the index key. Registered via
/// [`crate::Store::index`], which captures the caller's typed
/// `Fn(&T) -> Id` and deserialises into `T` internally before calling it —
/// this is the generic, compile-time stand-in for the reflection-driven
/// indexing the original store used.
pub(crate) type RawIndexer = Box<dyn Fn(&[u8]) -> Result<Id, Error> + Send + Sync>;

/// One named index for one species: the indexer function plus an
/// arena of value-lists addressed by stable handle, so an `Entry`'s
/// back-refs can name a list without borrowing it.
pub(crate) struct IndexTable {
    pub(crate) indexer: RawIndexer,
    lists: Vec<Vec<Id>>,
    value_to_handle: HashMap<Id, usize>,
}

impl IndexTable {
    fn new(indexer: RawIndexer) -> Self {
        IndexTable { indexer, lists: Vec::new(), value_to_handle: HashMap::new() }
    }

    /// Adds `id` to the list for `value`, creating the list if this is the
    /// first id with that value. Returns the list's stable handle.
    pub(crate) fn insert(&mut self, value: Id, id: Id) -> usize {
        let handle = *self.value_to_handle.entry(value).or_insert_with(|| {
            self.lists.push(Vec::new());
            self.lists.len() - 1
        });
        self.lists[handle].push(id);
        handle
    }

    pub(crate) fn remove_from_handle(&mut self, handle: usize, id: &Id) {
        if let Some(list) = self.lists.get_mut(handle) {
            if let Some(pos) = list.iter().position(|x| x == id) {
                list.remove(pos);
            }
        }
    }

    pub(crate) fn lookup(&self, value: &Id) -> &[Id] {
        self.value_to_handle
            .get(value)
            .and_then(|&h| self.lists.get(h))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}

/// Per-species, per-index-name index tables.
#[derive(Default)]
pub(crate) struct IndexStore {
    by_species: HashMap<Id, HashMap<String, IndexTable>>,
}

impl IndexStore {
    /// Registers a new indexer, failing with [`Error::Conflict`] if one is
    /// already registered under this `(species, index_name)`.
    pub(crate) fn register(&mut self, species: &Id, index_name: &str, indexer: RawIndexer) -> Result<(), Error> {
        let table = self.by_species.entry(species.clone()).or_default();
        if table.contains_key(index_name) {
            return Err(Error::Conflict { species: species.to_string(), index_name: index_name.to_string() });
        }
        table.insert(index_name.to_string(), IndexTable::new(indexer));
        Ok(())
    }

    pub(crate) fn indexers(&self, species: &Id) -> impl Iterator<Item = (&str, &RawIndexer)> {
        self.by_species
            .get(species)
            .into_iter()
            .flat_map(|m| m.iter().map(|(name, table)| (name.as_str(), &table.indexer)))
    }

    /// Applies the registered indexer for `(species, index_name)` to raw
    /// stored bytes. Panics if the index is not registered — callers only
    /// invoke this for indexes they just looked up or just registered.
    pub(crate) fn apply(&self, species: &Id, index_name: &str, bytes: &[u8]) -> Result<Id, Error> {
        let table = self.by_species.get(species).and_then(|m| m.get(index_name)).expect("index exists");
        (table.indexer)(bytes)
    }

    pub(crate) fn insert(&mut self, species: &Id, index_name: &str, value: Id, id: Id) -> usize {
        self.by_species.get_mut(species).and_then(|m| m.get_mut(index_name)).expect("index exists").insert(value, id)
    }

    pub(crate) fn remove_from_handle(&mut self, species: &Id, index_name: &str, handle: usize, id: &Id) {
        if let Some(table) = self.by_species.get_mut(species).and_then(|m| m.get_mut(index_name)) {
            table.remove_from_handle(handle, id);
        }
    }

    pub(crate) fn lookup(&self, species: &Id, index_name: &str, value: &Id) -> &[Id] {
        self.by_species
            .get(species)
            .and_then(|m| m.get(index_name))
            .map(|table| table.lookup(value))
            .unwrap_or(&[])
    }
}
