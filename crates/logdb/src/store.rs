use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::directory::{BackRef, Directory, Entry};
use crate::entity::{Entity, Indexer};
use crate::error::Error;
use crate::id::Id;
use crate::index::IndexStore;
use crate::log::FileLog;
use crate::parser::parse_log;

struct StoreState {
    log: FileLog,
    dir: Directory,
    indexes: IndexStore,
    size: u64,
    wasted: u64,
}

/// The embedded entity store. Exposes `index`/`store`/`load`/`delete`/
/// `query`/`compact`, coordinating the writer, directory, and indexes under
/// a single reader/writer lock.
///
/// `Load` and `Query` take the shared (reader) mode; `Store`, `Index`,
/// `Delete`, and `Compact` take the exclusive (writer) mode. No operation
/// suspends while holding the lock beyond the file I/O it performs.
pub struct Store {
    path: PathBuf,
    state: RwLock<StoreState>,
}

impl Store {
    /// Opens the data file at `path`, creating it if absent, and replays it
    /// to reconstruct the in-memory directory. Fatal on the first
    /// corruption encountered; the store refuses to open.
    pub fn open(path: impl AsRef<Path>) -> Result<Store, Error> {
        let path = path.as_ref().to_path_buf();
        File::options().create(true).append(true).open(&path)?;

        let mut dir = Directory::default();
        let mut size = 0u64;
        let mut wasted = 0u64;

        let parse_handle = File::open(&path)?;
        let eof = parse_log(parse_handle, |record| {
            let species = Id::new(&record.species);
            let id = Id::new(&record.id);
            let entry = Entry { offset: record.payload_offset, length: record.payload_length, back_refs: Vec::new() };
            if let Some(prior) = dir.put(&species, &id, entry) {
                wasted += prior.length;
                size = size.saturating_sub(prior.length);
            }
            size += record.payload_length;
            Ok(())
        })?;

        let log = FileLog::open(&path, eof)?;
        tracing::info!(path = %path.display(), live_bytes = size, wasted_bytes = wasted, "opened store");

        Ok(Store { path, state: RwLock::new(StoreState { log, dir, indexes: IndexStore::default(), size, wasted }) })
    }

    /// Registers `indexer` under `(species, index_name)` for entity type
    /// `T`, failing with [`Error::Conflict`] if that pair is already
    /// registered. Backfills every existing entry of `T`'s species before
    /// returning; every subsequent `store::<T>` call updates this index.
    pub fn index<T: Entity>(
        &self,
        index_name: &str,
        indexer: impl Fn(&T) -> Id + Send + Sync + 'static,
    ) -> Result<(), Error> {
        let species = T::species_id();
        let indexer: Indexer<T> = Box::new(indexer);
        let raw = Box::new(move |bytes: &[u8]| -> Result<Id, Error> {
            let entity = T::from_bytes(bytes)?;
            Ok(indexer(&entity))
        });

        let mut state = self.state.write().unwrap();
        state.indexes.register(&species, index_name, raw)?;

        let existing: Vec<(Id, u64, u64)> =
            state.dir.species_entries(&species).map(|(id, entry)| (id.clone(), entry.offset, entry.length)).collect();

        for (id, offset, length) in existing {
            let bytes = state.log.read_at(offset, length)?;
            let value = state.indexes.apply(&species, index_name, &bytes)?;
            let handle = state.indexes.insert(&species, index_name, value, id.clone());
            if let Some(entry) = state.dir.get_mut(&species, &id) {
                entry.back_refs.push(BackRef { index_name: index_name.to_string(), handle });
            }
        }

        Ok(())
    }

    /// Appends `entity`'s current payload to the log and updates the
    /// directory and every registered index of its species. `entity.id()`
    /// must already be set by the caller.
    pub fn store<T: Entity>(&self, entity: &T) -> Result<(), Error> {
        let species = T::species_id();
        let id = entity.id();
        if id.is_empty() {
            return Err(Error::ContractViolation("entity id must be non-empty".into()));
        }
        let payload = entity.to_bytes()?;

        let mut state = self.state.write().unwrap();
        let (offset, length) = state.log.append(species.as_str(), id.as_str(), &payload)?;

        if let Some(prior) = state.dir.remove(&species, &id) {
            state.wasted += prior.length;
            state.size = state.size.saturating_sub(prior.length);
            for back_ref in &prior.back_refs {
                state.indexes.remove_from_handle(&species, &back_ref.index_name, back_ref.handle, &id);
            }
        }
        state.size += length;

        let index_names: Vec<String> = state.indexes.indexers(&species).map(|(name, _)| name.to_string()).collect();
        let mut back_refs = Vec::with_capacity(index_names.len());
        for name in index_names {
            let value = state.indexes.apply(&species, &name, &payload)?;
            let handle = state.indexes.insert(&species, &name, value, id.clone());
            back_refs.push(BackRef { index_name: name, handle });
        }

        state.dir.put(&species, &id, Entry { offset, length, back_refs });
        Ok(())
    }

    /// Loads the entity of species `T` stored under `id`. `NotFound` if no
    /// entry exists; `Corrupt` if the stored bytes are short or fail to
    /// deserialise.
    pub fn load<T: Entity>(&self, id: &Id) -> Result<T, Error> {
        let species = T::species_id();
        let bytes = {
            let state = self.state.read().unwrap();
            let entry = state.dir.get(&species, id).ok_or(Error::NotFound)?;
            state.log.read_at(entry.offset, entry.length)?
        };
        let mut entity = T::from_bytes(&bytes)?;
        entity.set_id(id.clone());
        Ok(entity)
    }

    /// Removes the entry for `(T::species_id(), id)` from the directory and
    /// prunes it from every index list it belonged to. The file is not
    /// rewritten; the superseded record is reclaimed by the next `compact`.
    pub fn delete<T: Entity>(&self, id: &Id) -> Result<(), Error> {
        let species = T::species_id();
        let mut state = self.state.write().unwrap();
        let entry = state.dir.remove(&species, id).ok_or(Error::NotFound)?;
        state.wasted += entry.length;
        state.size = state.size.saturating_sub(entry.length);
        for back_ref in &entry.back_refs {
            state.indexes.remove_from_handle(&species, &back_ref.index_name, back_ref.handle, id);
        }
        Ok(())
    }

    /// Looks up `index_name`'s list for `value` and loads each entity in
    /// list order into `out`, which is cleared first. A missing index
    /// yields an empty `out`, not an error. A `Load` failure partway
    /// through stops the scan but leaves whatever was loaded so far in
    /// `out`.
    pub fn query<T: Entity>(&self, index_name: &str, value: &Id, out: &mut Vec<T>) -> Result<(), Error> {
        out.clear();
        let species = T::species_id();
        let ids: Vec<Id> = {
            let state = self.state.read().unwrap();
            state.indexes.lookup(&species, index_name, value).to_vec()
        };
        for id in ids {
            out.push(self.load::<T>(&id)?);
        }
        Ok(())
    }

    /// Rewrites the data file to contain only live records, then atomically
    /// replaces the active file. Readers and writers never observe a
    /// half-swapped state: the whole operation runs under the exclusive
    /// lock, and if any step before the rename fails, the temp file is
    /// discarded and the store keeps using the original file unchanged.
    pub fn compact(&self) -> Result<(), Error> {
        let mut state = self.state.write().unwrap();

        let dir_path = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let tmp = tempfile::NamedTempFile::new_in(dir_path)?;
        let mut new_log = FileLog::open(tmp.path(), 0)?;

        let live: Vec<(Id, Id, u64, u64)> = state
            .dir
            .all_entries_mut()
            .map(|(species, id, entry)| (species.clone(), id.clone(), entry.offset, entry.length))
            .collect();

        let mut relocated = Vec::with_capacity(live.len());
        for (species, id, offset, length) in live {
            let payload = state.log.read_at(offset, length)?;
            let (new_offset, new_length) = new_log.append(species.as_str(), id.as_str(), &payload)?;
            relocated.push((species, id, new_offset, new_length));
        }

        new_log.sync()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        for (species, id, offset, length) in relocated {
            if let Some(entry) = state.dir.get_mut(&species, &id) {
                entry.offset = offset;
                entry.length = length;
            }
        }

        let new_eof = new_log.eof();
        state.log = new_log;
        state.wasted = 0;

        tracing::info!(path = %self.path.display(), bytes = new_eof, "compacted store");
        Ok(())
    }

    /// Bytes of live payloads currently reachable through the directory.
    pub fn size(&self) -> u64 {
        self.state.read().unwrap().size
    }

    /// Payload bytes present in the file but superseded or deleted, not yet
    /// reclaimed by compaction.
    pub fn wasted(&self) -> u64 {
        self.state.read().unwrap().wasted
    }
}
