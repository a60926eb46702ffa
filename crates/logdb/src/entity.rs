use crate::error::Error;
use crate::id::Id;

/// The minimal capability the store requires of a stored value: it can
/// report its own id, report its species (a type tag shared by every
/// instance of the type), and serialise to and from a self-describing byte
/// blob.
///
/// Implementations must round-trip cleanly through `to_bytes`/`from_bytes`
/// and must never produce a blob containing a line-feed byte — the store
/// treats that as [`Error::ContractViolation`].
pub trait Entity: Sized + Send + 'static {
    /// Stable tag partitioning this type's keyspace. Must return the same
    /// value for every call.
    fn species_id() -> Id;

    /// This instance's primary key within its species.
    fn id(&self) -> Id;

    /// Assigns the instance's primary key. Callers generate ids before the
    /// first `Store`; the store itself never invents one.
    fn set_id(&mut self, id: Id);

    /// Serialises the entity to its on-disk payload.
    fn to_bytes(&self) -> Result<Vec<u8>, Error>;

    /// Deserialises a payload previously produced by `to_bytes`.
    fn from_bytes(bytes: &[u8]) -> Result<Self, Error>;
}

/// A pure, deterministic, side-effect-free function from an entity to an
/// index key. Indexers are registered once per `(species, index name)` and
/// applied to every subsequent store of that species. [`crate::Store::index`]
/// takes any closure of this shape and boxes it as an `Indexer<T>` itself.
pub type Indexer<T> = Box<dyn Fn(&T) -> Id + Send + Sync>;
