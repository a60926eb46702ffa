use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, OnceLock};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An interned, hash-comparable handle over a textual identifier.
///
/// Two `Id`s built from equal strings are indistinguishable: cloning is a
/// refcount bump, and equality/hashing are pointer operations rather than
/// string comparisons. All species and entity keys the store touches are
/// `Id`s.
#[derive(Clone)]
pub struct Id(Arc<str>);

impl Id {
    /// Interns `s`, returning the canonical handle for it.
    pub fn new(s: impl AsRef<str>) -> Id {
        Id(intern(s.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for Id {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Id {}

impl Hash for Id {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as *const () as usize).hash(state)
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Id::new(s)
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Id::new(s)
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Id::new(s))
    }
}

/// Process-wide string interner. Identity equality on `Id` only holds within
/// one process run, which is all the store's correctness requires.
struct Interner {
    set: HashSet<Arc<str>>,
}

fn interner() -> &'static Mutex<Interner> {
    static INTERNER: OnceLock<Mutex<Interner>> = OnceLock::new();
    INTERNER.get_or_init(|| Mutex::new(Interner { set: HashSet::new() }))
}

fn intern(s: &str) -> Arc<str> {
    let mut guard = interner().lock().unwrap();
    if let Some(existing) = guard.set.get(s) {
        return existing.clone();
    }
    let arc: Arc<str> = Arc::from(s);
    guard.set.insert(arc.clone());
    arc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_strings_intern_to_the_same_handle() {
        let a = Id::new("course");
        let b = Id::new(String::from("course"));
        assert_eq!(a, b);
        assert!(Arc::ptr_eq(&a.0, &b.0));
    }

    #[test]
    fn different_strings_are_distinct() {
        assert_ne!(Id::new("course"), Id::new("lesson"));
    }
}
