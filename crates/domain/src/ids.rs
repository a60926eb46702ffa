use rand::Rng;

const ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const ID_RANDOM_LEN: usize = 8;

/// Generates a new id of the form `"{prefix}-{8 random lowercase-alphanumeric
/// chars}"`. Callers assign the result to an entity's id field before its
/// first `Store` call; `logdb` itself never generates ids.
pub fn new_id(prefix: &str) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_RANDOM_LEN).map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char).collect();
    format!("{prefix}-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carries_the_given_prefix() {
        let id = new_id("user");
        assert!(id.starts_with("user-"));
        assert_eq!(id.len(), "user-".len() + ID_RANDOM_LEN);
    }

    #[test]
    fn successive_ids_differ() {
        assert_ne!(new_id("course"), new_id("course"));
    }
}
