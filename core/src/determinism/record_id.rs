use sha2::{Digest, Sha256};
use ulid::Ulid;

pub fn observation_id() -> String {
    format!("obs_{}", Ulid::new())
}

pub fn finding_id() -> String {
    format!("fnd_{}", Ulid::new())
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(bytes);
    hex::encode(h.finalize())
}

#[cfg(test)]
mod tests {
    use super::{finding_id, observation_id};
    use std::collections::BTreeSet;

    #[test]
    fn ids_are_prefixed_and_distinct() {
        let mut seen = BTreeSet::new();
        for _ in 0..64 {
            assert!(seen.insert(observation_id()));
            assert!(seen.insert(finding_id()));
        }
        assert!(seen.iter().all(|id| id.starts_with("obs_") || id.starts_with("fnd_")));
    }
}
