// src/utils/hash.rs

//! Content fingerprinting for document deduplication.

use sha2::{Digest, Sha256};

/// Hash a (title, body) pair after trimming both and lowercasing the result.
///
/// Cosmetic differences (surrounding whitespace, letter case) hash equal.
pub fn content_hash(title: &str, body: &str) -> String {
    let normalized = format!("{}\n{}", title.trim(), body.trim()).to_lowercase();
    hex::encode(Sha256::digest(normalized.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        let a = content_hash("Free gift cards", "Click the link");
        let b = content_hash("Free gift cards", "Click the link");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn hash_ignores_case_and_outer_whitespace() {
        let a = content_hash("  Free Gift Cards ", "CLICK the link\n");
        let b = content_hash("free gift cards", "click the link");
        assert_eq!(a, b);
    }

    #[test]
    fn hash_covers_normalized_title_and_body() {
        assert_eq!(
            content_hash(" Title ", "Body"),
            hex::encode(Sha256::digest(b"title\nbody"))
        );
    }

    #[test]
    fn empty_pair_hashes_separator_only() {
        assert_eq!(content_hash("", ""), hex::encode(Sha256::digest(b"\n")));
    }

    #[test]
    fn different_content_differs() {
        assert_ne!(content_hash("a", "b"), content_hash("a", "c"));
        // the separator keeps field boundaries meaningful
        assert_ne!(content_hash("ab", "c"), content_hash("a", "bc"));
    }
}
