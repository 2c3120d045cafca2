use blake3::Hasher;

/// Full BLAKE3 hash of one text.
#[inline]
pub fn hash_text(text: &str) -> [u8; 32] {
    *blake3::hash(text.as_bytes()).as_bytes()
}

/// Fingerprint of an ordered list of texts.
///
/// Each text is length-prefixed so `["ab", "c"]` and `["a", "bc"]` differ.
/// Order matters: the embedding matrix is aligned with record order, so a
/// reordered corpus must produce a different fingerprint.
pub fn fingerprint_texts<'a, I>(texts: I) -> [u8; 32]
where
    I: IntoIterator<Item = &'a str>,
{
    let mut hasher = Hasher::new();
    let mut count: u64 = 0;
    for text in texts {
        hasher.update(&(text.len() as u64).to_le_bytes());
        hasher.update(text.as_bytes());
        count += 1;
    }
    hasher.update(&count.to_le_bytes());
    *hasher.finalize().as_bytes()
}

/// Short hex form of a fingerprint (first 8 bytes) for log fields.
pub fn short_hex(hash: &[u8; 32]) -> String {
    hash[..8].iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_text_determinism() {
        let text = "What is Docker?";
        assert_eq!(hash_text(text), hash_text(text));
    }

    #[test]
    fn test_hash_text_case_and_whitespace_sensitive() {
        assert_ne!(hash_text("What is Docker?"), hash_text("what is docker?"));
        assert_ne!(hash_text("What is Docker?"), hash_text("What is Docker? "));
    }

    #[test]
    fn test_fingerprint_boundary_collision_resistance() {
        let a = fingerprint_texts(["ab", "c"]);
        let b = fingerprint_texts(["a", "bc"]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_fingerprint_order_sensitive() {
        let a = fingerprint_texts(["first", "second"]);
        let b = fingerprint_texts(["second", "first"]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_fingerprint_empty_vs_single_empty_text() {
        let none: [&str; 0] = [];
        assert_ne!(fingerprint_texts(none), fingerprint_texts([""]));
    }

    #[test]
    fn test_fingerprint_stable_across_iterators() {
        let owned = vec!["x".to_string(), "y".to_string()];
        let a = fingerprint_texts(owned.iter().map(String::as_str));
        let b = fingerprint_texts(["x", "y"]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_short_hex_length() {
        let hex = short_hex(&hash_text("docker"));
        assert_eq!(hex.len(), 16);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
