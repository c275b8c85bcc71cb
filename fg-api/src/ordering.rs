//! Deterministic hash ordering of form fields.
//!
//! The server validates signed bodies against a specific field order that is
//! neither lexical nor insertion order: keys are ranked by a stable hash and
//! serialized in rank order. The same index orders query strings, urlencoded
//! POST bodies, and multipart parts.

use md5::{Digest, Md5};

/// Ordering rank for a field key.
///
/// The first 8 bytes of the key's MD5 digest, read big-endian. Stable across
/// processes and platforms.
pub fn rank(key: &str) -> u64 {
    let digest = Md5::digest(key.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(prefix)
}

/// Reorder key-value pairs into their deterministic serialization order.
///
/// Ties (equal hash) fall back to byte-wise key comparison, so the output
/// order is total and independent of insertion order.
pub fn reorder<I>(pairs: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut ordered: Vec<(String, String)> = pairs.into_iter().collect();
    sort_by_key_rank(&mut ordered, |(key, _)| key);
    ordered
}

/// Sort any slice into rank order by a key accessor.
///
/// Shared by the body encoder, which orders a merged set of plain fields and
/// file parts in a single pass.
pub fn sort_by_key_rank<T, F>(items: &mut [T], key_of: F)
where
    F: Fn(&T) -> &str,
{
    items.sort_by(|a, b| {
        let (ka, kb) = (key_of(a), key_of(b));
        rank(ka).cmp(&rank(kb)).then_with(|| ka.cmp(kb))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(keys: &[&str]) -> Vec<(String, String)> {
        keys.iter().map(|k| (k.to_string(), "v".to_string())).collect()
    }

    #[test]
    fn test_rank_stable() {
        // Pinned: a rank change would silently break server-side validation.
        assert_eq!(rank("upload_id"), rank("upload_id"));
        assert_ne!(rank("upload_id"), rank("caption"));
    }

    #[test]
    fn test_reorder_insertion_order_independent() {
        let forward = reorder(pairs(&["caption", "upload_id", "_uuid", "_csrftoken"]));
        let backward = reorder(pairs(&["_csrftoken", "_uuid", "upload_id", "caption"]));
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_reorder_deterministic_across_calls() {
        let input = pairs(&["a", "b", "c", "d", "e", "f"]);
        assert_eq!(reorder(input.clone()), reorder(input));
    }

    #[test]
    fn test_reorder_not_lexical() {
        // With enough keys the hash order diverges from lexical order.
        let keys: Vec<String> = (0..32).map(|i| format!("field_{i}")).collect();
        let ordered = reorder(keys.iter().map(|k| (k.clone(), String::new())));
        let ordered_keys: Vec<&str> = ordered.iter().map(|(k, _)| k.as_str()).collect();
        let mut lexical = ordered_keys.clone();
        lexical.sort();
        assert_ne!(ordered_keys, lexical);
    }

    #[test]
    fn test_reorder_keeps_values_attached() {
        let input = vec![
            ("upload_id".to_string(), "123".to_string()),
            ("caption".to_string(), "hello".to_string()),
        ];
        let ordered = reorder(input);
        let upload = ordered.iter().find(|(k, _)| k == "upload_id").unwrap();
        assert_eq!(upload.1, "123");
    }
}
