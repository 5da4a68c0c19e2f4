use sha2::{Digest, Sha256};

pub fn sha256_hex(s: &str) -> String {
    let mut h = Sha256::new();
    h.update(s.as_bytes());
    hex::encode(h.finalize())
}

/// Cache key for one check against one data source: the check identity, its
/// canonical serialized parameters and the source fingerprint. Pointing the
/// same suite at a different source never yields a false hit.
pub fn cache_key(check_name: &str, params_json: &str, source_fingerprint: &str) -> String {
    let mut h = Sha256::new();
    h.update(check_name.as_bytes());
    h.update(b"\n");
    h.update(params_json.as_bytes());
    h.update(b"\n");
    h.update(source_fingerprint.as_bytes());
    format!("{:x}", h.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_stable() {
        let a = cache_key("row_count", "{}", "src-1");
        let b = cache_key("row_count", "{}", "src-1");
        assert_eq!(a, b);
    }

    #[test]
    fn key_is_sensitive_to_every_component() {
        let base = cache_key("row_count", "{}", "src-1");
        assert_ne!(base, cache_key("null_ratio", "{}", "src-1"));
        assert_ne!(base, cache_key("row_count", r#"{"column":"id"}"#, "src-1"));
        assert_ne!(base, cache_key("row_count", "{}", "src-2"));
    }
}
