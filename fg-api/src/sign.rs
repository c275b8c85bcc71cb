//! Body signing boundary.
//!
//! The app signs every POST body before transmission. The algorithm itself is
//! opaque to this crate; it is injected as a strategy so it can be swapped or
//! stubbed in tests. The engine's only obligation is sequencing: fields are
//! ordered first, signed second, encoded last, and the signer's output is the
//! authoritative field set.

use std::fmt;

/// Transform applied to the ordered POST fields before encoding.
///
/// Implementations typically replace the field set with a `signed_body`
/// payload plus a signature key-version marker. The input arrives already in
/// serialization order; implementations must preserve the ordering contract
/// for any fields they pass through.
pub trait Signer: Send + Sync {
    /// Sign the ordered field set, returning the new authoritative set.
    fn sign(&self, fields: Vec<(String, String)>) -> Vec<(String, String)>;
}

impl fmt::Debug for dyn Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Signer")
    }
}

/// Signer that returns the fields unchanged.
///
/// Default for endpoints that do not require a signed body, and a convenient
/// stand-in for tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughSigner;

impl Signer for PassthroughSigner {
    fn sign(&self, fields: Vec<(String, String)>) -> Vec<(String, String)> {
        fields
    }
}

impl<F> Signer for F
where
    F: Fn(Vec<(String, String)>) -> Vec<(String, String)> + Send + Sync,
{
    fn sign(&self, fields: Vec<(String, String)>) -> Vec<(String, String)> {
        self(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough_identity() {
        let fields = vec![("k".to_string(), "v".to_string())];
        assert_eq!(PassthroughSigner.sign(fields.clone()), fields);
    }

    #[test]
    fn test_closure_signer() {
        let signer = |mut fields: Vec<(String, String)>| {
            fields.push(("signature".to_string(), "abc".to_string()));
            fields
        };
        let out = Signer::sign(&signer, vec![]);
        assert_eq!(out, vec![("signature".to_string(), "abc".to_string())]);
    }
}
