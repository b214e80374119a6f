//! Identity unification for commit authors.
//!
//! By default every author signature is resolved through the repository's
//! mailmap (see [`Mailmap`]). Callers can inject a [`Canonicalize`]
//! implementation instead, which then replaces the mailmap entirely.

pub mod mailmap;

pub use mailmap::Mailmap;

/// Maps a raw commit identity onto its canonical identity.
pub trait Canonicalize: Send + Sync {
    /// Return the canonical `(name, email)` for a raw commit signature.
    fn canonicalize(&self, name: &str, email: &str) -> (String, String);
}

/// Identity map that leaves every signature unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCanonicalization;

impl Canonicalize for NoCanonicalization {
    fn canonicalize(&self, name: &str, email: &str) -> (String, String) {
        (name.to_string(), email.to_string())
    }
}

/// Adapts a closure into a [`Canonicalize`] implementation.
pub struct FnCanonicalizer<F>(pub F);

impl<F> Canonicalize for FnCanonicalizer<F>
where
    F: Fn(&str, &str) -> (String, String) + Send + Sync,
{
    fn canonicalize(&self, name: &str, email: &str) -> (String, String) {
        (self.0)(name, email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_canonicalization_is_identity() {
        let (name, email) = NoCanonicalization.canonicalize("A B", "ab@x.com");
        assert_eq!(name, "A B");
        assert_eq!(email, "ab@x.com");
    }

    #[test]
    fn test_closure_canonicalizer() {
        let lower = FnCanonicalizer(|name: &str, email: &str| {
            (name.to_string(), email.to_lowercase())
        });
        assert_eq!(
            lower.canonicalize("A", "A@X.COM"),
            ("A".to_string(), "a@x.com".to_string())
        );
    }
}
