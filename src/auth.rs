//! Administrative access capability.
//!
//! The admin surface (archive listing, stats, funds review) asks an
//! injected `AdminAuthenticator` whether a presented bearer token is
//! acceptable. Only a SHA-256 hash of the configured token is kept in
//! memory, and comparison is constant-time.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

pub trait AdminAuthenticator: Send + Sync {
    fn authenticate(&self, token: &str) -> bool;

    /// Whether any token could ever pass. Used to report the admin
    /// surface as disabled rather than unauthorized.
    fn enabled(&self) -> bool {
        true
    }
}

pub fn hash_token(token: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().into()
}

/// Accepts exactly one configured token.
pub struct TokenAuthenticator {
    token_hash: [u8; 32],
}

impl TokenAuthenticator {
    pub fn new(token: Zeroizing<String>) -> Self {
        Self {
            token_hash: hash_token(&token),
        }
    }
}

impl AdminAuthenticator for TokenAuthenticator {
    fn authenticate(&self, token: &str) -> bool {
        let presented = hash_token(token);
        self.token_hash.ct_eq(&presented).unwrap_u8() == 1
    }
}

/// No admin token configured: every request is refused.
#[derive(Debug, Default, Clone, Copy)]
pub struct DenyAll;

impl AdminAuthenticator for DenyAll {
    fn authenticate(&self, _token: &str) -> bool {
        false
    }

    fn enabled(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_token_accepted() {
        let auth = TokenAuthenticator::new(Zeroizing::new("s3cret-admin".into()));
        assert!(auth.enabled());
        assert!(auth.authenticate("s3cret-admin"));
    }

    #[test]
    fn wrong_token_rejected() {
        let auth = TokenAuthenticator::new(Zeroizing::new("s3cret-admin".into()));
        assert!(!auth.authenticate("s3cret-admi"));
        assert!(!auth.authenticate(""));
    }

    #[test]
    fn deny_all_refuses_everything() {
        assert!(!DenyAll.enabled());
        assert!(!DenyAll.authenticate("anything"));
    }

    #[test]
    fn hash_is_deterministic() {
        assert_eq!(hash_token("a"), hash_token("a"));
        assert_ne!(hash_token("a"), hash_token("b"));
    }
}
