//! Codec configuration
//!
//! Two behaviors of the envelope codec are configurable:
//!
//! - **Request id omission**: whether a request envelope drops only a missing
//!   id, or also `null`, `0` and `""` ids
//! - **Fingerprint mode**: whether the request fingerprint hashes params in
//!   insertion order or with top-level keys sorted
//!
//! The defaults reproduce the established wire behavior.
//!
//! # Examples
//!
//! ```rust
//! use rpc_common_core::{CodecConfig, FingerprintMode, IdOmission};
//!
//! let config = CodecConfig::default();
//! assert_eq!(config.request_id, IdOmission::Falsy);
//!
//! let custom = CodecConfig::new()
//!     .with_request_id(IdOmission::Absent)
//!     .with_fingerprint(FingerprintMode::SortedKeys);
//! assert_eq!(custom.fingerprint, FingerprintMode::SortedKeys);
//! ```

/// When a request envelope leaves out its `id` member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdOmission {
    /// Omit the id when it is missing, `null`, `0` or `""`
    ///
    /// A request with id `0` cannot be told apart from a notification.
    #[default]
    Falsy,
    /// Omit the id only when none was given; an explicit `null` is emitted
    Absent,
}

/// How params are laid out before hashing into a fingerprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FingerprintMode {
    /// Hash params exactly as inserted
    ///
    /// `{"a":1,"b":2}` and `{"b":2,"a":1}` produce different fingerprints.
    #[default]
    InsertionOrder,
    /// Sort top-level keys of named params before hashing
    SortedKeys,
}

/// Envelope codec configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CodecConfig {
    /// Request id omission policy
    pub request_id: IdOmission,
    /// Fingerprint params layout
    pub fingerprint: FingerprintMode,
}

impl CodecConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit every id that was given, hash in insertion order
    pub fn strict() -> Self {
        Self {
            request_id: IdOmission::Absent,
            fingerprint: FingerprintMode::InsertionOrder,
        }
    }

    /// Set the request id omission policy
    pub fn with_request_id(mut self, policy: IdOmission) -> Self {
        self.request_id = policy;
        self
    }

    /// Set the fingerprint mode
    pub fn with_fingerprint(mut self, mode: FingerprintMode) -> Self {
        self.fingerprint = mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CodecConfig::default();
        assert_eq!(config.request_id, IdOmission::Falsy);
        assert_eq!(config.fingerprint, FingerprintMode::InsertionOrder);
        assert_eq!(config, CodecConfig::new());
    }

    #[test]
    fn test_strict_preset() {
        let config = CodecConfig::strict();
        assert_eq!(config.request_id, IdOmission::Absent);
        assert_eq!(config.fingerprint, FingerprintMode::InsertionOrder);
    }

    #[test]
    fn test_builder() {
        let config = CodecConfig::new().with_fingerprint(FingerprintMode::SortedKeys);
        assert_eq!(config.request_id, IdOmission::Falsy);
        assert_eq!(config.fingerprint, FingerprintMode::SortedKeys);
    }
}
