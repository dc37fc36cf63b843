//! Error types for policy construction and configuration
//!
//! Queries against a built trie never fail: a missing resource or an unknown
//! subject is an ordinary "not permitted" answer. Errors only surface while
//! turning untrusted input (identifiers, policy documents, configuration)
//! into the validated types the enforcer consumes.

use thiserror::Error;

/// Policy operation result type
pub type Result<T> = std::result::Result<T, PolicyError>;

/// Errors raised while validating policy input
#[derive(Error, Debug)]
pub enum PolicyError {
    /// Policy id is not of the form `namespace:name`
    #[error("Invalid policy id: {0}")]
    InvalidPolicyId(String),

    /// Policy entry label is empty or malformed
    #[error("Invalid label: {0}")]
    InvalidLabel(String),

    /// Subject id is empty
    #[error("Invalid subject id: {0}")]
    InvalidSubjectId(String),

    /// Permission name is empty or contains whitespace
    #[error("Invalid permission: {0}")]
    InvalidPermission(String),

    /// Resource key has no resource type or cannot be parsed
    #[error("Invalid resource key: {0}")]
    InvalidResourceKey(String),

    /// Policy exceeds the configured entry limit
    #[error("Policy {policy_id} has {count} entries (max {max})")]
    TooManyEntries {
        policy_id: String,
        count: usize,
        max: usize,
    },

    /// Configuration failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}
