//! Error types for easel-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{Authority, ComponentName};

/// All errors that can arise from provider registry operations and address
/// resolution.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Underlying I/O failure (permission denied, disk full, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load; includes file path and line context from serde_yaml.
    #[error("failed to parse provider registry at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`, cannot locate `~/.easel/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// The component does not resolve to a live, enabled provider.
    #[error("invalid provider {component}, is your provider disabled? ({source})")]
    ProviderNotFound {
        component: ComponentName,
        #[source]
        source: LookupError,
    },

    /// A registry edit named a component that has no registration.
    #[error("provider {component} is not registered")]
    NotRegistered { component: ComponentName },

    /// Another component already owns the requested authority.
    #[error("authority {authority} is already registered to {owner}")]
    AuthorityTaken {
        authority: Authority,
        owner: ComponentName,
    },
}

/// Failure reported by a [`ComponentLookup`](crate::resolver::ComponentLookup).
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("component {0} is not registered")]
    NotRegistered(ComponentName),

    #[error("component {0} is disabled")]
    Disabled(ComponentName),

    /// The lookup backend itself could not be read.
    #[error("provider registry unavailable: {0}")]
    Unavailable(#[source] Box<RegistryError>),
}

/// A row from the store could not be decoded into an artwork record.
#[derive(Debug, Error)]
pub enum RowError {
    /// A known column held a value that cannot be coerced to its type.
    #[error("malformed row: column `{column}` {reason}")]
    Malformed { column: String, reason: String },

    /// The row representation itself could not be read.
    #[error("unreadable row: {0}")]
    Unreadable(#[from] serde_json::Error),
}

/// A string could not be parsed as a content address.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid content URI {input:?}: {reason}")]
    Invalid { input: String, reason: String },
}
