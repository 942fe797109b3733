//! Easel core library: artwork model, row codec, content addresses,
//! provider resolution and the provider registry.
//!
//! - [`record`]: [`ArtworkRecord`] and its sparse row codec
//! - [`row`]: the generic [`Row`] / [`Value`] representation
//! - [`address`]: [`ContentUri`]
//! - [`resolver`]: [`ComponentLookup`] and address resolution
//! - [`registry`]: YAML provider registry (load / save / register)
//! - [`error`]: error enums

pub mod address;
pub mod error;
pub mod record;
pub mod registry;
pub mod resolver;
pub mod row;
pub mod types;

pub use address::ContentUri;
pub use error::{AddressError, LookupError, RegistryError, RowError};
pub use record::{columns, ArtworkRecord};
pub use resolver::{content_uri, content_uri_for, ComponentLookup, ProviderInfo};
pub use row::{Row, Value};
pub use types::{ArtworkId, Authority, ComponentName};
