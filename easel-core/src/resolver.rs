//! Provider identifier → content address resolution.
//!
//! Two paths:
//! - [`content_uri`] builds the address straight from an authority string and
//!   never checks whether that authority is live.
//! - [`content_uri_for`] asks a [`ComponentLookup`] for the component's
//!   registration first. Unregistered and disabled components both fail with
//!   [`RegistryError::ProviderNotFound`], wrapping the lookup's error.
//!
//! Neither path touches a store.

use crate::address::ContentUri;
use crate::error::{LookupError, RegistryError};
use crate::types::{Authority, ComponentName};

/// Registration details for a provider component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderInfo {
    pub component: ComponentName,
    pub authority: Authority,
    pub enabled: bool,
}

/// Host-supplied capability mapping a component name to its registration.
///
/// Implementations may return disabled registrations; [`content_uri_for`]
/// rejects those itself.
pub trait ComponentLookup {
    fn provider_info(&self, component: &ComponentName) -> Result<ProviderInfo, LookupError>;
}

impl<T: ComponentLookup + ?Sized> ComponentLookup for &T {
    fn provider_info(&self, component: &ComponentName) -> Result<ProviderInfo, LookupError> {
        (**self).provider_info(component)
    }
}

/// Collection address for a raw authority string.
pub fn content_uri(authority: impl Into<Authority>) -> ContentUri {
    ContentUri::new(authority)
}

/// Collection address for a registered, enabled provider component.
pub fn content_uri_for(
    lookup: &dyn ComponentLookup,
    component: &ComponentName,
) -> Result<ContentUri, RegistryError> {
    let not_found = |source| RegistryError::ProviderNotFound {
        component: component.clone(),
        source,
    };
    let info = lookup.provider_info(component).map_err(not_found)?;
    if !info.enabled {
        return Err(not_found(LookupError::Disabled(component.clone())));
    }
    tracing::debug!("resolved {component} to authority {}", info.authority);
    Ok(content_uri(info.authority))
}
