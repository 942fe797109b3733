//! Provider registry persisted as YAML.
//!
//! # Storage layout
//!
//! ```text
//! ~/.easel/
//!   providers.yaml   (mode 0600, written atomically)
//! ```
//!
//! # API pattern
//!
//! Every function has two forms:
//! - `fn_at(home: &Path, …)`: explicit home, used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`
//!
//! Tests must NEVER call the no-arg wrappers; always use `_at`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LookupError, RegistryError};
use crate::resolver::{ComponentLookup, ProviderInfo};
use crate::types::{Authority, ComponentName};

/// Current on-disk format version.
pub const REGISTRY_VERSION: u32 = 1;

/// One registered provider component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRegistration {
    pub component: ComponentName,
    pub authority: Authority,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    pub registered_at: DateTime<Utc>,
}

fn enabled_by_default() -> bool {
    true
}

/// Root of `providers.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRegistry {
    pub version: u32,
    #[serde(default)]
    pub providers: Vec<ProviderRegistration>,
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self {
            version: REGISTRY_VERSION,
            providers: Vec::new(),
        }
    }
}

impl ProviderRegistry {
    pub fn get(&self, component: &ComponentName) -> Option<&ProviderRegistration> {
        self.providers.iter().find(|p| &p.component == component)
    }

    fn get_mut(&mut self, component: &ComponentName) -> Option<&mut ProviderRegistration> {
        self.providers.iter_mut().find(|p| &p.component == component)
    }

    pub fn owner_of(&self, authority: &Authority) -> Option<&ProviderRegistration> {
        self.providers.iter().find(|p| &p.authority == authority)
    }
}

impl ComponentLookup for ProviderRegistry {
    fn provider_info(&self, component: &ComponentName) -> Result<ProviderInfo, LookupError> {
        self.get(component)
            .map(|p| ProviderInfo {
                component: p.component.clone(),
                authority: p.authority.clone(),
                enabled: p.enabled,
            })
            .ok_or_else(|| LookupError::NotRegistered(component.clone()))
    }
}

/// [`ComponentLookup`] that reads `providers.yaml` on every lookup, so edits
/// made by other processes are observed.
#[derive(Debug, Clone)]
pub struct FileLookup {
    home: PathBuf,
}

impl FileLookup {
    pub fn at(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// Lookup rooted at `dirs::home_dir()`.
    pub fn from_home() -> Result<Self, RegistryError> {
        Ok(Self::at(home()?))
    }
}

impl ComponentLookup for FileLookup {
    fn provider_info(&self, component: &ComponentName) -> Result<ProviderInfo, LookupError> {
        let registry = load_at(&self.home).map_err(|e| LookupError::Unavailable(Box::new(e)))?;
        registry.provider_info(component)
    }
}

// ---------------------------------------------------------------------------
// 1. Paths
// ---------------------------------------------------------------------------

/// `<home>/.easel/`
pub fn easel_root(home: &Path) -> PathBuf {
    home.join(".easel")
}

/// `<home>/.easel/providers.yaml`. Pure, no I/O.
pub fn providers_path_at(home: &Path) -> PathBuf {
    easel_root(home).join("providers.yaml")
}

// ---------------------------------------------------------------------------
// 2. Load / save
// ---------------------------------------------------------------------------

/// Load the registry. A missing file is an empty registry;
/// malformed YAML is [`RegistryError::Parse`] with the file path.
pub fn load_at(home: &Path) -> Result<ProviderRegistry, RegistryError> {
    let path = providers_path_at(home);
    if !path.exists() {
        return Ok(ProviderRegistry::default());
    }
    let contents = std::fs::read_to_string(&path)?;
    serde_yaml::from_str(&contents).map_err(|e| RegistryError::Parse { path, source: e })
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<ProviderRegistry, RegistryError> {
    load_at(&home()?)
}

/// Atomically save the registry.
///
/// Write flow: serialize → `providers.yaml.tmp` sibling → `chmod 0600` → `rename`.
pub fn save_at(home: &Path, registry: &ProviderRegistry) -> Result<(), RegistryError> {
    let root = easel_root(home);
    if !root.exists() {
        std::fs::create_dir_all(&root)?;
        set_dir_permissions(&root)?;
    }
    let path = providers_path_at(home);
    let tmp_path = path.with_file_name("providers.yaml.tmp");

    let yaml = serde_yaml::to_string(registry)?;
    std::fs::write(&tmp_path, yaml)?;
    set_file_permissions(&tmp_path)?;
    if let Err(e) = std::fs::rename(&tmp_path, &path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    Ok(())
}

/// `save_at` convenience wrapper.
pub fn save(registry: &ProviderRegistry) -> Result<(), RegistryError> {
    save_at(&home()?, registry)
}

// ---------------------------------------------------------------------------
// 3. Edits
// ---------------------------------------------------------------------------

/// Register `component` under `authority`.
///
/// Idempotent for an identical registration. Re-registering a component
/// moves it to the new authority. Fails with [`RegistryError::AuthorityTaken`]
/// when a different component already owns `authority`. New registrations
/// start enabled; an existing registration keeps its state.
pub fn register_at(
    home: &Path,
    component: ComponentName,
    authority: Authority,
) -> Result<ProviderRegistration, RegistryError> {
    register_with_state_at(home, component, authority, None)
}

/// [`register_at`] with an explicit enabled state, applied in the same save.
///
/// `None` keeps an existing registration's state and enables a new one.
pub fn register_with_state_at(
    home: &Path,
    component: ComponentName,
    authority: Authority,
    enabled: Option<bool>,
) -> Result<ProviderRegistration, RegistryError> {
    let mut registry = load_at(home)?;

    if let Some(owner) = registry.owner_of(&authority) {
        if owner.component != component {
            return Err(RegistryError::AuthorityTaken {
                authority,
                owner: owner.component.clone(),
            });
        }
    }

    let registration = match registry.get_mut(&component) {
        Some(existing) => {
            let unchanged = existing.authority == authority
                && enabled.map_or(true, |e| e == existing.enabled);
            if unchanged {
                return Ok(existing.clone());
            }
            if existing.authority != authority {
                tracing::info!("moving {component} from {} to {authority}", existing.authority);
                existing.authority = authority;
            }
            if let Some(enabled) = enabled {
                existing.enabled = enabled;
            }
            existing.clone()
        }
        None => {
            let registration = ProviderRegistration {
                component,
                authority,
                enabled: enabled.unwrap_or(true),
                registered_at: Utc::now(),
            };
            tracing::info!(
                "registered {} at {}",
                registration.component,
                registration.authority
            );
            registry.providers.push(registration.clone());
            registry.providers.sort_by(|a, b| a.component.cmp(&b.component));
            registration
        }
    };

    save_at(home, &registry)?;
    Ok(registration)
}

/// `register_at` convenience wrapper.
pub fn register(
    component: ComponentName,
    authority: Authority,
) -> Result<ProviderRegistration, RegistryError> {
    register_at(&home()?, component, authority)
}

/// Enable or disable a registered component. Disabled components no longer
/// resolve to an address.
pub fn set_enabled_at(
    home: &Path,
    component: &ComponentName,
    enabled: bool,
) -> Result<ProviderRegistration, RegistryError> {
    let mut registry = load_at(home)?;
    let registration = registry
        .get_mut(component)
        .ok_or_else(|| RegistryError::NotRegistered {
            component: component.clone(),
        })?;
    if registration.enabled == enabled {
        return Ok(registration.clone());
    }
    registration.enabled = enabled;
    let registration = registration.clone();
    save_at(home, &registry)?;
    tracing::info!(
        "{} {component}",
        if enabled { "enabled" } else { "disabled" }
    );
    Ok(registration)
}

/// `set_enabled_at` convenience wrapper.
pub fn set_enabled(
    component: &ComponentName,
    enabled: bool,
) -> Result<ProviderRegistration, RegistryError> {
    set_enabled_at(&home()?, component, enabled)
}

/// Remove a component's registration.
pub fn unregister_at(
    home: &Path,
    component: &ComponentName,
) -> Result<ProviderRegistration, RegistryError> {
    let mut registry = load_at(home)?;
    let index = registry
        .providers
        .iter()
        .position(|p| &p.component == component)
        .ok_or_else(|| RegistryError::NotRegistered {
            component: component.clone(),
        })?;
    let removed = registry.providers.remove(index);
    save_at(home, &registry)?;
    tracing::info!("unregistered {component}");
    Ok(removed)
}

/// `unregister_at` convenience wrapper.
pub fn unregister(component: &ComponentName) -> Result<ProviderRegistration, RegistryError> {
    unregister_at(&home()?, component)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn home() -> Result<PathBuf, RegistryError> {
    dirs::home_dir().ok_or(RegistryError::HomeNotFound)
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), RegistryError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), RegistryError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), RegistryError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), RegistryError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::content_uri_for;
    use tempfile::TempDir;

    fn featured() -> ComponentName {
        ComponentName::from("com.example.art/.FeaturedArtProvider")
    }

    #[test]
    fn providers_path_is_correct() {
        let home = TempDir::new().expect("tempdir");
        assert!(providers_path_at(home.path()).ends_with(".easel/providers.yaml"));
    }

    #[test]
    fn load_missing_registry_is_empty() {
        let home = TempDir::new().expect("tempdir");
        let registry = load_at(home.path()).expect("load");
        assert!(registry.providers.is_empty());
        assert_eq!(registry.version, REGISTRY_VERSION);
    }

    #[test]
    fn register_then_lookup_through_file() {
        let home = TempDir::new().expect("tempdir");
        register_at(home.path(), featured(), Authority::from("com.example.art.featured"))
            .expect("register");

        let lookup = FileLookup::at(home.path());
        let uri = content_uri_for(&lookup, &featured()).expect("resolve");
        assert_eq!(uri.to_string(), "content://com.example.art.featured");
    }

    #[test]
    fn register_is_idempotent() {
        let home = TempDir::new().expect("tempdir");
        let first = register_at(home.path(), featured(), Authority::from("a.b")).unwrap();
        let second = register_at(home.path(), featured(), Authority::from("a.b")).unwrap();
        assert_eq!(first, second);
        assert_eq!(load_at(home.path()).unwrap().providers.len(), 1);
    }

    #[test]
    fn reregister_moves_authority() {
        let home = TempDir::new().expect("tempdir");
        register_at(home.path(), featured(), Authority::from("a.old")).unwrap();
        let moved = register_at(home.path(), featured(), Authority::from("a.new")).unwrap();
        assert_eq!(moved.authority, Authority::from("a.new"));
        let registry = load_at(home.path()).unwrap();
        assert_eq!(registry.providers.len(), 1);
        assert!(registry.owner_of(&Authority::from("a.old")).is_none());
    }

    #[test]
    fn authority_owned_by_other_component_is_rejected() {
        let home = TempDir::new().expect("tempdir");
        register_at(home.path(), featured(), Authority::from("a.b")).unwrap();
        let err = register_at(home.path(), ComponentName::from("other/.P"), Authority::from("a.b"))
            .unwrap_err();
        assert!(matches!(err, RegistryError::AuthorityTaken { .. }), "got: {err}");
    }

    #[test]
    fn disabled_provider_does_not_resolve() {
        let home = TempDir::new().expect("tempdir");
        register_at(home.path(), featured(), Authority::from("a.b")).unwrap();
        set_enabled_at(home.path(), &featured(), false).unwrap();

        let err = content_uri_for(&FileLookup::at(home.path()), &featured()).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::ProviderNotFound { source: LookupError::Disabled(_), .. }
        ));
    }

    #[test]
    fn unregister_missing_component_fails() {
        let home = TempDir::new().expect("tempdir");
        let err = unregister_at(home.path(), &featured()).unwrap_err();
        assert!(matches!(err, RegistryError::NotRegistered { .. }));
    }

    #[test]
    fn save_cleans_up_tmp() {
        let home = TempDir::new().expect("tempdir");
        register_at(home.path(), featured(), Authority::from("a.b")).unwrap();
        let tmp = providers_path_at(home.path()).with_file_name("providers.yaml.tmp");
        assert!(!tmp.exists(), ".tmp must be gone after successful save");
    }

    #[test]
    fn home_not_found_error_message() {
        assert!(RegistryError::HomeNotFound.to_string().contains("home directory"));
    }
}
