//! Provider registry error-message, atomic-write-safety and resolution tests.

use assert_fs::prelude::*;
use easel_core::{
    content_uri_for, registry, Authority, ComponentName, LookupError, RegistryError,
};
use predicates::prelude::*;
use std::fs;

fn featured() -> ComponentName {
    ComponentName::from("com.example.art/.FeaturedArtProvider")
}

// ---------------------------------------------------------------------------
// 1. Load error messages
// ---------------------------------------------------------------------------

#[test]
fn load_corrupt_yaml_returns_parse_error_with_path() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    home.child(".easel/providers.yaml")
        .write_str(": : corrupt : yaml : !!!\n  - broken: [unclosed")
        .expect("write");

    let err = registry::load_at(home.path()).unwrap_err();
    assert!(matches!(err, RegistryError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("providers.yaml"), "must contain file path, got: {err}");
}

#[test]
fn corrupt_registry_makes_lookup_unavailable() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    home.child(".easel/providers.yaml")
        .write_str("- this is a list, not a mapping\n")
        .expect("write");

    let err = content_uri_for(&registry::FileLookup::at(home.path()), &featured()).unwrap_err();
    match err {
        RegistryError::ProviderNotFound { source: LookupError::Unavailable(inner), .. } => {
            assert!(matches!(*inner, RegistryError::Parse { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
}

// ---------------------------------------------------------------------------
// 2. Atomic write safety
// ---------------------------------------------------------------------------

#[test]
fn saved_registry_is_readable_yaml() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    registry::register_at(home.path(), featured(), Authority::from("com.example.art.featured"))
        .expect("register");

    home.child(".easel/providers.yaml")
        .assert(predicate::str::contains("com.example.art.featured"))
        .assert(predicate::str::contains("enabled: true"));
    home.child(".easel/providers.yaml.tmp").assert(predicate::path::missing());
}

#[cfg(unix)]
#[test]
fn saved_registry_is_private() {
    use std::os::unix::fs::PermissionsExt;

    let home = assert_fs::TempDir::new().expect("tempdir");
    registry::register_at(home.path(), featured(), Authority::from("a.b")).expect("register");

    let mode = fs::metadata(registry::providers_path_at(home.path()))
        .expect("metadata")
        .permissions()
        .mode()
        & 0o777;
    assert_eq!(mode, 0o600);
}

#[test]
fn interrupted_save_leaves_original_intact() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    registry::register_at(home.path(), featured(), Authority::from("a.b")).expect("register");

    let path = registry::providers_path_at(home.path());
    let original = fs::read(&path).expect("read original");

    // Simulate a crash: .tmp written but the process died before rename.
    let tmp = path.with_file_name("providers.yaml.tmp");
    fs::write(&tmp, b"CRASH - INCOMPLETE WRITE").expect("write crash tmp");

    assert_eq!(fs::read(&path).expect("read after crash"), original);
    let reloaded = registry::load_at(home.path()).expect("load after crash");
    assert_eq!(reloaded.providers.len(), 1);
}

// ---------------------------------------------------------------------------
// 3. Registry lifecycle
// ---------------------------------------------------------------------------

#[test]
fn register_disable_enable_unregister() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let lookup = registry::FileLookup::at(home.path());

    registry::register_at(home.path(), featured(), Authority::from("a.b")).expect("register");
    assert!(content_uri_for(&lookup, &featured()).is_ok());

    registry::set_enabled_at(home.path(), &featured(), false).expect("disable");
    assert!(content_uri_for(&lookup, &featured()).is_err());

    registry::set_enabled_at(home.path(), &featured(), true).expect("enable");
    assert!(content_uri_for(&lookup, &featured()).is_ok());

    registry::unregister_at(home.path(), &featured()).expect("unregister");
    let err = content_uri_for(&lookup, &featured()).unwrap_err();
    assert!(matches!(
        err,
        RegistryError::ProviderNotFound { source: LookupError::NotRegistered(_), .. }
    ));
}

#[test]
fn register_disabled_is_saved_in_one_step() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let lookup = registry::FileLookup::at(home.path());

    let registration = registry::register_with_state_at(
        home.path(),
        featured(),
        Authority::from("a.b"),
        Some(false),
    )
    .expect("register");
    assert!(!registration.enabled);
    home.child(".easel/providers.yaml")
        .assert(predicate::str::contains("enabled: false"));
    assert!(matches!(
        content_uri_for(&lookup, &featured()).unwrap_err(),
        RegistryError::ProviderNotFound { source: LookupError::Disabled(_), .. }
    ));

    // Re-registering without a state keeps the provider disabled.
    let again = registry::register_at(home.path(), featured(), Authority::from("a.b"))
        .expect("re-register");
    assert!(!again.enabled);

    let enabled = registry::register_with_state_at(
        home.path(),
        featured(),
        Authority::from("a.b"),
        Some(true),
    )
    .expect("enable via register");
    assert!(enabled.enabled);
    assert!(content_uri_for(&lookup, &featured()).is_ok());
}

#[test]
fn providers_are_listed_in_component_order() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    for (component, authority) in [("zeta/.P", "z.p"), ("alpha/.P", "a.p"), ("mid/.P", "m.p")] {
        registry::register_at(home.path(), ComponentName::from(component), Authority::from(authority))
            .expect("register");
    }
    let names: Vec<String> = registry::load_at(home.path())
        .expect("load")
        .providers
        .into_iter()
        .map(|p| p.component.0)
        .collect();
    assert_eq!(names, vec!["alpha/.P", "mid/.P", "zeta/.P"]);
}
