//! Selecting which provider collection a command operates on.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgGroup, Args};

use easel_core::{content_uri, content_uri_for, registry::FileLookup, ComponentName, ContentUri};

/// A provider, named either by its registered component or by a raw
/// authority.
#[derive(Args, Debug, Clone)]
#[command(group(ArgGroup::new("target").required(true).args(["component", "authority"])))]
pub struct TargetArgs {
    /// Registered provider component (e.g. "com.example/.FeaturedArtProvider").
    pub component: Option<String>,

    /// Address the provider's authority directly, skipping the registry.
    #[arg(long, short = 'a', conflicts_with = "component")]
    pub authority: Option<String>,
}

impl TargetArgs {
    /// Collection address for the selected provider.
    pub fn resolve(&self) -> Result<ContentUri> {
        match (&self.component, &self.authority) {
            (_, Some(authority)) => Ok(content_uri(authority.as_str())),
            (Some(component), None) => {
                let lookup = FileLookup::at(home()?);
                let component = ComponentName::from(component.as_str());
                content_uri_for(&lookup, &component)
                    .with_context(|| format!("cannot resolve provider '{component}'"))
            }
            (None, None) => anyhow::bail!("name a provider component or pass --authority"),
        }
    }
}

pub fn home() -> Result<PathBuf> {
    dirs::home_dir().context("could not determine home directory")
}
