//! `easel provider register|list|enable|disable|remove`

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use easel_core::{registry, Authority, ComponentName};

use super::target::home;

/// Manage the provider registry at `~/.easel/providers.yaml`.
#[derive(Subcommand, Debug)]
pub enum ProviderCommand {
    /// Register a provider component under an authority.
    Register(RegisterArgs),

    /// List registered providers.
    List {
        /// Emit machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Enable a registered provider.
    Enable { component: String },

    /// Disable a registered provider; lookups by component then fail.
    Disable { component: String },

    /// Remove a provider's registration. Its table is left on disk.
    Remove { component: String },
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Provider component name.
    pub component: String,

    /// Authority the provider answers at.
    #[arg(long, short = 'a')]
    pub authority: String,

    /// Register the provider in the disabled state.
    #[arg(long)]
    pub disabled: bool,
}

#[derive(Serialize, Tabled)]
struct ProviderRow {
    #[tabled(rename = "component")]
    component: String,
    #[tabled(rename = "authority")]
    authority: String,
    #[tabled(rename = "enabled")]
    enabled: bool,
    #[tabled(rename = "registered")]
    registered_at: String,
}

pub fn run(cmd: ProviderCommand) -> Result<()> {
    match cmd {
        ProviderCommand::Register(args) => register(args),
        ProviderCommand::List { json } => list(json),
        ProviderCommand::Enable { component } => set_enabled(&component, true),
        ProviderCommand::Disable { component } => set_enabled(&component, false),
        ProviderCommand::Remove { component } => remove(&component),
    }
}

fn register(args: RegisterArgs) -> Result<()> {
    let home = home()?;
    let component = ComponentName::from(args.component);
    let enabled = if args.disabled { Some(false) } else { None };
    let registration = registry::register_with_state_at(
        &home,
        component.clone(),
        Authority::from(args.authority),
        enabled,
    )
    .with_context(|| format!("failed to register '{component}'"))?;

    let state = if registration.enabled {
        "enabled".green()
    } else {
        "disabled".yellow()
    };
    println!(
        "✓ Registered '{}' at content://{} ({state})",
        registration.component, registration.authority
    );
    Ok(())
}

fn list(json: bool) -> Result<()> {
    let registry = registry::load_at(&home()?).context("failed to load provider registry")?;
    let rows: Vec<ProviderRow> = registry
        .providers
        .iter()
        .map(|p| ProviderRow {
            component: p.component.to_string(),
            authority: p.authority.to_string(),
            enabled: p.enabled,
            registered_at: p.registered_at.format("%Y-%m-%d %H:%M").to_string(),
        })
        .collect();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&rows).context("failed to serialize provider list")?
        );
        return Ok(());
    }

    if rows.is_empty() {
        println!("No providers registered.");
        println!("Run: easel provider register <component> --authority <authority>");
        return Ok(());
    }
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}

fn set_enabled(component: &str, enabled: bool) -> Result<()> {
    let component = ComponentName::from(component);
    registry::set_enabled_at(&home()?, &component, enabled)
        .with_context(|| format!("failed to update '{component}'"))?;
    let state = if enabled { "Enabled" } else { "Disabled" };
    println!("✓ {state} '{component}'");
    Ok(())
}

fn remove(component: &str) -> Result<()> {
    let component = ComponentName::from(component);
    let removed = registry::unregister_at(&home()?, &component)
        .with_context(|| format!("failed to remove '{component}'"))?;
    println!("✓ Removed '{}' ({})", removed.component, removed.authority.as_str().bright_black());
    Ok(())
}
