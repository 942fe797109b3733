//! `easel uri`, `easel last`, `easel list`, `easel add`, `easel set`

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use easel_client::RegistryClient;
use easel_core::ArtworkRecord;
use easel_store::FileStore;

use super::target::{home, TargetArgs};

#[derive(Args, Debug)]
pub struct ReadArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

/// Fields of the artwork to write. Unset fields are left out of the row.
#[derive(Args, Debug)]
pub struct WriteArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Provider-defined identity; re-adding a token updates that artwork.
    #[arg(long)]
    pub token: Option<String>,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub byline: Option<String>,

    #[arg(long)]
    pub attribution: Option<String>,

    #[arg(long)]
    pub persistent_uri: Option<String>,

    #[arg(long)]
    pub web_uri: Option<String>,

    /// Opaque provider metadata.
    #[arg(long)]
    pub metadata: Option<String>,

    /// Path of the cached image file.
    #[arg(long)]
    pub data: Option<String>,
}

impl WriteArgs {
    fn record(&self) -> ArtworkRecord {
        ArtworkRecord {
            token: self.token.clone(),
            title: self.title.clone(),
            byline: self.byline.clone(),
            attribution: self.attribution.clone(),
            persistent_uri: self.persistent_uri.clone(),
            web_uri: self.web_uri.clone(),
            metadata: self.metadata.clone(),
            data: self.data.clone(),
            ..Default::default()
        }
    }
}

#[derive(Tabled)]
struct ArtworkRow {
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "token")]
    token: String,
    #[tabled(rename = "title")]
    title: String,
    #[tabled(rename = "byline")]
    byline: String,
    #[tabled(rename = "added")]
    added: String,
}

impl From<&ArtworkRecord> for ArtworkRow {
    fn from(record: &ArtworkRecord) -> Self {
        Self {
            id: record.id.map(|id| id.to_string()).unwrap_or_default(),
            token: record.token.clone().unwrap_or_default(),
            title: record.title.clone().unwrap_or_default(),
            byline: record.byline.clone().unwrap_or_default(),
            added: record.date_added.map(format_timestamp).unwrap_or_default(),
        }
    }
}

fn client() -> Result<RegistryClient<FileStore>> {
    Ok(RegistryClient::new(FileStore::at_home(&home()?)))
}

pub fn uri(target: TargetArgs) -> Result<()> {
    println!("{}", target.resolve()?);
    Ok(())
}

pub fn last(args: ReadArgs) -> Result<()> {
    let uri = args.target.resolve()?;
    let last = client()?
        .get_last_added(&uri)
        .with_context(|| format!("failed to read artwork at {uri}"))?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&last).context("failed to serialize artwork")?
        );
        return Ok(());
    }
    match last {
        Some(record) => print_table(std::slice::from_ref(&record)),
        None => println!("No artwork at {uri}."),
    }
    Ok(())
}

pub fn list(args: ReadArgs) -> Result<()> {
    let uri = args.target.resolve()?;
    let records = client()?
        .list_artwork(&uri)
        .with_context(|| format!("failed to read artwork at {uri}"))?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&records).context("failed to serialize artwork")?
        );
        return Ok(());
    }
    if records.is_empty() {
        println!("No artwork at {uri}.");
        return Ok(());
    }
    print_table(&records);
    println!("{} artwork at {}", records.len(), uri.to_string().bold());
    Ok(())
}

pub fn add(args: WriteArgs) -> Result<()> {
    let uri = args.target.resolve()?;
    let added = client()?
        .add_artwork(&uri, &args.record())
        .with_context(|| format!("failed to add artwork at {uri}"))?;
    match added {
        Some(row_uri) => {
            println!("✓ Added {}", row_uri.to_string().green());
            Ok(())
        }
        None => anyhow::bail!("{uri} declined the artwork"),
    }
}

pub fn set(args: WriteArgs) -> Result<()> {
    let uri = args.target.resolve()?;
    let inserted = client()?
        .try_set_artwork(&uri, &args.record())
        .with_context(|| format!("failed to replace artwork at {uri}; nothing was changed"))?;
    println!("✓ Set {}", inserted.to_string().green());
    Ok(())
}

fn print_table(records: &[ArtworkRecord]) {
    let rows: Vec<ArtworkRow> = records.iter().map(ArtworkRow::from).collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}

fn format_timestamp(seconds: i64) -> String {
    chrono::DateTime::from_timestamp(seconds, 0)
        .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| seconds.to_string())
}
