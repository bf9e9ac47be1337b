//! The `list` command: prints the filtered playlist.

use std::path::Path;

use clap::Args;
use colored::Colorize;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

use super::types::FilterArgs;
use crate::cli::output;
use crate::config::LoadedConfig;
use crate::error::BackdropError;
use crate::host::DirectoryCatalog;
use crate::platform::path::{display_relative, expand};
use crate::ports::CatalogPort;
use crate::slideshow::{MediaEntry, PlaylistStore};

/// Arguments of `backdrop list`.
#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Media directory. Overrides `slideshow.path` from the config file.
    #[arg(long, short, value_name = "DIR")]
    pub path: Option<String>,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Output as JSON.
    #[arg(long, short)]
    pub json: bool,
}

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    media_type: String,
    #[tabled(rename = "Tags")]
    tags: String,
    #[tabled(rename = "Path")]
    path: String,
}

/// Execute `backdrop list`.
///
/// # Errors
///
/// Returns an error if no media directory is configured or it cannot be read.
pub fn execute(args: &ListArgs, loaded: &LoadedConfig) -> Result<(), BackdropError> {
    let slideshow = &loaded.config.slideshow;
    let root = match args.path.as_deref() {
        Some(path) if !path.trim().is_empty() => expand(path),
        _ if slideshow.has_path() => slideshow.media_path(loaded.directory()),
        _ => {
            return Err(BackdropError::InvalidArguments(
                "No media directory configured. Pass --path or set slideshow.path".to_string(),
            ));
        }
    };

    let catalog = DirectoryCatalog::open(&root, slideshow.recursive)?;
    let mut playlist = PlaylistStore::new(args.filter.merge_into(slideshow.filter.clone()));
    playlist.refresh(catalog.all_entries()?, None);

    if args.json {
        let value = serde_json::to_value(playlist.entries()).unwrap_or_default();
        output::print_highlighted_json(&value);
        return Ok(());
    }

    if playlist.is_empty() {
        println!("{}", "No matching media found.".dimmed());
        return Ok(());
    }

    let rows = rows(playlist.entries(), catalog.root());
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::first()).with(Alignment::right()))
        .to_string();

    println!("{}", format!("Playlist ({})", playlist.len()).bold());
    println!("{table}");
    Ok(())
}

fn rows(entries: &[MediaEntry], root: &Path) -> Vec<EntryRow> {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| EntryRow {
            position: index + 1,
            name: output::truncate(&entry.name, 40),
            media_type: entry.media_type.to_string(),
            tags: entry.tags.iter().cloned().collect::<Vec<_>>().join(", "),
            path: display_relative(&entry.path, root),
        })
        .collect()
}
