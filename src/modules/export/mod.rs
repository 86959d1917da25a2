//! Export Module
//!
//! Saves what the open page shows to disk.
//!
//! - 'e' key or `:export` triggers export of the active tab
//! - List tabs → CSV, one row per entry plus the row's link
//! - Contract tab → JSON summary of the ABI
//! - Files saved to <data dir>/exports/

mod csv_export;
mod json_export;

use crate::core::{Action, NotifyLevel};
use crate::session::render::{ListBody, PageView};
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};

/// Generate a timestamped filename
fn generate_filename(prefix: &str, extension: &str) -> String {
    let timestamp = Local::now().format("%Y-%m-%d-%H%M%S");
    format!("{}-{}.{}", prefix, timestamp, extension)
}

/// File prefix such as `block-5-transactions`
fn file_prefix(kind: &str, id: &str, tab: &str) -> String {
    let id: String = id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(16)
        .collect();
    format!("{}-{}-{}", kind, id, tab)
}

/// Export the body of a composed page into `export_dir`
pub fn export_page(
    export_dir: Option<&Path>,
    kind: &str,
    id: &str,
    tab: &str,
    view: &PageView,
) -> Action {
    let Some(export_dir) = export_dir else {
        return Action::Notify(
            "No data directory available for exports".to_string(),
            NotifyLevel::Error,
        );
    };

    let (extension, is_empty) = match &view.body {
        ListBody::Table(table) => ("csv", table.rows.is_empty()),
        ListBody::Contract(_) => ("json", false),
        _ => {
            return Action::Notify(
                "Nothing to export in this view".to_string(),
                NotifyLevel::Warn,
            )
        }
    };
    if is_empty {
        return Action::Notify("No rows to export".to_string(), NotifyLevel::Warn);
    }

    if let Err(e) = fs::create_dir_all(export_dir) {
        return Action::Notify(
            format!("Failed to create export directory: {}", e),
            NotifyLevel::Error,
        );
    }

    let filename = generate_filename(&file_prefix(kind, id, tab), extension);
    let path: PathBuf = export_dir.join(&filename);

    let written = match &view.body {
        ListBody::Table(table) => csv_export::write_table(&path, table),
        ListBody::Contract(contract) => json_export::write_contract(&path, id, contract),
        _ => Ok(0),
    };

    match written {
        Ok(count) => Action::Notify(
            format!("Exported {} items to {}", count, path.display()),
            NotifyLevel::Info,
        ),
        Err(e) => Action::Notify(format!("Export failed: {}", e), NotifyLevel::Error),
    }
}
