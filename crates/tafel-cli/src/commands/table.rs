use std::fs;
use std::path::{Path, PathBuf};

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use serde::Deserialize;
use tafel_core::{EntryPatch, RandomTable, TableEntry};
use tafel_engine::{TableFilter, TableUpdate};

use super::{print_json, truncate};
use crate::config::CliConfig;

/// Shape of an importable table file. `id` is optional.
#[derive(Deserialize)]
struct TableDocument {
    #[serde(default)]
    id: Option<String>,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    entries: Vec<TableEntry>,
}

pub fn import(config: &CliConfig, file: &Path) -> Result<(), String> {
    let text = fs::read_to_string(file).map_err(|e| format!("cannot read {}: {e}", file.display()))?;
    let doc: TableDocument =
        serde_json::from_str(&text).map_err(|e| format!("invalid table file {}: {e}", file.display()))?;

    let service = config.table_service();
    let table = match doc.id {
        Some(id) => {
            let table = RandomTable::with_entries(id, doc.name, doc.description, doc.entries)
                .map_err(|e| e.to_string())?;
            service.import_table(&table).map_err(|e| e.to_string())?;
            table
        }
        None => service
            .create_table(&doc.name, &doc.description, doc.entries)
            .map_err(|e| e.to_string())?,
    };

    if config.json {
        return print_json(&table);
    }
    println!(
        "  Imported table '{}' ({}) with {} entries",
        table.name(),
        table.id(),
        table.len()
    );
    Ok(())
}

pub fn list(config: &CliConfig, name: Option<String>) -> Result<(), String> {
    let filter = TableFilter {
        name,
        ..TableFilter::default()
    };
    let tables = config
        .table_service()
        .list_tables(&filter)
        .map_err(|e| e.to_string())?;

    if config.json {
        return print_json(&tables);
    }
    if tables.is_empty() {
        println!("  No tables found.");
        return Ok(());
    }

    let mut out = Table::new();
    out.set_content_arrangement(ContentArrangement::Dynamic);
    out.set_header(vec!["ID", "Name", "Entries", "Description"]);
    for table in &tables {
        out.add_row(vec![
            table.id().to_string(),
            table.name().to_string(),
            table.len().to_string(),
            truncate(table.description(), 60),
        ]);
    }
    println!("{out}");
    println!();
    println!("  {} tables", tables.len());
    Ok(())
}

pub fn show(config: &CliConfig, id: &str) -> Result<(), String> {
    let table = config
        .table_service()
        .get_table(id)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("table with ID {id} not found"))?;

    if config.json {
        return print_json(&table);
    }

    println!("  {} [{}]", table.name().bold(), table.id().dimmed());
    if !table.description().is_empty() {
        println!("  {}", table.description());
    }
    println!();

    if table.is_empty() {
        println!("  No entries.");
        return Ok(());
    }

    let mut out = Table::new();
    out.set_content_arrangement(ContentArrangement::Dynamic);
    out.set_header(vec!["ID", "Weight", "Range", "Content"]);
    for entry in table.entries() {
        let range = entry.range().map_or_else(|| "-".to_string(), ToString::to_string);
        out.add_row(vec![
            entry.id().to_string(),
            entry.weight().to_string(),
            range,
            entry.content().to_string(),
        ]);
    }
    println!("{out}");
    println!();
    println!("  total weight {}", table.total_weight());
    Ok(())
}

/// Raw `table update` arguments, before entry files and patches are parsed.
pub struct UpdateArgs {
    pub name: Option<String>,
    pub description: Option<String>,
    pub add: Vec<PathBuf>,
    pub patch: Vec<String>,
    pub remove: Vec<String>,
}

pub fn update(config: &CliConfig, id: &str, args: UpdateArgs) -> Result<(), String> {
    let add = args
        .add
        .iter()
        .map(PathBuf::as_path)
        .map(read_entry)
        .collect::<Result<Vec<_>, _>>()?;
    let update = args
        .patch
        .iter()
        .map(String::as_str)
        .map(parse_patch)
        .collect::<Result<Vec<_>, _>>()?;
    let changes = TableUpdate {
        name: args.name,
        description: args.description,
        add,
        update,
        remove: args.remove,
    };

    let table = config
        .table_service()
        .update_table(id, changes)
        .map_err(|e| e.to_string())?;

    if config.json {
        return print_json(&table);
    }
    println!(
        "  Updated table '{}' ({}), now {} entries",
        table.name(),
        table.id(),
        table.len()
    );
    Ok(())
}

fn read_entry(path: &Path) -> Result<TableEntry, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("invalid entry file {}: {e}", path.display()))
}

/// Parse `<entry-id>=<json>` into an entry patch.
fn parse_patch(arg: &str) -> Result<(String, EntryPatch), String> {
    let (entry_id, json) = arg
        .split_once('=')
        .ok_or_else(|| format!("invalid patch \"{arg}\", expected <entry-id>=<json>"))?;
    if entry_id.is_empty() {
        return Err(format!("invalid patch \"{arg}\", entry ID is empty"));
    }
    let patch = serde_json::from_str(json).map_err(|e| format!("invalid patch for {entry_id}: {e}"))?;
    Ok((entry_id.to_string(), patch))
}

pub fn delete(config: &CliConfig, id: &str) -> Result<(), String> {
    config
        .table_service()
        .delete_table(id)
        .map_err(|e| e.to_string())?;
    println!("  Deleted table {id}");
    Ok(())
}
