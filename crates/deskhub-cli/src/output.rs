//! Table and JSON output formatting for CLI commands.

use deskhub_entity::Item;
use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// One item as a table row.
#[derive(Debug, Serialize, Tabled)]
pub struct ItemRow {
    id: i64,
    name: String,
    kind: String,
    #[tabled(rename = "position")]
    position: String,
    #[tabled(rename = "size")]
    dimensions: String,
    folder: String,
}

impl From<&Item> for ItemRow {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id.get(),
            name: item.name.clone(),
            kind: item.kind.to_string(),
            position: format!("{},{}", item.position.x, item.position.y),
            dimensions: item
                .dimensions
                .map(|d| format!("{}x{}", d.width, d.height))
                .unwrap_or_else(|| "-".to_string()),
            folder: item
                .parent_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// Print a list of items in the selected format
pub fn print_items(items: &[Item], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("No items.");
            } else {
                let rows: Vec<ItemRow> = items.iter().map(ItemRow::from).collect();
                println!("{}", Table::new(rows));
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(items).unwrap_or_else(|_| "[]".to_string());
            println!("{json}");
        }
    }
}

/// Print a single item in the selected format
pub fn print_item(item: &Item, format: OutputFormat) {
    match format {
        OutputFormat::Table => println!("{}", Table::new([ItemRow::from(item)])),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(item).unwrap_or_else(|_| "{}".to_string());
            println!("{json}");
        }
    }
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {msg}");
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("⚠ {msg}");
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {msg}");
}
