//! Output formatting for CLI commands

use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Color, ContentArrangement, Table};
use monotable_schema::{AttributeDef, IndexDef, IndexType, TableSchema};

/// Placeholder for an absent value in a table cell
pub const NONE: &str = "-";

/// Print a table with the given headers and rows
pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    println!("{}", render_table(headers, rows));
}

/// Build a table with cyan headers
pub fn render_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let header_cells: Vec<Cell> = headers
        .iter()
        .map(|h| Cell::new(h).fg(Color::Cyan))
        .collect();
    table.set_header(header_cells);

    for row in rows {
        table.add_row(row);
    }

    table
}

/// `Entity=logical` pairs for an attribute, in entity-name order
pub fn format_mappings(def: &AttributeDef) -> String {
    if def.mappings.is_empty() {
        return NONE.to_string();
    }
    def.mappings
        .iter()
        .map(|(entity, logical)| format!("{}={}", entity, logical))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Rows of the attribute table: name, type, mappings
pub fn attribute_rows(schema: &TableSchema) -> Vec<Vec<String>> {
    schema
        .attributes
        .iter()
        .map(|(name, def)| {
            vec![
                name.to_string(),
                def.attribute_type.to_string(),
                format_mappings(def),
            ]
        })
        .collect()
}

/// Rows of the index table: name, type, partition key, sort key.
///
/// A LOCAL index that reuses the table partition key shows it, since that
/// is the key it is queried by.
pub fn index_rows(schema: &TableSchema) -> Vec<Vec<String>> {
    schema
        .indexes
        .iter()
        .map(|(name, def)| {
            vec![
                name.clone(),
                index_type_label(def.index_type),
                partition_key_label(def, &schema.partition_key),
                def.sort_key.clone().unwrap_or_else(|| NONE.to_string()),
            ]
        })
        .collect()
}

fn index_type_label(index_type: IndexType) -> String {
    if index_type.is_local() {
        format!("{} (local)", index_type)
    } else {
        format!("{} (global)", index_type)
    }
}

fn partition_key_label(def: &IndexDef, table_partition_key: &str) -> String {
    def.effective_partition_key(table_partition_key).to_string()
}
