//! `monotable show`: print the canonical schema.

use super::config::load_table;
use super::output::{attribute_rows, index_rows, print_table, NONE};
use anyhow::{Context, Result};
use monotable_schema::TableSchema;
use std::path::PathBuf;

#[derive(Debug)]
pub struct ShowArgs {
    pub file: PathBuf,
    pub json: bool,
}

pub fn run(args: ShowArgs) -> Result<()> {
    let table = load_table(&args.file)?;
    let schema = table.schema();

    if args.json {
        let rendered =
            serde_json::to_string_pretty(&schema).context("Failed to serialize schema")?;
        println!("{}", rendered);
        return Ok(());
    }

    for line in header_lines(&schema) {
        println!("{}", line);
    }
    if let Some(client) = table.client() {
        println!("Client:        {}", client.client_name());
    }

    println!();
    println!("ATTRIBUTES");
    print_table(&["NAME", "TYPE", "MAPPINGS"], attribute_rows(&schema));

    if !schema.indexes.is_empty() {
        println!();
        println!("INDEXES");
        print_table(
            &["NAME", "TYPE", "PARTITION KEY", "SORT KEY"],
            index_rows(&schema),
        );
    }

    Ok(())
}

fn header_lines(schema: &TableSchema) -> Vec<String> {
    let entities = if schema.entities.is_empty() {
        NONE.to_string()
    } else {
        schema.entities.join(", ")
    };
    vec![
        format!("Table:         {}", schema.name),
        format!("Partition key: {}", schema.partition_key),
        format!(
            "Sort key:      {}",
            schema.sort_key.as_deref().unwrap_or(NONE)
        ),
        format!("Entity field:  {}", schema.entity_field),
        format!("Auto execute:  {}", schema.auto_execute),
        format!("Auto parse:    {}", schema.auto_parse),
        format!("Entities:      {}", entities),
    ]
}
