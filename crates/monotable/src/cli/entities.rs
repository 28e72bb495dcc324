//! `monotable entities`: tabulate registered entities and their mappings.

use super::config::load_table;
use super::output::print_table;
use anyhow::Result;
use monotable_schema::TableSchema;
use std::path::PathBuf;

#[derive(Debug)]
pub struct EntitiesArgs {
    pub file: PathBuf,
}

pub fn run(args: EntitiesArgs) -> Result<()> {
    let schema = load_table(&args.file)?.schema();

    if schema.entities.is_empty() {
        println!("Table '{}' has no registered entities", schema.name);
        return Ok(());
    }

    print_table(
        &["ENTITY", "LOGICAL", "PHYSICAL", "TYPE"],
        mapping_rows(&schema),
    );
    Ok(())
}

/// One row per (entity, logical attribute), grouped by registration order
/// and sorted by logical name within an entity.
pub fn mapping_rows(schema: &TableSchema) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    for entity in &schema.entities {
        let mut entity_rows: Vec<Vec<String>> = schema
            .attributes
            .iter()
            .filter_map(|(physical, def)| {
                def.mapping_for(entity).map(|logical| {
                    vec![
                        entity.clone(),
                        logical.to_string(),
                        physical.to_string(),
                        def.attribute_type.to_string(),
                    ]
                })
            })
            .collect();
        entity_rows.sort_by(|a, b| a[1].cmp(&b[1]));
        rows.extend(entity_rows);
    }
    rows
}
