//! `monotable check`: build the table and report success or the schema error.

use super::config::load_table;
use anyhow::Result;
use monotable_schema::Table;
use std::path::PathBuf;

#[derive(Debug)]
pub struct CheckArgs {
    pub file: PathBuf,
}

pub fn run(args: CheckArgs) -> Result<()> {
    let table = load_table(&args.file)?;
    println!("OK {}: {}", args.file.display(), summary(&table));
    Ok(())
}

/// One-line description of a built table
pub fn summary(table: &Table) -> String {
    let key = match table.sort_key() {
        Some(sk) => format!("{}/{}", table.partition_key(), sk),
        None => table.partition_key().to_string(),
    };
    let schema = table.schema();
    let client = match table.client() {
        Some(client) => format!(", client '{}'", client.client_name()),
        None => String::new(),
    };
    format!(
        "table '{}' (key {}, {} attributes, {} indexes, {} entities{})",
        schema.name,
        key,
        schema.attributes.len(),
        schema.indexes.len(),
        schema.entities.len(),
        client
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use monotable_schema::{Entity, EntityAttribute, IndexSpec, TableDefinition};

    #[test]
    fn test_summary_counts_everything() {
        let table = TableDefinition::new("test-table", "pk")
            .with_sort_key("sk")
            .with_index("GSI1", IndexSpec::new().with_partition_key("g"))
            .with_entity(
                Entity::builder("TestEnt")
                    .attribute("pk", EntityAttribute::partition_key())
                    .timestamps(false)
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();

        assert_eq!(
            summary(&table),
            "table 'test-table' (key pk/sk, 2 attributes, 1 indexes, 1 entities)"
        );
    }

    #[test]
    fn test_check_fails_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = run(CheckArgs {
            file: dir.path().join("missing.json"),
        });
        assert!(result.is_err());
    }
}
