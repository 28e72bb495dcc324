//! `monotable indexes`: tabulate secondary indexes.

use super::config::load_table;
use super::output::{index_rows, print_table};
use anyhow::Result;
use std::path::PathBuf;

#[derive(Debug)]
pub struct IndexesArgs {
    pub file: PathBuf,
}

pub fn run(args: IndexesArgs) -> Result<()> {
    let schema = load_table(&args.file)?.schema();

    if schema.indexes.is_empty() {
        println!("Table '{}' has no secondary indexes", schema.name);
        return Ok(());
    }

    print_table(
        &["NAME", "TYPE", "PARTITION KEY", "SORT KEY"],
        index_rows(&schema),
    );
    Ok(())
}
