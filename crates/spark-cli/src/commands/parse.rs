use std::path::Path;

use anyhow::{Context, Result};
use spark_core::content::{parse_to_blocks, SequentialIds};

pub fn run(file: &Path) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let blocks = parse_to_blocks(&text, &SequentialIds::new("b"));
    println!("{}", serde_json::to_string_pretty(&blocks)?);
    Ok(())
}
