use std::fmt::Write;
use std::path::Path;

use anyhow::{Context, Result};
use spark_core::config::LayoutConfig;
use spark_core::content::{estimate_block_height, parse_to_pages, BlockKind, Page, SequentialIds};
use spark_core::AppConfig;

const PREVIEW_CHARS: usize = 48;

pub fn run(config: &AppConfig, file: &Path, limit: Option<u32>, json: bool) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let mut layout = config.layout.clone();
    if let Some(limit) = limit {
        layout.page_height_limit = limit;
    }
    let pages = parse_to_pages(&text, None, &layout, &SequentialIds::new("b"));

    if json {
        println!("{}", serde_json::to_string_pretty(&pages)?);
    } else {
        print!("{}", describe_pages(&pages, &layout));
    }
    Ok(())
}

/// One header per page, then one row per block with its estimated height
pub fn describe_pages(pages: &[Page], layout: &LayoutConfig) -> String {
    let mut out = String::new();
    for (i, page) in pages.iter().enumerate() {
        let heights: Vec<u32> = page
            .blocks
            .iter()
            .map(|b| estimate_block_height(&b.kind, layout))
            .collect();
        let total: u32 = heights.iter().sum();
        let _ = writeln!(
            out,
            "Page {}/{} (~{} of {})",
            i + 1,
            pages.len(),
            total,
            layout.page_height_limit
        );
        for (block, height) in page.blocks.iter().zip(heights) {
            let _ = writeln!(
                out,
                "  {:<9} {:>5}  {}",
                block.kind.name(),
                height,
                preview(&block.kind)
            );
        }
    }
    out
}

fn preview(kind: &BlockKind) -> String {
    let text = match kind {
        BlockKind::Image { source, .. } => source.as_str().to_string(),
        BlockKind::List { items, .. } => items.join(" / "),
        other => other.text().unwrap_or_default().to_string(),
    };
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > PREVIEW_CHARS {
        format!("{}...", flat.chars().take(PREVIEW_CHARS).collect::<String>())
    } else {
        flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_pages_lists_blocks_per_page() {
        let layout = LayoutConfig::default();
        let pages = parse_to_pages(
            "# Title\n\nBody text.\n---\nSecond page.",
            None,
            &layout,
            &SequentialIds::new("b"),
        );
        let out = describe_pages(&pages, &layout);
        assert!(out.contains("Page 1/2"));
        assert!(out.contains("Page 2/2"));
        assert!(out.contains("Title"));
        assert!(out.contains("Second page."));
    }

    #[test]
    fn test_preview_truncates_long_text() {
        let long = "word ".repeat(30);
        let p = preview(&BlockKind::paragraph(long));
        assert!(p.ends_with("..."));
        assert_eq!(p.chars().count(), PREVIEW_CHARS + 3);
    }
}
