use std::path::Path;

use anyhow::Result;
use spark_core::content::SequentialIds;
use spark_core::{AppConfig, Post};

use super::open_source;

pub async fn run(config: &AppConfig, limit: usize, file: Option<&Path>) -> Result<()> {
    let source = open_source(config, file)?;
    let posts = source.fetch_posts(limit).await?;

    println!("Fetched {} posts from {}", posts.len(), source.name());
    println!();
    for post in &posts {
        println!("{}", summary_line(post, config));
    }
    Ok(())
}

fn summary_line(post: &Post, config: &AppConfig) -> String {
    let pages = post.resolve_pages(&config.layout, &SequentialIds::new("b")).len();
    let author = post
        .author
        .as_ref()
        .map(|a| a.name.as_str())
        .unwrap_or("-");
    format!(
        "{:<12} {:<40} {:<12} {:<16} {:>2}p  ♥{}",
        post.id,
        truncate(&post.title, 40),
        post.display_topic(),
        truncate(author, 16),
        pages,
        post.engagement.likes
    )
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}
