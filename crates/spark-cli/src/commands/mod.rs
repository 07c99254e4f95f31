pub mod config;
pub mod fetch;
pub mod paginate;
pub mod parse;
pub mod run;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use spark_core::post::{ContentSource, FileSource, HttpSource};
use spark_core::AppConfig;

/// A local post file when given, the configured API otherwise
pub fn open_source(config: &AppConfig, file: Option<&Path>) -> Result<Arc<dyn ContentSource>> {
    Ok(match file {
        Some(path) => Arc::new(FileSource::new(path)),
        None => Arc::new(HttpSource::new(&config.api)?),
    })
}
