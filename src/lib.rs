//! ghost-to-hugo: convert a Ghost blog export into Hugo content
//!
//! This crate reads a Ghost JSON export, reconstructs each post's author and
//! tags from the flat export tables, renders mobiledoc bodies (cards included)
//! to Markdown, and writes one Hugo content file per post.

pub mod commands;
pub mod config;
pub mod content;
pub mod helpers;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// The main conversion application
#[derive(Debug, Clone)]
pub struct GhostToHugo {
    /// Conversion configuration
    pub config: config::ConvertConfig,
    /// Hugo site directory
    pub base_dir: PathBuf,
    /// Content directory posts are written into
    pub content_dir: PathBuf,
}

impl GhostToHugo {
    /// Create an instance for a Hugo site directory, loading
    /// `ghost-to-hugo.yml` from it when present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join(config::CONFIG_FILE);

        let config = if config_path.exists() {
            tracing::debug!("Loading config from {:?}", config_path);
            config::ConvertConfig::load(&config_path)?
        } else {
            config::ConvertConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Create an instance with an explicit configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::ConvertConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let content_dir = base_dir.join(&config.content_dir);
        Self {
            config,
            base_dir,
            content_dir,
        }
    }

    /// Convert an export file into content files
    pub fn convert<P: AsRef<Path>>(&self, export_path: P) -> Result<commands::convert::ConvertSummary> {
        commands::convert::run(self, export_path.as_ref())
    }

    /// Print export content of the given type
    pub fn list<P: AsRef<Path>>(&self, export_path: P, content_type: &str) -> Result<()> {
        commands::list::run(self, export_path.as_ref(), content_type)
    }
}
