//! Conversion configuration (ghost-to-hugo.yml)

use anyhow::{anyhow, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::helpers::{TimestampParser, RFC3339};

/// Name of the optional config file in the Hugo site directory
pub const CONFIG_FILE: &str = "ghost-to-hugo.yml";

/// Main conversion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Hugo content directory, relative to the site
    pub content_dir: String,
    /// chrono format for string timestamps, or `rfc3339`
    pub date_format: String,
    /// IANA timezone for timestamps without an offset
    pub timezone: String,
    /// Front-matter flavour
    pub front_matter: FrontMatterFormat,
    /// Replace files that already exist
    pub overwrite: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            content_dir: "content".to_string(),
            date_format: RFC3339.to_string(),
            timezone: "UTC".to_string(),
            front_matter: FrontMatterFormat::Yaml,
            overwrite: false,
        }
    }
}

impl ConvertConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: ConvertConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Parsed timezone; empty means UTC
    pub fn timezone(&self) -> Result<Tz> {
        if self.timezone.trim().is_empty() {
            return Ok(Tz::UTC);
        }
        self.timezone
            .trim()
            .parse::<Tz>()
            .map_err(|e| anyhow!("Unknown timezone '{}': {}", self.timezone, e))
    }

    /// Timestamp parser for this configuration
    pub fn timestamp_parser(&self) -> Result<TimestampParser> {
        Ok(TimestampParser::new(&self.date_format, self.timezone()?))
    }
}

/// Front-matter serialization format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrontMatterFormat {
    #[default]
    Yaml,
    Toml,
    Json,
}

impl FromStr for FrontMatterFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "unknown front-matter format '{}' (expected yaml, toml or json)",
                other
            )),
        }
    }
}

impl fmt::Display for FrontMatterFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Yaml => "yaml",
            Self::Toml => "toml",
            Self::Json => "json",
        };
        f.write_str(name)
    }
}
