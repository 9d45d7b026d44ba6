//! Front-matter building and serialization

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::PostRecord;
use crate::config::FrontMatterFormat;
use crate::helpers::strip_content_folder;

/// Front-matter written ahead of a post body
///
/// Absent values are skipped rather than written as empty keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrontMatter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    pub title: String,
    pub draft: bool,
    pub slug: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl FrontMatter {
    /// Build front-matter from a populated post
    pub fn from_post(post: &PostRecord) -> Self {
        let image = [&post.image, &post.feature_image]
            .into_iter()
            .find(|s| !s.is_empty())
            .map(|s| strip_content_folder(s).to_string());

        Self {
            date: post.date(),
            title: post.title.clone(),
            draft: post.is_draft,
            slug: post.slug.clone(),
            description: post.meta_description.clone(),
            image,
            tags: post.tags.clone(),
            categories: post.tags.clone(),
            author: Some(post.author.clone()).filter(|a| !a.is_empty()),
        }
    }

    /// Serialize as a delimited front-matter block, ending with a newline
    pub fn to_block(&self, format: FrontMatterFormat) -> Result<String> {
        let block = match format {
            FrontMatterFormat::Yaml => format!("---\n{}---\n", serde_yaml::to_string(self)?),
            FrontMatterFormat::Toml => format!("+++\n{}+++\n", toml::to_string(self)?),
            FrontMatterFormat::Json => format!("{}\n", serde_json::to_string_pretty(self)?),
        };
        Ok(block)
    }
}

/// Full file contents: front-matter block, a blank line, then the body
pub fn compose(front_matter: &FrontMatter, body: &str, format: FrontMatterFormat) -> Result<String> {
    Ok(format!("{}\n{}", front_matter.to_block(format)?, body))
}
