//! Export loader - reads a Ghost JSON export into memory

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use super::{PostRecord, PostTagLink, Tag, User};
use crate::helpers::null_as_default;

/// Top level of an export file
///
/// Ghost writes either `{"db": [{"meta": .., "data": ..}]}` or, for some
/// versions and hand-made exports, a bare `{"meta": .., "data": ..}`.
#[derive(Debug, Deserialize)]
struct ExportFile {
    #[serde(default, deserialize_with = "null_as_default")]
    db: Vec<Database>,
    #[serde(default)]
    meta: Option<Meta>,
    #[serde(default)]
    data: Option<ExportData>,
}

#[derive(Debug, Deserialize)]
struct Database {
    #[serde(default)]
    meta: Option<Meta>,
    data: ExportData,
}

#[derive(Debug, Clone, Deserialize)]
struct Meta {
    #[serde(default)]
    version: Option<String>,
}

/// The collections of one exported database
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub posts: Vec<PostRecord>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub users: Vec<User>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<Tag>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub posts_tags: Vec<PostTagLink>,
}

/// A loaded export: one entry per database in the file
#[derive(Debug, Clone, Default)]
pub struct Export {
    pub databases: Vec<ExportData>,
}

impl Export {
    /// Load an export from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read export {:?}", path))?;
        Self::parse(&content).with_context(|| format!("Failed to parse export {:?}", path))
    }

    /// Parse export JSON
    pub fn parse(content: &str) -> Result<Self> {
        let file: ExportFile = serde_json::from_str(content)?;

        let mut databases = Vec::new();
        for db in file.db {
            log_meta(db.meta.as_ref());
            databases.push(db.data);
        }
        if let Some(data) = file.data {
            log_meta(file.meta.as_ref());
            databases.push(data);
        }

        if databases.is_empty() {
            anyhow::bail!("Export contains no data section");
        }

        Ok(Self { databases })
    }

    /// Total number of posts across all databases
    pub fn post_count(&self) -> usize {
        self.databases.iter().map(|db| db.posts.len()).sum()
    }
}

fn log_meta(meta: Option<&Meta>) {
    let version = meta
        .and_then(|m| m.version.as_deref())
        .unwrap_or("unknown");
    tracing::debug!("Reading export data (Ghost version {})", version);
}

#[cfg(test)]
mod tests {
    use super::*;

    const WRAPPED: &str = r##"{
        "db": [{
            "meta": {"exported_on": 1489149000000, "version": "1.0.0"},
            "data": {
                "posts": [
                    {"id": 1, "title": "Hello", "slug": "hello", "status": "published",
                     "author_id": 1, "page": 0, "mobiledoc": null,
                     "published_at": "2017-03-10T12:30:00.000Z", "created_at": null}
                ],
                "users": [{"id": 1, "name": "Ada", "email": "ada@example.com"}],
                "tags": [{"id": 2, "name": "#rust", "slug": "rust"}],
                "posts_tags": [{"id": 1, "post_id": 1, "tag_id": 2, "sort_order": 0}]
            }
        }]
    }"##;

    #[test]
    fn test_parse_wrapped_export() {
        let export = Export::parse(WRAPPED).unwrap();
        assert_eq!(export.databases.len(), 1);
        assert_eq!(export.post_count(), 1);

        let db = &export.databases[0];
        assert_eq!(db.posts[0].title, "Hello");
        assert_eq!(db.posts[0].id_str(), Some("1"));
        assert_eq!(db.users[0].name, "Ada");
        assert_eq!(db.tags[0].name, "#rust");
        assert_eq!(db.posts_tags.len(), 1);
    }

    #[test]
    fn test_parse_bare_export() {
        let export = Export::parse(
            r#"{"meta": {"version": "0.11"}, "data": {"posts": [{"id": "a", "slug": "a"}]}}"#,
        )
        .unwrap();
        assert_eq!(export.post_count(), 1);
        assert!(export.databases[0].users.is_empty());
        assert!(export.databases[0].posts_tags.is_empty());
    }

    #[test]
    fn test_parse_missing_data_fails() {
        assert!(Export::parse(r#"{"db": []}"#).is_err());
        assert!(Export::parse("not json").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");
        std::fs::write(&path, WRAPPED).unwrap();

        let export = Export::load(&path).unwrap();
        assert_eq!(export.post_count(), 1);
        assert!(Export::load(dir.path().join("missing.json")).is_err());
    }
}
