//! Export records: posts, users, tags and the post/tag join table

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::value::RawValue;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};

use super::diagnostics::{DiagnosticKind, Diagnostics};
use crate::helpers::{null_as_default, parse_bool, TimestampParser};

/// Opaque export identifier
///
/// Ghost has written ids both as numbers and as strings across versions, so
/// ids are kept as raw JSON text and compared byte for byte: `1` and `"1"`
/// are different ids.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct RawId(Box<RawValue>);

impl RawId {
    /// Build an id from its JSON text, e.g. `"1"` or `"\"5a1b\""`
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        RawValue::from_string(json.to_string()).map(Self)
    }

    pub fn as_str(&self) -> &str {
        self.0.get()
    }
}

impl PartialEq for RawId {
    fn eq(&self, other: &Self) -> bool {
        self.0.get() == other.0.get()
    }
}

impl Eq for RawId {}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.get())
    }
}

/// Both ids present and textually equal; a missing or `null` id joins nothing
fn same_id(a: Option<&RawId>, b: Option<&RawId>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a == b)
}

/// A user row
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: Option<RawId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

/// A tag row
#[derive(Debug, Clone, Deserialize)]
pub struct Tag {
    #[serde(default)]
    pub id: Option<RawId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

/// A `posts_tags` row
#[derive(Debug, Clone, Deserialize)]
pub struct PostTagLink {
    #[serde(default)]
    pub post_id: Option<RawId>,
    #[serde(default)]
    pub tag_id: Option<RawId>,
}

/// A post as exported, plus the fields derived by [`PostRecord::populate`]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostRecord {
    #[serde(default)]
    pub id: Option<RawId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub slug: String,
    /// Raw Markdown source (pre-mobiledoc exports)
    #[serde(default, deserialize_with = "null_as_default")]
    pub markdown: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub plaintext: String,
    /// Serialized mobiledoc document, empty when absent
    #[serde(default, deserialize_with = "null_as_default")]
    pub mobiledoc: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub feature_image: String,
    #[serde(default)]
    pub page: Value,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub meta_description: String,
    #[serde(default)]
    pub author_id: Option<RawId>,
    #[serde(default)]
    pub published_at: Value,
    #[serde(default)]
    pub created_at: Value,

    // Derived
    #[serde(skip)]
    pub published: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub created: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub is_draft: bool,
    #[serde(skip)]
    pub is_page: bool,
    #[serde(skip)]
    pub author: String,
    #[serde(skip)]
    pub tags: Vec<String>,
}

impl PostRecord {
    /// Raw id text, for logs and diagnostics
    pub fn id_str(&self) -> Option<&str> {
        self.id.as_ref().map(RawId::as_str)
    }

    /// Fill in the derived fields from the shared export collections
    pub fn populate(
        &mut self,
        users: &[User],
        tags: &[Tag],
        links: &[PostTagLink],
        timestamps: &TimestampParser,
        diagnostics: &Diagnostics,
    ) {
        self.classify(timestamps, diagnostics);
        self.author = resolve_author(self.author_id.as_ref(), users);
        self.tags = resolve_tags(self.id.as_ref(), tags, links);
    }

    /// Derive draft/page flags and timestamps from the raw fields
    pub fn classify(&mut self, timestamps: &TimestampParser, diagnostics: &Diagnostics) {
        self.is_draft = self.status == "draft";
        self.is_page = parse_bool(&self.page);
        self.published = self.timestamp("published_at", &self.published_at, timestamps, diagnostics);
        self.created = self.timestamp("created_at", &self.created_at, timestamps, diagnostics);
    }

    fn timestamp(
        &self,
        field: &str,
        raw: &Value,
        timestamps: &TimestampParser,
        diagnostics: &Diagnostics,
    ) -> Option<DateTime<Utc>> {
        timestamps.parse(raw).unwrap_or_else(|e| {
            diagnostics.record(
                self.id_str(),
                DiagnosticKind::InvalidTimestamp,
                format!("{}: {}", field, e),
            );
            None
        })
    }

    /// Timestamp used for the front-matter `date`
    pub fn date(&self) -> Option<DateTime<Utc>> {
        if self.is_draft {
            self.created
        } else {
            self.published
        }
    }

    /// Destination file for this post under the content root
    ///
    /// Pages live at the content root, posts under `post/`.
    pub fn destination(&self, content_root: &Path) -> PathBuf {
        let file_name = format!("{}.md", self.slug);
        if self.is_page {
            content_root.join(file_name)
        } else {
            content_root.join("post").join(file_name)
        }
    }
}

/// Name of the first user whose id matches, or empty
pub fn resolve_author(author_id: Option<&RawId>, users: &[User]) -> String {
    users
        .iter()
        .find(|user| same_id(user.id.as_ref(), author_id))
        .map(|user| user.name.clone())
        .unwrap_or_default()
}

/// Tag names attached to a post, in join-table order
///
/// Duplicate links produce duplicate names. A leading `#` (Ghost's marker
/// for internal tags) is stripped.
pub fn resolve_tags(post_id: Option<&RawId>, tags: &[Tag], links: &[PostTagLink]) -> Vec<String> {
    links
        .iter()
        .filter(|link| same_id(link.post_id.as_ref(), post_id))
        .filter_map(|link| {
            tags.iter()
                .find(|tag| same_id(tag.id.as_ref(), link.tag_id.as_ref()))
        })
        .map(|tag| tag.name.strip_prefix('#').unwrap_or(&tag.name).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn id(json: &str) -> Option<RawId> {
        Some(RawId::from_json(json).unwrap())
    }

    fn user(raw_id: &str, name: &str) -> User {
        User {
            id: id(raw_id),
            name: name.to_string(),
        }
    }

    fn tag(raw_id: &str, name: &str) -> Tag {
        Tag {
            id: id(raw_id),
            name: name.to_string(),
        }
    }

    fn link(post: &str, tag: &str) -> PostTagLink {
        PostTagLink {
            post_id: id(post),
            tag_id: id(tag),
        }
    }

    #[test]
    fn test_raw_id_equality_is_textual() {
        assert_eq!(RawId::from_json("1").unwrap(), RawId::from_json("1").unwrap());
        assert_ne!(RawId::from_json("1").unwrap(), RawId::from_json("\"1\"").unwrap());
        assert!(!same_id(None, None));
    }

    #[test]
    fn test_null_ids_never_join() {
        let users: Vec<User> =
            serde_json::from_str(r#"[{"id": null, "name": "Nobody"}, {"name": "Anon"}]"#).unwrap();
        assert!(users.iter().all(|u| u.id.is_none()));
        assert_eq!(resolve_author(None, &users), "");
    }

    #[test]
    fn test_resolve_author_first_match() {
        let users = vec![user("2", "Bob"), user("1", "Ada"), user("1", "Impostor")];
        assert_eq!(resolve_author(id("1").as_ref(), &users), "Ada");
        assert_eq!(resolve_author(id("\"1\"").as_ref(), &users), "");
        assert_eq!(resolve_author(None, &users), "");
    }

    #[test]
    fn test_resolve_tags_in_link_order() {
        let tags = vec![tag("10", "rust"), tag("11", "#golang"), tag("12", "c#")];
        let links = vec![
            link("1", "12"),
            link("2", "10"),
            link("1", "11"),
            link("1", "99"),
        ];
        assert_eq!(
            resolve_tags(id("1").as_ref(), &tags, &links),
            vec!["c#", "golang"]
        );
    }

    #[test]
    fn test_resolve_tags_keeps_duplicates() {
        let tags = vec![tag("10", "rust")];
        let links = vec![link("1", "10"), link("1", "10")];
        assert_eq!(
            resolve_tags(id("1").as_ref(), &tags, &links),
            vec!["rust", "rust"]
        );
    }

    #[test]
    fn test_resolve_tags_strips_only_leading_sigil() {
        let tags = vec![tag("1", "##double"), tag("2", "golang")];
        let links = vec![link("7", "1"), link("7", "2")];
        assert_eq!(
            resolve_tags(id("7").as_ref(), &tags, &links),
            vec!["#double", "golang"]
        );
    }

    #[test]
    fn test_classify_draft_is_exact() {
        let diagnostics = Diagnostics::new();
        let parser = TimestampParser::default();
        for (status, draft) in [("draft", true), ("Draft", false), ("published", false), ("", false)] {
            let mut post = PostRecord {
                status: status.to_string(),
                ..Default::default()
            };
            post.classify(&parser, &diagnostics);
            assert_eq!(post.is_draft, draft, "status {:?}", status);
        }
    }

    #[test]
    fn test_classify_page_and_dates() {
        let diagnostics = Diagnostics::new();
        let parser = TimestampParser::default();
        let mut post = PostRecord {
            page: json!(1),
            published_at: json!("2020-05-01T10:00:00.000Z"),
            created_at: json!(1_577_836_800_000_i64),
            ..Default::default()
        };
        post.classify(&parser, &diagnostics);
        assert!(post.is_page);
        assert_eq!(post.published, Some(Utc.with_ymd_and_hms(2020, 5, 1, 10, 0, 0).unwrap()));
        assert_eq!(post.created, Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_classify_bad_timestamp_is_unset() {
        let diagnostics = Diagnostics::new();
        let mut post = PostRecord {
            id: id("5"),
            published_at: json!("yesterday-ish"),
            created_at: Value::Null,
            ..Default::default()
        };
        post.classify(&TimestampParser::default(), &diagnostics);
        assert_eq!(post.published, None);
        assert_eq!(post.created, None);
        assert_eq!(diagnostics.count(DiagnosticKind::InvalidTimestamp), 1);
        assert_eq!(diagnostics.entries()[0].post_id.as_deref(), Some("5"));
    }

    #[test]
    fn test_date_selection() {
        let published = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
        let created = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let mut post = PostRecord {
            published: Some(published),
            created: Some(created),
            ..Default::default()
        };
        assert_eq!(post.date(), Some(published));
        post.is_draft = true;
        assert_eq!(post.date(), Some(created));
    }

    #[test]
    fn test_destination() {
        let root = Path::new("/site/content");
        let mut post = PostRecord {
            slug: "about".to_string(),
            is_page: true,
            ..Default::default()
        };
        assert_eq!(post.destination(root), PathBuf::from("/site/content/about.md"));

        post.slug = "hello".to_string();
        post.is_page = false;
        assert_eq!(
            post.destination(root),
            PathBuf::from("/site/content/post/hello.md")
        );
    }

    #[test]
    fn test_populate() {
        let users = vec![user("1", "Ada")];
        let tags = vec![tag("3", "#golang")];
        let links = vec![link("\"p1\"", "3")];
        let mut post: PostRecord = serde_json::from_str(
            r#"{"id": "p1", "title": "Hello", "slug": "hello", "status": "published",
                "page": false, "author_id": 1, "published_at": null,
                "meta_description": null, "mobiledoc": null}"#,
        )
        .unwrap();

        post.populate(&users, &tags, &links, &TimestampParser::default(), &Diagnostics::new());

        assert_eq!(post.id_str(), Some("\"p1\""));
        assert_eq!(post.author, "Ada");
        assert_eq!(post.tags, vec!["golang"]);
        assert!(!post.is_draft);
        assert!(!post.is_page);
        assert_eq!(post.published, None);
        assert_eq!(post.meta_description, "");
        assert_eq!(post.mobiledoc, "");
    }
}
