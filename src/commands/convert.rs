//! Convert an export into Hugo content files

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::content::{compose, render_body, Diagnostic, Diagnostics, Export, FrontMatter, PostRecord};
use crate::GhostToHugo;

/// Outcome of a conversion run
#[derive(Debug, Default)]
pub struct ConvertSummary {
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// What happened to a single post
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostOutcome {
    Written(PathBuf),
    Skipped(PathBuf),
}

/// Load an export file and convert every post in it
pub fn run(app: &GhostToHugo, export_path: &Path) -> Result<ConvertSummary> {
    let start = std::time::Instant::now();

    let export = Export::load(export_path)?;
    tracing::info!("Loaded {} posts from {:?}", export.post_count(), export_path);

    let summary = convert_export(app, export)?;

    tracing::info!(
        "Converted in {:.2}s: {} written, {} skipped, {} failed, {} diagnostics",
        start.elapsed().as_secs_f64(),
        summary.written,
        summary.skipped,
        summary.failed,
        summary.diagnostics.len()
    );

    Ok(summary)
}

/// Convert an already loaded export
///
/// Posts are independent: a post that fails to render or write is logged and
/// counted, and the rest of the export is still converted.
pub fn convert_export(app: &GhostToHugo, export: Export) -> Result<ConvertSummary> {
    let timestamps = app.config.timestamp_parser()?;
    let diagnostics = Diagnostics::new();
    let mut summary = ConvertSummary::default();

    for mut data in export.databases {
        let posts = std::mem::take(&mut data.posts);
        for mut post in posts {
            post.populate(
                &data.users,
                &data.tags,
                &data.posts_tags,
                &timestamps,
                &diagnostics,
            );

            match write_post(app, &post, &diagnostics) {
                Ok(PostOutcome::Written(path)) => {
                    tracing::debug!("Wrote {:?}", path);
                    summary.written += 1;
                }
                Ok(PostOutcome::Skipped(path)) => {
                    tracing::info!("Skipping existing file {:?}", path);
                    summary.skipped += 1;
                }
                Err(e) => {
                    tracing::error!("Failed to convert post {}: {:#}", post.id_str().unwrap_or("-"), e);
                    summary.failed += 1;
                }
            }
        }
    }

    summary.diagnostics = diagnostics.entries();
    Ok(summary)
}

/// Render a populated post into its file contents
pub fn render_post(app: &GhostToHugo, post: &PostRecord, diagnostics: &Diagnostics) -> Result<String> {
    let body = render_body(post, diagnostics);
    let front_matter = FrontMatter::from_post(post);
    compose(&front_matter, &body, app.config.front_matter)
}

/// Render and write a single populated post
pub fn write_post(app: &GhostToHugo, post: &PostRecord, diagnostics: &Diagnostics) -> Result<PostOutcome> {
    let path = post.destination(&app.content_dir);
    if path.exists() && !app.config.overwrite {
        return Ok(PostOutcome::Skipped(path));
    }

    let contents = render_post(app, post, diagnostics)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create {:?}", parent))?;
    }
    fs::write(&path, contents).with_context(|| format!("Failed to write {:?}", path))?;

    Ok(PostOutcome::Written(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConvertConfig, FrontMatterFormat};
    use crate::content::DiagnosticKind;

    const EXPORT: &str = r##"{
        "db": [{
            "meta": {"version": "2.0.0"},
            "data": {
                "posts": [
                    {"id": "1", "title": "Hello", "slug": "hello", "status": "published",
                     "author_id": "9", "page": false,
                     "published_at": "2019-01-02T03:04:05.000Z",
                     "created_at": "2019-01-01T00:00:00.000Z",
                     "feature_image": "/content/images/hello.png",
                     "mobiledoc": "{\"version\":\"0.3.1\",\"atoms\":[],\"markups\":[],\"cards\":[[\"code\",{\"language\":\"go\",\"code\":\"fmt.Println(1)\"}]],\"sections\":[[1,\"p\",[[0,[],0,\"Hi there\"]]],[10,0]]}"},
                    {"id": "2", "title": "About", "slug": "about", "status": "published",
                     "page": true, "markdown": "About me", "mobiledoc": null,
                     "published_at": null, "created_at": null},
                    {"id": "3", "title": "Broken", "slug": "broken", "status": "draft",
                     "mobiledoc": "{oops", "created_at": "2019-02-01T00:00:00.000Z"}
                ],
                "users": [{"id": "9", "name": "Ada"}],
                "tags": [{"id": "t1", "name": "#go"}, {"id": "t2", "name": "notes"}],
                "posts_tags": [
                    {"post_id": "1", "tag_id": "t1"},
                    {"post_id": "1", "tag_id": "t2"}
                ]
            }
        }]
    }"##;

    fn app(dir: &Path, config: ConvertConfig) -> GhostToHugo {
        GhostToHugo::with_config(dir, config)
    }

    #[test]
    fn test_convert_export_writes_posts_and_pages() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), ConvertConfig::default());
        let summary = convert_export(&app, Export::parse(EXPORT).unwrap()).unwrap();

        assert_eq!(summary.written, 3);
        assert_eq!(summary.skipped, 0);
        assert_eq!(summary.failed, 0);

        let hello = fs::read_to_string(dir.path().join("content/post/hello.md")).unwrap();
        assert!(hello.starts_with("---\n"));
        assert!(hello.contains("title: Hello\n"));
        assert!(hello.contains("author: Ada\n"));
        assert!(hello.contains("tags:\n- go\n- notes\n"));
        assert!(hello.contains("image: /images/hello.png\n"));
        assert!(hello.contains("2019-01-02T03:04:05Z"));
        assert!(hello.ends_with("---\n\nHi there\n\n```go\nfmt.Println(1)\n```\n\n"));

        let about = fs::read_to_string(dir.path().join("content/about.md")).unwrap();
        assert!(about.ends_with("---\n\nAbout me"));
        assert!(!about.contains("date:"));
        assert!(!about.contains("author:"));

        let broken = fs::read_to_string(dir.path().join("content/post/broken.md")).unwrap();
        assert!(broken.contains("draft: true\n"));
        assert!(broken.contains("2019-02-01T00:00:00Z"));
        assert!(broken.ends_with("---\n\n"));

        assert_eq!(summary.diagnostics.len(), 1);
        assert_eq!(summary.diagnostics[0].kind, DiagnosticKind::RenderFailure);
        assert_eq!(summary.diagnostics[0].post_id.as_deref(), Some("\"3\""));
    }

    #[test]
    fn test_existing_files_are_skipped_unless_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("content/about.md");
        fs::create_dir_all(target.parent().unwrap()).unwrap();
        fs::write(&target, "keep me").unwrap();

        let summary =
            convert_export(&app(dir.path(), ConvertConfig::default()), Export::parse(EXPORT).unwrap())
                .unwrap();
        assert_eq!(summary.written, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(fs::read_to_string(&target).unwrap(), "keep me");

        let config = ConvertConfig {
            overwrite: true,
            ..Default::default()
        };
        let summary = convert_export(&app(dir.path(), config), Export::parse(EXPORT).unwrap()).unwrap();
        assert_eq!(summary.written, 3);
        assert_ne!(fs::read_to_string(&target).unwrap(), "keep me");
    }

    #[test]
    fn test_toml_front_matter() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConvertConfig {
            front_matter: FrontMatterFormat::Toml,
            content_dir: "site".to_string(),
            ..Default::default()
        };
        convert_export(&app(dir.path(), config), Export::parse(EXPORT).unwrap()).unwrap();

        let hello = fs::read_to_string(dir.path().join("site/post/hello.md")).unwrap();
        assert!(hello.starts_with("+++\n"));
        assert!(hello.contains("slug = \"hello\"\n"));
    }

    #[test]
    fn test_run_reports_missing_export() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), ConvertConfig::default());
        assert!(run(&app, &dir.path().join("nope.json")).is_err());
    }
}
