//! List export content

use anyhow::Result;
use std::collections::HashMap;
use std::path::Path;

use crate::content::{Diagnostics, Export, PostRecord};
use crate::GhostToHugo;

/// Load and populate every post in an export
pub fn load_posts(app: &GhostToHugo, export_path: &Path) -> Result<Vec<PostRecord>> {
    let export = Export::load(export_path)?;
    let timestamps = app.config.timestamp_parser()?;
    let diagnostics = Diagnostics::new();

    let mut posts = Vec::with_capacity(export.post_count());
    for mut data in export.databases {
        for mut post in std::mem::take(&mut data.posts) {
            post.populate(&data.users, &data.tags, &data.posts_tags, &timestamps, &diagnostics);
            posts.push(post);
        }
    }
    Ok(posts)
}

/// Tag names with the number of posts carrying them, most used first
pub fn tag_counts(posts: &[PostRecord]) -> Vec<(String, usize)> {
    let mut tags: HashMap<String, usize> = HashMap::new();
    for post in posts {
        for tag in &post.tags {
            *tags.entry(tag.clone()).or_insert(0) += 1;
        }
    }
    let mut tags: Vec<_> = tags.into_iter().collect();
    tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    tags
}

/// List export content by type
pub fn run(app: &GhostToHugo, export_path: &Path, content_type: &str) -> Result<()> {
    let posts = load_posts(app, export_path)?;

    match content_type {
        "post" | "posts" => {
            let posts: Vec<_> = posts.iter().filter(|p| !p.is_page).collect();
            println!("Posts ({}):", posts.len());
            for post in posts {
                println!(
                    "  {} - {} [{}]{}",
                    post.date()
                        .map(|d| d.format("%Y-%m-%d").to_string())
                        .unwrap_or_else(|| "----------".to_string()),
                    post.title,
                    post.slug,
                    if post.is_draft { " (draft)" } else { "" }
                );
            }
        }
        "page" | "pages" => {
            let pages: Vec<_> = posts.iter().filter(|p| p.is_page).collect();
            println!("Pages ({}):", pages.len());
            for page in pages {
                println!("  {} [{}]", page.title, page.slug);
            }
        }
        "tag" | "tags" => {
            let tags = tag_counts(&posts);
            println!("Tags ({}):", tags.len());
            for (tag, count) in tags {
                println!("  {} ({})", tag, count);
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, page, tag",
                content_type
            );
        }
    }

    Ok(())
}
