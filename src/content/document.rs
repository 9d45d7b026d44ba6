//! Post body rendering

use serde_json::Value;

use super::cards::{atom_renderer, CardKind};
use super::diagnostics::{DiagnosticKind, Diagnostics, RenderContext};
use super::mobiledoc::{Mobiledoc, RenderError, Renderers};
use super::PostRecord;

/// Renders mobiledoc documents with the registered card and atom tables
pub struct DocumentRenderer<'a> {
    cx: RenderContext<'a>,
}

impl<'a> DocumentRenderer<'a> {
    pub fn new(cx: RenderContext<'a>) -> Self {
        Self { cx }
    }

    /// Render a serialized mobiledoc to Markdown
    pub fn render(&self, mobiledoc: &str) -> Result<String, RenderError> {
        Mobiledoc::parse(mobiledoc)?.render(self)
    }
}

impl Renderers for DocumentRenderer<'_> {
    fn card(&self, name: &str, payload: &Value) -> Option<String> {
        CardKind::lookup(name).map(|kind| kind.render(payload, &self.cx))
    }

    fn atom(&self, name: &str, value: &str, payload: &Value) -> Option<String> {
        atom_renderer(name).map(|render| render(value, payload))
    }
}

/// Body text for a post
///
/// A non-empty mobiledoc wins; otherwise the raw Markdown is used verbatim.
/// A mobiledoc that fails to render yields an empty body and a
/// [`DiagnosticKind::RenderFailure`] record; it never fails the batch.
pub fn render_body(post: &PostRecord, diagnostics: &Diagnostics) -> String {
    if post.mobiledoc.is_empty() {
        return post.markdown.clone();
    }

    let cx = RenderContext::new(post.id_str(), diagnostics);
    match DocumentRenderer::new(cx).render(&post.mobiledoc) {
        Ok(body) => body,
        Err(e) => {
            cx.report(
                DiagnosticKind::RenderFailure,
                format!("rendering post {} failed ({})", post.id_str().unwrap_or("-"), e),
            );
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::RawId;
    use serde_json::json;

    fn post(mobiledoc: Value, markdown: &str) -> PostRecord {
        PostRecord {
            id: Some(RawId::from_json("42").unwrap()),
            mobiledoc: if mobiledoc.is_null() {
                String::new()
            } else {
                mobiledoc.to_string()
            },
            markdown: markdown.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_mobiledoc_wins_over_markdown() {
        let diagnostics = Diagnostics::new();
        let post = post(
            json!({
                "version": "0.3.1",
                "atoms": [["soft-return", "", {}]],
                "cards": [
                    ["card-markdown", {"cardName": "card-markdown", "markdown": "Intro"}],
                    ["image", {"src": "/content/images/a.png", "caption": "A"}],
                    ["hr", {}]
                ],
                "sections": [
                    [10, 0],
                    [1, "p", [[0, [], 0, "one"], [1, [], 0, 0], [0, [], 0, "two"]]],
                    [10, 1],
                    [10, 2]
                ]
            }),
            "ignored",
        );
        let body = render_body(&post, &diagnostics);
        assert_eq!(
            body,
            "Intro\n\none\ntwo\n\n{{< figure src=\"/content/images/a.png\" caption=\"A\" >}}\n\n---\n\n"
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_markdown_fallback() {
        let diagnostics = Diagnostics::new();
        let post = post(Value::Null, "# Plain *markdown*\n");
        assert_eq!(render_body(&post, &diagnostics), "# Plain *markdown*\n");
    }

    #[test]
    fn test_render_failure_is_localized() {
        let diagnostics = Diagnostics::new();
        let mut post = post(Value::Null, "fallback is not used");
        post.mobiledoc = "{\"version\": \"0.3.1\", \"sections\": [[10, 0]]}".to_string();

        assert_eq!(render_body(&post, &diagnostics), "");
        let entries = diagnostics.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, DiagnosticKind::RenderFailure);
        assert_eq!(entries[0].post_id.as_deref(), Some("42"));
    }

    #[test]
    fn test_card_diagnostics_carry_post_id() {
        let diagnostics = Diagnostics::new();
        let post = post(
            json!({
                "version": "0.3.1",
                "cards": [["image", {"caption": "no source"}]],
                "sections": [[10, 0]]
            }),
            "",
        );
        assert_eq!(render_body(&post, &diagnostics), "\n");
        assert_eq!(diagnostics.count(DiagnosticKind::ImageMissingSource), 1);
        assert_eq!(diagnostics.entries()[0].post_id.as_deref(), Some("42"));
    }
}
