//! Content module - export records, rendering and front-matter

mod cards;
mod diagnostics;
mod document;
pub mod export;
mod frontmatter;
pub mod mobiledoc;
mod post;

pub use cards::{atom_renderer, Card, CardError, CardKind};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, RenderContext};
pub use document::{render_body, DocumentRenderer};
pub use export::{Export, ExportData};
pub use frontmatter::{compose, FrontMatter};
pub use post::{resolve_author, resolve_tags, PostRecord, PostTagLink, RawId, Tag, User};
