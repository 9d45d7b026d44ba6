//! Card and atom renderers
//!
//! Mobiledoc cards carry free-form JSON payloads. Each payload is decoded once
//! into a [`Card`] variant holding the typed fields that card needs; a payload
//! that does not decode renders as an empty fragment. Only a missing image
//! source and a missing embed body are worth reporting, everything else is
//! silently dropped.

use lazy_static::lazy_static;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;

use super::diagnostics::{DiagnosticKind, RenderContext};
use crate::helpers::{quote, strip_content_folder};

/// Number of images per gallery row
const GALLERY_ROW_SIZE: usize = 3;

/// Signature shared by atom renderers: `(value, payload) -> fragment`
pub type AtomRenderer = fn(&str, &Value) -> String;

lazy_static! {
    static ref CARD_KINDS: HashMap<&'static str, CardKind> = [
        ("markdown", CardKind::Markdown),
        ("card-markdown", CardKind::Markdown),
        ("hr", CardKind::Hr),
        ("html", CardKind::Html),
        ("embed", CardKind::Embed),
        ("image", CardKind::Image),
        ("code", CardKind::Code),
        ("gallery", CardKind::Gallery),
        ("bookmark", CardKind::Bookmark),
    ]
    .into_iter()
    .collect();

    static ref ATOM_RENDERERS: HashMap<&'static str, AtomRenderer> = {
        let mut atoms: HashMap<&'static str, AtomRenderer> = HashMap::new();
        atoms.insert("soft-break", soft_return);
        atoms.insert("soft-return", soft_return);
        atoms
    };
}

/// Look up the renderer registered for an atom name
pub fn atom_renderer(name: &str) -> Option<AtomRenderer> {
    ATOM_RENDERERS.get(name).copied()
}

fn soft_return(_value: &str, _payload: &Value) -> String {
    "\n".to_string()
}

/// Card types with a registered renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardKind {
    Markdown,
    Hr,
    Html,
    Embed,
    Image,
    Code,
    Gallery,
    Bookmark,
}

impl CardKind {
    /// Resolve a card name (`"card-markdown"` is an alias of `"markdown"`)
    pub fn lookup(name: &str) -> Option<Self> {
        CARD_KINDS.get(name).copied()
    }

    /// Decode and render a payload. Never fails: undecodable payloads render
    /// as `""`, with a diagnostic for image and embed cards.
    pub fn render(self, payload: &Value, cx: &RenderContext<'_>) -> String {
        match Card::decode(self, payload) {
            Ok(card) => card.render(),
            Err(err) => {
                match (self, &err) {
                    (_, CardError::NotAnObject) => {}
                    (CardKind::Image, _) => cx.report(DiagnosticKind::ImageMissingSource, err.to_string()),
                    (CardKind::Embed, _) => cx.report(DiagnosticKind::EmbedMissingHtml, err.to_string()),
                    _ => tracing::debug!("Skipping {:?} card: {}", self, err),
                }
                String::new()
            }
        }
    }
}

/// Why a payload could not be decoded
#[derive(Error, Debug)]
pub enum CardError {
    #[error("payload is not an object")]
    NotAnObject,

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` has the wrong shape: {source}")]
    TypeMismatch {
        field: &'static str,
        source: serde_json::Error,
    },
}

/// A decoded card payload
#[derive(Debug, Clone, PartialEq)]
pub enum Card {
    Markdown(String),
    Hr,
    Html(String),
    Embed(String),
    Image(ImageCard),
    Code(CodeCard),
    Gallery(GalleryCard),
    Bookmark(BookmarkCard),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageCard {
    pub src: String,
    pub caption: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CodeCard {
    pub code: String,
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GalleryCard {
    /// One slot per payload entry; `None` marks an entry that was skipped but
    /// still occupies its position in the row layout
    pub images: Vec<Option<GalleryImage>>,
    pub caption: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GalleryImage {
    pub src: String,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub alt: Option<String>,
    pub title: Option<String>,
}

impl GalleryImage {
    /// An entry needs to be an object with a string `src`
    fn decode(entry: &Value) -> Option<Self> {
        let map = entry.as_object()?;
        Some(Self {
            src: map.get("src")?.as_str()?.to_string(),
            width: lenient(map, "width"),
            height: lenient(map, "height"),
            alt: lenient(map, "alt"),
            title: lenient(map, "title"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookmarkCard {
    pub metadata: BookmarkMetadata,
    pub caption: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookmarkMetadata {
    pub url: String,
    pub title: String,
    pub description: String,
    pub thumbnail: Option<String>,
    pub icon: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
}

impl Card {
    /// Decode a raw payload for the given card kind
    ///
    /// Only required fields can fail the decode. An optional field that is
    /// null or has the wrong shape reads as absent.
    pub fn decode(kind: CardKind, payload: &Value) -> Result<Self, CardError> {
        let object = || payload.as_object().ok_or(CardError::NotAnObject);

        match kind {
            CardKind::Hr => Ok(Card::Hr),
            CardKind::Markdown => field(object()?, "markdown").map(Card::Markdown),
            CardKind::Html => field(object()?, "html").map(Card::Html),
            CardKind::Embed => field(object()?, "html").map(Card::Embed),
            CardKind::Image => {
                let map = object()?;
                Ok(Card::Image(ImageCard {
                    src: field(map, "src")?,
                    caption: lenient(map, "caption"),
                }))
            }
            CardKind::Code => {
                let map = object()?;
                Ok(Card::Code(CodeCard {
                    code: field(map, "code")?,
                    language: lenient(map, "language"),
                }))
            }
            CardKind::Gallery => {
                let map = object()?;
                let images: Vec<Value> = field(map, "images")?;
                Ok(Card::Gallery(GalleryCard {
                    images: images.iter().map(GalleryImage::decode).collect(),
                    caption: lenient(map, "caption"),
                }))
            }
            CardKind::Bookmark => {
                let map = object()?;
                let metadata = require(map, "metadata")?
                    .as_object()
                    .ok_or(CardError::MissingField("metadata"))?;
                Ok(Card::Bookmark(BookmarkCard {
                    metadata: BookmarkMetadata {
                        url: field(metadata, "url")?,
                        title: field(metadata, "title")?,
                        description: field(metadata, "description")?,
                        thumbnail: lenient(metadata, "thumbnail"),
                        icon: lenient(metadata, "icon"),
                        author: lenient(metadata, "author"),
                        publisher: lenient(metadata, "publisher"),
                    },
                    caption: lenient(map, "caption"),
                }))
            }
        }
    }

    /// Render the card into its markup fragment
    pub fn render(&self) -> String {
        match self {
            Card::Markdown(markdown) => format!("{}\n", markdown),
            Card::Hr => "---\n".to_string(),
            Card::Html(html) | Card::Embed(html) => html.clone(),
            Card::Image(image) => image.render(),
            Card::Code(code) => code.render(),
            Card::Gallery(gallery) => gallery.render(),
            Card::Bookmark(bookmark) => bookmark.render(),
        }
    }
}

impl ImageCard {
    fn render(&self) -> String {
        match &self.caption {
            Some(caption) => format!(
                "{{{{< figure src=\"{}\" caption=\"{}\" >}}}}\n",
                self.src, caption
            ),
            None => format!("{{{{< figure src=\"{}\" >}}}}\n", self.src),
        }
    }
}

impl CodeCard {
    fn render(&self) -> String {
        let mut out = String::from("```");
        if let Some(language) = &self.language {
            out.push_str(language);
        }
        out.push('\n');
        out.push_str(&self.code);
        out.push_str("\n```\n");
        out
    }
}

impl GalleryCard {
    fn render(&self) -> String {
        let mut out = String::from("<figure>\n");
        out.push_str("  <div>\n");
        out.push_str("    <div>\n");

        for (i, image) in self.images.iter().enumerate() {
            if i > 0 && i % GALLERY_ROW_SIZE == 0 {
                out.push_str("    </div>");
                out.push_str("    <div>");
            }
            let Some(image) = image else { continue };

            out.push_str("      <div><img");
            out.push_str(&format!(" src={}", quote(strip_content_folder(&image.src))));
            if let Some(width) = image.width {
                out.push_str(&format!(" width=\"{:.0}\"", width));
            }
            if let Some(height) = image.height {
                out.push_str(&format!(" height=\"{:.0}\"", height));
            }
            if let Some(alt) = &image.alt {
                out.push_str(&format!(" alt={}", quote(alt)));
            }
            if let Some(title) = &image.title {
                out.push_str(&format!(" title={}", quote(title)));
            }
            out.push_str("/></div>\n");
        }

        out.push_str("    </div>\n");
        out.push_str("  </div>\n");

        if let Some(caption) = &self.caption {
            out.push_str(&format!(
                "  <figcaption>\n    {}\n  </figcaption>\n",
                caption
            ));
        }

        out.push_str("</figure>");
        out
    }
}

impl BookmarkCard {
    fn render(&self) -> String {
        let meta = &self.metadata;
        let thumbnail = meta
            .thumbnail
            .as_ref()
            .map(|t| format!("<div><img src={}></div>", quote(t)))
            .unwrap_or_default();
        let icon = meta
            .icon
            .as_ref()
            .map(|i| format!("<img src={}>", quote(i)))
            .unwrap_or_default();
        let author = span(meta.author.as_deref());
        let publisher = span(meta.publisher.as_deref());
        let caption = self
            .caption
            .as_ref()
            .map(|c| format!("<figcaption>{}</figcaption>", c))
            .unwrap_or_default();

        format!(
            "<figure>\n\
             \t     <a href={}>\n\
             \t       <div>\n\
             \t         <div>{}</div>\n\
             \t         <div>{}</div>\n\
             \t         <div>\n\
             \t           {}\n\
             \t           {}\n\
             \t           {}\n\
             \t         </div>\n\
             \t       </div>\n\
             \t       {}\n\
             \t     </a>\n\
             \t     {}\n\
             \t   </figure>",
            quote(&meta.url),
            meta.title,
            meta.description,
            icon,
            author,
            publisher,
            thumbnail,
            caption,
        )
    }
}

fn span(text: Option<&str>) -> String {
    text.map(|t| format!("<span>{}</span>", t))
        .unwrap_or_default()
}

/// Present and non-null
fn require<'a>(map: &'a Map<String, Value>, name: &'static str) -> Result<&'a Value, CardError> {
    map.get(name)
        .filter(|v| !v.is_null())
        .ok_or(CardError::MissingField(name))
}

/// Required field decoded into `T`
fn field<T: DeserializeOwned>(map: &Map<String, Value>, name: &'static str) -> Result<T, CardError> {
    typed(require(map, name)?, name)
}

/// Optional field; `null` or a value of the wrong shape reads as absent
fn lenient<T: DeserializeOwned>(map: &Map<String, Value>, name: &str) -> Option<T> {
    map.get(name).and_then(|value| T::deserialize(value).ok())
}

fn typed<T: DeserializeOwned>(value: &Value, name: &'static str) -> Result<T, CardError> {
    T::deserialize(value).map_err(|source| CardError::TypeMismatch {
        field: name,
        source,
    })
}
