//! Mobiledoc walker
//!
//! Parses a serialized mobiledoc (format 0.3.x) and renders it to Markdown,
//! delegating cards and atoms to caller-supplied renderers. The walker owns
//! section ordering and inline markup; it knows nothing about individual
//! card types.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Mobiledoc rendering errors
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("invalid mobiledoc JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported mobiledoc version {0:?}")]
    UnsupportedVersion(String),

    #[error("malformed {what}: {detail}")]
    Malformed { what: &'static str, detail: String },

    #[error("unknown section type {0}")]
    UnknownSection(u64),

    #[error("{kind} index {index} out of range")]
    IndexOutOfRange { kind: &'static str, index: usize },

    #[error("no renderer registered for card {0:?}")]
    UnknownCard(String),

    #[error("no renderer registered for atom {0:?}")]
    UnknownAtom(String),
}

/// Callbacks invoked by the walker
///
/// Returning `None` means the name is not registered, which aborts the walk.
pub trait Renderers {
    fn card(&self, name: &str, payload: &Value) -> Option<String>;
    fn atom(&self, name: &str, value: &str, payload: &Value) -> Option<String>;
}

#[derive(Debug, Deserialize)]
struct RawMobiledoc {
    version: String,
    #[serde(default)]
    atoms: Vec<(String, Value, Value)>,
    #[serde(default)]
    cards: Vec<(String, Value)>,
    #[serde(default)]
    markups: Vec<Vec<Value>>,
    #[serde(default)]
    sections: Vec<Vec<Value>>,
}

/// A parsed mobiledoc document
#[derive(Debug, Clone)]
pub struct Mobiledoc {
    atoms: Vec<Atom>,
    cards: Vec<(String, Value)>,
    markups: Vec<Markup>,
    sections: Vec<Section>,
}

#[derive(Debug, Clone)]
struct Atom {
    name: String,
    value: String,
    payload: Value,
}

#[derive(Debug, Clone)]
struct Markup {
    tag: String,
    attributes: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
enum Section {
    Markup { tag: String, markers: Vec<Marker> },
    Image { src: String },
    List { tag: String, items: Vec<Vec<Marker>> },
    Card { index: usize },
}

#[derive(Debug, Clone)]
struct Marker {
    opens: Vec<usize>,
    closes: usize,
    content: MarkerContent,
}

#[derive(Debug, Clone)]
enum MarkerContent {
    Text(String),
    Atom(usize),
}

impl Mobiledoc {
    /// Parse a serialized mobiledoc
    pub fn parse(source: &str) -> Result<Self, RenderError> {
        let raw: RawMobiledoc = serde_json::from_str(source)?;
        if !raw.version.starts_with("0.3") {
            return Err(RenderError::UnsupportedVersion(raw.version));
        }

        let atoms = raw
            .atoms
            .into_iter()
            .map(|(name, value, payload)| Atom {
                name,
                value: match value {
                    Value::String(s) => s,
                    Value::Null => String::new(),
                    other => other.to_string(),
                },
                payload,
            })
            .collect();

        let markups = raw
            .markups
            .iter()
            .map(|m| parse_markup(m))
            .collect::<Result<Vec<_>, _>>()?;

        let sections = raw
            .sections
            .iter()
            .map(|s| parse_section(s))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            atoms,
            cards: raw.cards,
            markups,
            sections,
        })
    }

    /// Walk the document in order, concatenating rendered output
    pub fn render<R: Renderers + ?Sized>(&self, renderers: &R) -> Result<String, RenderError> {
        let mut out = String::new();

        for section in &self.sections {
            match section {
                Section::Markup { tag, markers } => {
                    out.push_str(section_prefix(tag));
                    self.render_markers(markers, renderers, &mut out)?;
                    out.push_str("\n\n");
                }
                Section::Image { src } => {
                    out.push_str(&format!("![]({})\n\n", src));
                }
                Section::List { tag, items } => {
                    let bullet = if tag == "ol" { "1. " } else { "* " };
                    for item in items {
                        out.push_str(bullet);
                        self.render_markers(item, renderers, &mut out)?;
                        out.push('\n');
                    }
                    out.push('\n');
                }
                Section::Card { index } => {
                    let (name, payload) =
                        self.cards
                            .get(*index)
                            .ok_or(RenderError::IndexOutOfRange {
                                kind: "card",
                                index: *index,
                            })?;
                    let rendered = renderers
                        .card(name, payload)
                        .ok_or_else(|| RenderError::UnknownCard(name.clone()))?;
                    out.push_str(&rendered);
                    out.push('\n');
                }
            }
        }

        Ok(out)
    }

    fn render_markers<R: Renderers + ?Sized>(
        &self,
        markers: &[Marker],
        renderers: &R,
        out: &mut String,
    ) -> Result<(), RenderError> {
        let mut open: Vec<&Markup> = Vec::new();

        for marker in markers {
            for &index in &marker.opens {
                let markup = self.markups.get(index).ok_or(RenderError::IndexOutOfRange {
                    kind: "markup",
                    index,
                })?;
                out.push_str(&markup.open());
                open.push(markup);
            }

            match &marker.content {
                MarkerContent::Text(text) => out.push_str(text),
                MarkerContent::Atom(index) => {
                    let atom = self.atoms.get(*index).ok_or(RenderError::IndexOutOfRange {
                        kind: "atom",
                        index: *index,
                    })?;
                    let rendered = renderers
                        .atom(&atom.name, &atom.value, &atom.payload)
                        .ok_or_else(|| RenderError::UnknownAtom(atom.name.clone()))?;
                    out.push_str(&rendered);
                }
            }

            for _ in 0..marker.closes {
                if let Some(markup) = open.pop() {
                    out.push_str(&markup.close());
                }
            }
        }

        // Unbalanced documents: close whatever is still open
        while let Some(markup) = open.pop() {
            out.push_str(&markup.close());
        }

        Ok(())
    }
}

impl Markup {
    fn attribute(&self, name: &str) -> &str {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }

    fn open(&self) -> String {
        match self.tag.as_str() {
            "strong" | "b" => "**".to_string(),
            "em" | "i" => "*".to_string(),
            "s" => "~~".to_string(),
            "code" => "`".to_string(),
            "a" => "[".to_string(),
            tag => format!("<{}>", tag),
        }
    }

    fn close(&self) -> String {
        match self.tag.as_str() {
            "strong" | "b" => "**".to_string(),
            "em" | "i" => "*".to_string(),
            "s" => "~~".to_string(),
            "code" => "`".to_string(),
            "a" => format!("]({})", self.attribute("href")),
            tag => format!("</{}>", tag),
        }
    }
}

fn section_prefix(tag: &str) -> &'static str {
    match tag {
        "h1" => "# ",
        "h2" => "## ",
        "h3" => "### ",
        "h4" => "#### ",
        "h5" => "##### ",
        "h6" => "###### ",
        "blockquote" | "aside" | "pull-quote" => "> ",
        _ => "",
    }
}

fn malformed(what: &'static str, value: impl std::fmt::Debug) -> RenderError {
    RenderError::Malformed {
        what,
        detail: format!("{:?}", value),
    }
}

fn as_str<'a>(value: Option<&'a Value>, what: &'static str) -> Result<&'a str, RenderError> {
    value
        .and_then(Value::as_str)
        .ok_or_else(|| malformed(what, value))
}

fn as_index(value: Option<&Value>, what: &'static str) -> Result<usize, RenderError> {
    value
        .and_then(Value::as_u64)
        .map(|n| n as usize)
        .ok_or_else(|| malformed(what, value))
}

fn as_array<'a>(value: Option<&'a Value>, what: &'static str) -> Result<&'a [Value], RenderError> {
    value
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .ok_or_else(|| malformed(what, value))
}

fn parse_markup(raw: &[Value]) -> Result<Markup, RenderError> {
    let tag = as_str(raw.first(), "markup tag")?.to_lowercase();
    let attributes = match raw.get(1) {
        None | Some(Value::Null) => Vec::new(),
        Some(_) => as_array(raw.get(1), "markup attributes")?
            .chunks(2)
            .map(|pair| {
                let key = as_str(pair.first(), "markup attribute name")?;
                let value = as_str(pair.get(1), "markup attribute value")?;
                Ok((key.to_string(), value.to_string()))
            })
            .collect::<Result<Vec<_>, RenderError>>()?,
    };
    Ok(Markup { tag, attributes })
}

fn parse_section(raw: &[Value]) -> Result<Section, RenderError> {
    let kind = raw
        .first()
        .and_then(Value::as_u64)
        .ok_or_else(|| malformed("section", raw))?;

    match kind {
        1 => Ok(Section::Markup {
            tag: as_str(raw.get(1), "section tag")?.to_lowercase(),
            markers: parse_markers(as_array(raw.get(2), "section markers")?)?,
        }),
        2 => Ok(Section::Image {
            src: as_str(raw.get(1), "image section src")?.to_string(),
        }),
        3 => Ok(Section::List {
            tag: as_str(raw.get(1), "list tag")?.to_lowercase(),
            items: as_array(raw.get(2), "list items")?
                .iter()
                .map(|item| parse_markers(as_array(Some(item), "list item")?))
                .collect::<Result<Vec<_>, _>>()?,
        }),
        10 => Ok(Section::Card {
            index: as_index(raw.get(1), "card section index")?,
        }),
        other => Err(RenderError::UnknownSection(other)),
    }
}

fn parse_markers(raw: &[Value]) -> Result<Vec<Marker>, RenderError> {
    raw.iter()
        .map(|marker| {
            let marker = as_array(Some(marker), "marker")?;
            let opens = as_array(marker.get(1), "marker open markups")?
                .iter()
                .map(|i| as_index(Some(i), "marker open markup"))
                .collect::<Result<Vec<_>, _>>()?;
            let closes = as_index(marker.get(2), "marker close count")?;
            let content = match as_index(marker.first(), "marker type")? {
                0 => MarkerContent::Text(as_str(marker.get(3), "marker text")?.to_string()),
                1 => MarkerContent::Atom(as_index(marker.get(3), "marker atom index")?),
                _ => return Err(malformed("marker type", marker.first())),
            };
            Ok(Marker {
                opens,
                closes,
                content,
            })
        })
        .collect()
}
