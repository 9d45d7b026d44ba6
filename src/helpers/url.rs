//! Path and attribute helpers shared by the renderers

/// Strip Ghost's `/content` prefix from an asset path
///
/// Ghost serves uploads from `/content/images/...`; in a Hugo site the same
/// files live under `static/images/...`.
///
/// # Examples
/// ```ignore
/// strip_content_folder("/content/images/a.png") // -> "/images/a.png"
/// ```
pub fn strip_content_folder(path: &str) -> &str {
    path.strip_prefix("/content").unwrap_or(path)
}

/// Quote a string as a double-quoted, backslash-escaped attribute value
///
/// # Examples
/// ```ignore
/// quote(r#"say "hi""#) // -> "\"say \\\"hi\\\"\""
/// ```
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() && (c as u32) < 0x80 => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
