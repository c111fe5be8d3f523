// Release notes rendering
// Turns the light HTML used in manifest `updateMessage` fields into plain text
// suitable for a dialog or terminal.

use std::sync::OnceLock;

use regex::Regex;

fn line_break_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)<br\s*/?>|</p\s*>|</div\s*>").expect("valid line break pattern")
    })
}

fn list_item_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<li(\s[^>]*)?>").expect("valid list item pattern"))
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"))
}

fn decode_entities(text: &str) -> String {
    // `&amp;` last so "&amp;lt;" stays "&lt;".
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Renders release-note markup to display text.
pub fn render(markup: &str) -> String {
    let text = line_break_re().replace_all(markup, "\n");
    let text = list_item_re().replace_all(&text, "\n• ");
    let text = tag_re().replace_all(&text, "");
    let text = decode_entities(&text);

    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
