// ── Chat link rewriting ──
//
// Comments and descriptions arrive with chat-style links: `<url|label>`
// or bare `<url>`. The primary store keeps the plain label, the mirror
// gets an HTML anchor.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(https?://[^|>]*)(?:\|([^>]*))?>").expect("valid link pattern")
});

/// The same text rendered for both destinations.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormattedText {
    /// Links replaced by their label (or the bare url).
    pub plain: String,
    /// Links replaced by `<a href="url" target="_blank">label</a>`.
    pub html: String,
}

impl FormattedText {
    pub fn new(text: &str) -> Self {
        let plain = LINK
            .replace_all(text, |caps: &Captures<'_>| label(caps).to_owned())
            .into_owned();
        let html = LINK
            .replace_all(text, |caps: &Captures<'_>| {
                format!(
                    "<a href=\"{}\" target=\"_blank\">{}</a>",
                    &caps[1],
                    label(caps)
                )
            })
            .into_owned();
        Self { plain, html }
    }
}

fn label<'t>(caps: &Captures<'t>) -> &'t str {
    caps.get(2)
        .map(|m| m.as_str())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| caps.get(1).map_or("", |m| m.as_str()))
}
