//! Client description sanitizer.
//!
//! Descriptions are shown to resource owners on the approval page, so they may
//! carry a little formatting but nothing executable. Allowed tags are rebuilt
//! without attributes, other tags are dropped (keeping their text), and the
//! contents of script-like elements are removed entirely. Any `<` or `>` left
//! in text is escaped.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::RegistrationConfig;

/// Comments and elements whose content is never shown as text.
static NON_TEXT_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)<!--.*?-->|<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>|<textarea\b[^>]*>.*?</textarea\s*>|<option\b[^>]*>.*?</option\s*>",
    )
    .expect("Invalid non-text block regex")
});

/// Opening or closing tag: captures the slash and the tag name.
static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<\s*(/?)\s*([a-zA-Z][a-zA-Z0-9]*)\b[^>]*>").expect("Invalid tag regex")
});

/// Allow-list markup sanitizer.
#[derive(Debug, Clone)]
pub struct DescriptionSanitizer {
    allowed: HashSet<String>,
}

impl DescriptionSanitizer {
    /// Creates a sanitizer that keeps the given tag names.
    #[must_use]
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed: allowed
                .into_iter()
                .map(|tag| tag.as_ref().to_ascii_lowercase())
                .collect(),
        }
    }

    /// Creates a sanitizer from registration settings.
    #[must_use]
    pub fn from_config(config: &RegistrationConfig) -> Self {
        Self::new(&config.allowed_description_tags)
    }

    /// Returns `true` if `tag` survives sanitizing.
    #[must_use]
    pub fn allows(&self, tag: &str) -> bool {
        self.allowed.contains(&tag.to_ascii_lowercase())
    }

    /// Sanitizes `input`.
    #[must_use]
    pub fn sanitize(&self, input: &str) -> String {
        let stripped = NON_TEXT_BLOCK.replace_all(input, "");
        let mut out = String::with_capacity(stripped.len());
        let mut last = 0;

        for caps in TAG.captures_iter(&stripped) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            out.push_str(&escape_angle_brackets(&stripped[last..whole.start()]));
            last = whole.end();

            let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
            let name = caps
                .get(2)
                .map(|m| m.as_str().to_ascii_lowercase())
                .unwrap_or_default();

            if self.allowed.contains(&name) {
                out.push('<');
                if closing {
                    out.push('/');
                }
                out.push_str(&name);
                out.push('>');
            }
        }

        out.push_str(&escape_angle_brackets(&stripped[last..]));
        out
    }
}

impl Default for DescriptionSanitizer {
    fn default() -> Self {
        Self::from_config(&RegistrationConfig::default())
    }
}

fn escape_angle_brackets(text: &str) -> String {
    text.replace('<', "&lt;").replace('>', "&gt;")
}
