// src/inventory/segment.rs

use regex::Regex;

/// Cuts a report body down to the part worth classifying: everything before
/// the sign-off, and (when a marker is configured and present) only what
/// follows the inventory heading.
#[derive(Debug, Clone, Default)]
pub struct ReportPreprocessor {
    signature: Option<Regex>,
    marker: Option<Regex>,
}

impl ReportPreprocessor {
    pub fn new<S: AsRef<str>>(
        signature_triggers: &[S],
        inventory_marker: Option<&str>,
    ) -> Result<Self, regex::Error> {
        let alternatives: Vec<String> = signature_triggers
            .iter()
            .map(|t| t.as_ref().trim())
            .filter(|t| !t.is_empty())
            .map(regex::escape)
            .collect();

        let signature = if alternatives.is_empty() {
            None
        } else {
            Some(Regex::new(&format!("(?i)(?:{})", alternatives.join("|")))?)
        };

        let marker = match inventory_marker.map(str::trim) {
            Some(m) if !m.is_empty() => {
                Some(Regex::new(&format!(r"(?i){}[ \t]*:?", regex::escape(m)))?)
            }
            _ => None,
        };

        Ok(Self { signature, marker })
    }

    pub fn prepare<'a>(&self, body: &'a str) -> &'a str {
        let body = self.strip_signature(body);
        self.inventory_section(body)
    }

    /// Everything before the earliest signature trigger, right-trimmed.
    pub fn strip_signature<'a>(&self, body: &'a str) -> &'a str {
        let end = self
            .signature
            .as_ref()
            .and_then(|re| re.find(body))
            .map_or(body.len(), |m| m.start());
        body[..end].trim_end()
    }

    /// Text after the inventory marker, or the whole body if it is missing.
    pub fn inventory_section<'a>(&self, body: &'a str) -> &'a str {
        match self.marker.as_ref().and_then(|re| re.find(body)) {
            Some(m) => &body[m.end()..],
            None => body,
        }
    }
}

/// Non-blank lines of a body, trimmed.
pub fn segment(body: &str) -> impl Iterator<Item = &str> {
    body.lines().map(str::trim).filter(|line| !line.is_empty())
}
