//! Sectioned key/value configuration text.
//!
//! # Format
//! ```text
//! ; comment
//! # comment
//! [section]
//! key = value
//! key: "quoted value"
//! ```
//!
//! # Design Decisions
//! - Parsing is all-or-nothing: the first bad line aborts with its line number
//! - Sections and keys keep the order they first appeared in
//! - Keys before any `[section]` header land in the default section `""`

use thiserror::Error;

/// Name of the implicit section for keys that precede any header.
pub const DEFAULT_SECTION: &str = "";

/// A syntax error at a specific line of the configuration text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct ParseError {
    /// 1-based line number.
    pub line: usize,
    pub message: String,
}

/// Ordered key/value pairs of one section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    entries: Vec<(String, String)>,
}

impl Section {
    /// Look up a key's raw string value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over `(key, value)` pairs in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn set(&mut self, key: &str, value: String) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }
}

/// Parsed configuration: section name → ordered key/value pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawConfig {
    sections: Vec<(String, Section)>,
}

impl RawConfig {
    /// Parse configuration text.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let mut config = RawConfig::default();
        let mut current = DEFAULT_SECTION.to_string();

        for (idx, raw_line) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw_line.trim();

            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if let Some(rest) = line.strip_prefix('[') {
                let name = rest.strip_suffix(']').ok_or_else(|| ParseError {
                    line: line_no,
                    message: format!("unterminated section header `{}`", line),
                })?;
                let name = name.trim();
                if name.is_empty() {
                    return Err(ParseError {
                        line: line_no,
                        message: "empty section name".to_string(),
                    });
                }
                config.section_mut(name);
                current = name.to_string();
                continue;
            }

            let split = line.find(|c: char| c == '=' || c == ':').ok_or_else(|| ParseError {
                line: line_no,
                message: format!("expected `key = value`, found `{}`", line),
            })?;
            let key = line[..split].trim();
            if key.is_empty() {
                return Err(ParseError {
                    line: line_no,
                    message: "missing key before separator".to_string(),
                });
            }
            let value = unquote(line[split + 1..].trim());
            config.section_mut(&current).set(key, value.to_string());
        }

        Ok(config)
    }

    /// Look up a section by name.
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s)
    }

    /// Look up a raw value.
    pub fn value(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section).and_then(|s| s.get(key))
    }

    /// Section names in file order.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|(n, _)| n.as_str())
    }

    fn section_mut(&mut self, name: &str) -> &mut Section {
        let pos = match self.sections.iter().position(|(n, _)| n == name) {
            Some(pos) => pos,
            None => {
                self.sections.push((name.to_string(), Section::default()));
                self.sections.len() - 1
            }
        };
        &mut self.sections[pos].1
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
