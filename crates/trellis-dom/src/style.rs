//! Inline style declarations
//!
//! An ordered property -> value map per element, parsed from and rendered
//! back to `name: value; ...` text. Property names are folded to ASCII
//! lowercase. The declaration itself is index-agnostic; the element facade
//! keeps the document index in sync.

use std::fmt;

/// Strict style parsing failure. The whole call is aborted and nothing is
/// applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed style declaration: {fragment:?}")]
pub struct StyleParseError {
    /// The declaration fragment that did not parse.
    pub fragment: String,
}

/// Ordered inline style declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleDeclaration {
    entries: Vec<(Box<str>, Box<str>)>,
}

fn parse_declarations(text: &str, strict: bool) -> Result<Vec<(String, String)>, StyleParseError> {
    let mut parsed = Vec::new();
    for fragment in text.split(';') {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            continue;
        }
        let declaration = fragment.split_once(':').and_then(|(name, value)| {
            let name = name.trim();
            let value = value.trim();
            (!name.is_empty() && !value.is_empty())
                .then(|| (name.to_ascii_lowercase(), value.to_string()))
        });
        match declaration {
            Some(decl) => parsed.push(decl),
            None if strict => {
                return Err(StyleParseError {
                    fragment: fragment.to_string(),
                });
            }
            None => {}
        }
    }
    Ok(parsed)
}

impl StyleDeclaration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a declaration list into a fresh declaration.
    pub fn parse(text: &str, strict: bool) -> Result<Self, StyleParseError> {
        let mut style = Self::new();
        style.set_styles(text, strict)?;
        Ok(style)
    }

    pub fn has_style(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Get a property value.
    pub fn get(&self, name: &str) -> Option<&str> {
        let name = name.trim().to_ascii_lowercase();
        self.entries
            .iter()
            .find(|(n, _)| **n == *name)
            .map(|(_, v)| &**v)
    }

    /// Set one property, keeping its position if it already exists.
    pub fn set(&mut self, name: &str, value: &str) {
        let name = name.trim().to_ascii_lowercase();
        let value = value.trim();
        match self.entries.iter_mut().find(|(n, _)| **n == *name) {
            Some((_, v)) => *v = value.into(),
            None => self.entries.push((name.into(), value.into())),
        }
    }

    /// Remove a property. Returns whether it was present.
    pub fn remove(&mut self, name: &str) -> bool {
        let name = name.trim().to_ascii_lowercase();
        let before = self.entries.len();
        self.entries.retain(|(n, _)| **n != *name);
        self.entries.len() != before
    }

    /// Replace the whole declaration with the parse of `text`.
    ///
    /// Under `strict`, a malformed fragment fails the entire call and the
    /// declaration is left exactly as it was; otherwise malformed fragments
    /// are skipped and the rest applied.
    pub fn set_styles(&mut self, text: &str, strict: bool) -> Result<(), StyleParseError> {
        let parsed = parse_declarations(text, strict)?;
        self.entries.clear();
        for (name, value) in parsed {
            self.set(&name, &value);
        }
        Ok(())
    }

    /// Merge the parse of `text` into the declaration. Same strictness
    /// contract as [`set_styles`](Self::set_styles).
    pub fn add_styles(&mut self, text: &str, strict: bool) -> Result<(), StyleParseError> {
        let parsed = parse_declarations(text, strict)?;
        for (name, value) in parsed {
            self.set(&name, &value);
        }
        Ok(())
    }

    /// Ordered (name, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (&**n, &**v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for StyleDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_render() {
        let style = StyleDeclaration::parse("color: red; width: 10px", true).unwrap();
        assert_eq!(style.get("color"), Some("red"));
        assert_eq!(style.get("width"), Some("10px"));
        assert_eq!(style.to_string(), "color: red; width: 10px");
    }

    #[test]
    fn test_strict_rejects_and_leaves_unchanged() {
        let mut style = StyleDeclaration::parse("color: red", true).unwrap();
        let err = style.set_styles("color: blue; bogus", true).unwrap_err();
        assert_eq!(err.fragment, "bogus");
        assert_eq!(style.to_string(), "color: red");
    }

    #[test]
    fn test_lenient_skips_malformed() {
        let mut style = StyleDeclaration::new();
        style.set_styles("color: red; bogus; width: 2em", false).unwrap();
        assert_eq!(style.to_string(), "color: red; width: 2em");
    }

    #[test]
    fn test_names_fold_case() {
        let mut style = StyleDeclaration::new();
        style.set("Color", "red");
        assert!(style.has_style("color"));
        style.set("COLOR", "blue");
        assert_eq!(style.len(), 1);
        assert_eq!(style.get("color"), Some("blue"));
    }

    #[test]
    fn test_remove() {
        let mut style = StyleDeclaration::parse("a: 1; b: 2", true).unwrap();
        assert!(style.remove("a"));
        assert!(!style.remove("a"));
        assert_eq!(style.to_string(), "b: 2");
    }

    #[test]
    fn test_trailing_semicolons_and_whitespace() {
        let style = StyleDeclaration::parse("  color : red ; ; ", true).unwrap();
        assert_eq!(style.to_string(), "color: red");
    }
}
