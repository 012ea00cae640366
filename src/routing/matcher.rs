//! Route matching module
//!
//! Implements path pattern matching with `{name}` placeholders.

use std::borrow::Cow;
use std::str::Utf8Error;

use percent_encoding::percent_decode_str;

/// One segment of a route pattern
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// Parsed route pattern such as `/sleep/{secs}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

/// Path parameters captured by a successful match
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Params<'a> {
    pairs: Vec<(&'a str, &'a str)>,
}

impl<'a> Params<'a> {
    /// Percent-decoded value of a captured placeholder
    ///
    /// `Some(Err(_))` when the decoded bytes are not UTF-8.
    pub fn get(&self, name: &str) -> Option<Result<Cow<'a, str>, Utf8Error>> {
        self.pairs
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| percent_decode_str(value).decode_utf8())
    }
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Self {
        let segments = split_path(pattern)
            .map(|seg| {
                match seg.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                    Some(name) => Segment::Param(name.to_string()),
                    None => Segment::Literal(seg.to_string()),
                }
            })
            .collect();

        Self {
            raw: pattern.to_string(),
            segments,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Match a request path, capturing placeholder values still encoded
    pub fn matches<'a>(&'a self, path: &'a str) -> Option<Params<'a>> {
        let mut params = Params::default();
        let mut parts = split_path(path);

        for segment in &self.segments {
            let part = parts.next()?;
            match segment {
                Segment::Literal(lit) if lit == part => {}
                Segment::Param(name) if !part.is_empty() => params.pairs.push((name.as_str(), part)),
                _ => return None,
            }
        }

        // Reject extra trailing segments
        if parts.next().is_some() {
            return None;
        }
        Some(params)
    }
}

/// Split a path into segments; `/` has none
fn split_path(path: &str) -> impl Iterator<Item = &str> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let mut parts = trimmed.split('/');
    // "".split('/') yields one empty item, which the root path must not have
    let skip_empty_root = trimmed.is_empty();
    if skip_empty_root {
        parts.next();
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_pattern() {
        let pattern = PathPattern::parse("/");
        assert!(pattern.matches("/").is_some());
        assert!(pattern.matches("/healthcheck").is_none());
    }

    #[test]
    fn test_literal_pattern() {
        let pattern = PathPattern::parse("/healthcheck");
        assert!(pattern.matches("/healthcheck").is_some());
        assert!(pattern.matches("/healthcheck/").is_none());
        assert!(pattern.matches("/health").is_none());
        assert!(pattern.matches("/").is_none());
    }

    #[test]
    fn test_param_capture() {
        let pattern = PathPattern::parse("/sleep/{secs}");
        let params = pattern.matches("/sleep/1.50").unwrap();
        assert_eq!(params.get("secs").unwrap().unwrap(), "1.50");
        assert!(params.get("other").is_none());
    }

    #[test]
    fn test_param_requires_value() {
        let pattern = PathPattern::parse("/sleep/{secs}");
        assert!(pattern.matches("/sleep/").is_none());
        assert!(pattern.matches("/sleep").is_none());
        assert!(pattern.matches("/sleep/1/2").is_none());
    }

    #[test]
    fn test_param_percent_decoded() {
        let pattern = PathPattern::parse("/sleep/{secs}");
        let params = pattern.matches("/sleep/0%2E1").unwrap();
        assert_eq!(params.get("secs").unwrap().unwrap(), "0.1");

        let params = pattern.matches("/sleep/%31").unwrap();
        assert_eq!(params.get("secs").unwrap().unwrap(), "1");
    }

    #[test]
    fn test_param_invalid_utf8() {
        let pattern = PathPattern::parse("/sleep/{secs}");
        let params = pattern.matches("/sleep/%FF").unwrap();
        assert!(params.get("secs").unwrap().is_err());
    }
}
