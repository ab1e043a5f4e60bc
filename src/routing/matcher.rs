//! Path pattern matching.
//!
//! A pattern is a `/`-delimited template. Each segment is one of:
//! - a literal, compared byte for byte
//! - a placeholder `[name]`, matching any single segment and binding it to `name`
//! - the wildcard `*`, matching the rest of the path (including nothing)
//!
//! Empty segments are dropped on both sides, so `//a//b/` is `a/b`.
//! Matching is a single left-to-right scan with no backtracking. Without a
//! wildcard the segment counts must be equal.

use std::collections::HashMap;

const OPEN_PLACEHOLDER: char = '[';
const CLOSE_PLACEHOLDER: char = ']';
const WILDCARD: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Placeholder(String),
    Wildcard,
}

impl Segment {
    fn parse(segment: &str) -> Self {
        if segment == WILDCARD {
            return Segment::Wildcard;
        }

        match placeholder_name(segment) {
            Some(name) => Segment::Placeholder(name.to_string()),
            None => Segment::Literal(segment.to_string()),
        }
    }
}

/// A route pattern compiled into segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    raw: String,
    segments: Vec<Segment>,
}

impl Pattern {
    pub fn parse(pattern: &str) -> Self {
        Self {
            raw: pattern.to_string(),
            segments: path_segments(pattern).map(Segment::parse).collect(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether `path` satisfies this pattern.
    pub fn matches(&self, path: &str) -> bool {
        self.walk(path).is_some()
    }

    /// Placeholder bindings for `path`, empty when the path does not match.
    ///
    /// A wildcard ends the scan, so the bindings before it are returned even
    /// when the path has more segments than the pattern:
    /// `/u/[id]/*` against `/u/7/x/y` yields `{"id": "7"}`.
    pub fn extract(&self, path: &str) -> HashMap<String, String> {
        self.walk(path).unwrap_or_default()
    }

    fn walk(&self, path: &str) -> Option<HashMap<String, String>> {
        let request: Vec<&str> = path_segments(path).collect();
        let mut params = HashMap::new();

        for (idx, segment) in self.segments.iter().enumerate() {
            if *segment == Segment::Wildcard {
                return Some(params);
            }

            let value = request.get(idx)?;

            match segment {
                Segment::Placeholder(name) => {
                    params.insert(name.clone(), value.to_string());
                }
                Segment::Literal(literal) if literal == value => {}
                _ => return None,
            }
        }

        (request.len() == self.segments.len()).then_some(params)
    }
}

impl From<&str> for Pattern {
    fn from(pattern: &str) -> Self {
        Pattern::parse(pattern)
    }
}

/// Non-empty `/`-separated segments of a path.
pub fn path_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

/// `[name]` yields `name`; `[]` and anything unbracketed yield `None`.
pub fn placeholder_name(segment: &str) -> Option<&str> {
    segment
        .strip_prefix(OPEN_PLACEHOLDER)
        .and_then(|rest| rest.strip_suffix(CLOSE_PLACEHOLDER))
        .filter(|name| !name.is_empty())
}

pub fn path_match(request_path: &str, pattern: &str) -> bool {
    Pattern::parse(pattern).matches(request_path)
}

pub fn route_params(request_path: &str, pattern: &str) -> HashMap<String, String> {
    Pattern::parse(pattern).extract(request_path)
}
