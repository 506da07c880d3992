//! Segment-wise pattern matching.
//!
//! # Responsibilities
//! - Parse registration patterns into literal and `:param` segments
//! - Match request paths against a pattern and capture parameters
//! - Order parameterised patterns by specificity
//!
//! # Design Decisions
//! - Matching is case-sensitive and byte-exact for literals
//! - A parameter captures exactly one non-empty segment
//! - Patterns ending in `/` are subtrees (prefix match, no parameters)
//! - `/foo` and `/foo/` are different paths
//! - Paths are matched in decoded form; see [`decode_path`]

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::routing::{Params, RouteError};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// How a pattern is matched, which also decides where it is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    /// No parameters, exact comparison.
    Static,
    /// At least one `:param` segment.
    Parameterized,
    /// Ends in `/`, matches every path below it.
    Subtree,
}

/// A parsed route pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    raw: String,
    kind: PatternKind,
    segments: Vec<Segment>,
}

impl Pattern {
    /// Parse a registration pattern.
    pub fn parse(raw: &str) -> Result<Self, RouteError> {
        let invalid = |reason| RouteError::InvalidPattern {
            pattern: raw.to_string(),
            reason,
        };

        if raw.is_empty() {
            return Err(invalid("pattern is empty"));
        }
        if !raw.starts_with('/') {
            return Err(invalid("pattern must start with '/'"));
        }
        if raw == "/" {
            return Ok(Self {
                raw: raw.to_string(),
                kind: PatternKind::Static,
                segments: Vec::new(),
            });
        }

        let subtree = raw.ends_with('/');
        let body = &raw[1..];
        let body = if subtree { &body[..body.len() - 1] } else { body };

        let mut segments = Vec::new();
        let mut names = HashSet::new();
        for part in body.split('/') {
            if part.is_empty() {
                return Err(invalid("empty path segment"));
            }
            match part.strip_prefix(':') {
                Some("") => return Err(invalid("parameter name is empty")),
                Some(name) => {
                    if !name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
                        return Err(invalid("parameter names are alphanumeric or '_'"));
                    }
                    if !names.insert(name) {
                        return Err(invalid("duplicate parameter name"));
                    }
                    segments.push(Segment::Param(name.to_string()));
                }
                None => segments.push(Segment::Literal(part.to_string())),
            }
        }

        let kind = match (subtree, names.is_empty()) {
            (true, false) => return Err(invalid("subtree patterns cannot hold parameters")),
            (true, true) => PatternKind::Subtree,
            (false, false) => PatternKind::Parameterized,
            (false, true) => PatternKind::Static,
        };

        Ok(Self {
            raw: raw.to_string(),
            kind,
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    /// Names of the parameters, in path order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Match `path`, returning the captured parameters on success.
    ///
    /// `path` is expected in decoded form, as produced by [`decode_path`].
    /// Captured values are taken as they appear in it.
    pub fn matches(&self, path: &str) -> Option<Params> {
        match self.kind {
            PatternKind::Static => (path == self.raw).then(Params::default),
            PatternKind::Subtree => path.starts_with(&self.raw).then(Params::default),
            PatternKind::Parameterized => {
                let mut parts = path.strip_prefix('/')?.split('/');
                let mut params = Params::default();
                for segment in &self.segments {
                    let part = parts.next()?;
                    match segment {
                        Segment::Literal(literal) if literal == part => {}
                        Segment::Literal(_) => return None,
                        Segment::Param(_) if part.is_empty() => return None,
                        Segment::Param(name) => params.push(name.clone(), part.to_string()),
                    }
                }
                match parts.next() {
                    Some(_) => None,
                    None => Some(params),
                }
            }
        }
    }

    /// Precedence between two parameterised patterns.
    ///
    /// At the first position where one pattern has a literal and the other a
    /// parameter, the literal sorts first. Longer patterns sort before
    /// shorter ones; they can never match the same path, so this only keeps
    /// the order total. `Equal` leaves registration order in charge.
    pub fn specificity_cmp(&self, other: &Pattern) -> Ordering {
        for (a, b) in self.segments.iter().zip(&other.segments) {
            match (a, b) {
                (Segment::Literal(_), Segment::Param(_)) => return Ordering::Less,
                (Segment::Param(_), Segment::Literal(_)) => return Ordering::Greater,
                _ => {}
            }
        }
        other.segments.len().cmp(&self.segments.len())
    }
}

/// Percent-decode a request path one segment at a time.
///
/// A segment that does not decode to UTF-8 is kept as received, so one bad
/// segment never hides the rest of the path from literal comparison.
pub fn decode_path(path: &str) -> String {
    if !path.contains('%') {
        return path.to_string();
    }
    path.split('/')
        .map(|segment| match urlencoding::decode(segment) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kinds() {
        assert_eq!(Pattern::parse("/").unwrap().kind(), PatternKind::Static);
        assert_eq!(Pattern::parse("/contact").unwrap().kind(), PatternKind::Static);
        assert_eq!(Pattern::parse("/static/").unwrap().kind(), PatternKind::Subtree);
        assert_eq!(
            Pattern::parse("/api/widgets/:slug").unwrap().kind(),
            PatternKind::Parameterized
        );
    }

    #[test]
    fn test_parse_rejects_invalid() {
        for raw in ["", "user", "/:/x", "/a/:id/:id", "/files/:name/", "/a//b", "/x/:bad-name"] {
            assert!(
                matches!(Pattern::parse(raw), Err(RouteError::InvalidPattern { .. })),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_param_names_in_order() {
        let pattern = Pattern::parse("/api/widgets/:slug/parts/:id/update").unwrap();
        let names: Vec<_> = pattern.param_names().collect();
        assert_eq!(names, ["slug", "id"]);
    }

    #[test]
    fn test_static_match_is_exact() {
        let pattern = Pattern::parse("/contact").unwrap();
        assert!(pattern.matches("/contact").is_some());
        assert!(pattern.matches("/contact/").is_none());
        assert!(pattern.matches("/Contact").is_none());
    }

    #[test]
    fn test_subtree_match_is_prefix() {
        let pattern = Pattern::parse("/static/").unwrap();
        assert!(pattern.matches("/static/").is_some());
        assert!(pattern.matches("/static/css/site.css").is_some());
        assert!(pattern.matches("/static").is_none());
        assert!(pattern.matches("/staticfiles").is_none());
    }

    #[test]
    fn test_param_captures_one_segment() {
        let pattern = Pattern::parse("/api/widgets/:slug/parts/:id/update").unwrap();
        let params = pattern.matches("/api/widgets/gizmo/parts/3/update").unwrap();
        assert_eq!(params.get("slug"), Some("gizmo"));
        assert_eq!(params.get("id"), Some("3"));

        assert!(pattern.matches("/api/widgets/gizmo/parts/3").is_none());
        assert!(pattern.matches("/api/widgets/gizmo/parts/3/update/x").is_none());
        assert!(pattern.matches("/api/widgets//parts/3/update").is_none());
    }

    #[test]
    fn test_trailing_slash_is_distinct() {
        let pattern = Pattern::parse("/:slug").unwrap();
        assert!(pattern.matches("/gizmo").is_some());
        assert!(pattern.matches("/gizmo/").is_none());
        assert!(pattern.matches("/").is_none());
    }

    #[test]
    fn test_param_values_are_decoded() {
        let pattern = Pattern::parse("/:slug").unwrap();
        let params = pattern.matches(&decode_path("/blue%20gizmo")).unwrap();
        assert_eq!(params.get("slug"), Some("blue gizmo"));
    }

    #[test]
    fn test_decode_path_matches_literals() {
        let pattern = Pattern::parse("/contact").unwrap();
        assert_eq!(decode_path("/c%6Fntact"), "/contact");
        assert!(pattern.matches(&decode_path("/c%6Fntact")).is_some());
    }

    #[test]
    fn test_decode_path_keeps_invalid_utf8_segment() {
        assert_eq!(decode_path("/%FF"), "/%FF");
        assert_eq!(decode_path("/%FF/c%6Fntact"), "/%FF/contact");

        let pattern = Pattern::parse("/:slug").unwrap();
        let params = pattern.matches(&decode_path("/%FF")).unwrap();
        assert_eq!(params.get("slug"), Some("%FF"));
    }

    #[test]
    fn test_specificity_prefers_leftmost_literal() {
        let literal_first = Pattern::parse("/user/:id").unwrap();
        let param_first = Pattern::parse("/:slug/admin").unwrap();
        assert_eq!(literal_first.specificity_cmp(&param_first), Ordering::Less);
        assert_eq!(param_first.specificity_cmp(&literal_first), Ordering::Greater);

        let same_shape = Pattern::parse("/:slug/image").unwrap();
        assert_eq!(param_first.specificity_cmp(&same_shape), Ordering::Equal);
    }
}
