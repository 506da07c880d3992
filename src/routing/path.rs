//! Trailing-id path splitter.
//!
//! Splits a request path into its leading part and its final segment, the
//! "id". Used by subtree handlers such as the error pages, which are mounted
//! at a prefix and read the status code from the last segment.

/// A path split into everything before the last segment and the last
/// segment itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathId {
    pub path: String,
    pub id: String,
}

impl PathId {
    /// Split `raw` after trimming `/` and `:` from both ends.
    ///
    /// `"/user/3/order/24"` becomes path `user/3/order` and id `24`. A path
    /// with a single segment has that segment as its path and no id.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim_matches(|c| c == '/' || c == ':');
        match trimmed.rsplit_once('/') {
            Some((path, id)) => Self {
                path: path.to_string(),
                id: id.to_string(),
            },
            None => Self {
                path: trimmed.to_string(),
                id: String::new(),
            },
        }
    }

    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_trailing_id() {
        let cases = [
            ("/user/3/order/24", "user/3/order", "24"),
            ("/user/3/order/24/", "user/3/order", "24"),
            ("/error/404", "error", "404"),
            (":/api/widgets/:", "api", "widgets"),
            ("/error/", "error", ""),
            ("/", "", ""),
        ];
        for (raw, path, id) in cases {
            let parsed = PathId::parse(raw);
            assert_eq!(parsed.path, path, "path of {raw}");
            assert_eq!(parsed.id, id, "id of {raw}");
        }
    }

    #[test]
    fn test_has_id() {
        assert!(PathId::parse("/error/500").has_id());
        assert!(!PathId::parse("/error/").has_id());
    }
}
