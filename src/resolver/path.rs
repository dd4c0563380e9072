//! Validated relative asset paths.

use std::fmt;

/// A client-requested asset path relative to the mount, e.g. `Images/a.png`.
///
/// Leading slashes are stripped. Paths that could escape the search root
/// (`..`, backslashes, NUL) are rejected, as are empty paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelativePath(String);

impl RelativePath {
    /// Parse a raw, already percent-decoded path.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim_start_matches('/');
        if trimmed.is_empty() || trimmed.contains('\\') || trimmed.contains('\0') {
            return None;
        }
        if trimmed.split('/').any(|segment| segment == "..") {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Non-empty path segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty() && *s != ".")
    }

    /// Last path segment.
    pub fn file_name(&self) -> Option<&str> {
        self.segments().last()
    }

    /// Split `tickets/<digits>/<rest>` into `(id, rest)`.
    ///
    /// The `tickets` segment is matched case-sensitively; `rest` may itself
    /// contain further segments.
    pub fn ticket_parts(&self) -> Option<(&str, &str)> {
        let rest = self.0.strip_prefix("tickets/")?;
        let (id, file) = rest.split_once('/')?;
        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) || file.is_empty() {
            return None;
        }
        Some((id, file))
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
