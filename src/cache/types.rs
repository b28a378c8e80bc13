//! Identifier parsing and filename sanitization for cache entries

/// File extension used for all cached documentation entries
pub const DOC_EXTENSION: &str = "md";

/// A hierarchical library identifier parsed from a slash-separated string
/// such as `/vercel/next.js` or `org/project/version`.
///
/// Segments are positional: organization, project, version. Missing segments
/// fall back to `unknown` (`latest` for the version). Segments are never
/// validated against any registry; any string is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryId {
    organization: String,
    project: String,
    version: String,
}

impl LibraryId {
    /// Parse a raw identifier. Empty segments (leading/trailing/double
    /// slashes) are ignored.
    pub fn parse(raw: &str) -> Self {
        let mut segments = raw.split('/').filter(|s| !s.is_empty());
        Self {
            organization: segments.next().unwrap_or("unknown").to_string(),
            project: segments.next().unwrap_or("unknown").to_string(),
            version: segments.next().unwrap_or("latest").to_string(),
        }
    }

    pub fn organization(&self) -> &str {
        &self.organization
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

/// Make a topic safe for use as a filename component: filesystem-unsafe
/// characters become `-` and whitespace runs collapse to a single `_`.
///
/// The output contains neither unsafe characters nor whitespace, so
/// sanitizing an already-sanitized string is a no-op.
pub fn sanitize_topic(topic: &str) -> String {
    const UNSAFE: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

    let mut out = String::with_capacity(topic.len());
    let mut pending_space = false;
    for c in topic.chars() {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            out.push('_');
            pending_space = false;
        }
        out.push(if UNSAFE.contains(&c) { '-' } else { c });
    }
    if pending_space {
        out.push('_');
    }
    out
}
