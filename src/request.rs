//! Incoming HTTP request type.

/// An incoming `GET`, reduced to what a download handler looks at.
///
/// The mock servers never read a request body.
pub struct Request {
    pub(crate) path: String,
    pub(crate) headers: http::HeaderMap,
}

impl Request {
    pub(crate) fn new(parts: http::request::Parts) -> Self {
        let path = parts.uri.path().to_owned();
        Self { path, headers: parts.headers }
    }

    #[cfg(test)]
    pub(crate) fn test(path: &str) -> Self {
        Self { path: path.to_owned(), headers: http::HeaderMap::new() }
    }

    pub fn path(&self) -> &str { &self.path }

    /// Case-insensitive header lookup. Values that are not visible ASCII
    /// are treated as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
