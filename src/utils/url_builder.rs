//! Utility for building request URLs with consistent path handling.

use crate::error::Error;
use url::Url;

/// Joins a request path onto a fixed base URL.
pub struct UrlBuilder {
    base_url: Url,
}

impl UrlBuilder {
    /// Creates a new `UrlBuilder` with the given base URL.
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }

    /// Builds a URL by appending `path` to the base URL.
    ///
    /// Handles base URLs that may or may not end in `/` and paths that may
    /// or may not begin with `/`, so callers never have to think about
    /// double slashes.
    pub fn build(&self, path: &str) -> Result<Url, Error> {
        let clean_path = path.trim_start_matches('/');
        let joined = if self.base_url.path().ends_with('/') {
            self.base_url.join(clean_path)
        } else {
            self.base_url.join(&format!("{}/{}", self.base_url.path(), clean_path))
        };

        joined.map_err(|e| Error::validation(format!("invalid URL construction for path '{path}': {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_with_trailing_slash_base() {
        let base_url = Url::parse("https://api.example.com/v1/").unwrap();
        let builder = UrlBuilder::new(base_url);
        let url = builder.build("rides").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/rides");
    }

    #[test]
    fn build_without_trailing_slash_base() {
        let base_url = Url::parse("https://api.example.com/v1").unwrap();
        let builder = UrlBuilder::new(base_url);
        let url = builder.build("rides").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/rides");
    }

    #[test]
    fn build_with_leading_slash_path() {
        let base_url = Url::parse("https://api.example.com/v1/").unwrap();
        let builder = UrlBuilder::new(base_url);
        let url = builder.build("/rides").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/rides");
    }

    #[test]
    fn build_joins_nested_paths() {
        let base_url = Url::parse("https://api.example.com/v1/").unwrap();
        let builder = UrlBuilder::new(base_url);
        let url = builder.build("rides/42/cancel").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/rides/42/cancel");
    }
}
