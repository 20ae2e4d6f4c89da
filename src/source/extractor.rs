//! Image URL extraction from album page bodies.
//!
//! Album pages embed their gallery as a JSON document passed through a JavaScript
//! string literal:
//!
//! ```text
//! gallery: JSON.parse("{\"count\":3,\"sub_images\":[{\"url\":\"http:\\/\\/p1.example\\/a\"}]}")
//! ```
//!
//! The literal is unescaped, parsed, and the `url` of every `sub_images` entry is
//! returned in document order.

use crate::error::Result;
use regex::Regex;
use serde::Deserialize;
use url::Url;

/// Matches the gallery fragment; the capture is the still-escaped string literal body
const GALLERY_MARKER: &str = r#"gallery: JSON\.parse\("((?:[^"\\]|\\.)*)"\)"#;

#[derive(Debug, Deserialize)]
struct Gallery {
    sub_images: Vec<serde_json::Value>,
}

/// Pulls the ordered image URL list out of an album page
#[derive(Debug, Clone)]
pub struct ImageUrlExtractor {
    marker: Regex,
}

impl ImageUrlExtractor {
    /// Create an extractor
    pub fn new() -> Result<Self> {
        Ok(Self {
            marker: Regex::new(GALLERY_MARKER)?,
        })
    }

    /// Extract image URLs from a page body
    ///
    /// Returns `None` when the page has no gallery marker, the payload does not
    /// parse, or it lacks a `sub_images` entry with a string `url`. None of these is
    /// an error; the album simply has no images. Entries without a usable `url` are
    /// skipped and the rest are kept.
    pub fn extract(&self, page_body: &str) -> Option<Vec<String>> {
        let payload = self.gallery_payload(page_body)?;
        let gallery = parse_gallery(payload)?;
        let urls: Vec<String> = gallery
            .sub_images
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match entry.get("url").and_then(|u| u.as_str()) {
                Some(url) => Some(url.to_string()),
                None => {
                    tracing::debug!(index, "Skipping gallery entry without a url");
                    None
                }
            })
            .collect();
        if urls.is_empty() {
            return None;
        }
        Some(urls)
    }

    /// Like [`extract`](Self::extract), resolving relative and protocol-relative URLs
    /// against the album page URL
    ///
    /// URLs that cannot be resolved are dropped; if none remain the album has no images.
    pub fn extract_with_base(&self, page_body: &str, page_url: &str) -> Option<Vec<String>> {
        let urls = self.extract(page_body)?;
        let Ok(base) = Url::parse(page_url) else {
            return Some(urls);
        };

        let resolved: Vec<String> = urls
            .into_iter()
            .filter_map(|raw| match base.join(&raw) {
                Ok(url) => Some(url.to_string()),
                Err(e) => {
                    tracing::debug!(album_url = %page_url, image_url = %raw, error = %e, "Dropping unresolvable image URL");
                    None
                }
            })
            .collect();

        if resolved.is_empty() {
            None
        } else {
            Some(resolved)
        }
    }

    fn gallery_payload<'a>(&self, page_body: &'a str) -> Option<&'a str> {
        let captures = self.marker.captures(page_body)?;
        captures.get(1).map(|m| m.as_str())
    }
}

fn parse_gallery(escaped: &str) -> Option<Gallery> {
    // Decode as a JSON string literal first; pages that escape characters JSON does not
    // know fall back to dropping every backslash
    let decoded = serde_json::from_str::<String>(&format!("\"{}\"", escaped))
        .unwrap_or_else(|_| escaped.replace('\\', ""));

    match serde_json::from_str::<Gallery>(&decoded) {
        Ok(gallery) => Some(gallery),
        Err(e) => {
            tracing::debug!(error = %e, "Gallery payload did not parse");
            None
        }
    }
}
