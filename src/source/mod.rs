//! Remote source access: HTTP fetching, album listing, and gallery extraction.
//!
//! - [`client`] - [`HttpFetcher`] seam and its reqwest implementation
//! - [`lister`] - [`AlbumLister`], one listing page at a time
//! - [`extractor`] - [`ImageUrlExtractor`], image URLs embedded in an album page

pub mod client;
pub mod extractor;
pub mod lister;

pub use client::{HttpFetcher, ReqwestFetcher};
pub use extractor::ImageUrlExtractor;
pub use lister::AlbumLister;
