//! Dossier Fetch
//!
//! Reading external sources into bounded context text, and the web search
//! collaborator that finds those sources.
//!
//! # Overview
//!
//! - [`SourceFetcher`] reads each of an entity's source URLs through a
//!   [`PageFetcher`], turns HTML or PDF bodies into lowercase text, and cuts
//!   an excerpt window around the candidate's name.
//! - [`window`] is the excerpt rule on its own: start at the anchor, keep a
//!   fixed number of space-separated tokens, stop early after a cutoff token.
//! - [`GoogleSearchProvider`] and [`MockSearchProvider`] implement
//!   [`dossier_domain::SearchProvider`].

#![warn(missing_docs)]
#![warn(clippy::all)]

mod anchor;
mod config;
mod error;
mod fetcher;
mod html;
mod http;
mod pdf;
mod search;

pub use anchor::{anchored_window, window};
pub use config::{AnchorConfig, FetchConfig};
pub use error::{FetchError, SearchError};
pub use fetcher::SourceFetcher;
pub use html::page_text;
pub use http::{HttpPageFetcher, MockPageFetcher, PageFetcher};
pub use pdf::pdf_text;
pub use search::{GoogleSearchProvider, MockSearchProvider, DEFAULT_SEARCH_URL};
