//! Input parsing: raw URL collection and index/range selection.
//!
//! # Overview
//!
//! - [`collect_urls`] gathers raw URL strings from a list file and/or an
//!   inline comma-separated list, preserving order and duplicates.
//! - [`select_indices`] turns a selection expression such as `1-3,5` or
//!   `all` into a sorted set of indices, used to pick entries from a
//!   displayed URL list.
//!
//! # Example
//!
//! ```
//! use edu_downloader::parser::{collect_urls, select_indices};
//!
//! let urls = collect_urls(None, Some("https://a.example/1, https://a.example/2"));
//! let picked = select_indices("2", urls.len()).unwrap();
//! assert_eq!(picked.into_iter().collect::<Vec<_>>(), vec![2]);
//! ```

mod error;
mod input;
mod range;

pub use error::ParseError;
pub use input::{collect_urls, collect_urls_from_file, read_url_list, split_url_list};
pub use range::{select_indices, select_indices_with_min};
