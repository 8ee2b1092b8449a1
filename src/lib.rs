//! HTML Microdata and JSON-LD extraction
//!
//! Extracts structured data embedded in HTML into one ordered list of items:
//! - Microdata (itemscope/itemprop/itemtype/itemid/itemref)
//! - JSON-LD script blocks (including @graph)
//!
//! Also provides a blocking fetcher and an FFI interface returning JSON.

pub mod config;
pub mod error;
pub mod extractors;
pub mod fetch;
pub mod ffi;
pub mod model;

pub use config::{ExtractOptions, FetchOptions, LINKED_DATA_TYPE};
pub use error::{MicrodataError, Result};
pub use extractors::*;
pub use fetch::*;
pub use ffi::*;
pub use model::*;
