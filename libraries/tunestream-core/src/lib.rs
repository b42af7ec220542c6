//! TuneStream Core
//!
//! Shared domain types and the catalog contract used by the playback core.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `TrackId`
//! - **Catalog Contract**: `CatalogProvider`, the read-only metadata source
//!   the player resolves tracks through, plus `InMemoryCatalog`
//! - **Error Handling**: `CoreError` and `Result`
//!
//! # Example
//!
//! ```rust
//! use tunestream_core::{CatalogProvider, InMemoryCatalog, Track, TrackId};
//!
//! let mut catalog = InMemoryCatalog::new();
//! catalog.insert(Track::new(
//!     "s1",
//!     "Song One",
//!     "Some Artist",
//!     "https://cdn.example.com/songs/s1.mp3",
//! ));
//!
//! let track = catalog.get_track(&TrackId::new("s1")).unwrap();
//! assert_eq!(track.title, "Song One");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog;
pub mod error;
pub mod types;

pub use catalog::{CatalogProvider, InMemoryCatalog};
pub use error::{CoreError, Result};
pub use types::{Track, TrackId};
