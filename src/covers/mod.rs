//! Cover thumbnails
//!
//! Covers mirror the library layout under the covers root: `physics/b.pdf`
//! gets `physics/b.jpg`. They are built once, before the server starts
//! listening, and then served as static files.

mod builder;
mod rasterizer;
mod types;

pub use builder::CoverBuilder;
pub use rasterizer::{PopplerRasterizer, Rasterizer};
pub use types::{CoverError, CoverOptions, CoverOutcome, CoverReport};
