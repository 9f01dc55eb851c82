//! Viewer presence
//!
//! Every open push-channel session counts as one viewer. The count is logged
//! on each connect and disconnect and reported by `/health`.

mod client;
mod tracker;

pub use client::client_address;
pub use tracker::{ConnectionTracker, ViewerSession};
