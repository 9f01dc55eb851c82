//! Library module for PDF management
//!
//! Handles folder scanning, listing records, and cover path derivation.

mod catalog;
mod entry;
mod scanner;

pub use catalog::*;
pub use entry::*;
pub use scanner::*;
