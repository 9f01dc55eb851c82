//! PDF Shelf Server Library
//!
//! Serves a folder tree of PDFs with generated cover thumbnails.
//! The server binary is in main.rs.
//!
//! # Modules
//!
//! - `library`: folder scanning and the `/api/pdfs` catalog
//! - `covers`: cover thumbnail generation via external rasterizers
//! - `presence`: live viewer counting for the push channel
//! - `routes`: HTTP surface

pub mod config;
pub mod covers;
pub mod error;
pub mod library;
pub mod presence;
pub mod routes;
pub mod state;
