//! Organization logo sync library.
//!
//! Downloads organization logos from their source URLs, publishes them to a
//! Cloudflare R2 bucket, and records the published location on the
//! organization's MongoDB document.

pub mod config;
pub mod constants;
pub mod db;
pub mod fetch;
pub mod naming;
pub mod s3;
pub mod sync;
