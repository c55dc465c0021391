//! Output module for writing the mirror to disk
//!
//! This module handles:
//! - The on-disk layout (root document, pages, asset directories)
//! - Rewriting documents to reference local assets
//! - The static-hosting configuration file
//! - Run statistics

mod layout;
mod netlify;
mod rewrite;
pub mod stats;

pub use layout::OutputLayout;
pub use netlify::{write_netlify_config, NETLIFY_FILE, NETLIFY_TEMPLATE};
pub use rewrite::{rewrite_document, rewrite_nested_prefixes, strip_base_elements};
pub use stats::{print_statistics, CrawlStatistics};
