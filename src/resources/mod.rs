//! Resource handling for mirrored pages
//!
//! # Components
//!
//! - `ResourceCategory`: Kinds of assets and where each is stored
//! - `ResourceMap`: Run-scoped reference → local path mapping
//! - `ResourceResolver`: Resolves, downloads and records references
//! - Font scanning of stylesheets
//! - Deterministic local filenames

mod category;
mod filename;
mod fonts;
mod map;
mod resolver;

pub use category::{ResourceCategory, ResourceSelector, ASSETS_DIR};
pub use filename::{derive_filename, extension_for_mime, sanitize_filename, stable_hash};
pub use fonts::{find_font_references, localize_stylesheet};
pub use map::{ResourceMap, ResourceRecord};
pub use resolver::{Reference, ResolveSummary, ResourceResolver};
