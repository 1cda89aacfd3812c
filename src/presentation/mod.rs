//! Presentation layer for visual styling and summaries.
//!
//! This module contains presentation logic separated from domain logic:
//! - Marker styling (status colors, overlay content, visual signatures)
//! - Deal/price summary strings for hover previews

pub mod marker_style;
pub mod summary;
