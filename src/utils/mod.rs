//! Utility modules shared across the crate.

pub mod html;
pub mod url;
