//! Feature modules that sit beside the page session
//!
//! - export: write the active tab to CSV or JSON

pub mod export;
