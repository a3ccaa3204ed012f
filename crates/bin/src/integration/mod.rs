//! Glue between the command line and the screening libraries.
//!
//! Provider construction (API client plus optional SQLite cache), the cache
//! location, and the terminal progress bar.

pub(crate) mod cache_manager;
pub(crate) mod pipeline;
pub(crate) mod progress;
