//! Integration test modules
//!
//! End-to-end scenarios grouped by pipeline stage.

mod expiry;
mod prepare;
mod submit;
