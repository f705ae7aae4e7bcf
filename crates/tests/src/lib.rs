//! Cross-crate tests for smart-volume-adjust
//!
//! Nothing is exported; the modules below only exist under `cargo test`.

#[cfg(test)]
mod selection_integration;
