//! Cross-crate property tests
