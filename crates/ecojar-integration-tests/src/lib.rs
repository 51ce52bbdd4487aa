//! Cross-crate scenario tests live in `tests/`. This crate intentionally
//! exports nothing.
