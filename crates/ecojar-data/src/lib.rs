//! On-disk jar definitions for the ecojar engine.
//!
//! A jar definition file declares the species parameter tables, the food
//! web, the auxiliary couplings, and the session's initial conditions, in
//! RON, TOML, or JSON. The loader resolves every name reference, runs the
//! registry's load-time validation, and hands back a [`JarDefinition`]
//! ready to become a [`ecojar_core::engine::JarEngine`].

pub mod loader;
pub mod schema;

pub use loader::{DataLoadError, Format, JarDefinition, detect_format, load_jar_file, parse_jar_str};
