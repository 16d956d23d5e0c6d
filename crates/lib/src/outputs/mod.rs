//! Published outputs after realization.
//!
//! The engine reports outputs as JSON; shell tooling reads them from a
//! `KEY=value` env file. This module converts between the two and loads
//! env files for the site sync, failing fast on anything malformed.

mod env;

pub use env::*;
