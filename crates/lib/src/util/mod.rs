//! Shared utilities.
//!
//! Hashing for asset change detection and manifest identity.

pub mod hash;

#[cfg(test)]
pub mod testutil;
