//! # Grid-Bridge Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/
//! │   ├── fixtures.rs       # Shared builders for grids, producers and wiring
//! │   └── integration/      # Cross-crate flows over the message bus
//! └── benches/              # Criterion benchmarks
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p gc-tests
//! cargo test -p gc-tests integration::data_channel
//!
//! # Benchmarks
//! cargo bench -p gc-tests
//! ```

#![allow(dead_code)]

pub mod fixtures;
pub mod integration;
