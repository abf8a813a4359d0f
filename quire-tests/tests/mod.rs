//! Integration tests that run synthetic files through several crates at
//! once.

mod document;
