//! A crate containing the byte cursor shared by all quire crates.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod byte;
