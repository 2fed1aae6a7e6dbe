//! Parsers for `/proc` files.

pub mod cmdline;
pub mod mountinfo;
