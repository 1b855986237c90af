//! Backends - documentation tree traversal

pub mod scan;
