//! Core module - Contains the fundamental data structures and utilities
//!
//! This module provides:
//! - Configuration loading and validation
//! - Unified result model (ResultItem)
//! - Rendering functions for different output formats
//! - Path normalization utilities
//! - Document reading

pub mod config;
pub mod file_reader;
pub mod model;
pub mod paths;
pub mod render;
pub mod util;
