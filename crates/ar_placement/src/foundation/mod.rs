//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and poses
//! - Stable object handles
//! - Logging utilities

pub mod math;
pub mod collections;
pub mod logging;
