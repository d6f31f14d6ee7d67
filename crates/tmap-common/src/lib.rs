//! Common constants shared by the tmap crates.
//!
//! This crate provides foundational values used across all tmap crates:
//! - Recursion and expansion limits for plan building
//! - Default null-handling policy values

// Centralized limits and thresholds
pub mod limits;
