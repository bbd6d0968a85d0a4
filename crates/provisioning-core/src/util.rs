//! Common utility functions.

pub mod data;
