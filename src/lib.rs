//! cmdforge - safe ffmpeg command generation
//!
//! This library crate exposes the binary's glue for integration testing.

pub mod config;
