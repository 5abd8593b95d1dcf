//! Step definitions for provider selection scenarios.

pub mod given;
pub mod when;
pub mod world;
