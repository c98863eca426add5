//! Core domain models for the experiment pipeline
//!
//! This module defines the stages, the pipeline that orders them, the
//! configuration they are built from, and the record of a run.

pub mod config;
pub mod pipeline;
pub mod stage;
pub mod state;

pub use pipeline::*;
pub use stage::*;
pub use state::*;
