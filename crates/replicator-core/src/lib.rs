//! replicator-core — Transcript model, drill scheduling, and recall scoring.
//!
//! This crate turns a play script into per-character drill units and drives
//! a memorization session over them: a sequential base pass, a worst-first
//! random review, and a final sequential pass.

pub mod alias;
pub mod config;
pub mod engine;
pub mod error;
pub mod evaluation;
pub mod model;
pub mod prng;
pub mod report;
pub mod scheduler;
pub mod scoring;
pub mod statistics;
pub mod transcript;
pub mod units;

pub use error::{ReplicatorError, Result};
