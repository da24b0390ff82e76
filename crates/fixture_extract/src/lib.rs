//! Extraction pipeline: raw competition-page markup → validated fixtures.
//!
//! The page layouts in the wild vary, so extraction runs an ordered list of
//! strategies over each document and keeps the first one that produces at
//! least one record the builder accepts. Zero records from every strategy is
//! a normal outcome (an off-week page), not an error.

pub mod builder;
pub mod normalize;
pub mod strategy;

pub use builder::{build_all, IngestConfig, Skip};
pub use strategy::{Candidate, DateHint, ExtractOutcome, ExtractStrategy, Extractor};
