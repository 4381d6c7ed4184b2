//! Buildability (aprovechamiento urbanístico) calculations for POT zoning
//! treatments, plus the catalog, configuration and HTTP plumbing around them.

pub mod aprovechamiento;
pub mod catalog;
pub mod config;
pub mod error;
pub mod telemetry;
