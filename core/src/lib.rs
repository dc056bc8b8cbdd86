//! Churn-risk explorer core: loads a raw customer table and a model-scored
//! table, labels customers against a probability threshold and builds the
//! dashboard view and retention export.
//!
//! Pipeline order (every interaction):
//!   loader -> resolver -> classifier -> { presenter, exporter }

pub mod classifier;
pub mod config;
pub mod error;
pub mod exporter;
pub mod loader;
pub mod pipeline;
pub mod presenter;
pub mod resolver;
pub mod session;
pub mod table;
pub mod types;
