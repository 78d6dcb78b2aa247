//! Role classification and community characterization for developer collaboration networks

pub mod activity;
pub mod community;
pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod roles;
pub mod storage;
pub mod temporal;

pub use error::{AnalysisError, Result};
