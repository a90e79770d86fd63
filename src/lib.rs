//! Risk Scoring Service
//!
//! HTTP service that scores an asset's risk as impact multiplied by probability,
//! plus the CLI plumbing (configuration, logging, typed client) around it.

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod risk;
pub mod server;

pub use client::RiskClient;
pub use crate::config::{LoggingConfig, ServerConfig, ServiceConfig};
pub use error::RiskError;
pub use risk::{
    LevelResponse, OverviewResponse, ResidualResponse, RiskLevel, RiskRequest, RiskResponse,
};
pub use server::build_router;
