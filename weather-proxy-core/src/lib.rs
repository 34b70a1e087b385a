//! Core library for the `weather-proxy` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Abstraction over upstream weather sources
//! - The fetch-and-normalize routine and DTO mapping
//! - The per-request audit log
//!
//! It is used by `weather-proxy-cli`, but can also be reused by other binaries or services.

pub mod audit;
pub mod config;
pub mod model;
pub mod provider;
pub mod service;

pub use audit::{AuditSink, FileAuditSink, LogStatus, MemoryAuditSink, NoopAuditSink, RequestLog};
pub use config::{Config, SourceConfig};
pub use model::{CurrentWeatherDto, QueryConfig, Units, WeatherReading};
pub use provider::{FetchError, SourceId, WeatherProvider};
pub use service::{ServiceError, WeatherService, to_dto};
