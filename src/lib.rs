// Library exports for testing and external use
pub mod client;
pub mod config;
pub mod daemon;
pub mod federations;
pub mod metrics;
pub mod stats;
pub mod teams;
pub mod transactions;

#[cfg(feature = "api")]
pub mod auth;
#[cfg(feature = "api")]
pub mod error;
#[cfg(feature = "api")]
pub mod observability;
#[cfg(feature = "api")]
pub mod router;
#[cfg(feature = "api")]
pub mod state;
