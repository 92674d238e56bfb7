pub mod config;
pub mod connection;
pub mod federations;
pub mod stats;
pub mod transactions;
