pub mod anatomy;
pub mod ancestry;
pub mod cluster;
pub mod config;
pub mod error;
pub mod export;
pub mod nest;
pub mod overlap;
pub mod types;
