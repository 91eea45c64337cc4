pub mod aggregator;
pub mod export;
pub mod models;
pub mod normalizer;
pub mod ports;
pub mod services;
