//! Configuration models of the marketplace client.

pub mod config;
