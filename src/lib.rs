//! power-position — intraday power position reporting service.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`], async orchestration in [`service`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod service;
pub mod cli;
