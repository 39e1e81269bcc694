//! Port traits at the boundaries of the service.

pub mod clock_port;
pub mod config_port;
pub mod report_port;
pub mod trade_port;
pub mod trigger_port;
