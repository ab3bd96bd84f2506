//! Mock gateway implementation for testing and development.
//!
//! This module provides a simulated gateway that can be controlled
//! programmatically without requiring scanner hardware.

pub mod gateway;

// Re-export commonly used types
pub use gateway::{GatewayCommand, MockEventSource, MockGateway, MockGatewayHandle};
