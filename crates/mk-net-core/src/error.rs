//! Error types for the network bring-up core
//!
//! Errors only travel between a port and its caller inside this crate.
//! The detector and the resolver turn every one of them into a log line.

use thiserror::Error;

/// Result type alias for mk-net operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the network bring-up system
#[derive(Error, Debug)]
pub enum Error {
    /// Interface enumeration failed
    #[error("Interface provider error: {0}")]
    InterfaceProvider(String),

    /// Kernel module listing or reload failed
    #[error("Module control error: {0}")]
    ModuleControl(String),

    /// DHCP client control failed
    #[error("DHCP control error: {0}")]
    Dhcp(String),

    /// Host name resolution failed
    #[error("Resolution error: {0}")]
    Resolution(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an interface provider error
    pub fn interface_provider(msg: impl Into<String>) -> Self {
        Self::InterfaceProvider(msg.into())
    }

    /// Create a module control error
    pub fn module_control(msg: impl Into<String>) -> Self {
        Self::ModuleControl(msg.into())
    }

    /// Create a DHCP control error
    pub fn dhcp(msg: impl Into<String>) -> Self {
        Self::Dhcp(msg.into())
    }

    /// Create a resolution error
    pub fn resolution(msg: impl Into<String>) -> Self {
        Self::Resolution(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
