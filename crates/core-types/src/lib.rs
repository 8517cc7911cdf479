//! Shared types for the DriftTerm core.
//!
//! This crate defines the seams the rest of the workspace plugs into:
//! the serial transport traits, the event feed consumed by the UI layer,
//! and the platform-split logging macros.

use serde::{Deserialize, Serialize};

pub mod logging;
pub mod transport;

pub use transport::{InboundReader, OutboundWriter, SerialApi, SerialPort, TransportError};

/// Events published by the session layer to the UI/log collaborator.
///
/// `Data` carries decoded inbound text and is append-only from the
/// consumer's point of view. `Notice` carries inline annotations (device
/// loss, read errors) that belong in the scrollback but did not come from
/// the device.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum TerminalEvent {
    /// Decoded text received from the device.
    Data { text: String },

    /// Inline log annotation (not device output).
    Notice { message: String },

    /// Connectivity flag changed.
    Connectivity { connected: bool },

    /// Availability flag changed (a previously authorized device exists).
    Availability { available: bool },
}

/// Platform-level hotplug notifications delivered to the session layer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DeviceEvent {
    /// A previously authorized device became available.
    Connected,
    /// A granted device was unplugged.
    Disconnected,
}

/// Drop guard for a platform event registration.
///
/// Returned by [`SerialApi::watch_device_events`]; dropping it runs the
/// unregistration closure exactly once.
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(unsubscribe: impl FnOnce() + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// A subscription with nothing to undo (used by mocks and stubs).
    pub fn noop() -> Self {
        Self { unsubscribe: None }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}
