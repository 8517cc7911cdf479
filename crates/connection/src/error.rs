use thiserror::Error;

/// User-facing session failures.
///
/// Causes are carried as strings because the platform layer only surfaces
/// opaque error values; the messages are meant to be shown to the user
/// as-is. Internal cleanup failures are never reported through this type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The serial transport API does not exist on this platform.
    #[error("WebSerial is not supported or is disabled in this browser")]
    UnsupportedPlatform,

    /// The device rejected the open, or session setup failed.
    #[error("Failed to open device: {0}")]
    OpenFailed(String),

    /// The opened device exposes no readable or writable stream.
    #[error("Device is not streamable (missing readable/writable channel)")]
    PortNotStreamable,

    /// A send was attempted with no active session.
    #[error("Not connected")]
    NotConnected,

    /// The write failed; the session has been torn down as a side effect.
    #[error("Send failed: {0}")]
    SendFailed(String),
}
