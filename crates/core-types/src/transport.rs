use futures_channel::mpsc;
use thiserror::Error;

use crate::{DeviceEvent, Subscription};

/// Low-level transport failures.
///
/// These carry stringified platform causes because the WebSerial API only
/// surfaces opaque `JsValue` errors; the session layer maps them into its
/// own user-facing taxonomy.
#[derive(Error, Debug, Clone)]
pub enum TransportError {
    #[error("Serial API not supported or disabled")]
    NotSupported,
    #[error("No device selected: {0}")]
    NoDevice(String),
    #[error("Failed to open device: {0}")]
    OpenFailed(String),
    #[error("Device not open")]
    NotOpen,
    #[error("IO Error: {0}")]
    Io(String),
}

/// The platform surface for discovering serial devices.
///
/// Implemented over `navigator.serial` on wasm32 and by mocks in tests.
/// All handle types are cheap to clone (JS object references or `Rc`s);
/// the traits take `&self` throughout because the underlying browser
/// objects are interiorly mutable.
#[allow(async_fn_in_trait)]
pub trait SerialApi: Clone + 'static {
    type Device: SerialPort;

    /// Whether the transport API exists at all on this platform.
    fn is_supported(&self) -> bool;

    /// Prompt the user to pick a device. Fails if none is chosen or the
    /// picker is unavailable.
    async fn request_device(&self) -> Result<Self::Device, TransportError>;

    /// Previously authorized devices, without prompting.
    async fn authorized_devices(&self) -> Result<Vec<Self::Device>, TransportError>;

    /// Register for hotplug notifications. Events are delivered on `tx`
    /// until the returned guard is dropped.
    fn watch_device_events(&self, tx: mpsc::Sender<DeviceEvent>) -> Subscription;
}

/// One serial device handle.
#[allow(async_fn_in_trait)]
pub trait SerialPort: Clone + 'static {
    type Reader: InboundReader;
    type Writer: OutboundWriter;

    async fn open(&self, baud_rate: u32) -> Result<(), TransportError>;

    async fn close(&self) -> Result<(), TransportError>;

    /// Take the exclusive reader over the inbound byte stream.
    ///
    /// Returns `None` when the device exposes no readable stream or the
    /// stream is already locked.
    fn acquire_reader(&self) -> Option<Self::Reader>;

    /// Take the exclusive writer over the outbound byte stream.
    fn acquire_writer(&self) -> Option<Self::Writer>;
}

/// Exclusive reader half of an open connection.
#[allow(async_fn_in_trait)]
pub trait InboundReader: Clone + 'static {
    /// Await the next chunk of raw bytes.
    ///
    /// `Ok(None)` signals end-of-stream (device-initiated close).
    async fn next_chunk(&self) -> Result<Option<Vec<u8>>, TransportError>;

    /// Cancel the stream, unblocking any pending `next_chunk`. Best-effort.
    async fn cancel(&self);

    /// Return the stream lock so a future session can re-acquire it.
    fn release(&self);
}

/// Exclusive writer half of an open connection.
#[allow(async_fn_in_trait)]
pub trait OutboundWriter: Clone + 'static {
    async fn write(&self, data: &[u8]) -> Result<(), TransportError>;

    /// Close the outbound stream. Best-effort.
    async fn close(&self);

    /// Return the stream lock.
    fn release(&self);
}
