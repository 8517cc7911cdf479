//! Tuning constants for the session layer.

/// Default baud rate offered to the UI.
pub const DEFAULT_BAUD: u32 = 115_200;

/// Suggested capacity for the terminal event feed.
///
/// Sized so a fast device does not overrun the channel between UI polls;
/// events beyond this are dropped with a warning rather than blocking the
/// read loop.
pub const EVENT_CHANNEL_CAPACITY: usize = 8192;

/// Capacity of the platform hotplug event channel (low frequency).
pub(crate) const DEVICE_EVENT_CAPACITY: usize = 8;
