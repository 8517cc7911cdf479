/// # Session State Machine
///
/// A single source of truth for the lifecycle of one serial session.
///
/// ```text
///            connect / quick_connect
///   ┌────────┐          ┌─────────┐
///   │  Idle  │─────────►│ Opening │
///   └────────┘          └──┬───┬──┘
///        ▲         opened  │   │ setup failed
///        │                 │   │
///        │             ┌───▼┐ ┌▼──────┐
///        │             │Open│ │ Error │
///        │             └──┬─┘ └──┬────┘
///        │   disconnect / │      │ cleanup
///        │   write fail / │      │
///        │   stream end   │      │
///        │            ┌───▼──────▼┐
///        └────────────┤  Closing  │
///      teardown done  └───────────┘
/// ```
///
/// ## Invariants
///
/// - **Idle**: no device held, no read loop, ready for a new session
/// - **Opening**: device opening, channels being acquired
/// - **Open**: read loop active, send enabled
/// - **Closing**: best-effort teardown in progress
/// - **Error**: setup failed; transient, always resolves to Idle through
///   the teardown path
///
/// A fresh session never reuses handles from a previous one; every path
/// out of Open or Error runs the same idempotent teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SessionState {
    /// No device held, ready to connect.
    Idle,

    /// Opening the device and acquiring channels.
    Opening,

    /// Connected and operational.
    Open,

    /// Tearing the session down.
    Closing,

    /// Session setup failed; cleanup pending.
    Error,
}

impl SessionState {
    /// Is a disconnect action meaningful in this state (UI button hint)?
    /// `disconnect()` itself is safe to call from any state.
    pub fn can_disconnect(&self) -> bool {
        matches!(self, Self::Opening | Self::Open)
    }

    /// Can data be transmitted right now?
    pub fn can_send(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// User-facing status text.
    pub fn status_text(&self) -> &'static str {
        match self {
            Self::Idle => "Ready to connect",
            Self::Opening => "Connecting...",
            Self::Open => "Connected",
            Self::Closing => "Disconnecting...",
            Self::Error => "Connection error",
        }
    }

    /// Validate a transition. The manager only warns on unexpected edges
    /// (teardown must always make progress), but the table documents every
    /// edge the implementation takes.
    pub fn can_transition_to(&self, new_state: SessionState) -> bool {
        use SessionState::*;

        match (self, new_state) {
            // From Idle
            (Idle, Opening) => true, // user starts a connection
            (Idle, Idle) => true,    // idempotent disconnect

            // From Opening
            (Opening, Open) => true,    // channels acquired
            (Opening, Error) => true,   // open or acquisition failed
            (Opening, Closing) => true, // disconnect raced the open

            // From Open
            (Open, Closing) => true, // disconnect, write failure, stream end

            // From Closing
            (Closing, Idle) => true,    // teardown complete
            (Closing, Closing) => true, // concurrent teardown paths converge

            // From Error
            (Error, Closing) => true, // cleanup starting
            (Error, Idle) => true,    // nothing was acquired

            // All other transitions are invalid
            _ => false,
        }
    }
}
