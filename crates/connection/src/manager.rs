use std::cell::{Cell, RefCell};
use std::rc::Rc;

use core_types::{
    term_debug, term_warn, DeviceEvent, InboundReader, OutboundWriter, SerialApi, SerialPort,
    Subscription, TerminalEvent,
};
use decoders::Utf8Stream;
use futures::stream::StreamExt;
use futures_channel::mpsc;

use crate::constants::{DEVICE_EVENT_CAPACITY, EVENT_CHANNEL_CAPACITY};
use crate::error::SessionError;
use crate::state::SessionState;

type DeviceOf<A> = <A as SerialApi>::Device;
type ReaderOf<A> = <<A as SerialApi>::Device as SerialPort>::Reader;
type WriterOf<A> = <<A as SerialApi>::Device as SerialPort>::Writer;

/// Create the event feed the manager publishes on, at the suggested
/// capacity.
pub fn event_channel() -> (
    mpsc::Sender<TerminalEvent>,
    mpsc::Receiver<TerminalEvent>,
) {
    mpsc::channel(EVENT_CHANNEL_CAPACITY)
}

/// Spawn a fire-and-forget task on the current single-threaded scheduler.
///
/// Native callers must be running inside a `tokio::task::LocalSet`.
fn spawn_detached<F>(future: F)
where
    F: std::future::Future<Output = ()> + 'static,
{
    #[cfg(target_arch = "wasm32")]
    wasm_bindgen_futures::spawn_local(future);

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = tokio::task::spawn_local(future);
    }
}

/// Owns the lifecycle of the single active serial session.
///
/// The manager is cheaply cloneable; all clones share the same session
/// (the internals are `Rc` slots). Everything runs on one cooperative
/// scheduler: the read loop and any in-flight call interleave only at
/// await points, and no borrow is held across one.
pub struct ConnectionManager<A: SerialApi> {
    api: A,
    state: Rc<Cell<SessionState>>,
    device: Rc<RefCell<Option<DeviceOf<A>>>>,
    reader: Rc<RefCell<Option<ReaderOf<A>>>>,
    writer: Rc<RefCell<Option<WriterOf<A>>>>,
    baud_rate: Rc<Cell<u32>>,
    connected: Rc<Cell<bool>>,
    available: Rc<Cell<bool>>,
    // Bumped by every open(); a read loop spawned under an older value
    // must not tear down the session that superseded it.
    session_seq: Rc<Cell<u32>>,
    event_tx: mpsc::Sender<TerminalEvent>,
    device_watch: Rc<RefCell<Option<Subscription>>>,
}

impl<A: SerialApi> Clone for ConnectionManager<A> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            state: self.state.clone(),
            device: self.device.clone(),
            reader: self.reader.clone(),
            writer: self.writer.clone(),
            baud_rate: self.baud_rate.clone(),
            connected: self.connected.clone(),
            available: self.available.clone(),
            session_seq: self.session_seq.clone(),
            event_tx: self.event_tx.clone(),
            device_watch: self.device_watch.clone(),
        }
    }
}

impl<A: SerialApi> ConnectionManager<A> {
    pub fn new(api: A, event_tx: mpsc::Sender<TerminalEvent>) -> Self {
        Self {
            api,
            state: Rc::new(Cell::new(SessionState::Idle)),
            device: Rc::new(RefCell::new(None)),
            reader: Rc::new(RefCell::new(None)),
            writer: Rc::new(RefCell::new(None)),
            baud_rate: Rc::new(Cell::new(0)),
            connected: Rc::new(Cell::new(false)),
            available: Rc::new(Cell::new(false)),
            session_seq: Rc::new(Cell::new(0)),
            event_tx,
            device_watch: Rc::new(RefCell::new(None)),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.get()
    }

    pub fn is_connected(&self) -> bool {
        self.connected.get()
    }

    /// Whether a previously authorized device exists (see
    /// [`check_availability`](Self::check_availability)).
    pub fn is_available(&self) -> bool {
        self.available.get()
    }

    /// Baud rate of the current (or most recent) session.
    pub fn baud_rate(&self) -> u32 {
        self.baud_rate.get()
    }

    /// Refresh the availability flag without prompting the user.
    ///
    /// Platform errors are swallowed; they degrade to "not available".
    pub async fn check_availability(&self) {
        let available = self
            .api
            .authorized_devices()
            .await
            .map(|devices| !devices.is_empty())
            .unwrap_or(false);
        if self.available.replace(available) != available {
            self.emit(TerminalEvent::Availability { available });
        }
    }

    /// Prompt the user for a device and open it.
    pub async fn connect(&self, baud_rate: u32) -> Result<(), SessionError> {
        if !self.api.is_supported() {
            return Err(SessionError::UnsupportedPlatform);
        }
        let device = self
            .api
            .request_device()
            .await
            .map_err(|e| SessionError::OpenFailed(e.to_string()))?;
        self.open(device, baud_rate).await
    }

    /// Reuse a previously authorized device without prompting; falls back
    /// to the picker when none exists.
    pub async fn quick_connect(&self, baud_rate: u32) -> Result<(), SessionError> {
        if !self.api.is_supported() {
            return Err(SessionError::UnsupportedPlatform);
        }
        let device = self
            .api
            .authorized_devices()
            .await
            .ok()
            .and_then(|devices| devices.into_iter().next());
        match device {
            Some(device) => self.open(device, baud_rate).await,
            None => self.connect(baud_rate).await,
        }
    }

    /// Open `device` at `baud_rate`, tearing down any existing session
    /// first.
    ///
    /// On success the read loop runs as a detached task until the stream
    /// ends, a read fails, or the session is torn down. Every failure path
    /// releases whatever was acquired before returning.
    pub async fn open(&self, device: DeviceOf<A>, baud_rate: u32) -> Result<(), SessionError> {
        // Supersede any running read loop before touching its channel.
        let session = self.session_seq.get().wrapping_add(1);
        self.session_seq.set(session);

        self.disconnect().await;
        self.set_state(SessionState::Opening);

        match self.open_channels(&device, baud_rate).await {
            Ok(()) => {
                self.set_state(SessionState::Open);
                self.connected.set(true);
                self.emit(TerminalEvent::Connectivity { connected: true });
                self.spawn_read_loop(session);
                Ok(())
            }
            Err(err) => {
                self.set_state(SessionState::Error);
                self.disconnect().await;
                Err(err)
            }
        }
    }

    async fn open_channels(
        &self,
        device: &DeviceOf<A>,
        baud_rate: u32,
    ) -> Result<(), SessionError> {
        device
            .open(baud_rate)
            .await
            .map_err(|e| SessionError::OpenFailed(e.to_string()))?;

        // Hold the device from here on so the failure paths close it.
        *self.device.borrow_mut() = Some(device.clone());
        self.baud_rate.set(baud_rate);

        let Some(writer) = device.acquire_writer() else {
            return Err(SessionError::PortNotStreamable);
        };
        *self.writer.borrow_mut() = Some(writer);

        let Some(reader) = device.acquire_reader() else {
            return Err(SessionError::PortNotStreamable);
        };
        *self.reader.borrow_mut() = Some(reader);

        Ok(())
    }

    /// Transmit `text` as UTF-8. The caller newline-terminates.
    ///
    /// A failed write tears the session down; the connection must not be
    /// assumed to survive the error.
    pub async fn send(&self, text: &str) -> Result<(), SessionError> {
        let writer = self.writer.borrow().clone();
        let Some(writer) = writer else {
            return Err(SessionError::NotConnected);
        };
        if let Err(e) = writer.write(text.as_bytes()).await {
            self.disconnect().await;
            return Err(SessionError::SendFailed(e.to_string()));
        }
        Ok(())
    }

    /// Tear down the session. Idempotent, safe from any state, and
    /// best-effort: release failures are ignored so teardown always
    /// reaches Idle.
    pub async fn disconnect(&self) {
        if self.state.get() != SessionState::Idle {
            self.set_state(SessionState::Closing);
        }

        // Reader half: cancel unblocks a pending read, release returns the
        // stream lock.
        let reader = self.reader.borrow_mut().take();
        if let Some(reader) = reader {
            reader.cancel().await;
            reader.release();
        }

        // Writer half.
        let writer = self.writer.borrow_mut().take();
        if let Some(writer) = writer {
            writer.close().await;
            writer.release();
        }

        let device = self.device.borrow_mut().take();
        if let Some(device) = device {
            let _ = device.close().await;
        }

        self.check_availability().await;

        if self.connected.replace(false) {
            self.emit(TerminalEvent::Connectivity { connected: false });
        }

        self.set_state(SessionState::Idle);
    }

    /// Platform notification that a granted device was unplugged.
    ///
    /// Logs an inline notice, then runs the shared teardown. When no
    /// session is open only the availability flag is refreshed (the event
    /// may concern an unrelated authorized device).
    pub async fn handle_device_lost(&self) {
        if !self.connected.get() {
            self.check_availability().await;
            return;
        }
        self.emit(TerminalEvent::Notice {
            message: "Device disconnected.".into(),
        });
        self.disconnect().await;
    }

    /// Register for platform hotplug events and pump them into the
    /// session. The registration lives until
    /// [`stop_watching`](Self::stop_watching) or the manager is dropped.
    pub fn watch_device_events(&self) {
        let (tx, mut rx) = mpsc::channel(DEVICE_EVENT_CAPACITY);
        let subscription = self.api.watch_device_events(tx);
        *self.device_watch.borrow_mut() = Some(subscription);

        let manager = self.clone();
        spawn_detached(async move {
            while let Some(event) = rx.next().await {
                match event {
                    DeviceEvent::Connected => manager.check_availability().await,
                    DeviceEvent::Disconnected => manager.handle_device_lost().await,
                }
            }
        });
    }

    /// Drop the hotplug registration; the pump task exits once the
    /// platform side releases its sender.
    pub fn stop_watching(&self) {
        self.device_watch.borrow_mut().take();
    }

    fn spawn_read_loop(&self, session: u32) {
        let manager = self.clone();
        spawn_detached(async move {
            manager.read_loop(session).await;
        });
    }

    /// Drain the inbound channel for one session.
    ///
    /// Never propagates errors past its own boundary: stream end and read
    /// failures both turn into log events plus the shared teardown. If a
    /// newer `open()` superseded this loop, the handles belong to the new
    /// session and are left untouched.
    async fn read_loop(&self, session: u32) {
        let mut decoder = Utf8Stream::new();

        loop {
            let reader = self.reader.borrow().clone();
            let Some(reader) = reader else {
                break; // torn down while we were not reading
            };

            match reader.next_chunk().await {
                Ok(Some(chunk)) => {
                    if !chunk.is_empty() {
                        let text = decoder.decode(&chunk);
                        if !text.is_empty() {
                            self.emit(TerminalEvent::Data { text });
                        }
                    }
                }
                Ok(None) => break, // device signalled end of stream
                Err(e) => {
                    self.emit(TerminalEvent::Notice {
                        message: format!("[read error: {}]", e),
                    });
                    break;
                }
            }

            if self.session_seq.get() != session {
                return; // superseded mid-stream
            }
        }

        let tail = decoder.flush();
        if !tail.is_empty() {
            self.emit(TerminalEvent::Data { text: tail });
        }

        if self.session_seq.get() != session {
            return;
        }

        // Release our half first, then run the shared teardown so the
        // writer and device land in the same state on every exit path.
        let reader = self.reader.borrow_mut().take();
        if let Some(reader) = reader {
            reader.release();
        }
        self.disconnect().await;
    }

    fn set_state(&self, next: SessionState) {
        let prev = self.state.replace(next);
        if prev == next {
            return;
        }
        if !prev.can_transition_to(next) {
            term_warn!("unexpected session transition: {:?} -> {:?}", prev, next);
        }
        term_debug!("session state: {:?} -> {:?}", prev, next);
    }

    fn emit(&self, event: TerminalEvent) {
        let mut tx = self.event_tx.clone();
        if let Err(e) = tx.try_send(event) {
            term_warn!("terminal event dropped: {:?}", e);
        }
    }
}
