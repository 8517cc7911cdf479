//! WebSerial implementation of the transport traits.
//!
//! Note: Usage requires RUSTFLAGS="--cfg=web_sys_unstable_apis" — the
//! Serial API bindings are gated as unstable in web-sys.
//!
//! On non-wasm targets this crate is empty; the session layer is driven by
//! mock transports there.

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::{WebReader, WebSerial, WebSerialPort, WebWriter};
