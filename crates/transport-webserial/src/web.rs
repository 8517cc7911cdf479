use core_types::{
    DeviceEvent, InboundReader, OutboundWriter, SerialApi, SerialPort, Subscription,
    TransportError,
};
use futures_channel::mpsc;
use js_sys::Uint8Array;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{ReadableStreamDefaultReader, WritableStreamDefaultWriter};

/// `navigator.serial`.
#[derive(Clone, Default)]
pub struct WebSerial;

impl WebSerial {
    pub fn new() -> Self {
        Self
    }

    fn serial() -> Option<web_sys::Serial> {
        let window = web_sys::window()?;
        let serial = window.navigator().serial();
        if serial.is_undefined() {
            None
        } else {
            Some(serial)
        }
    }
}

impl SerialApi for WebSerial {
    type Device = WebSerialPort;

    fn is_supported(&self) -> bool {
        Self::serial().is_some()
    }

    async fn request_device(&self) -> Result<WebSerialPort, TransportError> {
        let serial = Self::serial().ok_or(TransportError::NotSupported)?;
        let value = JsFuture::from(serial.request_port())
            .await
            .map_err(|e| TransportError::NoDevice(format!("{:?}", e)))?;
        let port: web_sys::SerialPort = value
            .dyn_into()
            .map_err(|_| TransportError::NoDevice("SerialPort cast failed".into()))?;
        Ok(WebSerialPort { port })
    }

    async fn authorized_devices(&self) -> Result<Vec<WebSerialPort>, TransportError> {
        let serial = Self::serial().ok_or(TransportError::NotSupported)?;
        let value = JsFuture::from(serial.get_ports())
            .await
            .map_err(|e| TransportError::Io(format!("{:?}", e)))?;
        let array = js_sys::Array::from(&value);
        let mut devices = Vec::with_capacity(array.length() as usize);
        for entry in array.iter() {
            if let Ok(port) = entry.dyn_into::<web_sys::SerialPort>() {
                devices.push(WebSerialPort { port });
            }
        }
        Ok(devices)
    }

    fn watch_device_events(&self, tx: mpsc::Sender<DeviceEvent>) -> Subscription {
        let Some(serial) = Self::serial() else {
            return Subscription::noop();
        };

        let mut connect_tx = tx.clone();
        let onconnect = Closure::wrap(Box::new(move |_event: web_sys::Event| {
            let _ = connect_tx.try_send(DeviceEvent::Connected);
        }) as Box<dyn FnMut(web_sys::Event)>);

        let mut disconnect_tx = tx;
        let ondisconnect = Closure::wrap(Box::new(move |_event: web_sys::Event| {
            let _ = disconnect_tx.try_send(DeviceEvent::Disconnected);
        }) as Box<dyn FnMut(web_sys::Event)>);

        serial.set_onconnect(Some(onconnect.as_ref().unchecked_ref()));
        serial.set_ondisconnect(Some(ondisconnect.as_ref().unchecked_ref()));

        // The guard keeps the closures alive until unregistration.
        Subscription::new(move || {
            serial.set_onconnect(None);
            serial.set_ondisconnect(None);
            drop(onconnect);
            drop(ondisconnect);
        })
    }
}

/// One granted serial device.
#[derive(Clone)]
pub struct WebSerialPort {
    port: web_sys::SerialPort,
}

impl SerialPort for WebSerialPort {
    type Reader = WebReader;
    type Writer = WebWriter;

    async fn open(&self, baud_rate: u32) -> Result<(), TransportError> {
        let options = web_sys::SerialOptions::new(baud_rate);
        JsFuture::from(self.port.open(&options))
            .await
            .map_err(|e| TransportError::OpenFailed(format!("{:?}", e)))?;
        Ok(())
    }

    async fn close(&self) -> Result<(), TransportError> {
        JsFuture::from(self.port.close())
            .await
            .map_err(|e| TransportError::Io(format!("{:?}", e)))?;
        Ok(())
    }

    fn acquire_reader(&self) -> Option<WebReader> {
        let readable: JsValue = self.port.readable().into();
        if readable.is_null() || readable.is_undefined() {
            return None;
        }
        let stream: web_sys::ReadableStream = readable.dyn_into().ok()?;
        // getReader() throws on an already-locked stream; the cast failure
        // maps that to "not acquirable".
        let reader: ReadableStreamDefaultReader =
            JsValue::from(stream.get_reader()).dyn_into().ok()?;
        Some(WebReader { reader })
    }

    fn acquire_writer(&self) -> Option<WebWriter> {
        let writable: JsValue = self.port.writable().into();
        if writable.is_null() || writable.is_undefined() {
            return None;
        }
        let stream: web_sys::WritableStream = writable.dyn_into().ok()?;
        let writer: WritableStreamDefaultWriter = stream.get_writer().ok()?;
        Some(WebWriter { writer })
    }
}

/// Exclusive lock on the port's readable stream.
#[derive(Clone)]
pub struct WebReader {
    reader: ReadableStreamDefaultReader,
}

impl InboundReader for WebReader {
    async fn next_chunk(&self) -> Result<Option<Vec<u8>>, TransportError> {
        // read() resolves to { value: Uint8Array, done: bool }
        let result = JsFuture::from(self.reader.read())
            .await
            .map_err(|e| TransportError::Io(format!("{:?}", e)))?;

        let done = js_sys::Reflect::get(&result, &"done".into())
            .ok()
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        if done {
            return Ok(None);
        }

        let value = js_sys::Reflect::get(&result, &"value".into())
            .map_err(|_| TransportError::Io("invalid read result".into()))?;
        Ok(Some(Uint8Array::new(&value).to_vec()))
    }

    async fn cancel(&self) {
        let _ = JsFuture::from(self.reader.cancel()).await;
    }

    fn release(&self) {
        self.reader.release_lock();
    }
}

/// Exclusive lock on the port's writable stream.
#[derive(Clone)]
pub struct WebWriter {
    writer: WritableStreamDefaultWriter,
}

impl OutboundWriter for WebWriter {
    async fn write(&self, data: &[u8]) -> Result<(), TransportError> {
        let chunk = Uint8Array::from(data);
        JsFuture::from(self.writer.write_with_chunk(&chunk))
            .await
            .map_err(|e| TransportError::Io(format!("{:?}", e)))?;
        Ok(())
    }

    async fn close(&self) {
        let _ = JsFuture::from(self.writer.close()).await;
    }

    fn release(&self) {
        self.writer.release_lock();
    }
}
