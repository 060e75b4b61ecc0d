use crate::error::Result;

/// Capability set a concrete transport binding provides to the protocol engine.
///
/// Implementations own the physical connection (WebSocket, MQTT control
/// channel plus UDP audio, ...). The engine only ever talks to this trait,
/// usually as `Box<dyn Transport>`.
///
/// Sends are synchronous relative to the caller and are not retried by the
/// engine. A binding may block until the bytes are handed to its socket.
pub trait Transport: Send {
    /// Short binding name used in log output.
    fn name(&self) -> &str {
        "transport"
    }

    /// Connection establishment that must happen before any channel is opened
    /// (for example connecting to an MQTT broker). Every binding states what
    /// it needs here, even when that is nothing.
    fn start(&mut self) -> Result<()>;

    /// Open the audio/control channel pair.
    fn open_channel(&mut self) -> Result<()>;

    /// Close the channel. Closing an already-closed channel is a no-op.
    fn close_channel(&mut self);

    /// Whether the channel is currently open at the transport level.
    fn is_channel_open(&self) -> bool;

    /// Send one already-encoded binary audio frame.
    fn send_audio(&mut self, frame: &[u8]) -> Result<()>;

    /// Send one UTF-8 JSON control message.
    fn send_text(&mut self, text: &str) -> Result<()>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn start(&mut self) -> Result<()> {
        (**self).start()
    }

    fn open_channel(&mut self) -> Result<()> {
        (**self).open_channel()
    }

    fn close_channel(&mut self) {
        (**self).close_channel()
    }

    fn is_channel_open(&self) -> bool {
        (**self).is_channel_open()
    }

    fn send_audio(&mut self, frame: &[u8]) -> Result<()> {
        (**self).send_audio(frame)
    }

    fn send_text(&mut self, text: &str) -> Result<()> {
        (**self).send_text(text)
    }
}
