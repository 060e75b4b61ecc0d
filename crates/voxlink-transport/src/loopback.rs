use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use tracing::debug;

use crate::error::{Result, TransportError};
use crate::traits::Transport;

/// One unit handed to the loopback transport by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    /// A binary audio frame, exactly as encoded.
    Audio(Bytes),
    /// A JSON control message.
    Text(String),
}

#[derive(Debug, Default)]
struct State {
    started: bool,
    open: bool,
    open_count: usize,
    close_count: usize,
    sent: Vec<Sent>,
    fail_start: Option<String>,
    fail_open: Option<String>,
    fail_sends: Option<String>,
}

/// In-memory transport binding.
///
/// Nothing leaves the process: every frame and message is appended to a log
/// that a [`LoopbackHandle`] can inspect. Failures can be scripted to exercise
/// the engine's error paths.
#[derive(Debug, Default)]
pub struct LoopbackTransport {
    state: Arc<Mutex<State>>,
}

/// Inspection and scripting side of a [`LoopbackTransport`].
#[derive(Debug, Clone)]
pub struct LoopbackHandle {
    state: Arc<Mutex<State>>,
}

impl LoopbackTransport {
    /// Create a transport and the handle that observes it.
    pub fn new() -> (Self, LoopbackHandle) {
        let transport = Self::default();
        let handle = LoopbackHandle {
            state: Arc::clone(&transport.state),
        };
        (transport, handle)
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Transport for LoopbackTransport {
    fn name(&self) -> &str {
        "loopback"
    }

    fn start(&mut self) -> Result<()> {
        let mut state = self.lock();
        if let Some(reason) = state.fail_start.take() {
            return Err(TransportError::OpenFailed(reason));
        }
        state.started = true;
        Ok(())
    }

    fn open_channel(&mut self) -> Result<()> {
        let mut state = self.lock();
        if let Some(reason) = state.fail_open.take() {
            return Err(TransportError::OpenFailed(reason));
        }
        state.open = true;
        state.open_count += 1;
        debug!(opens = state.open_count, "loopback channel opened");
        Ok(())
    }

    fn close_channel(&mut self) {
        let mut state = self.lock();
        if state.open {
            state.open = false;
            state.close_count += 1;
            debug!(closes = state.close_count, "loopback channel closed");
        }
    }

    fn is_channel_open(&self) -> bool {
        self.lock().open
    }

    fn send_audio(&mut self, frame: &[u8]) -> Result<()> {
        let mut state = self.lock();
        if !state.open {
            return Err(TransportError::NotOpen);
        }
        if let Some(reason) = &state.fail_sends {
            return Err(TransportError::SendFailed(reason.clone()));
        }
        state.sent.push(Sent::Audio(Bytes::copy_from_slice(frame)));
        Ok(())
    }

    fn send_text(&mut self, text: &str) -> Result<()> {
        let mut state = self.lock();
        if !state.open {
            return Err(TransportError::NotOpen);
        }
        if let Some(reason) = &state.fail_sends {
            return Err(TransportError::SendFailed(reason.clone()));
        }
        state.sent.push(Sent::Text(text.to_string()));
        Ok(())
    }
}

impl LoopbackHandle {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Everything sent so far, oldest first.
    pub fn sent(&self) -> Vec<Sent> {
        self.lock().sent.clone()
    }

    /// Drain the send log.
    pub fn take_sent(&self) -> Vec<Sent> {
        std::mem::take(&mut self.lock().sent)
    }

    /// Only the text messages sent so far.
    pub fn texts(&self) -> Vec<String> {
        self.lock()
            .sent
            .iter()
            .filter_map(|sent| match sent {
                Sent::Text(text) => Some(text.clone()),
                Sent::Audio(_) => None,
            })
            .collect()
    }

    /// Only the audio frames sent so far.
    pub fn audio_frames(&self) -> Vec<Bytes> {
        self.lock()
            .sent
            .iter()
            .filter_map(|sent| match sent {
                Sent::Audio(frame) => Some(frame.clone()),
                Sent::Text(_) => None,
            })
            .collect()
    }

    /// Whether `start` has succeeded.
    pub fn is_started(&self) -> bool {
        self.lock().started
    }

    /// Whether the channel is open at the transport level.
    pub fn is_open(&self) -> bool {
        self.lock().open
    }

    /// Number of successful `open_channel` calls.
    pub fn open_count(&self) -> usize {
        self.lock().open_count
    }

    /// Number of `close_channel` calls that actually closed an open channel.
    pub fn close_count(&self) -> usize {
        self.lock().close_count
    }

    /// Make the next `start` fail with `reason`.
    pub fn fail_next_start(&self, reason: impl Into<String>) {
        self.lock().fail_start = Some(reason.into());
    }

    /// Make the next `open_channel` fail with `reason`.
    pub fn fail_next_open(&self, reason: impl Into<String>) {
        self.lock().fail_open = Some(reason.into());
    }

    /// Make every send fail with `reason` until cleared with `None`.
    pub fn fail_sends(&self, reason: Option<&str>) {
        self.lock().fail_sends = reason.map(str::to_string);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_sends_in_order() {
        let (mut transport, handle) = LoopbackTransport::new();
        transport.open_channel().unwrap();

        transport.send_text("{\"type\":\"hello\"}").unwrap();
        transport.send_audio(&[1, 2, 3]).unwrap();

        assert_eq!(
            handle.sent(),
            vec![
                Sent::Text("{\"type\":\"hello\"}".to_string()),
                Sent::Audio(Bytes::from_static(&[1, 2, 3])),
            ]
        );
        assert_eq!(handle.texts().len(), 1);
        assert_eq!(handle.audio_frames().len(), 1);
    }

    #[test]
    fn sends_require_open_channel() {
        let (mut transport, handle) = LoopbackTransport::new();

        assert!(matches!(
            transport.send_text("x"),
            Err(TransportError::NotOpen)
        ));
        assert!(matches!(
            transport.send_audio(&[0]),
            Err(TransportError::NotOpen)
        ));
        assert!(handle.sent().is_empty());
    }

    #[test]
    fn scripted_open_failure_is_one_shot() {
        let (mut transport, handle) = LoopbackTransport::new();
        handle.fail_next_open("refused");

        assert!(matches!(
            transport.open_channel(),
            Err(TransportError::OpenFailed(reason)) if reason == "refused"
        ));
        assert!(!handle.is_open());

        transport.open_channel().unwrap();
        assert!(handle.is_open());
        assert_eq!(handle.open_count(), 1);
    }

    #[test]
    fn scripted_send_failure_until_cleared() {
        let (mut transport, handle) = LoopbackTransport::new();
        transport.open_channel().unwrap();
        handle.fail_sends(Some("broken pipe"));

        assert!(matches!(
            transport.send_text("x"),
            Err(TransportError::SendFailed(_))
        ));

        handle.fail_sends(None);
        transport.send_text("x").unwrap();
        assert_eq!(handle.texts(), vec!["x".to_string()]);
    }

    #[test]
    fn close_counts_only_real_transitions() {
        let (mut transport, handle) = LoopbackTransport::new();
        transport.close_channel();
        assert_eq!(handle.close_count(), 0);

        transport.open_channel().unwrap();
        transport.close_channel();
        transport.close_channel();
        assert_eq!(handle.close_count(), 1);
        assert!(!transport.is_channel_open());
    }

    #[test]
    fn boxed_transport_delegates() {
        let (transport, handle) = LoopbackTransport::new();
        let mut boxed: Box<dyn Transport> = Box::new(transport);

        boxed.start().unwrap();
        boxed.open_channel().unwrap();
        boxed.send_text("hi").unwrap();

        assert_eq!(boxed.name(), "loopback");
        assert!(handle.is_started());
        assert_eq!(handle.take_sent().len(), 1);
        assert!(handle.sent().is_empty());
    }
}
