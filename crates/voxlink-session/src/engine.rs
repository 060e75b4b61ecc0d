use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};
use voxlink_control::{
    iot_descriptor_messages, parse_json_text, AbortReason, ControlMessage, ControlMessageError,
    Hello, ListeningMode,
};
use voxlink_frame::{decode_frame, encode_audio, AudioStreamPacket, Frame};
use voxlink_transport::Transport;

use crate::clock::{Clock, SystemClock};
use crate::config::SessionConfig;
use crate::error::{ChannelError, Result, SessionError};
use crate::liveness::Liveness;
use crate::observer::Observers;
use crate::state::{ChannelState, SessionState};

/// Protocol engine for one logical connection.
///
/// Not internally synchronized: sends and inbound dispatch for one engine
/// must be serialized by the owner. Only the [`Liveness`] probe is meant to
/// be shared across threads.
pub struct ProtocolEngine {
    transport: Box<dyn Transport>,
    config: SessionConfig,
    clock: Arc<dyn Clock>,
    liveness: Liveness,
    channel: ChannelState,
    state: SessionState,
    opening_since: Option<Duration>,
    observers: Observers,
}

impl ProtocolEngine {
    /// Create an engine over `transport` using the system clock.
    pub fn new(transport: impl Transport + 'static, config: SessionConfig) -> Self {
        Self::with_clock(transport, config, Arc::new(SystemClock::new()))
    }

    /// Create an engine with an explicit time source.
    pub fn with_clock(
        transport: impl Transport + 'static,
        config: SessionConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let liveness = Liveness::new(Arc::clone(&clock), config.timeout);
        Self {
            transport: Box::new(transport),
            config,
            clock,
            liveness,
            channel: ChannelState::Closed,
            state: SessionState::default(),
            opening_since: None,
            observers: Observers::default(),
        }
    }

    // -- Accessors --

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn channel_state(&self) -> ChannelState {
        self.channel
    }

    pub fn session_state(&self) -> &SessionState {
        &self.state
    }

    pub fn server_sample_rate(&self) -> u32 {
        self.state.server_sample_rate
    }

    pub fn server_frame_duration(&self) -> u32 {
        self.state.server_frame_duration
    }

    pub fn session_id(&self) -> &str {
        &self.state.session_id
    }

    pub fn is_error(&self) -> bool {
        self.state.error_occurred
    }

    /// Whether audio can flow right now: open, healthy and not timed out.
    pub fn is_audio_channel_opened(&self) -> bool {
        self.channel == ChannelState::Open
            && self.transport.is_channel_open()
            && !self.state.error_occurred
            && !self.liveness.is_timeout()
    }

    /// True when no inbound data arrived within the configured threshold.
    pub fn is_timeout(&self) -> bool {
        self.liveness.is_timeout()
    }

    /// A thread-safe handle on the last-incoming timestamp.
    pub fn liveness(&self) -> Liveness {
        self.liveness.clone()
    }

    // -- Observer registration --

    pub fn on_incoming_audio(&mut self, observer: impl FnMut(AudioStreamPacket) + Send + 'static) {
        self.observers.set_incoming_audio(Box::new(observer));
    }

    pub fn on_incoming_json(&mut self, observer: impl FnMut(&ControlMessage) + Send + 'static) {
        self.observers.set_incoming_json(Box::new(observer));
    }

    pub fn on_channel_opened(&mut self, observer: impl FnMut() + Send + 'static) {
        self.observers.set_channel_opened(Box::new(observer));
    }

    pub fn on_channel_closed(&mut self, observer: impl FnMut() + Send + 'static) {
        self.observers.set_channel_closed(Box::new(observer));
    }

    pub fn on_network_error(&mut self, observer: impl FnMut(&str) + Send + 'static) {
        self.observers.set_network_error(Box::new(observer));
    }

    // -- Lifecycle --

    /// Run the binding's connection establishment.
    pub fn start(&mut self) -> Result<()> {
        if let Err(err) = self.transport.start() {
            self.set_error(&format!("failed to start transport: {err}"));
            return Err(err.into());
        }
        info!(transport = self.transport.name(), "transport started");
        Ok(())
    }

    /// Open the channel and send the client hello.
    ///
    /// The channel stays `Opening` until the server hello arrives through
    /// [`handle_text`](Self::handle_text). Opening while a session is live
    /// closes it first.
    pub fn open_channel(&mut self) -> Result<()> {
        if self.channel != ChannelState::Closed {
            debug!(state = %self.channel, "reopening; closing current session first");
            self.close_session(false);
        }

        self.state = SessionState::default();
        self.channel = ChannelState::Opening;
        self.opening_since = Some(self.clock.now());
        self.liveness.touch();

        if let Err(err) = self.transport.open_channel() {
            return Err(self.fail_open(err.to_string()).into());
        }

        let hello = ControlMessage::Hello(self.config.client_hello()).to_json();
        if let Err(err) = self.transport.send_text(&hello) {
            return Err(self.fail_open(format!("failed to send hello: {err}")).into());
        }

        info!(
            transport = self.transport.name(),
            version = %self.config.frame.version,
            "channel opening"
        );
        Ok(())
    }

    /// Close the channel. No-op when already closed.
    pub fn close_channel(&mut self) {
        let goodbye = self.config.send_goodbye_on_close;
        self.close_session(goodbye);
    }

    /// The binding lost its connection.
    pub fn handle_disconnect(&mut self, reason: &str) {
        match self.channel {
            ChannelState::Opening => {
                self.fail_open(ChannelError::TransportDisconnected(reason.to_string()).to_string());
            }
            ChannelState::Open => {
                error!(session_id = %self.state.session_id, reason, "transport disconnected");
                self.close_session(false);
            }
            ChannelState::Closed | ChannelState::Closing => {
                debug!(reason, "disconnect on inactive channel ignored");
            }
        }
    }

    /// Owner-driven housekeeping: enforces the hello deadline while opening
    /// and force-closes an open channel that has gone silent.
    ///
    /// Returns the channel error when this call ended the session.
    pub fn tick(&mut self) -> Result<()> {
        match self.channel {
            ChannelState::Opening => {
                let waited = self
                    .opening_since
                    .map(|since| self.clock.now().saturating_sub(since))
                    .unwrap_or_default();
                if waited >= self.config.hello_timeout {
                    return Err(self.fail_open("server timeout".to_string()).into());
                }
            }
            ChannelState::Open if self.liveness.is_timeout() => {
                error!(
                    session_id = %self.state.session_id,
                    elapsed = ?self.liveness.elapsed(),
                    "channel timed out"
                );
                self.close_session(false);
                return Err(ChannelError::Timeout(self.config.timeout).into());
            }
            _ => {}
        }
        Ok(())
    }

    /// Flag the session unusable and notify the network-error observer.
    ///
    /// While opening this also abandons the handshake: the channel goes
    /// straight to `Closed` and channel-opened never fires.
    pub fn set_error(&mut self, message: &str) {
        if self.channel == ChannelState::Opening {
            self.fail_open(message.to_string());
        } else {
            self.notify_error(message);
        }
    }

    fn notify_error(&mut self, message: &str) {
        self.state.error_occurred = true;
        error!(session_id = %self.state.session_id, message, "session error");
        self.observers.network_error(message);
    }

    // -- Inbound --

    /// Feed one text message from the control channel.
    pub fn handle_text(&mut self, text: &str) {
        if self.channel == ChannelState::Closed {
            debug!(size = text.len(), "text on closed channel dropped");
            return;
        }

        match ControlMessage::parse(text) {
            Ok(message) => {
                self.liveness.touch();
                self.dispatch(message);
            }
            Err(err) => self.reject_inbound(format!("malformed control message: {err}")),
        }
    }

    /// Feed one binary message from the audio channel.
    pub fn handle_binary(&mut self, data: &[u8]) {
        if self.channel == ChannelState::Closed {
            debug!(size = data.len(), "binary on closed channel dropped");
            return;
        }

        match decode_frame(data, self.config.frame.version) {
            Ok(frame) => self.handle_frame(frame),
            Err(err) => self.reject_inbound(format!("malformed audio frame: {err}")),
        }
    }

    /// Feed one frame already split off a byte stream (see
    /// [`FrameReader`](voxlink_frame::FrameReader)).
    pub fn handle_frame(&mut self, frame: Frame) {
        if self.channel == ChannelState::Closed {
            debug!(size = frame.payload_len(), "frame on closed channel dropped");
            return;
        }

        let limit = self.config.frame.payload_limit();
        if frame.payload_len() > limit {
            return self.reject_inbound(format!(
                "frame payload of {} bytes exceeds limit of {limit}",
                frame.payload_len()
            ));
        }

        match frame {
            Frame::Audio(audio) => {
                self.liveness.touch();
                let packet = audio.into_packet(
                    self.state.server_sample_rate,
                    self.state.server_frame_duration,
                );
                debug!(
                    timestamp = packet.timestamp,
                    size = packet.payload.len(),
                    "audio frame received"
                );
                self.observers.incoming_audio(packet);
            }
            Frame::Json(text) => self.handle_text(&text),
        }
    }

    fn dispatch(&mut self, message: ControlMessage) {
        match message {
            ControlMessage::Hello(hello) if self.channel == ChannelState::Opening => {
                self.accept_hello(hello);
            }
            ControlMessage::Goodbye { session_id } => {
                let ours = session_id
                    .as_deref()
                    .is_none_or(|id| id == self.state.session_id);
                if ours && self.channel == ChannelState::Opening {
                    self.fail_open("server said goodbye".to_string());
                } else if ours {
                    info!(session_id = %self.state.session_id, "server said goodbye");
                    self.close_session(false);
                } else {
                    debug!(?session_id, "goodbye for another session ignored");
                }
            }
            ControlMessage::Error { message } if self.channel == ChannelState::Opening => {
                self.fail_open(message);
            }
            ControlMessage::Error { message } => self.set_error(&message),
            other => {
                debug!(kind = other.kind(), "control message received");
                self.observers.incoming_json(&other);
            }
        }
    }

    fn accept_hello(&mut self, hello: Hello) {
        if self.state.error_occurred {
            self.fail_open("session already unusable".to_string());
            return;
        }
        if hello.transport != self.config.transport_name {
            self.fail_open(format!("unsupported transport: {}", hello.transport));
            return;
        }

        self.state
            .negotiate(hello.session_id.as_deref(), hello.audio_params.as_ref());
        self.channel = ChannelState::Open;
        self.opening_since = None;

        info!(
            session_id = %self.state.session_id,
            sample_rate = self.state.server_sample_rate,
            frame_duration = self.state.server_frame_duration,
            "channel opened"
        );
        self.observers.channel_opened();
    }

    /// Malformed inbound units never end an open session; while opening they
    /// abort the handshake.
    fn reject_inbound(&mut self, message: String) {
        if self.channel == ChannelState::Opening {
            self.fail_open(message);
        } else {
            warn!(session_id = %self.state.session_id, %message, "inbound unit dropped");
            self.observers.network_error(&message);
        }
    }

    fn fail_open(&mut self, reason: String) -> ChannelError {
        self.transport.close_channel();
        self.channel = ChannelState::Closed;
        self.opening_since = None;
        self.state = SessionState::default();
        self.notify_error(&reason);
        ChannelError::OpenFailed(reason)
    }

    fn close_session(&mut self, send_goodbye: bool) {
        let previous = self.channel;
        if previous == ChannelState::Closed {
            return;
        }
        self.channel = ChannelState::Closing;

        if send_goodbye && previous == ChannelState::Open && !self.state.error_occurred {
            let goodbye = ControlMessage::Goodbye {
                session_id: Some(self.state.session_id.clone()),
            };
            if let Err(err) = self.transport.send_text(&goodbye.to_json()) {
                warn!(error = %err, "failed to send goodbye");
            }
        }

        self.transport.close_channel();
        let session_id = std::mem::take(&mut self.state.session_id);
        self.state = SessionState::default();
        self.channel = ChannelState::Closed;
        self.opening_since = None;

        info!(session_id = %session_id, "channel closed");
        if previous == ChannelState::Open {
            self.observers.channel_closed();
        }
    }

    // -- Outbound --

    pub fn send_wake_word_detected(&mut self, wake_word: &str) -> Result<()> {
        self.send_message(|session_id| ControlMessage::WakeWordDetected {
            session_id,
            wake_word: wake_word.to_string(),
        })
    }

    /// Begin a listening turn. Realtime mode needs AEC advertised in hello.
    pub fn send_start_listening(&mut self, mode: ListeningMode) -> Result<()> {
        if mode == ListeningMode::Realtime && !self.config.features.aec {
            return Err(ControlMessageError::InvalidValue {
                field: "mode",
                value: mode.as_str().to_string(),
            }
            .into());
        }
        self.send_message(|session_id| ControlMessage::ListenStart { session_id, mode })
    }

    pub fn send_stop_listening(&mut self) -> Result<()> {
        self.send_message(|session_id| ControlMessage::ListenStop { session_id })
    }

    pub fn send_abort_speaking(&mut self, reason: AbortReason) -> Result<()> {
        self.send_message(|session_id| ControlMessage::Abort { session_id, reason })
    }

    /// Send an IoT descriptor array, one message per descriptor.
    pub fn send_iot_descriptors(&mut self, descriptors: &str) -> Result<()> {
        self.ensure_sendable()?;
        for message in iot_descriptor_messages(&self.state.session_id, descriptors)? {
            self.send_text(&message.to_json())?;
        }
        Ok(())
    }

    pub fn send_iot_states(&mut self, states: &str) -> Result<()> {
        self.ensure_sendable()?;
        let states = parse_json_text(states)?;
        self.send_message(|session_id| ControlMessage::IotStates { session_id, states })
    }

    pub fn send_mcp_message(&mut self, payload: &str) -> Result<()> {
        self.ensure_sendable()?;
        let payload = parse_json_text(payload)?;
        self.send_message(|session_id| ControlMessage::Mcp {
            session_id,
            payload,
        })
    }

    /// Encode `packet` with the configured layout and send it.
    pub fn send_audio(&mut self, packet: &AudioStreamPacket) -> Result<()> {
        self.ensure_sendable()?;
        let frame = encode_audio(packet, self.config.frame.version)?;
        if let Err(err) = self.transport.send_audio(&frame) {
            self.set_error(&format!("failed to send audio: {err}"));
            return Err(err.into());
        }
        Ok(())
    }

    fn ensure_sendable(&self) -> Result<()> {
        if self.channel != ChannelState::Open {
            return Err(SessionError::NotOpen(self.channel));
        }
        if self.state.error_occurred {
            return Err(SessionError::Unusable);
        }
        Ok(())
    }

    fn send_message(&mut self, build: impl FnOnce(String) -> ControlMessage) -> Result<()> {
        self.ensure_sendable()?;
        let message = build(self.state.session_id.clone());
        self.send_text(&message.to_json())
    }

    fn send_text(&mut self, text: &str) -> Result<()> {
        if let Err(err) = self.transport.send_text(text) {
            self.set_error(&format!("failed to send control message: {err}"));
            return Err(err.into());
        }
        debug!(size = text.len(), "control message sent");
        Ok(())
    }
}

impl std::fmt::Debug for ProtocolEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtocolEngine")
            .field("transport", &self.transport.name())
            .field("channel", &self.channel)
            .field("state", &self.state)
            .field("observers", &self.observers)
            .finish()
    }
}
