use std::fmt;

use voxlink_control::ControlMessage;
use voxlink_frame::AudioStreamPacket;

pub type AudioObserver = Box<dyn FnMut(AudioStreamPacket) + Send>;
pub type JsonObserver = Box<dyn FnMut(&ControlMessage) + Send>;
pub type ChannelObserver = Box<dyn FnMut() + Send>;
pub type ErrorObserver = Box<dyn FnMut(&str) + Send>;

/// One observer slot per event class.
///
/// Registering replaces whatever was in the slot. Observers run on the
/// transport's receive path and must hand long work off elsewhere.
#[derive(Default)]
pub struct Observers {
    incoming_audio: Option<AudioObserver>,
    incoming_json: Option<JsonObserver>,
    channel_opened: Option<ChannelObserver>,
    channel_closed: Option<ChannelObserver>,
    network_error: Option<ErrorObserver>,
}

impl Observers {
    pub fn set_incoming_audio(&mut self, observer: AudioObserver) {
        self.incoming_audio = Some(observer);
    }

    pub fn set_incoming_json(&mut self, observer: JsonObserver) {
        self.incoming_json = Some(observer);
    }

    pub fn set_channel_opened(&mut self, observer: ChannelObserver) {
        self.channel_opened = Some(observer);
    }

    pub fn set_channel_closed(&mut self, observer: ChannelObserver) {
        self.channel_closed = Some(observer);
    }

    pub fn set_network_error(&mut self, observer: ErrorObserver) {
        self.network_error = Some(observer);
    }

    pub(crate) fn incoming_audio(&mut self, packet: AudioStreamPacket) {
        if let Some(observer) = self.incoming_audio.as_mut() {
            observer(packet);
        }
    }

    pub(crate) fn incoming_json(&mut self, message: &ControlMessage) {
        if let Some(observer) = self.incoming_json.as_mut() {
            observer(message);
        }
    }

    pub(crate) fn channel_opened(&mut self) {
        if let Some(observer) = self.channel_opened.as_mut() {
            observer();
        }
    }

    pub(crate) fn channel_closed(&mut self) {
        if let Some(observer) = self.channel_closed.as_mut() {
            observer();
        }
    }

    pub(crate) fn network_error(&mut self, message: &str) {
        if let Some(observer) = self.network_error.as_mut() {
            observer(message);
        }
    }
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("incoming_audio", &self.incoming_audio.is_some())
            .field("incoming_json", &self.incoming_json.is_some())
            .field("channel_opened", &self.channel_opened.is_some())
            .field("channel_closed", &self.channel_closed.is_some())
            .field("network_error", &self.network_error.is_some())
            .finish()
    }
}
