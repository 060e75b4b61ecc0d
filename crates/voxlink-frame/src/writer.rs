use std::io::{ErrorKind, Write};

use bytes::BytesMut;

use crate::codec::{encode_frame, Frame, FrameConfig};
use crate::error::{FrameError, Result};
use crate::kind::FrameType;
use crate::packet::AudioStreamPacket;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Writes back-to-back v2/v3 frames to any `Write` stream.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Write> FrameWriter<T> {
    /// Create a frame writer for the given layout.
    ///
    /// Fails with [`FrameError::Unframed`] for v1: frames written without a
    /// length field could never be split apart again.
    pub fn new(inner: T, config: FrameConfig) -> Result<Self> {
        if config.version.header_size() == 0 {
            return Err(FrameError::Unframed(config.version));
        }
        Ok(Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        })
    }

    /// Write an audio packet. The timestamp is kept only by v2.
    pub fn write_audio(&mut self, packet: &AudioStreamPacket) -> Result<()> {
        self.write_raw(FrameType::Audio, packet.timestamp, packet.payload.as_ref())
    }

    /// Write a JSON control message as an embedded JSON frame.
    pub fn write_json(&mut self, text: &str) -> Result<()> {
        self.write_raw(FrameType::Json, 0, text.as_bytes())
    }

    /// Write a decoded frame back out.
    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        match frame {
            Frame::Audio(audio) => {
                self.write_raw(FrameType::Audio, audio.timestamp, audio.payload.as_ref())
            }
            Frame::Json(text) => self.write_json(text),
        }
    }

    fn write_raw(&mut self, frame_type: FrameType, timestamp: u32, payload: &[u8]) -> Result<()> {
        let limit = self.config.payload_limit();
        if payload.len() > limit {
            return Err(FrameError::PayloadTooLarge {
                size: payload.len(),
                max: limit,
            });
        }

        self.buf.clear();
        encode_frame(
            self.config.version,
            frame_type,
            timestamp,
            payload,
            &mut self.buf,
        )?;

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}
