use std::io::{ErrorKind, Read};

use bytes::BytesMut;
use tracing::debug;

use crate::codec::{decode_stream, Frame, FrameConfig};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Reads back-to-back v2/v3 frames from any `Read` stream.
///
/// Used for capture files and stream transports where frame boundaries come
/// from the header's payload_size instead of the transport's message framing.
pub struct FrameReader<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Read> FrameReader<T> {
    /// Create a frame reader for the given layout.
    ///
    /// Fails with [`FrameError::Unframed`] for v1, which has no length field.
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

    /// Read the next complete frame (blocking).
    ///
    /// Returns `Ok(None)` on a clean EOF between frames and
    /// `Err(FrameError::ConnectionClosed)` when EOF cuts a frame short.
    pub fn read_frame(&mut self) -> Result<Option<Frame>> {
        loop {
            if let Some(frame) =
                decode_stream(&mut self.buf, self.config.version, self.config.max_payload_size)?
            {
                return Ok(Some(frame));
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                if self.buf.is_empty() {
                    return Ok(None);
                }
                debug!(buffered = self.buf.len(), "stream ended mid-frame");
                return Err(FrameError::ConnectionClosed);
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl<T: Read> Iterator for FrameReader<T> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_frame().transpose()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use bytes::{BufMut, Bytes};

    use super::*;
    use crate::codec::{encode_frame, AudioFrame};
    use crate::kind::{FrameType, FrameVersion};

    fn v2() -> FrameConfig {
        FrameConfig {
            version: FrameVersion::V2,
            ..FrameConfig::default()
        }
    }

    fn audio(timestamp: u32, payload: &'static [u8]) -> Frame {
        Frame::Audio(AudioFrame {
            timestamp,
            payload: Bytes::from_static(payload),
        })
    }

    #[test]
    fn reads_frames_until_clean_eof() {
        let mut wire = BytesMut::new();
        encode_frame(FrameVersion::V2, FrameType::Audio, 20, b"one", &mut wire).unwrap();
        encode_frame(FrameVersion::V2, FrameType::Audio, 80, b"two", &mut wire).unwrap();

        let mut reader = FrameReader::new(Cursor::new(wire.to_vec()), v2()).unwrap();

        assert_eq!(reader.read_frame().unwrap(), Some(audio(20, b"one")));
        assert_eq!(reader.read_frame().unwrap(), Some(audio(80, b"two")));
        assert_eq!(reader.read_frame().unwrap(), None);
    }

    #[test]
    fn iterates_frames() {
        let mut wire = BytesMut::new();
        for i in 0..5u8 {
            encode_frame(FrameVersion::V3, FrameType::Audio, 0, &[i], &mut wire).unwrap();
        }
        let cfg = FrameConfig {
            version: FrameVersion::V3,
            ..FrameConfig::default()
        };

        let reader = FrameReader::new(Cursor::new(wire.to_vec()), cfg).unwrap();
        let frames: Vec<Frame> = reader.collect::<Result<_>>().unwrap();

        assert_eq!(frames.len(), 5);
        assert_eq!(frames[4].payload_len(), 1);
    }

    #[test]
    fn partial_read_handling() {
        let mut wire = BytesMut::new();
        encode_frame(FrameVersion::V2, FrameType::Audio, 7, b"slow", &mut wire).unwrap();

        let byte_reader = ByteByByteReader {
            bytes: wire.to_vec(),
            pos: 0,
        };
        let mut reader = FrameReader::new(byte_reader, v2()).unwrap();

        assert_eq!(reader.read_frame().unwrap(), Some(audio(7, b"slow")));
    }

    #[test]
    fn eof_mid_frame() {
        let mut partial = BytesMut::new();
        partial.put_u8(0);
        partial.put_u8(0);
        partial.put_u16(16);
        partial.put_slice(b"only-part");
        let cfg = FrameConfig {
            version: FrameVersion::V3,
            ..FrameConfig::default()
        };

        let mut reader = FrameReader::new(Cursor::new(partial.to_vec()), cfg).unwrap();
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn rejects_v1_streams() {
        let result = FrameReader::new(Cursor::new(Vec::<u8>::new()), FrameConfig::default());
        assert!(matches!(result, Err(FrameError::Unframed(FrameVersion::V1))));
    }

    #[test]
    fn interrupted_read_retries() {
        let mut wire = BytesMut::new();
        encode_frame(FrameVersion::V2, FrameType::Json, 0, b"{}", &mut wire).unwrap();

        let reader = InterruptedThenData {
            interrupted: false,
            inner: Cursor::new(wire.to_vec()),
        };
        let mut framed = FrameReader::new(reader, v2()).unwrap();

        assert_eq!(
            framed.read_frame().unwrap(),
            Some(Frame::Json("{}".to_string()))
        );
    }

    #[derive(Debug)]
    struct ByteByByteReader {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for ByteByByteReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.bytes.len() || buf.is_empty() {
                return Ok(0);
            }

            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    struct InterruptedThenData {
        interrupted: bool,
        inner: Cursor<Vec<u8>>,
    }

    impl Read for InterruptedThenData {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            self.inner.read(buf)
        }
    }
}
