use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::convert::TryInto;
use std::io::Cursor;
use tokio_util::codec::{Decoder, Encoder};

use crate::argument::Argument;
use crate::config::DEFAULT_MAX_FRAME_SIZE;
use crate::frame::{self, Frame};
use crate::Error;

/// A command name and its arguments, ready to be framed.
#[derive(Clone, Copy, Debug)]
pub struct Request<'a> {
    pub command: &'a str,
    pub args: &'a [Argument],
}

impl<'a> Request<'a> {
    pub fn new(command: &'a str, args: &'a [Argument]) -> Request<'a> {
        Request { command, args }
    }

    /// Encodes the request into a standalone buffer.
    ///
    /// Nothing is produced unless every argument is encodable, so a rejected request can never
    /// leave half a frame behind in a connection's write path.
    pub fn encode(self) -> Result<Bytes, Error> {
        let mut buf = BytesMut::new();
        FrameCodec::default().encode(self, &mut buf)?;
        Ok(buf.freeze())
    }
}

pub struct FrameCodec {
    max_frame_size: usize,
}

impl FrameCodec {
    pub fn new(max_frame_size: usize) -> FrameCodec {
        FrameCodec { max_frame_size }
    }

    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        FrameCodec::new(DEFAULT_MAX_FRAME_SIZE)
    }
}

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let mut cursor = Cursor::new(&src[..]);
        let frame = match Frame::parse(&mut cursor) {
            Ok(frame) => frame,
            Err(frame::Error::Incomplete) => {
                // Not enough data yet, but refuse to buffer without bound.
                if src.len() > self.max_frame_size {
                    return Err(Error::FrameTooLarge {
                        limit: self.max_frame_size,
                    });
                }
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        let position: usize = cursor
            .position()
            .try_into()
            .map_err(|_| Error::FrameTooLarge {
                limit: self.max_frame_size,
            })?;

        // Remove the parsed frame from the buffer.
        src.advance(position);

        Ok(Some(frame))
    }
}

impl<'a> Encoder<Request<'a>> for FrameCodec {
    type Error = Error;

    fn encode(&mut self, request: Request<'a>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        for arg in request.args {
            arg.validate()?;
        }

        Argument::Text(request.command.to_string()).encode(dst)?;
        for arg in request.args {
            arg.encode(dst)?;
        }
        dst.put_u8(b'\n');

        Ok(())
    }
}

/// Outcome of feeding bytes into a [`FrameDecoder`].
#[derive(Debug, PartialEq)]
pub enum DecodeResult {
    /// More bytes are needed; everything received so far is retained.
    Incomplete,
    Frame(Frame),
    /// The stream is desynchronized and the connection has to be dropped.
    Malformed(String),
}

/// Push-style decoder for callers that own the socket reads themselves.
pub struct FrameDecoder {
    codec: FrameCodec,
    buffer: BytesMut,
}

impl FrameDecoder {
    pub fn new() -> FrameDecoder {
        FrameDecoder::with_codec(FrameCodec::default())
    }

    pub fn with_codec(codec: FrameCodec) -> FrameDecoder {
        FrameDecoder {
            codec,
            buffer: BytesMut::with_capacity(4096),
        }
    }

    /// Appends `chunk` and returns the next complete frame, if any.
    ///
    /// A chunk may carry several frames; call `feed(&[])` to drain the ones that follow.
    pub fn feed(&mut self, chunk: &[u8]) -> DecodeResult {
        self.buffer.extend_from_slice(chunk);

        match self.codec.decode(&mut self.buffer) {
            Ok(Some(frame)) => DecodeResult::Frame(frame),
            Ok(None) => DecodeResult::Incomplete,
            Err(err) => DecodeResult::Malformed(err.to_string()),
        }
    }

    /// Number of bytes received but not yet consumed by a frame.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        FrameDecoder::new()
    }
}
