use std::net::SocketAddr;
use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::codec::Decoder;

use crate::codec::FrameCodec;
use crate::config::ClientConfig;
use crate::frame::Frame;
use crate::{Error, Result};

/// A single TCP stream plus the bytes read from it that have not formed a frame yet.
pub struct Connection {
    stream: TcpStream,
    // Data is read from the socket into the read buffer. When a frame is parsed, the corresponding
    // data is removed from the buffer.
    buffer: BytesMut,
    codec: FrameCodec,
    timeout: Duration,
}

impl Connection {
    pub fn new(stream: TcpStream, config: &ClientConfig) -> Connection {
        Connection {
            stream,
            // Allocate the buffer with 4kb of capacity.
            buffer: BytesMut::with_capacity(4096),
            codec: FrameCodec::new(config.max_frame_size),
            timeout: config.timeout,
        }
    }

    pub async fn connect(addr: SocketAddr, config: &ClientConfig) -> Result<Connection> {
        let stream = timeout(config.timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| Error::Timeout(config.timeout))??;
        stream.set_nodelay(true)?;
        Ok(Connection::new(stream, config))
    }

    /// Writes an already encoded request.
    pub async fn send(&mut self, request: &[u8]) -> Result<()> {
        let limit = self.timeout;
        let stream = &mut self.stream;
        let write = async move {
            stream.write_all(request).await?;
            stream.flush().await
        };
        timeout(limit, write)
            .await
            .map_err(|_| Error::Timeout(limit))??;
        Ok(())
    }

    /// Reads until one complete frame is buffered. Each socket read gets its own deadline.
    pub async fn read_frame(&mut self) -> Result<Frame> {
        loop {
            if let Some(frame) = self.codec.decode(&mut self.buffer)? {
                return Ok(frame);
            }

            let limit = self.timeout;
            let read = timeout(limit, self.stream.read_buf(&mut self.buffer))
                .await
                .map_err(|_| Error::Timeout(limit))??;

            if read == 0 {
                return Err(Error::ConnectionReset);
            }
        }
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub async fn shutdown(&mut self) -> Result<()> {
        self.stream.shutdown().await?;
        Ok(())
    }
}
