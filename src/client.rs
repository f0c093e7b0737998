use std::fmt;
use std::net::SocketAddr;
use std::ops::Deref;
use std::sync::Arc;

use tokio::net::{lookup_host, ToSocketAddrs};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::argument::Argument;
use crate::codec::Request;
use crate::config::ClientConfig;
use crate::connection::Connection;
use crate::frame::Frame;
use crate::{Error, Result};

/// Connection engine for one store instance.
///
/// The handle is cheap to clone; clones share the socket. Requests issued through any clone are
/// serialized, so a caller never observes bytes belonging to somebody else's request. The socket
/// may be replaced underneath by reconnects, the client's identity (`id`) and address never
/// change.
#[derive(Clone)]
pub struct Client {
    inner: Arc<InnerClient>,
}

pub struct InnerClient {
    pub id: Uuid,
    pub addr: SocketAddr,
    config: ClientConfig,
    state: Mutex<State>,
}

enum State {
    Connected(Connection),
    /// No usable socket; the next request opens one.
    Reconnecting,
    Closed,
}

impl Client {
    pub async fn connect(addr: impl ToSocketAddrs + fmt::Display) -> Result<Client> {
        Client::connect_with_config(addr, ClientConfig::default()).await
    }

    pub async fn connect_with_config(
        addr: impl ToSocketAddrs + fmt::Display,
        config: ClientConfig,
    ) -> Result<Client> {
        let display = addr.to_string();
        let addr = lookup_host(addr)
            .await
            .map_err(|_| Error::Resolve(display.clone()))?
            .next()
            .ok_or(Error::Resolve(display))?;

        let conn = Connection::connect(addr, &config).await?;
        let id = Uuid::new_v4();
        info!(client = %id, %addr, "connected");

        Ok(Client {
            inner: Arc::new(InnerClient {
                id,
                addr,
                config,
                state: Mutex::new(State::Connected(conn)),
            }),
        })
    }

    /// Sends one request and waits for its reply.
    ///
    /// Transient failures drop the socket and the whole request is retried on a fresh one, up to
    /// `max_attempts` in total; the last failure is returned once attempts run out. Arguments
    /// that cannot be encoded fail before anything is sent and are never retried.
    #[instrument(
        name = "execute",
        skip(self, args),
        fields(client = %self.id, addr = %self.addr)
    )]
    pub async fn execute(&self, command: &str, args: &[Argument]) -> Result<Frame> {
        let request = Request::new(command, args).encode()?;

        let mut state = self.state.lock().await;
        let mut attempt = 1;
        loop {
            match self.round_trip(&mut state, &request).await {
                Ok(frame) => {
                    debug!(attempt, "received {}", frame);
                    return Ok(frame);
                }
                Err(err) if err.is_transient() => {
                    if attempt >= self.config.max_attempts {
                        warn!(attempt, %err, "giving up");
                        return Err(err);
                    }
                    warn!(attempt, %err, "transient failure, retrying on a new connection");
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Replaces the socket with a fresh one to the same address, dropping any buffered input.
    pub async fn reconnect(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        if let State::Closed = *state {
            return Err(Error::Closed);
        }

        *state = State::Reconnecting;
        let conn = Connection::connect(self.addr, &self.config).await?;
        *state = State::Connected(conn);
        info!(client = %self.id, addr = %self.addr, "reconnected");
        Ok(())
    }

    /// Closes the socket. Every later request fails with [`Error::Closed`].
    pub async fn close(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        let previous = std::mem::replace(&mut *state, State::Closed);
        info!(client = %self.id, addr = %self.addr, "closed");

        match previous {
            State::Connected(mut conn) => conn.shutdown().await,
            State::Reconnecting | State::Closed => Ok(()),
        }
    }

    pub async fn is_closed(&self) -> bool {
        matches!(*self.state.lock().await, State::Closed)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Runs one attempt.
    ///
    /// The connection is out of `state` while in use and goes back only after a whole reply has
    /// been read. An attempt that fails or is cancelled midway leaves the client `Reconnecting`.
    async fn round_trip(&self, state: &mut State, request: &[u8]) -> Result<Frame> {
        let mut conn = match std::mem::replace(state, State::Reconnecting) {
            State::Connected(conn) => conn,
            State::Reconnecting => {
                let conn = Connection::connect(self.addr, &self.config).await?;
                debug!("opened a new connection");
                conn
            }
            State::Closed => {
                *state = State::Closed;
                return Err(Error::Closed);
            }
        };

        conn.send(request).await?;
        let frame = conn.read_frame().await?;
        *state = State::Connected(conn);
        Ok(frame)
    }
}

impl Deref for Client {
    type Target = InnerClient;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("id", &self.id)
            .field("addr", &self.addr)
            .finish()
    }
}
