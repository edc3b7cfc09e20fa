use std::sync::Arc;

use anyhow::Context;
use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;
use tracing::{debug, info, trace};

use crate::config::{Config, RECV_BUFFER_SIZE};
use crate::http::file::FileBody;
use crate::http::parser::{headers_complete, parse_http_request, request_line_ready};
use crate::http::request::ConnectionHeader;
use crate::http::response::Response;
use crate::http::writer::{send_body, write_fully};
use crate::server::shutdown::Shutdown;

/// One client connection, driven through request/response cycles until it
/// closes.
pub struct Connection<S> {
    stream: S,
    /// Bytes received but not yet consumed by a request. Never grows past
    /// `RECV_BUFFER_SIZE`.
    buffer: BytesMut,
    /// Cycles left before the connection is closed regardless of keep-alive.
    remaining: usize,
    config: Arc<Config>,
    shutdown: Shutdown,
    state: ConnectionState,
}

pub enum ConnectionState {
    /// Waiting for a request line and its header block.
    Waiting,
    Dispatching,
    WritingHeader(Response),
    WritingBody(FileBody, bool), // bool = keep_alive?
    Closed,
}

enum ReadOutcome {
    Data,
    IdleTimeout,
    /// Peer hung up or shutdown was signalled.
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, config: Arc<Config>, shutdown: Shutdown) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(RECV_BUFFER_SIZE),
            remaining: config.max_requests,
            config,
            shutdown,
            state: ConnectionState::Waiting,
        }
    }

    /// Serves the connection, then shuts down the write side of the stream.
    ///
    /// An error means the transport failed; the connection is finished either way.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        let result = self.drive().await;
        let _ = self.stream.shutdown().await;
        result
    }

    async fn drive(&mut self) -> anyhow::Result<()> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Waiting => {
                    if headers_complete(&self.buffer) || self.buffer.len() >= RECV_BUFFER_SIZE {
                        self.state = ConnectionState::Dispatching;
                        continue;
                    }

                    match self.read_more().await? {
                        ReadOutcome::Data => self.state = ConnectionState::Waiting,
                        // A bare request line is still answered, then closed.
                        ReadOutcome::IdleTimeout if request_line_ready(&self.buffer) => {
                            self.state = ConnectionState::Dispatching;
                        }
                        ReadOutcome::IdleTimeout | ReadOutcome::Closed => {}
                    }
                }

                ConnectionState::Dispatching => {
                    let response = self.dispatch().await;
                    self.state = ConnectionState::WritingHeader(response);
                }

                ConnectionState::WritingHeader(response) => {
                    write_fully(&mut self.stream, &response.head)
                        .await
                        .context("writing response head")?;

                    match response.body {
                        Some(body) => {
                            self.state = ConnectionState::WritingBody(body, response.keep_alive);
                        }
                        None => self.finish_cycle(response.keep_alive).await?,
                    }
                }

                ConnectionState::WritingBody(mut body, keep_alive) => {
                    send_body(&mut self.stream, &mut body).await?;
                    self.finish_cycle(keep_alive).await?;
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        Ok(())
    }

    /// Reads whatever the peer sends next, within the idle timeout.
    async fn read_more(&mut self) -> anyhow::Result<ReadOutcome> {
        let mut temp = [0u8; RECV_BUFFER_SIZE];
        let room = RECV_BUFFER_SIZE - self.buffer.len();
        let idle = self.config.idle_timeout();

        let n = tokio::select! {
            res = timeout(idle, self.stream.read(&mut temp[..room])) => match res {
                Ok(res) => res.context("reading request")?,
                Err(_) => {
                    debug!(?idle, "idle timeout");
                    return Ok(ReadOutcome::IdleTimeout);
                }
            },
            _ = self.shutdown.recv() => {
                debug!("shutdown requested");
                return Ok(ReadOutcome::Closed);
            }
        };

        if n == 0 {
            debug!("client closed connection");
            return Ok(ReadOutcome::Closed);
        }

        self.buffer.extend_from_slice(&temp[..n]);
        Ok(ReadOutcome::Data)
    }

    async fn dispatch(&mut self) -> Response {
        trace!(raw = %String::from_utf8_lossy(&self.buffer).escape_debug(), "request bytes");

        let mut parsed = parse_http_request(&self.buffer);

        // Without the blank line the next request's start is unknown, so this
        // one has to be the last.
        if !headers_complete(&self.buffer) {
            if let Ok((request, _)) = &mut parsed {
                debug!("header block incomplete, closing after response");
                request.headers.connection = ConnectionHeader::Close;
            }
        }

        let response = Response::for_request(
            parsed.as_ref().map(|(request, _)| request).map_err(|e| *e),
            &self.config,
        )
        .await;

        let consumed = match &parsed {
            Ok((request, consumed)) => {
                info!(
                    method = %request.line.method,
                    uri = %request.line.uri,
                    status = response.status.as_u16(),
                    "request served"
                );
                *consumed
            }
            Err(e) => {
                info!(error = %e, status = response.status.as_u16(), "request rejected");
                self.buffer.len()
            }
        };
        self.buffer.advance(consumed);
        self.remaining = self.remaining.saturating_sub(1);

        response
    }

    async fn finish_cycle(&mut self, keep_alive: bool) -> anyhow::Result<()> {
        self.stream.flush().await?;

        if keep_alive && self.remaining > 0 {
            self.state = ConnectionState::Waiting;
        } else {
            if keep_alive {
                debug!("request limit reached");
            }
            self.state = ConnectionState::Closed;
        }
        Ok(())
    }
}
