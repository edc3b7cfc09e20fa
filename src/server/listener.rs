use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::{TcpListener, TcpSocket};
use tokio::task::JoinSet;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::config::{BACKLOG, Config};
use crate::http::connection::Connection;
use crate::server::shutdown::{self, Shutdown};

/// Pause after a failed accept; errors like EMFILE repeat until a worker exits.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Binds the listening socket on the configured address and port.
pub fn bind(cfg: &Config) -> anyhow::Result<TcpListener> {
    let addr = SocketAddr::new(cfg.bind_addr, cfg.port);
    let socket = match addr {
        SocketAddr::V4(_) => TcpSocket::new_v4(),
        SocketAddr::V6(_) => TcpSocket::new_v6(),
    }
    .context("creating listening socket")?;

    socket.set_reuseaddr(true).context("setting SO_REUSEADDR")?;
    socket
        .bind(addr)
        .with_context(|| format!("binding {addr}"))?;
    socket.listen(BACKLOG).context("listening")
}

/// Binds and serves until `signal` resolves.
pub async fn run(cfg: Config, signal: impl Future<Output = ()>) -> anyhow::Result<()> {
    let listener = bind(&cfg)?;
    serve(listener, Arc::new(cfg), signal).await
}

/// Accepts connections until `signal` resolves, one worker task per connection.
///
/// Finished workers are reaped while accepting. Once `signal` resolves the
/// listener is closed, every worker is told to stop, and all of them are
/// awaited before returning.
pub async fn serve(
    listener: TcpListener,
    cfg: Arc<Config>,
    signal: impl Future<Output = ()>,
) -> anyhow::Result<()> {
    info!("Listening on {}", listener.local_addr()?);

    let (trigger, shutdown) = shutdown::channel();
    let mut workers = JoinSet::new();
    let mut next_id: u64 = 0;
    tokio::pin!(signal);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (socket, peer) = match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        warn!("accept failed: {}", e);
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                        continue;
                    }
                };

                next_id += 1;
                spawn_worker(&mut workers, next_id, socket, peer, cfg.clone(), shutdown.clone());
            }

            Some(joined) = workers.join_next(), if !workers.is_empty() => {
                reap(joined);
            }

            _ = &mut signal => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    drop(listener);
    trigger.fire();

    let outstanding = workers.len();
    while let Some(joined) = workers.join_next().await {
        reap(joined);
    }
    info!(workers = outstanding, "all workers reclaimed, exiting");

    Ok(())
}

fn spawn_worker<S>(
    workers: &mut JoinSet<u64>,
    id: u64,
    socket: S,
    peer: SocketAddr,
    cfg: Arc<Config>,
    shutdown: Shutdown,
) where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send + 'static,
{
    let span = info_span!("worker", id, %peer);
    workers.spawn(
        async move {
            debug!("accepted connection");
            let mut conn = Connection::new(socket, cfg, shutdown);
            if let Err(e) = conn.run().await {
                error!("Connection error from {}: {:#}", peer, e);
            }
            id
        }
        .instrument(span),
    );
}

fn reap(joined: Result<u64, tokio::task::JoinError>) {
    match joined {
        Ok(id) => debug!(id, "reaped worker"),
        Err(e) if e.is_panic() => error!("worker panicked: {}", e),
        Err(e) => warn!("worker cancelled: {}", e),
    }
}
