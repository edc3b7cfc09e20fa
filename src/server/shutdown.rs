//! Interrupt delivery from the supervisor to its workers.

use std::future::Future;

use tokio::sync::watch;

/// Sending half, owned by the supervisor.
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

/// Receiving half, one clone per worker.
#[derive(Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

pub fn channel() -> (ShutdownTrigger, Shutdown) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger { tx }, Shutdown { rx })
}

impl ShutdownTrigger {
    pub fn fire(&self) {
        // send_replace does not fail when every worker has already gone.
        self.tx.send_replace(true);
    }
}

impl Shutdown {
    /// A handle that never fires, for connections driven outside a supervisor.
    pub fn never() -> Self {
        let (tx, rx) = watch::channel(false);
        // The sender is dropped; recv() then waits forever.
        drop(tx);
        Self { rx }
    }

    #[cfg(test)]
    fn is_fired(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the trigger fires.
    pub async fn recv(&mut self) {
        if self.rx.wait_for(|fired| *fired).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Installs the process interrupt handler.
///
/// Installation happens here, eagerly, so a failure is reported at startup
/// rather than when the first interrupt arrives.
#[cfg(unix)]
pub fn interrupt() -> anyhow::Result<impl Future<Output = ()>> {
    use anyhow::Context;
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt()).context("installing SIGINT handler")?;
    Ok(async move {
        sigint.recv().await;
    })
}

#[cfg(not(unix))]
pub fn interrupt() -> anyhow::Result<impl Future<Output = ()>> {
    Ok(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    })
}
