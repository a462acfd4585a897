use tokio::sync::watch;

/// Resolves once the process has been asked to stop (SIGINT, or SIGTERM on
/// unix).
pub struct ShutdownSignal {
    requested: watch::Receiver<bool>,
}

impl ShutdownSignal {
    pub fn install() -> Self {
        let (trigger, requested) = watch::channel(false);

        let on_ctrl_c = trigger.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::debug!(target: "shutdown", "SIGINT received");
                let _ = on_ctrl_c.send(true);
            }
        });

        #[cfg(unix)]
        tokio::spawn(async move {
            use tokio::signal::unix::{signal, SignalKind};
            if let Ok(mut term) = signal(SignalKind::terminate()) {
                term.recv().await;
                tracing::debug!(target: "shutdown", "SIGTERM received");
                let _ = trigger.send(true);
            }
        });

        Self { requested }
    }

    /// Also returns immediately when the stop was requested earlier.
    pub async fn received(&mut self) {
        // a dropped sender means no signal can arrive any more; keep waiting
        if self.requested.wait_for(|stop| *stop).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
impl ShutdownSignal {
    fn manual() -> (watch::Sender<bool>, Self) {
        let (trigger, requested) = watch::channel(false);
        (trigger, Self { requested })
    }
}
