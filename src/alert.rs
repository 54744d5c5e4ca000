use std::io::{self, Write};
use std::sync::Arc;
use std::thread;

use anyhow::{Context, Result};

/// Audible side effect of a risky report.
pub trait AlertSink: Send + Sync {
    fn play(&self) -> Result<()>;
}

/// Rings the terminal bell.
pub struct TerminalBell;

impl AlertSink for TerminalBell {
    fn play(&self) -> Result<()> {
        let mut out = io::stdout();
        out.write_all(b"\x07").context("write bell")?;
        out.flush().context("flush bell")
    }
}

/// Fire-and-forget: playback runs detached and failures only reach the log.
pub fn fire(sink: Arc<dyn AlertSink>) {
    thread::spawn(move || {
        if let Err(err) = sink.play() {
            tracing::warn!(error = %err, "alert playback failed");
        }
    });
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::time::Duration;

    use super::*;

    struct Failing(mpsc::Sender<()>);

    impl AlertSink for Failing {
        fn play(&self) -> Result<()> {
            let _ = self.0.send(());
            anyhow::bail!("playback rejected")
        }
    }

    struct Counting(AtomicUsize, mpsc::Sender<()>);

    impl AlertSink for Counting {
        fn play(&self) -> Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            let _ = self.1.send(());
            Ok(())
        }
    }

    #[test]
    fn failures_are_swallowed() {
        let (tx, rx) = mpsc::channel();
        fire(Arc::new(Failing(tx)));
        rx.recv_timeout(Duration::from_secs(2)).expect("sink was called");
    }

    #[test]
    fn fire_plays_once() {
        let (tx, rx) = mpsc::channel();
        let sink = Arc::new(Counting(AtomicUsize::new(0), tx));
        fire(sink.clone());
        rx.recv_timeout(Duration::from_secs(2)).expect("sink was called");
        assert_eq!(sink.0.load(Ordering::SeqCst), 1);
    }
}
