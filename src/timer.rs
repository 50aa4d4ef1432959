use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Background task that sends a message on every interval until cancelled.
///
/// Dropping the timer cancels it, so a session that is submitted, discarded or
/// abandoned never leaves a tick source running behind it.
pub struct CountdownTimer {
    cancelled: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl CountdownTimer {
    pub fn start<T>(tx: Sender<T>, interval: Duration, make_tick: fn() -> T) -> Self
    where
        T: Send + 'static,
    {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);

        let handle = thread::spawn(move || loop {
            thread::sleep(interval);
            if flag.load(Ordering::Acquire) {
                break;
            }
            if tx.send(make_tick()).is_err() {
                break;
            }
        });

        Self {
            cancelled,
            handle: Some(handle),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn cancel(&mut self) {
        if self.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        tracing::debug!("countdown timer cancelled");
        // the worker exits after its current sleep; no need to block on it
        self.handle.take();
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
