//! Dedicated UI task thread with channel-based communication.
//!
//! Hosts that already own a UI event loop implement [`UiExecutor`] on top of
//! it. [`UiThread`] is the standalone variant: a named thread draining an
//! mpsc queue of tasks, in order.
//!
//! ```text
//! Producer thread                     UI thread
//! ---------------                     ---------
//! post(task)      ─── Run(task) ───▶  run task (panics caught and logged)
//! shutdown()      ─── Shutdown  ───▶  finish queued tasks, exit
//! join            ◀────────────────
//! ```

use super::{UiExecutor, UiTask};
use crate::event::{LogLevel, emit_log};
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

/// Commands sent to the UI thread.
enum UiCommand {
    /// Run one task.
    Run(UiTask),
    /// Exit after the tasks queued before this command.
    Shutdown,
}

/// A standalone UI thread.
///
/// `UiThread` is `Sync`, so it can be shared behind an `Arc` as the executor
/// of a [`RedrawCoalescer`](super::RedrawCoalescer) while the owner keeps a
/// handle for shutdown.
pub struct UiThread {
    tx: Sender<UiCommand>,
    handle: Mutex<Option<JoinHandle<()>>>,
    tasks_run: Arc<AtomicU64>,
}

impl UiThread {
    /// Spawn the UI thread.
    pub fn spawn() -> io::Result<Self> {
        let (tx, rx) = mpsc::channel::<UiCommand>();
        let tasks_run = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&tasks_run);

        let handle = thread::Builder::new()
            .name("printtape-ui".to_string())
            .spawn(move || ui_thread_main(&rx, &counter))?;

        Ok(Self {
            tx,
            handle: Mutex::new(Some(handle)),
            tasks_run,
        })
    }

    /// Number of tasks that have finished running, panicked ones included.
    #[must_use]
    pub fn tasks_run(&self) -> u64 {
        self.tasks_run.load(Ordering::Acquire)
    }

    /// Run every task queued so far, then stop the thread.
    ///
    /// Tasks posted after shutdown are dropped unrun, which releases any
    /// redraw flag they carry. Calling this twice is a no-op.
    pub fn shutdown(&self) -> io::Result<()> {
        let handle = self
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(handle) = handle else {
            return Ok(());
        };
        // A send error means the thread is already gone; join reports why.
        let _ = self.tx.send(UiCommand::Shutdown);
        handle
            .join()
            .map_err(|_| io::Error::other("UI thread panicked"))
    }
}

impl UiExecutor for UiThread {
    fn post(&self, task: UiTask) {
        // The returned task is dropped here, clearing its pending flag.
        if self.tx.send(UiCommand::Run(task)).is_err() {
            emit_log(LogLevel::Warn, "UI thread stopped; dropping redraw task");
        }
    }
}

impl Drop for UiThread {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

impl std::fmt::Debug for UiThread {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiThread")
            .field("tasks_run", &self.tasks_run())
            .finish_non_exhaustive()
    }
}

fn ui_thread_main(rx: &Receiver<UiCommand>, tasks_run: &AtomicU64) {
    // Ends on Shutdown or when every sender is gone.
    while let Ok(UiCommand::Run(task)) = rx.recv() {
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(task)) {
            let msg = panic_message(payload.as_ref());
            emit_log(LogLevel::Error, &format!("UI task panicked: {msg}"));
        }
        tasks_run.fetch_add(1, Ordering::AcqRel);
    }
}

fn panic_message(payload: &dyn std::any::Any) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "UI task panicked".to_string())
}
