//! Coalesced redraw scheduling.
//!
//! The producer may append print rows far faster than the UI can lay out
//! and paint them. [`RedrawCoalescer`] keeps at most one layout task and one
//! paint task outstanding on the UI queue at any time:
//!
//! ```text
//! Producer                              UI thread
//! --------                              ---------
//! request_layout()  pending? no ──post──▶ task: clear, layout()
//! request_layout()  pending? yes (noop)
//! request_paint()   pending? no ──post──▶ task: clear, paint()
//! ```
//!
//! Requests never block on the UI and are never dropped: a request made
//! while a task is pending is served by that task, and a request made while
//! a pass is running posts the next one. The flag lock is only held to flip
//! the flag, never across a pass. A task the executor drops without running
//! clears its flag as well.

mod ui_thread;

pub use ui_thread::UiThread;

use bitflags::bitflags;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Unit of work posted to the UI queue.
pub type UiTask = Box<dyn FnOnce() + Send + 'static>;

/// A queue that runs tasks on the UI thread, in order.
pub trait UiExecutor: Send + Sync {
    fn post(&self, task: UiTask);
}

impl<F> UiExecutor for F
where
    F: Fn(UiTask) + Send + Sync,
{
    fn post(&self, task: UiTask) {
        self(task);
    }
}

/// The view being kept in sync with the print-out.
pub trait RedrawTarget: Send + Sync {
    /// Re-measure after the number of printed rows changed.
    fn layout(&self);
    /// Scroll to the newest row and repaint.
    fn paint(&self);
}

/// Which pass a log mutation needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Redraw {
    /// The row count changed, so the view must be re-measured.
    Layout,
    /// Same height, new content.
    Paint,
}

bitflags! {
    /// Passes currently waiting on the UI queue.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
    pub struct Passes: u8 {
        const LAYOUT = 0x01;
        const PAINT  = 0x02;
    }
}

type Pending = Arc<Mutex<bool>>;

fn lock(flag: &Mutex<bool>) -> MutexGuard<'_, bool> {
    flag.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clears a pending flag once, when the task starts or when it is dropped.
struct Release(Option<Pending>);

impl Release {
    fn release(&mut self) {
        if let Some(flag) = self.0.take() {
            *lock(&flag) = false;
        }
    }
}

impl Drop for Release {
    fn drop(&mut self) {
        self.release();
    }
}

/// Collapses bursts of redraw requests into single UI tasks.
///
/// Cloning shares the pending flags, so every clone coalesces with the
/// others.
#[derive(Clone)]
pub struct RedrawCoalescer {
    executor: Arc<dyn UiExecutor>,
    target: Arc<dyn RedrawTarget>,
    layout_pending: Pending,
    paint_pending: Pending,
}

impl RedrawCoalescer {
    pub fn new(executor: Arc<dyn UiExecutor>, target: Arc<dyn RedrawTarget>) -> Self {
        Self {
            executor,
            target,
            layout_pending: Arc::new(Mutex::new(false)),
            paint_pending: Arc::new(Mutex::new(false)),
        }
    }

    /// Schedule a layout pass unless one is already pending.
    pub fn request_layout(&self) {
        self.schedule(&self.layout_pending, |target| target.layout());
    }

    /// Schedule a scroll-to-bottom and repaint unless one is already pending.
    pub fn request_paint(&self) {
        self.schedule(&self.paint_pending, |target| target.paint());
    }

    /// Schedule the pass a log mutation asked for.
    pub fn request(&self, redraw: Redraw) {
        match redraw {
            Redraw::Layout => self.request_layout(),
            Redraw::Paint => self.request_paint(),
        }
    }

    #[must_use]
    pub fn is_layout_pending(&self) -> bool {
        *lock(&self.layout_pending)
    }

    #[must_use]
    pub fn is_paint_pending(&self) -> bool {
        *lock(&self.paint_pending)
    }

    /// Snapshot of both pending flags.
    #[must_use]
    pub fn pending(&self) -> Passes {
        let mut passes = Passes::empty();
        passes.set(Passes::LAYOUT, self.is_layout_pending());
        passes.set(Passes::PAINT, self.is_paint_pending());
        passes
    }

    fn schedule(&self, flag: &Pending, pass: fn(&dyn RedrawTarget)) {
        {
            let mut pending = lock(flag);
            if *pending {
                return;
            }
            *pending = true;
        }
        // Posted after the guard is released so an executor that runs tasks
        // inline cannot deadlock on the flag.
        let mut release = Release(Some(Arc::clone(flag)));
        let target = Arc::clone(&self.target);
        self.executor.post(Box::new(move || {
            release.release();
            pass(target.as_ref());
        }));
    }
}

impl std::fmt::Debug for RedrawCoalescer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedrawCoalescer")
            .field("pending", &self.pending())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::OnceLock;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingTarget {
        layouts: AtomicUsize,
        paints: AtomicUsize,
    }

    impl RedrawTarget for CountingTarget {
        fn layout(&self) {
            self.layouts.fetch_add(1, Ordering::SeqCst);
        }
        fn paint(&self) {
            self.paints.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct ManualQueue(Mutex<VecDeque<UiTask>>);

    impl UiExecutor for ManualQueue {
        fn post(&self, task: UiTask) {
            self.0.lock().unwrap().push_back(task);
        }
    }

    impl ManualQueue {
        fn len(&self) -> usize {
            self.0.lock().unwrap().len()
        }

        fn drop_all(&self) {
            self.0.lock().unwrap().clear();
        }

        fn run_all(&self) {
            loop {
                let task = self.0.lock().unwrap().pop_front();
                match task {
                    Some(task) => task(),
                    None => break,
                }
            }
        }
    }

    fn setup() -> (Arc<ManualQueue>, Arc<CountingTarget>, RedrawCoalescer) {
        let queue = Arc::new(ManualQueue::default());
        let target = Arc::new(CountingTarget::default());
        let coalescer = RedrawCoalescer::new(queue.clone(), target.clone());
        (queue, target, coalescer)
    }

    #[test]
    fn test_repeat_requests_coalesce() {
        let (queue, target, coalescer) = setup();
        for _ in 0..100 {
            coalescer.request_layout();
            coalescer.request_paint();
        }
        assert_eq!(queue.len(), 2);
        assert_eq!(coalescer.pending(), Passes::LAYOUT | Passes::PAINT);

        queue.run_all();
        assert_eq!(target.layouts.load(Ordering::SeqCst), 1);
        assert_eq!(target.paints.load(Ordering::SeqCst), 1);
        assert_eq!(coalescer.pending(), Passes::empty());
    }

    #[test]
    fn test_request_after_run_posts_again() {
        let (queue, target, coalescer) = setup();
        coalescer.request(Redraw::Paint);
        queue.run_all();
        coalescer.request(Redraw::Paint);
        assert!(coalescer.is_paint_pending());
        assert!(!coalescer.is_layout_pending());
        queue.run_all();
        assert_eq!(target.paints.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_inline_executor_does_not_deadlock() {
        let target = Arc::new(CountingTarget::default());
        let inline = |task: UiTask| task();
        let coalescer = RedrawCoalescer::new(Arc::new(inline), target.clone());
        coalescer.request_layout();
        coalescer.request_layout();
        assert_eq!(target.layouts.load(Ordering::SeqCst), 2);
        assert!(!coalescer.is_layout_pending());
    }

    #[test]
    fn test_panicking_pass_clears_flag() {
        struct Exploding;
        impl RedrawTarget for Exploding {
            fn layout(&self) {
                panic!("layout failed");
            }
            fn paint(&self) {}
        }

        let queue = Arc::new(ManualQueue::default());
        let coalescer = RedrawCoalescer::new(queue.clone(), Arc::new(Exploding));
        coalescer.request_layout();
        let result = panic::catch_unwind(AssertUnwindSafe(|| queue.run_all()));
        assert!(result.is_err());
        assert!(!coalescer.is_layout_pending());
    }

    #[test]
    fn test_clones_share_flags() {
        let (queue, _target, coalescer) = setup();
        let other = coalescer.clone();
        coalescer.request_paint();
        other.request_paint();
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_pass_can_request_itself() {
        #[derive(Default)]
        struct Reentrant {
            coalescer: OnceLock<RedrawCoalescer>,
            layouts: AtomicUsize,
        }
        impl RedrawTarget for Reentrant {
            fn layout(&self) {
                let first = self.layouts.fetch_add(1, Ordering::SeqCst) == 0;
                if let Some(coalescer) = self.coalescer.get().filter(|_| first) {
                    coalescer.request_layout();
                }
            }
            fn paint(&self) {}
        }

        let target = Arc::new(Reentrant::default());
        let inline = |task: UiTask| task();
        let coalescer = RedrawCoalescer::new(Arc::new(inline), target.clone());
        target.coalescer.set(coalescer.clone()).unwrap();

        coalescer.request_layout();
        assert_eq!(target.layouts.load(Ordering::SeqCst), 2);
        assert!(!coalescer.is_layout_pending());
    }

    #[test]
    fn test_flag_clear_before_pass_runs() {
        struct Observer(OnceLock<RedrawCoalescer>, AtomicUsize);
        impl RedrawTarget for Observer {
            fn layout(&self) {}
            fn paint(&self) {
                if self.0.get().is_some_and(|c| !c.is_paint_pending()) {
                    self.1.fetch_add(1, Ordering::SeqCst);
                }
            }
        }

        let queue = Arc::new(ManualQueue::default());
        let target = Arc::new(Observer(OnceLock::new(), AtomicUsize::new(0)));
        let coalescer = RedrawCoalescer::new(queue.clone(), target.clone());
        target.0.set(coalescer.clone()).unwrap();

        coalescer.request_paint();
        queue.run_all();
        assert_eq!(target.1.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dropped_task_clears_flag() {
        let (queue, target, coalescer) = setup();
        coalescer.request_layout();
        coalescer.request_paint();
        assert_eq!(coalescer.pending(), Passes::LAYOUT | Passes::PAINT);

        queue.drop_all();
        assert_eq!(coalescer.pending(), Passes::empty());

        coalescer.request_layout();
        assert_eq!(queue.len(), 1);
        queue.run_all();
        assert_eq!(target.layouts.load(Ordering::SeqCst), 1);
    }
}
