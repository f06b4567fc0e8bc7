#![forbid(unsafe_code)]

//! FIFO task queue for deferring work past the current call turn.
//!
//! Session construction schedules its provider acquisition here instead of
//! running it inline, so listeners registered immediately after construction
//! are guaranteed to be in place before any event can fire. The embedder
//! pumps the queue from its own loop; everything stays on one logical
//! thread.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

type Task = Box<dyn FnOnce()>;

/// A cloneable handle to a shared FIFO queue of deferred thunks.
#[derive(Clone, Default)]
pub struct TaskQueue {
    inner: Rc<RefCell<VecDeque<Task>>>,
}

impl TaskQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a task to run on a later pump.
    pub fn schedule(&self, task: impl FnOnce() + 'static) {
        self.inner.borrow_mut().push_back(Box::new(task));
    }

    /// Run the oldest pending task. Returns false if the queue was empty.
    ///
    /// The queue borrow is released before the task runs, so tasks may
    /// schedule further tasks.
    pub fn run_one(&self) -> bool {
        let task = self.inner.borrow_mut().pop_front();
        match task {
            Some(task) => {
                task();
                true
            }
            None => false,
        }
    }

    /// Run up to `limit` tasks; returns how many ran.
    pub fn run_at_most(&self, limit: usize) -> usize {
        let mut ran = 0;
        while ran < limit && self.run_one() {
            ran += 1;
        }
        ran
    }

    /// Drain the queue, including tasks scheduled while draining.
    ///
    /// A task that perpetually reschedules itself will keep this from
    /// returning; use [`run_at_most`](Self::run_at_most) where that matters.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while self.run_one() {
            ran += 1;
        }
        ran
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }
}

impl std::fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskQueue").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tasks_run_in_fifo_order() {
        let queue = TaskQueue::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for tag in 1..=3 {
            let log = log.clone();
            queue.schedule(move || log.borrow_mut().push(tag));
        }
        assert_eq!(queue.run_until_idle(), 3);
        assert_eq!(*log.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn run_one_pops_a_single_task() {
        let queue = TaskQueue::new();
        queue.schedule(|| {});
        queue.schedule(|| {});
        assert!(queue.run_one());
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn run_one_on_empty_queue_is_false() {
        let queue = TaskQueue::new();
        assert!(!queue.run_one());
    }

    #[test]
    fn tasks_scheduled_while_draining_also_run() {
        let queue = TaskQueue::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        {
            let queue2 = queue.clone();
            let log = log.clone();
            queue.schedule(move || {
                log.borrow_mut().push(1);
                let log = log.clone();
                queue2.schedule(move || log.borrow_mut().push(2));
            });
        }
        assert_eq!(queue.run_until_idle(), 2);
        assert_eq!(*log.borrow(), vec![1, 2]);
    }

    #[test]
    fn run_at_most_respects_the_limit() {
        let queue = TaskQueue::new();
        for _ in 0..5 {
            queue.schedule(|| {});
        }
        assert_eq!(queue.run_at_most(3), 3);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn clones_share_the_queue() {
        let queue = TaskQueue::new();
        let other = queue.clone();
        other.schedule(|| {});
        assert_eq!(queue.len(), 1);
    }
}
