//! Run work on the thread that owns the drawing device.
//!
//! The owner keeps a [`TaskQueue`] and calls [`TaskQueue::drain`] from its
//! own loop. Other threads hold a [`Dispatcher`] and submit closures that
//! receive `&mut T`; [`Dispatcher::run_blocking`] waits until the owner has
//! executed the closure and hands back its result.

use std::sync::mpsc;
use std::thread::{self, ThreadId};

use crate::error::{Result, TableError};

type Task<T> = Box<dyn FnOnce(&mut T) + Send>;

/// Receiving side, owned by the rendering thread.
pub struct TaskQueue<T> {
    tx: mpsc::Sender<Task<T>>,
    rx: mpsc::Receiver<Task<T>>,
    owner: ThreadId,
}

impl<T> std::fmt::Debug for TaskQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskQueue").field("owner", &self.owner).finish_non_exhaustive()
    }
}

impl<T> Default for TaskQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TaskQueue<T> {
    /// Create a queue owned by the calling thread.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            owner: thread::current().id(),
        }
    }

    pub fn dispatcher(&self) -> Dispatcher<T> {
        Dispatcher {
            tx: self.tx.clone(),
            owner: self.owner,
        }
    }

    /// Run every queued task against `target`. Returns how many ran.
    pub fn drain(&self, target: &mut T) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.rx.try_recv() {
            task(target);
            ran += 1;
        }
        if ran > 0 {
            tracing::trace!(ran, "drained owner-thread tasks");
        }
        ran
    }
}

/// Sending side; cheap to clone and safe to move across threads.
pub struct Dispatcher<T> {
    tx: mpsc::Sender<Task<T>>,
    owner: ThreadId,
}

impl<T> Clone for Dispatcher<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            owner: self.owner,
        }
    }
}

impl<T> std::fmt::Debug for Dispatcher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher").field("owner", &self.owner).finish_non_exhaustive()
    }
}

impl<T: 'static> Dispatcher<T> {
    /// True when called from the thread that drains the queue.
    pub fn is_owner_thread(&self) -> bool {
        thread::current().id() == self.owner
    }

    /// Queue `task` without waiting for it.
    pub fn post<F>(&self, task: F) -> Result<()>
    where
        F: FnOnce(&mut T) + Send + 'static,
    {
        self.tx
            .send(Box::new(task))
            .map_err(|_| TableError::Dispatch("owner queue has been dropped".to_string()))
    }

    /// Queue `task` and block until the owner has run it.
    ///
    /// Fails instead of deadlocking when called on the owner thread, and
    /// when the queue is dropped before the task runs.
    pub fn run_blocking<R, F>(&self, task: F) -> Result<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut T) -> R + Send + 'static,
    {
        if self.is_owner_thread() {
            return Err(TableError::Dispatch(
                "run_blocking called on the owner thread".to_string(),
            ));
        }
        let (reply_tx, reply_rx) = mpsc::sync_channel(1);
        self.post(move |target| {
            // The waiter may have given up; nothing to report then.
            let _ = reply_tx.send(task(target));
        })?;
        reply_rx
            .recv()
            .map_err(|_| TableError::Dispatch("owner queue dropped the task".to_string()))
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_post_then_drain() {
        let queue = TaskQueue::<Vec<i32>>::new();
        let dispatcher = queue.dispatcher();
        dispatcher.post(|v| v.push(1)).unwrap();
        dispatcher.post(|v| v.push(2)).unwrap();

        let mut target = Vec::new();
        assert_eq!(queue.drain(&mut target), 2);
        assert_eq!(target, vec![1, 2]);
        assert_eq!(queue.drain(&mut target), 0);
    }

    #[test]
    fn test_run_blocking_from_other_thread() {
        let queue = TaskQueue::<i32>::new();
        let dispatcher = queue.dispatcher();
        let worker = std::thread::spawn(move || {
            dispatcher.run_blocking(|n| {
                *n += 5;
                *n
            })
        });

        let mut value = 10;
        while !worker.is_finished() {
            queue.drain(&mut value);
            std::thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(worker.join().unwrap().unwrap(), 15);
        assert_eq!(value, 15);
    }

    #[test]
    fn test_run_blocking_on_owner_fails() {
        let queue = TaskQueue::<i32>::new();
        let err = queue.dispatcher().run_blocking(|n| *n).unwrap_err();
        assert!(matches!(err, TableError::Dispatch(_)));
    }

    #[test]
    fn test_dropped_queue_reports_error() {
        let queue = TaskQueue::<i32>::new();
        let dispatcher = queue.dispatcher();
        drop(queue);
        let worker = std::thread::spawn(move || dispatcher.run_blocking(|n| *n));
        assert!(matches!(worker.join().unwrap(), Err(TableError::Dispatch(_))));
    }
}
