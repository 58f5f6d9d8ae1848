//! Bounded frame queue between detector callbacks and the render tick
//!
//! Detector results may arrive on another thread; they are pushed here and
//! drained in order by the owning session on its tick.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{TrackingError, TrackingResult};

struct Inner<T> {
    items: VecDeque<T>,
    capacity: usize,
}

/// Owning side of the queue
pub struct DispatchQueue<T> {
    inner: Arc<Mutex<Inner<T>>>,
}

/// Cloneable producer handle
pub struct DispatchHandle<T> {
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T> DispatchQueue<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                items: VecDeque::with_capacity(capacity),
                capacity,
            })),
        }
    }

    pub fn handle(&self) -> DispatchHandle<T> {
        DispatchHandle {
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn push(&self, item: T) -> TrackingResult<()> {
        push(&self.inner, item)
    }

    /// Take every queued item, oldest first
    pub fn drain(&self) -> Vec<T> {
        self.inner.lock().items.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity
    }
}

impl<T> DispatchHandle<T> {
    /// Fails with `QueueFull` instead of blocking or dropping old frames
    pub fn push(&self, item: T) -> TrackingResult<()> {
        push(&self.inner, item)
    }
}

impl<T> Clone for DispatchHandle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

fn push<T>(inner: &Mutex<Inner<T>>, item: T) -> TrackingResult<()> {
    let mut guard = inner.lock();
    if guard.items.len() >= guard.capacity {
        return Err(TrackingError::QueueFull {
            capacity: guard.capacity,
        });
    }
    guard.items.push_back(item);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let queue = DispatchQueue::new(4);
        queue.push(1).unwrap();
        queue.handle().push(2).unwrap();
        queue.push(3).unwrap();
        assert_eq!(queue.drain(), vec![1, 2, 3]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_full_queue_rejects() {
        let queue = DispatchQueue::new(2);
        queue.push('a').unwrap();
        queue.push('b').unwrap();
        assert_eq!(queue.push('c'), Err(TrackingError::QueueFull { capacity: 2 }));
        assert_eq!(queue.drain(), vec!['a', 'b']);
        assert!(queue.push('c').is_ok());
    }

    #[test]
    fn test_handle_from_other_thread() {
        let queue = DispatchQueue::new(16);
        let handle = queue.handle();
        std::thread::spawn(move || {
            for i in 0..10 {
                handle.push(i).unwrap();
            }
        })
        .join()
        .unwrap();
        assert_eq!(queue.drain(), (0..10).collect::<Vec<_>>());
    }
}
