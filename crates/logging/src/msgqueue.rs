// SPDX-License-Identifier: MIT

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

/// The 1-second wake deadline: bounds teardown latency even when no
/// producer signals the condition variable.
const WAKE_INTERVAL: Duration = Duration::from_secs(1);

struct Shared<T> {
    queue: Mutex<VecDeque<T>>,
    cond: Condvar,
    stop: AtomicBool,
}

/// Named single-consumer in-process FIFO with condition-variable wakeup.
/// `enqueue` transfers ownership of the payload to the queue; the
/// dedicated consumer thread processes items strictly in enqueue order
/// and then drops them.
pub struct MsgQueue<T> {
    shared: Arc<Shared<T>>,
    handle: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> MsgQueue<T> {
    /// Spawn a dedicated consumer thread named `name` (truncated to 15
    /// bytes, the common pthread thread-name length limit) that
    /// repeatedly waits up to one second for work and invokes `consumer`
    /// on each item in FIFO order.
    pub fn create<F>(name: &str, mut consumer: F) -> std::io::Result<Self>
    where
        F: FnMut(T) + Send + 'static,
    {
        let shared = Arc::new(Shared {
            queue: Mutex::new(VecDeque::new()),
            cond: Condvar::new(),
            stop: AtomicBool::new(false),
        });

        let thread_name: String = name.chars().take(15).collect();
        let worker = Arc::clone(&shared);
        let handle = std::thread::Builder::new()
            .name(thread_name)
            .spawn(move || consume_loop(worker, &mut consumer))?;

        Ok(MsgQueue { shared, handle: Some(handle) })
    }

    /// Append `payload` to the tail and wake the consumer. Never blocks on
    /// the consumer; producers are unbounded (no backpressure).
    pub fn enqueue(&self, payload: T) {
        let mut queue = self.shared.queue.lock().unwrap_or_else(|e| e.into_inner());
        queue.push_back(payload);
        self.shared.cond.notify_one();
    }

    /// Signal the consumer thread to stop and join it. Worst-case latency
    /// is the 1-second wake interval.
    pub fn shutdown(mut self) {
        self.shared.stop.store(true, Ordering::SeqCst);
        self.shared.cond.notify_one();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn consume_loop<T, F: FnMut(T)>(shared: Arc<Shared<T>>, consumer: &mut F) {
    loop {
        let item = {
            let mut queue = shared.queue.lock().unwrap_or_else(|e| e.into_inner());
            loop {
                if let Some(item) = queue.pop_front() {
                    break Some(item);
                }
                if shared.stop.load(Ordering::SeqCst) {
                    return;
                }
                let (guard, timeout) =
                    shared.cond.wait_timeout(queue, WAKE_INTERVAL).unwrap_or_else(|e| e.into_inner());
                queue = guard;
                if timeout.timed_out() && queue.is_empty() {
                    if shared.stop.load(Ordering::SeqCst) {
                        return;
                    }
                    continue;
                }
            }
        };
        if let Some(item) = item {
            consumer(item);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn delivers_in_enqueue_order() {
        let (tx, rx) = mpsc::channel();
        let queue = MsgQueue::create("testq", move |item: u32| {
            tx.send(item).unwrap();
        })
        .unwrap();

        for i in 0..50 {
            queue.enqueue(i);
        }

        for expected in 0..50 {
            let got = rx.recv_timeout(Duration::from_secs(2)).unwrap();
            assert_eq!(got, expected);
        }
        queue.shutdown();
    }

    #[test]
    fn shutdown_joins_within_wake_interval() {
        let queue: MsgQueue<u32> = MsgQueue::create("idleq", |_| {}).unwrap();
        let start = std::time::Instant::now();
        queue.shutdown();
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn each_payload_consumed_exactly_once() {
        let (tx, rx) = mpsc::channel();
        let queue = MsgQueue::create("onceq", move |item: u32| {
            tx.send(item).unwrap();
        })
        .unwrap();
        for i in 0..20 {
            queue.enqueue(i);
        }
        let mut seen = Vec::new();
        for _ in 0..20 {
            seen.push(rx.recv_timeout(Duration::from_secs(2)).unwrap());
        }
        seen.sort_unstable();
        assert_eq!(seen, (0..20).collect::<Vec<_>>());
        queue.shutdown();
    }

    proptest::proptest! {
        /// For any sequence of payloads enqueued back to back, the consumer
        /// observes them in exactly that order — enqueue-order is
        /// delivery-order, regardless of how many items or how they're
        /// interleaved with the consumer waking up.
        #[test]
        fn fifo_ordering_holds_for_arbitrary_sequences(items in proptest::collection::vec(0i32..10_000, 0..200)) {
            let (tx, rx) = mpsc::channel();
            let queue = MsgQueue::create("propq", move |item: i32| {
                let _ = tx.send(item);
            })
            .unwrap();

            for &item in &items {
                queue.enqueue(item);
            }

            let mut received = Vec::with_capacity(items.len());
            for _ in 0..items.len() {
                received.push(rx.recv_timeout(Duration::from_secs(5)).unwrap());
            }

            proptest::prop_assert_eq!(received, items);
            queue.shutdown();
        }
    }
}
