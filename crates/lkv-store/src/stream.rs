//! Lazy key enumeration through a bounded producer/consumer handoff.
//!
//! A background thread scans the bucket and pushes keys into a bounded
//! channel. The producer blocks while the channel is full, ends the stream
//! with an explicit end marker, and stops early once the consumer cancels or
//! goes away.

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::traits::OrderedStore;

/// Number of keys buffered between producer and consumer.
pub const STREAM_CAPACITY: usize = 64;

enum Handoff {
    Key(String),
    End,
    Failed(StoreError),
}

/// A finite, non-restartable sequence of bucket keys in ascending order.
///
/// Consume it with [`next_key`](Self::next_key) from async code or as an
/// [`Iterator`] from blocking code. Dropping the stream cancels the producer.
pub struct KeyStream {
    bucket: String,
    rx: mpsc::Receiver<Handoff>,
    cancel: Arc<AtomicBool>,
    finished: bool,
}

impl KeyStream {
    /// Start a producer thread scanning every key of `store`.
    pub fn spawn<S>(bucket: &str, store: Arc<S>) -> StoreResult<Self>
    where
        S: OrderedStore + ?Sized + 'static,
    {
        let (tx, rx) = mpsc::channel(STREAM_CAPACITY);
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);
        let label = bucket.to_string();

        thread::Builder::new()
            .name(format!("lkv-keys-{bucket}"))
            .spawn(move || {
                let mut sent = 0usize;
                let scanned = store.scan(&[], None, &mut |key, _| {
                    if flag.load(Ordering::Relaxed) {
                        return ControlFlow::Break(());
                    }
                    let key = String::from_utf8_lossy(key).into_owned();
                    match tx.blocking_send(Handoff::Key(key)) {
                        Ok(()) => {
                            sent += 1;
                            ControlFlow::Continue(())
                        }
                        Err(_) => ControlFlow::Break(()),
                    }
                });

                if flag.load(Ordering::Relaxed) || tx.is_closed() {
                    debug!(bucket = %label, sent, "key stream cancelled");
                    return;
                }
                let last = match scanned {
                    Ok(()) => Handoff::End,
                    Err(err) => {
                        warn!(bucket = %label, error = %err, "key stream scan failed");
                        Handoff::Failed(err)
                    }
                };
                let _ = tx.blocking_send(last);
                debug!(bucket = %label, sent, "key stream finished");
            })?;

        Ok(Self {
            bucket: bucket.to_string(),
            rx,
            cancel,
            finished: false,
        })
    }

    /// A stream that yields nothing, for buckets that do not exist.
    pub fn empty(bucket: &str) -> Self {
        let (tx, rx) = mpsc::channel(1);
        // Capacity 1 and a fresh channel: this cannot fail.
        let _ = tx.try_send(Handoff::End);
        Self {
            bucket: bucket.to_string(),
            rx,
            cancel: Arc::new(AtomicBool::new(false)),
            finished: false,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Ask the producer to stop at its next key.
    pub fn cancel(&mut self) {
        self.cancel.store(true, Ordering::Relaxed);
        self.rx.close();
        self.finished = true;
    }

    /// Receive the next key asynchronously. `None` after the end marker.
    pub async fn next_key(&mut self) -> Option<StoreResult<String>> {
        if self.finished {
            return None;
        }
        let handoff = self.rx.recv().await;
        self.settle(handoff)
    }

    /// Receive the next key, blocking the current thread.
    ///
    /// Must not be called from inside an async runtime.
    pub fn blocking_next(&mut self) -> Option<StoreResult<String>> {
        if self.finished {
            return None;
        }
        let handoff = self.rx.blocking_recv();
        self.settle(handoff)
    }

    fn settle(&mut self, handoff: Option<Handoff>) -> Option<StoreResult<String>> {
        match handoff {
            Some(Handoff::Key(key)) => Some(Ok(key)),
            Some(Handoff::End) => {
                self.finished = true;
                None
            }
            Some(Handoff::Failed(err)) => {
                self.finished = true;
                Some(Err(err))
            }
            None => {
                self.finished = true;
                Some(Err(StoreError::StreamInterrupted(self.bucket.clone())))
            }
        }
    }
}

impl Iterator for KeyStream {
    type Item = StoreResult<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.blocking_next()
    }
}

impl Drop for KeyStream {
    fn drop(&mut self) {
        self.cancel.store(true, Ordering::Relaxed);
    }
}

impl std::fmt::Debug for KeyStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyStream")
            .field("bucket", &self.bucket)
            .field("finished", &self.finished)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use std::time::{Duration, Instant};

    fn store_with(n: usize) -> Arc<InMemoryStore> {
        let store = InMemoryStore::new();
        for i in 0..n {
            store.put(format!("key{i:04}").as_bytes(), b"").unwrap();
        }
        Arc::new(store)
    }

    #[test]
    fn yields_all_keys_in_order() {
        let stream = KeyStream::spawn("b", store_with(200)).unwrap();
        let keys: Vec<String> = stream.map(Result::unwrap).collect();
        assert_eq!(keys.len(), 200);
        assert_eq!(keys[0], "key0000");
        assert_eq!(keys[199], "key0199");
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn stream_is_not_restartable() {
        let mut stream = KeyStream::spawn("b", store_with(2)).unwrap();
        assert!(stream.blocking_next().is_some());
        assert!(stream.blocking_next().is_some());
        assert!(stream.blocking_next().is_none());
        assert!(stream.blocking_next().is_none());
    }

    #[test]
    fn empty_stream_ends_immediately() {
        let mut stream = KeyStream::empty("missing");
        assert!(stream.blocking_next().is_none());
        assert_eq!(stream.bucket(), "missing");
    }

    #[test]
    fn cancel_stops_consumption() {
        let mut stream = KeyStream::spawn("b", store_with(STREAM_CAPACITY * 4)).unwrap();
        assert!(stream.blocking_next().is_some());
        stream.cancel();
        assert!(stream.blocking_next().is_none());
    }

    #[test]
    fn dropping_the_stream_stops_the_producer() {
        let store = store_with(STREAM_CAPACITY * 4);
        let mut stream = KeyStream::spawn("b", Arc::clone(&store)).unwrap();
        assert!(stream.blocking_next().is_some());
        drop(stream);

        // The producer holds the only other reference until it exits.
        let deadline = Instant::now() + Duration::from_secs(5);
        while Arc::strong_count(&store) > 1 {
            assert!(Instant::now() < deadline, "producer thread did not exit");
            thread::sleep(Duration::from_millis(10));
        }
    }

    #[tokio::test]
    async fn async_consumer_receives_keys() {
        let mut stream = KeyStream::spawn("b", store_with(3)).unwrap();
        let mut keys = Vec::new();
        while let Some(key) = stream.next_key().await {
            keys.push(key.unwrap());
        }
        assert_eq!(keys, vec!["key0000", "key0001", "key0002"]);
    }
}
