use std::sync::Arc;
use tokio::sync::broadcast;

/// Bounded broadcast channel between the macroquad render loop and the tokio tasks.
///
/// Clicks travel from the render thread to the navigation task, and snapshots
/// and grids travel back, so `T` must be `Send + Sync`. Slow subscribers lose
/// the oldest messages rather than blocking the publisher.
#[derive(Debug, Clone)]
pub struct Topic<T> {
    tx: broadcast::Sender<Arc<T>>,
}

impl<T: Send + Sync + 'static> Topic<T> {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publishes `msg`; dropped silently when nobody is subscribed.
    pub fn publish(&self, msg: T) {
        let _ = self.tx.send(Arc::new(msg));
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<T>> {
        self.tx.subscribe()
    }

    /// Raw sender for tasks that publish through the channel directly.
    pub fn sender(&self) -> broadcast::Sender<Arc<T>> {
        self.tx.clone()
    }
}
