//! Debounced scroll-to-bottom signal
//!
//! Live ingestion asks the view to scroll after layout settles; rapid bursts
//! coalesce into one signal per quiet period.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

/// Emits one `()` per debounced scroll request
pub struct ScrollNotifier {
    delay: Duration,
    tx: mpsc::UnboundedSender<()>,
    generation: Arc<AtomicU64>,
}

impl ScrollNotifier {
    /// Fixed settle delay for layout before scrolling
    pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(50);

    /// Create a notifier and the receiver the view listens on
    #[must_use]
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                delay,
                tx,
                generation: Arc::new(AtomicU64::new(0)),
            },
            rx,
        )
    }

    /// Request a scroll; bursts within the delay window collapse to one signal
    pub fn request(&self) {
        let my_generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let generation = self.generation.clone();
        let tx = self.tx.clone();
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Superseded by a newer request while we slept
            if generation.load(Ordering::SeqCst) == my_generation {
                let _ = tx.send(());
            }
        });
    }
}
