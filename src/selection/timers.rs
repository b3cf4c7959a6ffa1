use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Delivered on the owner's channel when a named timer elapses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFired<K> {
    pub name: K,
    pub generation: u64,
}

struct Scheduled {
    generation: u64,
    task: JoinHandle<()>,
}

/// Named debounce timers: at most one pending fire per name.
///
/// Scheduling a name that is already pending aborts the earlier sleep and
/// starts a new one. Fires carry a generation so that a fire already sitting
/// in the channel when its timer was replaced or cancelled is rejected by
/// [`NamedTimers::accept`].
pub struct NamedTimers<K> {
    fired_tx: mpsc::UnboundedSender<TimerFired<K>>,
    pending: HashMap<K, Scheduled>,
    next_generation: u64,
}

impl<K> NamedTimers<K>
where
    K: Copy + Eq + Hash + Debug + Send + 'static,
{
    pub fn new(fired_tx: mpsc::UnboundedSender<TimerFired<K>>) -> Self {
        Self {
            fired_tx,
            pending: HashMap::new(),
            next_generation: 0,
        }
    }

    /// Must be called from within a tokio runtime.
    pub fn schedule(&mut self, name: K, delay: Duration) {
        if self.cancel(name) {
            log::debug!("Timer {:?} rescheduled ({}ms)", name, delay.as_millis());
        }

        self.next_generation += 1;
        let generation = self.next_generation;
        let fired_tx = self.fired_tx.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = fired_tx.send(TimerFired { name, generation });
        });

        self.pending.insert(name, Scheduled { generation, task });
    }

    /// Returns true when a pending timer was cancelled
    pub fn cancel(&mut self, name: K) -> bool {
        match self.pending.remove(&name) {
            Some(scheduled) => {
                scheduled.task.abort();
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&mut self) {
        for (name, scheduled) in self.pending.drain() {
            scheduled.task.abort();
            log::debug!("Timer {:?} cancelled", name);
        }
    }

    pub fn is_pending(&self, name: K) -> bool {
        self.pending.contains_key(&name)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Consume a fire. Returns false for fires of cancelled or replaced timers.
    pub fn accept(&mut self, fired: &TimerFired<K>) -> bool {
        match self.pending.get(&fired.name) {
            Some(scheduled) if scheduled.generation == fired.generation => {
                self.pending.remove(&fired.name);
                true
            }
            _ => {
                log::debug!(
                    "Discarding stale fire for {:?} (generation {})",
                    fired.name,
                    fired.generation
                );
                false
            }
        }
    }
}

impl<K> Drop for NamedTimers<K> {
    fn drop(&mut self) {
        for (_, scheduled) in self.pending.drain() {
            scheduled.task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{timeout, Instant};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Name {
        Alpha,
        Beta,
    }

    fn timers() -> (NamedTimers<Name>, mpsc::UnboundedReceiver<TimerFired<Name>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (NamedTimers::new(tx), rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_fires_once_with_latest_delay() {
        let (mut timers, mut rx) = timers();
        let start = Instant::now();

        timers.schedule(Name::Alpha, Duration::from_millis(1000));
        timers.schedule(Name::Alpha, Duration::from_millis(200));
        assert_eq!(timers.pending_count(), 1);

        let fired = rx.recv().await.expect("timer should fire");
        assert_eq!(fired.name, Name::Alpha);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(200));
        assert!(elapsed < Duration::from_millis(1000));
        assert!(timers.accept(&fired));
        assert!(!timers.is_pending(Name::Alpha));

        let second = timeout(Duration::from_secs(5), rx.recv()).await;
        assert!(second.is_err(), "replaced timer must not fire");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_fire() {
        let (mut timers, mut rx) = timers();

        timers.schedule(Name::Alpha, Duration::from_millis(300));
        assert!(timers.cancel(Name::Alpha));
        assert!(!timers.cancel(Name::Alpha));

        let fired = timeout(Duration::from_secs(5), rx.recv()).await;
        assert!(fired.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_names_are_independent() {
        let (mut timers, mut rx) = timers();

        timers.schedule(Name::Alpha, Duration::from_millis(300));
        timers.schedule(Name::Beta, Duration::from_millis(100));

        let first = rx.recv().await.unwrap();
        assert_eq!(first.name, Name::Beta);
        assert!(timers.accept(&first));
        assert!(timers.is_pending(Name::Alpha));

        let second = rx.recv().await.unwrap();
        assert_eq!(second.name, Name::Alpha);
        assert!(timers.accept(&second));
        assert_eq!(timers.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_all_clears_everything() {
        let (mut timers, mut rx) = timers();

        timers.schedule(Name::Alpha, Duration::from_millis(300));
        timers.schedule(Name::Beta, Duration::from_millis(100));
        timers.cancel_all();
        assert_eq!(timers.pending_count(), 0);

        assert!(timeout(Duration::from_secs(5), rx.recv()).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_fire_is_rejected() {
        let (mut timers, _rx) = timers();

        timers.schedule(Name::Alpha, Duration::from_millis(300));
        let stale = TimerFired {
            name: Name::Alpha,
            generation: 0,
        };
        assert!(!timers.accept(&stale));
        assert!(timers.is_pending(Name::Alpha));

        let unknown = TimerFired {
            name: Name::Beta,
            generation: 1,
        };
        assert!(!timers.accept(&unknown));
    }
}
