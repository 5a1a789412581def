//! Change notification.
//!
//! After each successful mutation the service emits a payload-free "persons
//! changed" signal. Delivery is best effort: sending never blocks and never
//! fails the mutation that triggered it.

use tokio::sync::broadcast;

/// The signal sent to subscribers. Carries no data; subscribers re-query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersonsChanged;

/// Receives a signal after every successful mutation.
///
/// Implementations must return promptly and must not panic.
pub trait ChangeNotifier: Send + Sync {
  fn notify_changed(&self);
}

/// Fans the signal out to every subscriber of a tokio broadcast channel.
///
/// Slow subscribers that fall more than `capacity` signals behind observe a
/// lag error on their receiver; the sender is never held up.
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
  tx: broadcast::Sender<PersonsChanged>,
}

impl BroadcastNotifier {
  pub const DEFAULT_CAPACITY: usize = 64;

  pub fn new(capacity: usize) -> Self {
    let (tx, _) = broadcast::channel(capacity.max(1));
    Self { tx }
  }

  pub fn subscribe(&self) -> broadcast::Receiver<PersonsChanged> { self.tx.subscribe() }

  pub fn subscriber_count(&self) -> usize { self.tx.receiver_count() }
}

impl Default for BroadcastNotifier {
  fn default() -> Self { Self::new(Self::DEFAULT_CAPACITY) }
}

impl ChangeNotifier for BroadcastNotifier {
  fn notify_changed(&self) {
    match self.tx.send(PersonsChanged) {
      Ok(receivers) => tracing::trace!(receivers, "broadcast persons changed"),
      Err(_) => tracing::debug!("persons changed, but nobody is subscribed"),
    }
  }
}

/// Discards every signal.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl ChangeNotifier for NoopNotifier {
  fn notify_changed(&self) {}
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn send_without_subscribers_does_not_fail() {
    let notifier = BroadcastNotifier::new(0);
    assert_eq!(notifier.subscriber_count(), 0);
    notifier.notify_changed();
  }

  #[tokio::test]
  async fn every_subscriber_receives_the_signal() {
    let notifier = BroadcastNotifier::default();
    let mut a = notifier.subscribe();
    let mut b = notifier.subscribe();

    notifier.notify_changed();

    assert_eq!(a.recv().await.unwrap(), PersonsChanged);
    assert_eq!(b.recv().await.unwrap(), PersonsChanged);
  }

  #[tokio::test]
  async fn lagging_subscriber_does_not_block_sender() {
    let notifier = BroadcastNotifier::new(1);
    let mut rx = notifier.subscribe();

    for _ in 0..5 {
      notifier.notify_changed();
    }

    assert!(matches!(
      rx.recv().await,
      Err(broadcast::error::RecvError::Lagged(_))
    ));
    assert_eq!(rx.recv().await.unwrap(), PersonsChanged);
  }
}
