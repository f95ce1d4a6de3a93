//! Card search filter and input debouncing.

use super::view::Card;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Case-insensitive substring match of `query` against a card's text.
/// An empty query matches everything.
pub fn matches(card: &Card, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    query.is_empty() || card.text().to_lowercase().contains(&query)
}

pub fn filter_cards<'a>(cards: &'a [Card], query: &str) -> Vec<&'a Card> {
    cards.iter().filter(|card| matches(card, query)).collect()
}

/// Trailing-edge debouncer.
///
/// Values pushed in quick succession are coalesced: only the last one is
/// emitted, once no new value has arrived for the configured delay.
pub struct Debouncer<T> {
    input: mpsc::UnboundedSender<T>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Spawns the debounce task and returns the debouncer with the receiver
    /// of settled values. The task ends when the debouncer is dropped.
    pub fn spawn(delay: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (input, input_rx) = mpsc::unbounded_channel();
        let (output, output_rx) = mpsc::unbounded_channel();
        tokio::spawn(debounce(delay, input_rx, output));
        (Self { input }, output_rx)
    }

    pub fn push(&self, value: T) {
        if self.input.send(value).is_err() {
            debug!("Debounce task has exited, dropping input");
        }
    }
}

async fn debounce<T>(
    delay: Duration,
    mut input: mpsc::UnboundedReceiver<T>,
    output: mpsc::UnboundedSender<T>,
) {
    let mut pending: Option<T> = None;
    loop {
        if pending.is_none() {
            match input.recv().await {
                Some(value) => pending = Some(value),
                None => break,
            }
            continue;
        }

        tokio::select! {
            next = input.recv() => match next {
                Some(value) => pending = Some(value),
                None => break,
            },
            _ = tokio::time::sleep(delay) => {
                if let Some(value) = pending.take() {
                    if output.send(value).is_err() {
                        break;
                    }
                }
            }
        }
    }
}
