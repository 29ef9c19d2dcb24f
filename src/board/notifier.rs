//! "Something changed" broadcast
//!
//! Listeners are one-shot: each `fire_all` wakes everyone registered so far and
//! empties the list. A watcher that wants the change after that registers again.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

#[derive(Debug, Default)]
pub struct ChangeNotifier {
    listeners: Vec<oneshot::Sender<()>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register for the next change
    pub fn register(&mut self) -> ChangeListener {
        let (tx, rx) = oneshot::channel();
        self.listeners.push(tx);
        ChangeListener { rx }
    }

    /// Wake every registered listener; returns how many were still listening
    pub fn fire_all(&mut self) -> usize {
        self.listeners
            .drain(..)
            .map(|tx| tx.send(()))
            .filter(|sent| sent.is_ok())
            .count()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

/// Resolves at the first board change after it was registered
///
/// Also resolves if the board is dropped, since no further change can come.
#[derive(Debug)]
pub struct ChangeListener {
    rx: oneshot::Receiver<()>,
}

impl Future for ChangeListener {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        Pin::new(&mut self.rx).poll(cx).map(|_| ())
    }
}
