//! The readiness gate.
//!
//! A level-triggered boolean the connectivity monitor rewrites after every
//! pipeline run; consumers hold a read-and-wait handle. Built on a watch
//! channel, so a waiter arriving while the gate is already set passes
//! straight through instead of waiting for the next edge.

use thiserror::Error;
use tokio::sync::watch;

/// The owning monitor is gone and the gate will never change again.
#[derive(Debug, Error)]
#[error("readiness gate closed: connectivity monitor is gone")]
pub struct GateClosed;

/// Writer side, owned by the connectivity monitor.
#[derive(Debug)]
pub struct ReadinessGate {
    tx: watch::Sender<bool>,
}

/// Read-and-wait side handed to consumers.
#[derive(Debug, Clone)]
pub struct ReadinessHandle {
    rx: watch::Receiver<bool>,
}

impl ReadinessGate {
    /// A new gate, initially clear.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Mark connectivity as confirmed working.
    pub fn set(&self) {
        self.tx.send_replace(true);
    }

    /// Mark connectivity as absent or unverified.
    pub fn clear(&self) {
        self.tx.send_replace(false);
    }

    /// Current level.
    pub fn is_set(&self) -> bool {
        *self.tx.borrow()
    }

    /// A new consumer handle.
    pub fn subscribe(&self) -> ReadinessHandle {
        ReadinessHandle {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for ReadinessGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadinessHandle {
    /// Current level.
    pub fn is_set(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until the gate is set. Returns immediately when it already
    /// is.
    pub async fn wait(&mut self) -> Result<(), GateClosed> {
        self.rx
            .wait_for(|ready| *ready)
            .await
            .map(|_| ())
            .map_err(|_| GateClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn gate_starts_clear() {
        let gate = ReadinessGate::new();
        assert!(!gate.is_set());
        assert!(!gate.subscribe().is_set());
    }

    #[tokio::test]
    async fn set_and_clear_are_visible_to_handles() {
        let gate = ReadinessGate::new();
        let handle = gate.subscribe();

        gate.set();
        assert!(handle.is_set());

        gate.clear();
        assert!(!handle.is_set());
    }

    #[tokio::test]
    async fn wait_passes_straight_through_when_already_set() {
        let gate = ReadinessGate::new();
        gate.set();

        let mut handle = gate.subscribe();
        tokio::time::timeout(Duration::from_secs(1), handle.wait())
            .await
            .expect("wait should not block on a set gate")
            .unwrap();
    }

    #[tokio::test]
    async fn wait_wakes_on_the_rising_edge() {
        let gate = ReadinessGate::new();
        let mut handle = gate.subscribe();

        let waiter = tokio::spawn(async move { handle.wait().await });
        tokio::task::yield_now().await;

        gate.set();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should wake once the gate is set")
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn repeated_set_is_idempotent_for_waiters() {
        let gate = ReadinessGate::new();
        gate.set();
        gate.set();

        let mut handle = gate.subscribe();
        handle.wait().await.unwrap();
        assert!(handle.is_set());
    }

    #[tokio::test]
    async fn dropping_the_gate_fails_pending_waits() {
        let gate = ReadinessGate::new();
        let mut handle = gate.subscribe();

        drop(gate);
        let err = handle.wait().await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "readiness gate closed: connectivity monitor is gone"
        );
    }

    #[tokio::test]
    async fn handles_are_independent() {
        let gate = ReadinessGate::new();
        let mut first = gate.subscribe();
        let mut second = first.clone();

        gate.set();
        first.wait().await.unwrap();
        second.wait().await.unwrap();
    }
}
