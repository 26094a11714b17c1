//! Hand-off of document alerts (e.g. JavaScript `app.alert`) from the engine
//! to whoever is driving the UI.
//!
//! One alert is in flight at a time. The engine thread that raised it blocks
//! until the UI answers or delivery is stopped.

use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertIcon {
    Error,
    Warning,
    Question,
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertButtons {
    Ok,
    OkCancel,
    YesNo,
    YesNoCancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertButton {
    None,
    Ok,
    Cancel,
    No,
    Yes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub title: String,
    pub message: String,
    pub icon: AlertIcon,
    pub buttons: AlertButtons,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertReply {
    pub pressed: AlertButton,
}

#[derive(Default)]
struct Slot {
    enabled: bool,
    pending: Option<Alert>,
    delivered: bool,
    reply: Option<AlertReply>,
    epoch: u64,
}

#[derive(Default)]
pub struct AlertBridge {
    slot: Mutex<Slot>,
    changed: Condvar,
}

impl AlertBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self) {
        self.slot.lock().enabled = true;
    }

    /// Disables delivery and wakes everyone blocked on the bridge.
    pub fn stop(&self) {
        let mut slot = self.slot.lock();
        slot.enabled = false;
        slot.pending = None;
        slot.delivered = false;
        slot.reply = None;
        slot.epoch = slot.epoch.wrapping_add(1);
        self.changed.notify_all();
    }

    pub fn is_enabled(&self) -> bool {
        self.slot.lock().enabled
    }

    /// Engine side: posts `alert` and blocks for the answer.
    pub fn raise(&self, alert: Alert) -> Option<AlertReply> {
        let mut slot = self.slot.lock();
        if !slot.enabled {
            return None;
        }
        while slot.pending.is_some() {
            self.changed.wait(&mut slot);
            if !slot.enabled {
                return None;
            }
        }

        let epoch = slot.epoch;
        slot.pending = Some(alert);
        slot.delivered = false;
        slot.reply = None;
        self.changed.notify_all();

        loop {
            if slot.epoch != epoch || !slot.enabled {
                return None;
            }
            if let Some(reply) = slot.reply.take() {
                slot.pending = None;
                slot.delivered = false;
                self.changed.notify_all();
                return Some(reply);
            }
            self.changed.wait(&mut slot);
        }
    }

    /// UI side: blocks until an alert is waiting for an answer. Returns `None`
    /// once delivery is stopped.
    pub fn wait_for_alert(&self) -> Option<Alert> {
        let mut slot = self.slot.lock();
        loop {
            if !slot.enabled {
                return None;
            }
            if !slot.delivered {
                if let Some(alert) = slot.pending.clone() {
                    slot.delivered = true;
                    return Some(alert);
                }
            }
            self.changed.wait(&mut slot);
        }
    }

    /// UI side: answers the alert in flight.
    pub fn reply(&self, reply: AlertReply) {
        let mut slot = self.slot.lock();
        if slot.pending.is_none() || slot.reply.is_some() {
            debug!(?reply, "dropping alert reply with nothing in flight");
            return;
        }
        slot.reply = Some(reply);
        self.changed.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn sample_alert() -> Alert {
        Alert {
            title: "Form".into(),
            message: "Field is required".into(),
            icon: AlertIcon::Warning,
            buttons: AlertButtons::OkCancel,
        }
    }

    #[test]
    fn raise_returns_none_while_stopped() {
        let bridge = AlertBridge::new();
        assert_eq!(bridge.raise(sample_alert()), None);
    }

    #[test]
    fn reply_reaches_the_raising_thread() {
        let bridge = Arc::new(AlertBridge::new());
        bridge.start();

        let producer = {
            let bridge = Arc::clone(&bridge);
            thread::spawn(move || bridge.raise(sample_alert()))
        };

        let alert = bridge.wait_for_alert().unwrap();
        assert_eq!(alert, sample_alert());
        bridge.reply(AlertReply {
            pressed: AlertButton::Cancel,
        });

        let reply = producer.join().unwrap();
        assert_eq!(
            reply,
            Some(AlertReply {
                pressed: AlertButton::Cancel
            })
        );
    }

    #[test]
    fn stop_unblocks_waiting_consumer() {
        let bridge = Arc::new(AlertBridge::new());
        bridge.start();

        let consumer = {
            let bridge = Arc::clone(&bridge);
            thread::spawn(move || bridge.wait_for_alert())
        };

        thread::sleep(Duration::from_millis(20));
        bridge.stop();
        assert_eq!(consumer.join().unwrap(), None);
    }

    #[test]
    fn stop_unblocks_raising_engine() {
        let bridge = Arc::new(AlertBridge::new());
        bridge.start();

        let producer = {
            let bridge = Arc::clone(&bridge);
            thread::spawn(move || bridge.raise(sample_alert()))
        };

        assert!(bridge.wait_for_alert().is_some());
        bridge.stop();
        assert_eq!(producer.join().unwrap(), None);
        assert!(!bridge.is_enabled());
    }

    #[test]
    fn reply_without_pending_alert_is_ignored() {
        let bridge = AlertBridge::new();
        bridge.start();
        bridge.reply(AlertReply {
            pressed: AlertButton::Ok,
        });
        assert!(bridge.slot.lock().reply.is_none());
    }
}
