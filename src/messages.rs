use std::sync::mpsc::{self, Receiver, Sender};
use thiserror::Error;

use crate::provider::ProviderError;
use crate::scanner::ScanStatus;

/// Everything workers may ask of the UI loop. One tag per channel, each with
/// a fixed payload shape; the loop matches exhaustively at its boundary.
#[derive(Debug)]
pub enum AppEvent {
    /// Present the overlay in its loading state, replacing any prior one.
    ShowLoading { title: String },
    /// Render an answer into the overlay that is already attached.
    ShowResult { text: String },
    /// Terminal outcome of the ask flow.
    AnswerReady { result: Result<String, ProviderError> },
    /// Terminal outcome of a repository scan.
    ScanFinished { status: ScanStatus },
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("the view is no longer listening")]
pub struct DeliveryError;

/// Sender half handed to every spawned worker.
#[derive(Clone)]
pub struct EventBus {
    tx: Sender<AppEvent>,
}

impl EventBus {
    pub fn channel() -> (Self, Receiver<AppEvent>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }

    /// Best-effort delivery into the UI loop. Fire-and-forget for the
    /// sender; a receiver that is gone surfaces as a recoverable error,
    /// never a panic.
    pub fn dispatch(&self, event: AppEvent) -> Result<(), DeliveryError> {
        self.tx.send(event).map_err(|_| DeliveryError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_reaches_the_loop_in_order() {
        let (bus, rx) = EventBus::channel();
        bus.dispatch(AppEvent::ShowLoading {
            title: "Analyzing Code...".into(),
        })
        .unwrap();
        bus.dispatch(AppEvent::ShowResult { text: "done".into() }).unwrap();

        assert!(matches!(rx.recv().unwrap(), AppEvent::ShowLoading { .. }));
        match rx.recv().unwrap() {
            AppEvent::ShowResult { text } => assert_eq!(text, "done"),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn missing_receiver_is_a_recoverable_delivery_error() {
        let (bus, rx) = EventBus::channel();
        drop(rx);
        let err = bus
            .dispatch(AppEvent::ShowResult { text: "late".into() })
            .unwrap_err();
        assert_eq!(err, DeliveryError);
    }
}
