//! Page observation as a subscription.
//!
//! DOM mutation callbacks are flattened into a lazy, infinite,
//! non-restartable sequence of [`PageEvent`]s delivered over a channel: the
//! producer side sits wherever page changes are detected, the consumer side
//! is the attacher's event loop. Dropping the stream ends the subscription
//! for good.

use super::surface::CommentSurface;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// One observed page occurrence or user action.
pub enum PageEvent {
    /// A comment box matching the platform's selector table appeared (or was
    /// re-reported by a later mutation batch).
    CandidateAppeared(Box<dyn CommentSurface>),
    /// The trigger control on the given comment box was activated.
    Trigger(u64),
    /// Global keyboard shortcut: toggle the panel for the first attached box.
    ShortcutToggle,
    /// Context-menu request seeded from the user's text selection.
    SelectionRequest(String),
    /// Copy the given generated comment to the clipboard.
    Copy(i64),
    /// Insert the given generated comment into the originating box.
    Insert(i64),
    /// Close the panel.
    Dismiss,
}

/// Producer half of the page-event subscription.
#[derive(Clone)]
pub struct CommentBoxObserver {
    tx: mpsc::Sender<PageEvent>,
}

impl CommentBoxObserver {
    /// Create the subscription; the returned stream is the attacher's input.
    pub fn subscribe(capacity: usize) -> (Self, ReceiverStream<PageEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, ReceiverStream::new(rx))
    }

    /// Publish an event. Returns `false` once the subscriber is gone.
    pub async fn publish(&self, event: PageEvent) -> bool {
        self.tx.send(event).await.is_ok()
    }

    pub async fn candidate(&self, surface: impl CommentSurface + 'static) -> bool {
        self.publish(PageEvent::CandidateAppeared(Box::new(surface)))
            .await
    }
}
