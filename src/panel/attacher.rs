//! The per-page attacher: idempotent trigger attachment plus the suggestion
//! panel state machine.
//!
//! One attacher owns one page context. All of its state is explicit here
//! rather than ambient module state, so tests can drive it in isolation
//! through [`Attacher::handle_event`].

use super::observer::PageEvent;
use super::surface::{CommentSurface, InsertMethod};
use crate::error::ExtractError;
use crate::extract::{self, ExtractionBackend};
use crate::generate::types::{ExtractedPost, GenerationResult};
use crate::platform::PlatformId;
use crate::service::ServiceHandle;
use std::collections::HashMap;
use tokio::sync::oneshot;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;

/// Panel lifecycle. `Error` is terminal for the invocation; dismissal takes
/// every non-idle state back to `Idle`.
#[derive(Debug)]
pub enum PanelState {
    Idle,
    Extracting,
    Generating,
    Displaying(GenerationResult),
    Error(String),
}

/// Side effects the host page must carry out.
#[derive(Debug, PartialEq, Eq)]
pub enum PanelEffect {
    /// Put this text on the clipboard.
    Copied(String),
    /// A comment was written into the given box.
    Inserted { box_id: u64 },
}

type GenerationReply = oneshot::Receiver<Result<GenerationResult, String>>;

pub struct Attacher {
    platform: PlatformId,
    backend: Box<dyn ExtractionBackend>,
    service: ServiceHandle,
    /// Attachment order; first entry is the shortcut target.
    attached: Vec<u64>,
    surfaces: HashMap<u64, Box<dyn CommentSurface>>,
    state: PanelState,
    /// The box the open panel was triggered from; insertion target.
    origin: Option<u64>,
    /// Reply slot of the in-flight generation, if any. Dropping it discards
    /// the eventual reply instead of rendering it into a closed panel.
    pending: Option<GenerationReply>,
}

impl Attacher {
    pub fn new(
        platform: PlatformId,
        backend: Box<dyn ExtractionBackend>,
        service: ServiceHandle,
    ) -> Self {
        Self {
            platform,
            backend,
            service,
            attached: Vec::new(),
            surfaces: HashMap::new(),
            state: PanelState::Idle,
            origin: None,
            pending: None,
        }
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    pub fn attached_count(&self) -> usize {
        self.attached.len()
    }

    fn in_flight(&self) -> bool {
        self.pending.is_some()
    }

    /// Consume page events until the subscription ends, interleaving
    /// in-flight generation replies as they arrive.
    pub async fn run(mut self, mut events: ReceiverStream<PageEvent>) {
        loop {
            if let Some(mut reply) = self.pending.take() {
                tokio::select! {
                    outcome = &mut reply => {
                        self.apply_reply(outcome);
                    }
                    maybe_event = events.next() => {
                        self.pending = Some(reply);
                        let Some(event) = maybe_event else { break };
                        if let Some(effect) = self.handle_event(event).await {
                            tracing::info!(?effect, "panel effect");
                        }
                    }
                }
            } else {
                let Some(event) = events.next().await else { break };
                if let Some(effect) = self.handle_event(event).await {
                    tracing::info!(?effect, "panel effect");
                }
            }
        }
        tracing::debug!("page event stream ended");
    }

    /// Apply one page event to the panel state machine.
    pub async fn handle_event(&mut self, event: PageEvent) -> Option<PanelEffect> {
        match event {
            PageEvent::CandidateAppeared(surface) => {
                self.attach(surface);
                None
            }
            PageEvent::Trigger(box_id) => {
                self.trigger(box_id).await;
                None
            }
            PageEvent::ShortcutToggle => {
                self.toggle().await;
                None
            }
            PageEvent::SelectionRequest(selection) => {
                self.trigger_from_selection(&selection).await;
                None
            }
            PageEvent::Copy(comment_id) => self.copy(comment_id),
            PageEvent::Insert(comment_id) => self.insert(comment_id),
            PageEvent::Dismiss => {
                self.dismiss();
                None
            }
        }
    }

    /// Await the in-flight generation reply, if any.
    pub async fn resolve_pending(&mut self) {
        if let Some(reply) = self.pending.take() {
            let outcome = reply.await;
            self.apply_reply(outcome);
        }
    }

    /// At most one trigger control per box, no matter how many mutation
    /// batches re-report it.
    fn attach(&mut self, surface: Box<dyn CommentSurface>) {
        let box_id = surface.id();
        if self.attached.contains(&box_id) {
            tracing::debug!(box_id, "comment box already attached");
            return;
        }
        self.attached.push(box_id);
        self.surfaces.insert(box_id, surface);
        tracing::debug!(box_id, "trigger control attached");
    }

    async fn trigger(&mut self, box_id: u64) {
        if self.in_flight() {
            tracing::debug!(box_id, "generation already in flight, trigger ignored");
            return;
        }
        if !self.surfaces.contains_key(&box_id) {
            tracing::debug!(box_id, "trigger for unattached box ignored");
            return;
        }

        self.origin = Some(box_id);
        self.state = PanelState::Extracting;

        let post = extract::extract_post(self.backend.as_ref(), self.platform);
        if post.post_text.is_empty() {
            self.state = PanelState::Error(ExtractError::NoPostText.to_string());
            return;
        }

        self.begin_generation(post).await;
    }

    async fn toggle(&mut self) {
        if !matches!(self.state, PanelState::Idle) {
            self.dismiss();
            return;
        }
        let Some(first) = self.attached.first().copied() else {
            tracing::debug!("shortcut ignored, no attached comment box");
            return;
        };
        self.trigger(first).await;
    }

    async fn trigger_from_selection(&mut self, selection: &str) {
        if self.in_flight() {
            tracing::debug!("generation already in flight, selection request ignored");
            return;
        }

        let post = ExtractedPost::from_selection(self.platform, selection);
        if post.post_text.is_empty() {
            self.state = PanelState::Error(ExtractError::NoPostText.to_string());
            return;
        }

        self.origin = self.attached.first().copied();
        self.begin_generation(post).await;
    }

    async fn begin_generation(&mut self, post: ExtractedPost) {
        self.state = PanelState::Generating;
        self.pending = Some(self.service.request_generation(post).await);
    }

    fn apply_reply(
        &mut self,
        outcome: Result<Result<GenerationResult, String>, oneshot::error::RecvError>,
    ) {
        self.state = match outcome {
            Ok(Ok(result)) => PanelState::Displaying(result),
            Ok(Err(message)) => PanelState::Error(format!("Error: {message}")),
            Err(_) => PanelState::Error("Error: generation service unavailable".to_string()),
        };
    }

    fn copy(&self, comment_id: i64) -> Option<PanelEffect> {
        let PanelState::Displaying(result) = &self.state else {
            return None;
        };
        let comment = result.comment(comment_id)?;
        Some(PanelEffect::Copied(comment.text.clone()))
    }

    fn insert(&mut self, comment_id: i64) -> Option<PanelEffect> {
        let PanelState::Displaying(result) = &self.state else {
            return None;
        };
        let text = result.comment(comment_id)?.text.clone();

        let box_id = self.origin?;
        let surface = self.surfaces.get_mut(&box_id)?;
        surface.focus();
        surface.apply(InsertMethod::for_platform(self.platform), &text);

        self.state = PanelState::Idle;
        self.origin = None;
        Some(PanelEffect::Inserted { box_id })
    }

    fn dismiss(&mut self) {
        // Dropping the reply slot discards any still-in-flight response.
        self.pending = None;
        self.state = PanelState::Idle;
        self.origin = None;
    }
}
