//! The request-handling boundary.
//!
//! This is the only component holding network and credential access. It
//! consumes request messages from an mpsc channel and answers each exactly
//! once through the request's oneshot reply; a caller that went away is
//! tolerated (the reply is discarded, never retried).

use crate::error::GenerateError;
use crate::generate::types::{ExtractedPost, GenerationResult};
use crate::generate::GenerationClient;
use crate::prompt::{self, TeraEngine};
use crate::security::CredentialStore;
use tokio::sync::{mpsc, oneshot};

const REQUEST_CHANNEL_CAPACITY: usize = 16;

/// Key baked in at build time, standing in for a bundler-injected default.
const BUILD_TIME_API_KEY: Option<&str> = option_env!("COMMENTCRAFT_API_KEY");

/// Process-wide fallback key: build-time value first, then the environment.
pub fn fallback_api_key() -> Option<String> {
    BUILD_TIME_API_KEY
        .map(str::to_string)
        .or_else(|| std::env::var("GEMINI_API_KEY").ok())
        .filter(|key| !key.trim().is_empty())
}

/// One request message into the service.
pub enum ServiceRequest {
    GenerateComments {
        post: ExtractedPost,
        reply: oneshot::Sender<Result<GenerationResult, String>>,
    },
    SetApiKey {
        api_key: String,
        reply: oneshot::Sender<Result<(), String>>,
    },
    GetApiKey {
        reply: oneshot::Sender<String>,
    },
}

/// Cloneable sender half used by panels and the CLI.
#[derive(Clone)]
pub struct ServiceHandle {
    tx: mpsc::Sender<ServiceRequest>,
}

impl ServiceHandle {
    /// Fire a generation request and return the reply slot without awaiting
    /// it, so the caller can keep servicing events while the request is in
    /// flight (and drop the receiver to discard a stale reply).
    pub async fn request_generation(
        &self,
        post: ExtractedPost,
    ) -> oneshot::Receiver<Result<GenerationResult, String>> {
        let (reply, rx) = oneshot::channel();
        // A failed send drops `reply`, which surfaces to the caller as a
        // closed reply slot.
        let _ = self
            .tx
            .send(ServiceRequest::GenerateComments { post, reply })
            .await;
        rx
    }

    /// Request generation and await the outcome (single-shot flow).
    pub async fn generate(&self, post: ExtractedPost) -> Result<GenerationResult, String> {
        self.request_generation(post)
            .await
            .await
            .unwrap_or_else(|_| Err("generation service unavailable".to_string()))
    }

    pub async fn set_api_key(&self, api_key: String) -> Result<(), String> {
        let (reply, rx) = oneshot::channel();
        let _ = self
            .tx
            .send(ServiceRequest::SetApiKey { api_key, reply })
            .await;
        rx.await
            .unwrap_or_else(|_| Err("generation service unavailable".to_string()))
    }

    /// The stored key, or an empty string when none is configured.
    pub async fn get_api_key(&self) -> String {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(ServiceRequest::GetApiKey { reply }).await;
        rx.await.unwrap_or_default()
    }
}

#[cfg(test)]
pub(crate) fn test_handle() -> (ServiceHandle, mpsc::Receiver<ServiceRequest>) {
    let (tx, rx) = mpsc::channel(REQUEST_CHANNEL_CAPACITY);
    (ServiceHandle { tx }, rx)
}

pub struct CommentService {
    credentials: CredentialStore,
    client: GenerationClient,
    engine: TeraEngine,
    fallback_api_key: Option<String>,
}

impl CommentService {
    pub fn new(
        credentials: CredentialStore,
        client: GenerationClient,
        fallback_api_key: Option<String>,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            credentials,
            client,
            engine: TeraEngine::new()?,
            fallback_api_key,
        })
    }

    /// Start the service task and return the handle callers use.
    pub fn spawn(self) -> ServiceHandle {
        let (tx, rx) = mpsc::channel(REQUEST_CHANNEL_CAPACITY);
        tokio::spawn(self.run(rx));
        ServiceHandle { tx }
    }

    async fn run(mut self, mut rx: mpsc::Receiver<ServiceRequest>) {
        while let Some(request) = rx.recv().await {
            self.handle(request).await;
        }
        tracing::debug!("service channel closed, shutting down");
    }

    async fn handle(&mut self, request: ServiceRequest) {
        match request {
            ServiceRequest::GenerateComments { post, reply } => {
                let result = self.generate(post).await;
                let _ = reply.send(result);
            }
            ServiceRequest::SetApiKey { api_key, reply } => {
                let result = self
                    .credentials
                    .store_api_key(&api_key)
                    .map_err(|e| e.to_string());
                let _ = reply.send(result);
            }
            ServiceRequest::GetApiKey { reply } => {
                let api_key = self
                    .credentials
                    .load_api_key()
                    .unwrap_or_default()
                    .unwrap_or_default();
                let _ = reply.send(api_key);
            }
        }
    }

    async fn generate(&mut self, post: ExtractedPost) -> Result<GenerationResult, String> {
        let api_key = self.resolve_api_key().map_err(|e| e.to_string())?;

        let prompt = prompt::build_comment_prompt(&mut self.engine, &post)
            .map_err(|e| format!("failed to build prompt: {e}"))?;

        tracing::info!(platform = %post.platform, "generation request");
        self.client.generate(&prompt, &api_key).await.map_err(|e| {
            tracing::warn!(error = %e, "generation failed");
            e.to_string()
        })
    }

    /// Key resolution: the user-configured credential wins, then the
    /// process-wide fallback.
    fn resolve_api_key(&self) -> Result<String, GenerateError> {
        match self.credentials.load_api_key() {
            Ok(Some(key)) if !key.is_empty() => return Ok(key),
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "credential store unreadable"),
        }

        self.fallback_api_key
            .clone()
            .ok_or(GenerateError::MissingApiKey)
    }
}
