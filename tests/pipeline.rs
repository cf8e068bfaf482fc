//! End-to-end pipeline tests: fixture page -> extraction -> service ->
//! mocked generation endpoint -> panel states and effects.

use commentcraft::extract::DomBackend;
use commentcraft::generate::GenerationClient;
use commentcraft::panel::{Attacher, CommentBoxObserver, CommentSurface, InsertMethod, PageEvent, PanelState};
use commentcraft::platform::PlatformId;
use commentcraft::security::CredentialStore;
use commentcraft::service::{CommentService, ServiceHandle};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LINKEDIN_PAGE: &str = r#"<html><body>
  <div class="feed-shared-text">Great milestone!</div>
  <span class="feed-shared-actor__name">Ada Lovelace</span>
  <div class="ql-editor"></div>
</body></html>"#;

struct RecordingSurface {
    id: u64,
    applied: Arc<Mutex<Vec<(InsertMethod, String)>>>,
}

impl RecordingSurface {
    fn new(id: u64) -> (Self, Arc<Mutex<Vec<(InsertMethod, String)>>>) {
        let applied = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                id,
                applied: Arc::clone(&applied),
            },
            applied,
        )
    }
}

impl CommentSurface for RecordingSurface {
    fn id(&self) -> u64 {
        self.id
    }
    fn apply(&mut self, method: InsertMethod, text: &str) {
        self.applied.lock().unwrap().push((method, text.to_string()));
    }
}

fn ok_result_json() -> serde_json::Value {
    json!({
        "status": "ok",
        "comments": [
            {
                "id": 1,
                "tone": "professional",
                "text": "Congratulations on the milestone!",
                "length_chars": 33,
                "rationale": "supportive and specific"
            },
            {
                "id": 2,
                "text": "What was the hardest part of getting here?",
                "length_chars": 42,
                "rationale": "invites discussion"
            }
        ],
        "recommendation": { "comment_id": 1 }
    })
}

fn envelope_with_text(text: &str) -> serde_json::Value {
    json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] })
}

async fn spawn_service_with_key(dir: &TempDir, server: &MockServer) -> ServiceHandle {
    let credentials = CredentialStore::new(dir.path(), true);
    let client = GenerationClient::new().with_base_url(server.uri());
    let handle = CommentService::new(credentials, client, None)
        .unwrap()
        .spawn();
    handle
        .set_api_key("AIza-pipeline-key".into())
        .await
        .unwrap();
    handle
}

#[tokio::test]
async fn extract_generate_display_insert_round_trip() {
    let server = MockServer::start().await;
    let fenced = format!("```json\n{}\n```", ok_result_json());
    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-flash:generateContent"))
        .and(query_param("key", "AIza-pipeline-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope_with_text(&fenced)))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let service = spawn_service_with_key(&dir, &server).await;

    let backend = DomBackend::parse(LINKEDIN_PAGE);
    let mut attacher = Attacher::new(PlatformId::Linkedin, Box::new(backend), service);

    let (surface, applied) = RecordingSurface::new(1);
    attacher
        .handle_event(PageEvent::CandidateAppeared(Box::new(surface)))
        .await;

    attacher.handle_event(PageEvent::Trigger(1)).await;
    attacher.resolve_pending().await;

    let PanelState::Displaying(result) = attacher.state() else {
        panic!("expected Displaying, got {:?}", attacher.state());
    };
    assert_eq!(result.comments.len(), 2);
    assert_eq!(result.recommended().unwrap().id, 1);
    // The second comment ships without a tone label; that is fine.
    assert_eq!(result.comments[1].tone, None);

    attacher.handle_event(PageEvent::Insert(1)).await;
    assert!(matches!(attacher.state(), PanelState::Idle));
    assert_eq!(
        applied.lock().unwrap().as_slice(),
        &[(
            InsertMethod::SetInnerText,
            "Congratulations on the milestone!".to_string()
        )]
    );
}

#[tokio::test]
async fn ok_results_respect_avoid_keywords() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(envelope_with_text(&ok_result_json().to_string())),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let service = spawn_service_with_key(&dir, &server).await;

    let backend = DomBackend::parse(LINKEDIN_PAGE);
    let mut post = commentcraft::extract::extract_post(&backend, PlatformId::Linkedin);
    post.avoid_keywords = vec!["synergy".into(), "rockstar".into()];

    let avoid = post.avoid_keywords.clone();
    let result = service.generate(post).await.unwrap();
    for comment in &result.comments {
        for keyword in &avoid {
            assert!(
                !comment.text.contains(keyword.as_str()),
                "comment {} contains avoided keyword {keyword}",
                comment.id
            );
        }
    }
}

#[tokio::test]
async fn transport_failure_surfaces_status_in_panel_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "error": { "message": "API key not valid" } })),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let service = spawn_service_with_key(&dir, &server).await;

    let backend = DomBackend::parse(LINKEDIN_PAGE);
    let mut attacher = Attacher::new(PlatformId::Linkedin, Box::new(backend), service);
    let (surface, _) = RecordingSurface::new(1);
    attacher
        .handle_event(PageEvent::CandidateAppeared(Box::new(surface)))
        .await;

    attacher.handle_event(PageEvent::Trigger(1)).await;
    attacher.resolve_pending().await;

    let PanelState::Error(message) = attacher.state() else {
        panic!("expected Error, got {:?}", attacher.state());
    };
    assert!(message.starts_with("Error:"), "got: {message}");
    assert!(message.contains("401"), "got: {message}");
}

#[tokio::test]
async fn event_loop_runs_the_whole_flow_to_insertion() {
    let server = MockServer::start().await;
    let fenced = format!("```json\n{}\n```", ok_result_json());
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope_with_text(&fenced)))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let service = spawn_service_with_key(&dir, &server).await;

    let backend = DomBackend::parse(LINKEDIN_PAGE);
    let attacher = Attacher::new(PlatformId::Linkedin, Box::new(backend), service);

    let (observer, events) = CommentBoxObserver::subscribe(16);
    let runner = tokio::spawn(attacher.run(events));

    let (surface, applied) = RecordingSurface::new(1);
    assert!(observer.candidate(surface).await);
    assert!(observer.publish(PageEvent::Trigger(1)).await);

    // Insert is a no-op until the panel reaches Displaying, so keep asking.
    let inserted = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            observer.publish(PageEvent::Insert(1)).await;
            if !applied.lock().unwrap().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(inserted.is_ok(), "insertion never happened");

    drop(observer);
    runner.await.unwrap();

    let applied = applied.lock().unwrap();
    assert_eq!(applied[0].1, "Congratulations on the milestone!");
}
