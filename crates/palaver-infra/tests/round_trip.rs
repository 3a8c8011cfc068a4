//! End-to-end round-trips through `ChatService` backed by the JSON-file
//! repository in a temporary data directory.

use std::sync::Mutex;

use palaver_core::chat::remote::ChatSettings;
use palaver_core::chat::repository::ChatRepository;
use palaver_core::chat::service::ChatService;
use palaver_core::llm::box_provider::BoxLlmProvider;
use palaver_core::llm::provider::{EventStream, LlmProvider};
use palaver_infra::filesystem::chat::FileChatRepository;
use palaver_types::chat::{SessionId, SubmitStatus, Turn};
use palaver_types::history::HistoryContent;
use palaver_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, ProviderCapabilities, StreamEvent,
};
use tempfile::TempDir;

/// Streams one scripted list of fragments per call.
struct ScriptedProvider {
    replies: Mutex<Vec<Vec<&'static str>>>,
    capabilities: ProviderCapabilities,
}

impl ScriptedProvider {
    fn new(replies: Vec<Vec<&'static str>>) -> Self {
        Self {
            replies: Mutex::new(replies),
            capabilities: ProviderCapabilities {
                streaming: true,
                max_context_tokens: 1_000,
                max_output_tokens: 100,
            },
        }
    }
}

impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    async fn complete(&self, _request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        Err(LlmError::InvalidRequest("streaming only".to_string()))
    }

    fn stream(&self, _request: CompletionRequest) -> EventStream {
        let fragments = self.replies.lock().unwrap().remove(0);
        let events: Vec<Result<StreamEvent, LlmError>> = std::iter::once(Ok(StreamEvent::Connected))
            .chain(fragments.into_iter().map(|f| {
                Ok(StreamEvent::TextDelta {
                    text: f.to_string(),
                })
            }))
            .chain(std::iter::once(Ok(StreamEvent::Done)))
            .collect();
        Box::pin(futures_util::stream::iter(events))
    }
}

fn service(
    data_dir: &TempDir,
    replies: Vec<Vec<&'static str>>,
) -> ChatService<FileChatRepository> {
    ChatService::new(
        FileChatRepository::local(data_dir.path()),
        BoxLlmProvider::new(ScriptedProvider::new(replies)),
        ChatSettings {
            model: "scripted-model".to_string(),
            system_prompt: None,
            max_tokens: 128,
            temperature: None,
        },
    )
}

#[tokio::test]
async fn fresh_session_persists_first_exchange() {
    let tmp = TempDir::new().unwrap();
    let service = service(&tmp, vec![vec!["4"]]);
    let id = SessionId::parse("1718000000.000001").unwrap();

    let mut session = service.begin_session(id.clone()).await.unwrap();
    assert!(session.messages().is_empty());
    assert!(session.history().is_empty());

    let outcome = service.submit(&mut session, "2+2?", |_| {}).await.unwrap();
    assert_eq!(outcome.status, SubmitStatus::Completed);

    let expected = vec![Turn::user("2+2?"), Turn::assistant("4 ")];
    assert_eq!(session.messages(), expected.as_slice());

    let chats = tmp.path().join("chats");
    assert!(chats.join("sessions.json").exists());
    assert!(chats.join("1718000000.000001-messages.json").exists());
    assert!(chats.join("1718000000.000001-history.json").exists());

    let repo = FileChatRepository::local(tmp.path());
    assert_eq!(repo.load_messages(&id).await.unwrap(), expected);
    assert_eq!(
        repo.load_history(&id).await.unwrap(),
        vec![HistoryContent::user("2+2?"), HistoryContent::model("4")]
    );
    let index = repo.load_sessions().await.unwrap();
    assert_eq!(
        index.title(&id).map(|t| t.as_str()),
        Some("ChatSession-1718000000.000001")
    );
}

#[tokio::test]
async fn resumed_session_reproduces_records() {
    let tmp = TempDir::new().unwrap();
    let id = SessionId::parse("s1").unwrap();

    {
        let service = service(&tmp, vec![vec!["Hi", "there"]]);
        let mut session = service.begin_session(id.clone()).await.unwrap();
        service.submit(&mut session, "hello", |_| {}).await.unwrap();
    }

    let service = service(&tmp, vec![vec!["Fine"]]);
    let mut resumed = service.begin_session(id.clone()).await.unwrap();
    assert_eq!(
        resumed.messages(),
        &[Turn::user("hello"), Turn::assistant("Hi there ")]
    );
    assert_eq!(resumed.remote().history().len(), 2);

    let mut streamed = String::new();
    service
        .submit(&mut resumed, "how are you?", |piece| streamed.push_str(piece))
        .await
        .unwrap();

    assert_eq!(streamed, "Fine ");
    assert_eq!(resumed.messages().len(), 4);
    assert_eq!(resumed.history().len(), 4);
    assert_eq!(
        service.load_transcript(&id).await.unwrap(),
        resumed.messages()
    );
}

#[tokio::test]
async fn deleted_session_starts_fresh() {
    let tmp = TempDir::new().unwrap();
    let service = service(&tmp, vec![vec!["ok"]]);
    let id = SessionId::parse("s1").unwrap();

    let mut session = service.begin_session(id.clone()).await.unwrap();
    service.submit(&mut session, "hi", |_| {}).await.unwrap();
    service.delete_session(&id).await.unwrap();

    assert!(service.list_sessions().await.unwrap().is_empty());
    let reopened = service.begin_session(id).await.unwrap();
    assert!(reopened.messages().is_empty());
    assert!(reopened.history().is_empty());
}

#[tokio::test]
async fn two_handles_on_one_session_append_in_order() {
    let tmp = TempDir::new().unwrap();
    let service = service(&tmp, vec![vec!["A"], vec!["B"]]);
    let id = SessionId::parse("s1").unwrap();

    let mut first = service.begin_session(id.clone()).await.unwrap();
    let mut second = service.begin_session(id.clone()).await.unwrap();
    service.submit(&mut first, "one", |_| {}).await.unwrap();
    service.submit(&mut second, "two", |_| {}).await.unwrap();

    let repo = FileChatRepository::local(tmp.path());
    assert_eq!(
        repo.load_messages(&id).await.unwrap(),
        vec![
            Turn::user("one"),
            Turn::assistant("A "),
            Turn::user("two"),
            Turn::assistant("B "),
        ]
    );
    assert_eq!(repo.load_history(&id).await.unwrap().len(), 4);
}

#[tokio::test]
async fn index_with_path_like_key_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let chats = tmp.path().join("chats");
    std::fs::create_dir_all(&chats).unwrap();
    std::fs::write(chats.join("sessions.json"), r#"{"../x": "ChatSession-../x"}"#).unwrap();

    let repo = FileChatRepository::local(tmp.path());
    assert!(repo.load_sessions().await.is_err());
}
