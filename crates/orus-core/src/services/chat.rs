//! Chat and generate services.
//!
//! Synchronous calls run the whole backend exchange inside the dispatcher
//! and return the accumulated text. Streaming calls only open the backend
//! stream under the deadline; the relay then owns the stream.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::domain::{
    CallLlmRequest, GenerateChunk, GenerateTextRequest, StreamEvent, StreamRecord,
};
use crate::error::GatewayError;
use crate::ports::{BackendError, InferenceBackendPort, RecordStream};
use crate::services::accumulator::ChatAccumulator;
use crate::services::dispatcher::RequestDispatcher;

/// Result of a non-streaming chat or generate call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatCompletion {
    pub model: String,
    pub content: String,
    /// Number of backend records consumed.
    pub records: usize,
}

/// Chat and prompt completion against the inference backend.
#[derive(Debug, Clone)]
pub struct ChatService {
    backend: Arc<dyn InferenceBackendPort>,
    dispatcher: RequestDispatcher,
}

impl ChatService {
    pub fn new(backend: Arc<dyn InferenceBackendPort>, dispatcher: RequestDispatcher) -> Self {
        Self {
            backend,
            dispatcher,
        }
    }

    /// Run a chat to completion and return the concatenated reply.
    pub async fn complete(
        &self,
        request: &CallLlmRequest,
        deadline: Duration,
    ) -> Result<ChatCompletion, GatewayError> {
        let mut chat = request.to_chat_request();
        chat.stream = false;
        let model = chat.model.clone();
        info!(model = %model, messages = chat.messages.len(), "Dispatching chat");

        let backend = Arc::clone(&self.backend);
        self.dispatcher
            .dispatch(deadline, move |cancel| async move {
                let stream = backend.chat(&chat, cancel).await?;
                Ok(collect(model, stream).await?)
            })
            .await
            .into_result()
    }

    /// Open a streaming chat. `cancel` stays attached to the returned
    /// stream so the relay can abort it later.
    pub async fn open_stream(
        &self,
        request: &CallLlmRequest,
        deadline: Duration,
        cancel: CancellationToken,
    ) -> Result<RecordStream<StreamEvent>, GatewayError> {
        let mut chat = request.to_chat_request();
        chat.stream = true;
        info!(model = %chat.model, "Opening chat stream");

        let backend = Arc::clone(&self.backend);
        self.dispatcher
            .dispatch(deadline, move |_| async move {
                backend.chat(&chat, cancel).await.map_err(GatewayError::from)
            })
            .await
            .into_result()
    }

    /// Run a prompt completion to the end.
    pub async fn generate(
        &self,
        request: &GenerateTextRequest,
        deadline: Duration,
    ) -> Result<ChatCompletion, GatewayError> {
        let mut generate = request.to_generate_request();
        generate.stream = false;
        let model = generate.model.clone();
        info!(model = %model, "Dispatching generate");

        let backend = Arc::clone(&self.backend);
        self.dispatcher
            .dispatch(deadline, move |cancel| async move {
                let stream = backend.generate(&generate, cancel).await?;
                Ok(collect(model, stream).await?)
            })
            .await
            .into_result()
    }

    pub async fn open_generate_stream(
        &self,
        request: &GenerateTextRequest,
        deadline: Duration,
        cancel: CancellationToken,
    ) -> Result<RecordStream<GenerateChunk>, GatewayError> {
        let mut generate = request.to_generate_request();
        generate.stream = true;
        info!(model = %generate.model, "Opening generate stream");

        let backend = Arc::clone(&self.backend);
        self.dispatcher
            .dispatch(deadline, move |_| async move {
                backend
                    .generate(&generate, cancel)
                    .await
                    .map_err(GatewayError::from)
            })
            .await
            .into_result()
    }
}

/// Drain a record stream into one completion.
async fn collect<R: StreamRecord>(
    model: String,
    mut stream: RecordStream<R>,
) -> Result<ChatCompletion, BackendError> {
    let mut accumulator = ChatAccumulator::new();
    while let Some(record) = stream.next().await {
        let record = record?;
        if let Some(message) = record.upstream_error() {
            return Err(BackendError::Upstream(message.to_string()));
        }
        accumulator.observe(&record);
        if record.is_terminal() {
            break;
        }
    }
    let records = accumulator.records();
    let content = accumulator.finish()?;
    debug!(records, chars = content.len(), "Completion accumulated");
    Ok(ChatCompletion {
        model,
        content,
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChatRequest, GenerateRequest, PullProgress};
    use async_trait::async_trait;
    use futures_util::stream;
    use std::sync::Mutex;

    /// Backend that replays canned chat records.
    #[derive(Debug, Default)]
    struct ScriptedBackend {
        chat: Vec<StreamEvent>,
        delay: Option<Duration>,
        seen: Mutex<Vec<ChatRequest>>,
    }

    #[async_trait]
    impl InferenceBackendPort for ScriptedBackend {
        async fn chat(
            &self,
            request: &ChatRequest,
            _cancel: CancellationToken,
        ) -> Result<RecordStream<StreamEvent>, BackendError> {
            self.seen.lock().unwrap().push(request.clone());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            Ok(Box::pin(stream::iter(self.chat.clone().into_iter().map(Ok))))
        }

        async fn generate(
            &self,
            request: &GenerateRequest,
            _cancel: CancellationToken,
        ) -> Result<RecordStream<GenerateChunk>, BackendError> {
            let chunks = request
                .prompt
                .split_inclusive(' ')
                .map(|word| GenerateChunk {
                    response: word.to_uppercase(),
                    ..GenerateChunk::default()
                })
                .chain(std::iter::once(GenerateChunk {
                    done: true,
                    ..GenerateChunk::default()
                }))
                .map(Ok)
                .collect::<Vec<_>>();
            Ok(Box::pin(stream::iter(chunks)))
        }

        async fn pull_model(
            &self,
            _name: &str,
            _cancel: CancellationToken,
        ) -> Result<RecordStream<PullProgress>, BackendError> {
            Ok(Box::pin(stream::empty()))
        }

        async fn embed(
            &self,
            _model: &str,
            _text: &str,
            _cancel: CancellationToken,
        ) -> Result<Vec<f64>, BackendError> {
            Ok(Vec::new())
        }

        async fn list_models(
            &self,
            _cancel: CancellationToken,
        ) -> Result<Vec<String>, BackendError> {
            Ok(Vec::new())
        }
    }

    fn request(stream: bool) -> CallLlmRequest {
        CallLlmRequest::from_body(
            format!(
                r#"{{"model":"llama3","stream":{stream},"messages":[{{"role":"user","content":"hi"}}]}}"#
            )
            .as_bytes(),
        )
        .unwrap()
    }

    fn service(backend: ScriptedBackend) -> (ChatService, Arc<ScriptedBackend>) {
        let backend = Arc::new(backend);
        let service = ChatService::new(backend.clone(), RequestDispatcher::default());
        (service, backend)
    }

    #[tokio::test]
    async fn test_complete_concatenates_deltas() {
        let (service, backend) = service(ScriptedBackend {
            chat: vec![
                StreamEvent::delta("llama3", "Hel", false),
                StreamEvent::delta("llama3", "lo", true),
            ],
            ..ScriptedBackend::default()
        });

        let completion = service
            .complete(&request(true), Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(completion.content, "Hello");
        assert_eq!(completion.records, 2);
        assert!(!backend.seen.lock().unwrap()[0].stream);
    }

    #[tokio::test]
    async fn test_complete_without_done_is_incomplete() {
        let (service, _) = service(ScriptedBackend {
            chat: vec![StreamEvent::delta("llama3", "Hel", false)],
            ..ScriptedBackend::default()
        });

        let error = service
            .complete(&request(false), Duration::from_secs(5))
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            GatewayError::Upstream(BackendError::IncompleteStream(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_complete_times_out() {
        let (service, _) = service(ScriptedBackend {
            chat: vec![StreamEvent::delta("llama3", "late", true)],
            delay: Some(Duration::from_secs(30)),
            ..ScriptedBackend::default()
        });

        let error = service
            .complete(&request(false), Duration::from_secs(1))
            .await
            .unwrap_err();

        assert_eq!(error, GatewayError::Timeout(Duration::from_secs(1)));
    }

    #[tokio::test]
    async fn test_open_stream_forces_streaming() {
        let (service, backend) = service(ScriptedBackend {
            chat: vec![StreamEvent::delta("llama3", "x", true)],
            ..ScriptedBackend::default()
        });

        let stream = service
            .open_stream(&request(false), Duration::from_secs(5), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(stream.count().await, 1);
        assert!(backend.seen.lock().unwrap()[0].stream);
    }

    #[tokio::test]
    async fn test_generate_concatenates_response() {
        let (service, _) = service(ScriptedBackend::default());
        let request =
            GenerateTextRequest::from_body(br#"{"model":"llama3","prompt":"why is the sky blue"}"#)
                .unwrap();

        let completion = service
            .generate(&request, Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(completion.content, "WHY IS THE SKY BLUE");
    }
}
