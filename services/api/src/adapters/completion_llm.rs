//! services/api/src/adapters/completion_llm.rs
//!
//! This module contains the AI gateway: the adapter for the chat-completion
//! endpoint (OpenRouter, spoken to through its OpenAI-compatible API).
//! It implements the `CompletionService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use std::time::Duration;
use stylo_core::domain::{ChatRole, ChatTurn};
use stylo_core::ports::{CompletionService, PortError, PortResult};
use tracing::{error, info};

/// The reply handed back in place of an answer when the model could not be reached.
pub fn unavailable_reply(reason: &str) -> String {
    format!("Sorry, the AI service is currently unavailable. ({})", reason)
}

/// A backoff policy that gives up after the first failure, so 5xx and 429
/// answers surface as-is instead of being retried by the client.
fn single_attempt() -> ExponentialBackoff {
    ExponentialBackoffBuilder::new()
        .with_max_elapsed_time(Some(Duration::ZERO))
        .build()
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `CompletionService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiCompletionAdapter {
    client: Client<OpenAIConfig>,
    model: String,
    timeout: Duration,
}

impl OpenAiCompletionAdapter {
    /// Creates a new `OpenAiCompletionAdapter`. Any retry policy on `client` is replaced.
    pub fn new(client: Client<OpenAIConfig>, model: String, timeout: Duration) -> Self {
        Self {
            client: client.with_backoff(single_attempt()),
            model,
            timeout,
        }
    }

    fn to_request_message(turn: &ChatTurn) -> Result<ChatCompletionRequestMessage, OpenAIError> {
        let content = turn.content.clone();
        Ok(match turn.role {
            ChatRole::System => ChatCompletionRequestSystemMessageArgs::default()
                .content(content)
                .build()?
                .into(),
            ChatRole::User => ChatCompletionRequestUserMessageArgs::default()
                .content(content)
                .build()?
                .into(),
            ChatRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                .content(content)
                .build()?
                .into(),
        })
    }

    /// A single request, no retries. Every failure mode comes back as `PortError::Unexpected`.
    async fn try_complete(&self, messages: &[ChatTurn]) -> PortResult<String> {
        let request_messages = messages
            .iter()
            .map(Self::to_request_message)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(request_messages)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| {
                PortError::Unexpected(format!(
                    "request timed out after {}s",
                    self.timeout.as_secs_f32()
                ))
            })?
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        // Extract the text content from the first choice in the response.
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::Unexpected("completion response contained no text content".to_string())
            })
    }
}

//=========================================================================================
// `CompletionService` Trait Implementation
//=========================================================================================

#[async_trait]
impl CompletionService for OpenAiCompletionAdapter {
    async fn complete(&self, messages: &[ChatTurn]) -> String {
        info!(
            "Requesting completion from {} with {} messages",
            self.model,
            messages.len()
        );
        match self.try_complete(messages).await {
            Ok(text) => text,
            Err(e) => {
                error!("Completion request to {} failed: {}", self.model, e);
                let reason = match e {
                    PortError::Unexpected(detail) => detail,
                    other => other.to_string(),
                };
                unavailable_reply(&reason)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    fn adapter(base_url: &str, timeout: Duration) -> OpenAiCompletionAdapter {
        let config = OpenAIConfig::new()
            .with_api_base(base_url)
            .with_api_key("test-key");
        OpenAiCompletionAdapter::new(Client::with_config(config), "test/model".to_string(), timeout)
    }

    /// Reads one HTTP request (headers plus `Content-Length` body) off the socket.
    async fn read_request(socket: &mut TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = match socket.read(&mut chunk).await {
                Ok(0) | Err(_) => return,
                Ok(n) => n,
            };
            buf.extend_from_slice(&chunk[..n]);
            let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let body_len = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + body_len {
                return;
            }
        }
    }

    /// Serves the same canned response to every request and counts the requests.
    async fn canned_server(status: &'static str, body: &'static str) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let counter = counter.clone();
                tokio::spawn(async move {
                    read_request(&mut socket).await;
                    counter.fetch_add(1, Ordering::SeqCst);
                    let response = format!(
                        "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });
        (format!("http://{}", addr), hits)
    }

    #[test]
    fn placeholder_embeds_reason() {
        let reply = unavailable_reply("connection refused");
        assert_eq!(
            reply,
            "Sorry, the AI service is currently unavailable. (connection refused)"
        );
    }

    #[tokio::test]
    async fn successful_completion_returns_first_choice() {
        let (url, hits) = canned_server(
            "200 OK",
            r#"{"id":"c1","object":"chat.completion","created":1,"model":"test/model","choices":[{"index":0,"message":{"role":"assistant","content":"Wear the navy blazer."},"finish_reason":"stop"}]}"#,
        )
        .await;

        let reply = adapter(&url, Duration::from_secs(5))
            .complete(&[ChatTurn::user("hello")])
            .await;
        assert_eq!(reply, "Wear the navy blazer.");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unreachable_endpoint_degrades_to_placeholder() {
        // Bind then drop to get a local port with nothing listening on it.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let gateway = adapter(&format!("http://{}", addr), Duration::from_secs(5));
        let reply = gateway.complete(&[ChatTurn::user("hello")]).await;
        assert!(reply.starts_with("Sorry, the AI service is currently unavailable. ("));
        assert!(reply.len() > unavailable_reply("").len());
    }

    #[tokio::test]
    async fn server_error_is_reported_once_with_its_body() {
        let (url, hits) = canned_server(
            "503 Service Unavailable",
            r#"{"error":{"message":"upstream overloaded"}}"#,
        )
        .await;

        let reply = adapter(&url, Duration::from_secs(5))
            .complete(&[ChatTurn::user("hello")])
            .await;
        assert!(reply.starts_with("Sorry, the AI service is currently unavailable. ("));
        assert!(reply.contains("upstream overloaded"), "unexpected reply: {}", reply);
        assert!(!reply.contains("timed out"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rate_limit_is_not_retried() {
        let (url, hits) = canned_server(
            "429 Too Many Requests",
            r#"{"error":{"message":"slow down","type":"rate_limit_exceeded"}}"#,
        )
        .await;

        let reply = adapter(&url, Duration::from_secs(5))
            .complete(&[ChatTurn::user("hello")])
            .await;
        assert!(reply.contains("slow down"), "unexpected reply: {}", reply);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn malformed_body_degrades_to_placeholder() {
        let (url, hits) = canned_server("200 OK", r#"{"unexpected": true}"#).await;

        let reply = adapter(&url, Duration::from_secs(5))
            .complete(&[ChatTurn::user("hello")])
            .await;
        assert!(reply.contains("failed to deserialize"), "unexpected reply: {}", reply);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_choices_degrade_to_placeholder() {
        let (url, _) = canned_server(
            "200 OK",
            r#"{"id":"c1","object":"chat.completion","created":1,"model":"test/model","choices":[]}"#,
        )
        .await;

        let reply = adapter(&url, Duration::from_secs(5))
            .complete(&[ChatTurn::user("hello")])
            .await;
        assert_eq!(
            reply,
            unavailable_reply("completion response contained no text content")
        );
    }

    #[tokio::test]
    async fn silent_endpoint_times_out_into_placeholder() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 4096];
                    while let Ok(n) = socket.read(&mut buf).await {
                        if n == 0 {
                            break;
                        }
                    }
                });
            }
        });

        let gateway = adapter(&format!("http://{}", addr), Duration::from_millis(200));
        let reply = gateway.complete(&[ChatTurn::system("be brief"), ChatTurn::user("hi")]).await;
        assert!(reply.contains("timed out"), "unexpected reply: {}", reply);
    }
}
