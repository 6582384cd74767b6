//! Scripted provider for tests.

use super::provider::{AiError, CompletionProvider, Message};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

type Responder = Box<dyn Fn(u32, &[Message]) -> Result<String, AiError> + Send + Sync>;

pub struct MockProvider {
    respond: Responder,
    calls: AtomicU32,
    last_messages: Mutex<Vec<Message>>,
}

impl MockProvider {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(u32, &[Message]) -> Result<String, AiError> + Send + Sync + 'static,
    {
        Self {
            respond: Box::new(respond),
            calls: AtomicU32::new(0),
            last_messages: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: &str) -> Self {
        let text = text.to_string();
        Self::new(move |_, _| Ok(text.clone()))
    }

    /// Fails the first `failures` calls with a 503, then replies with `text`.
    pub fn failing_then(failures: u32, text: &str) -> Self {
        let text = text.to_string();
        Self::new(move |call, _| {
            if call < failures {
                Err(AiError::Api {
                    status: 503,
                    body: "overloaded".to_string(),
                })
            } else {
                Ok(text.clone())
            }
        })
    }

    pub fn broken() -> Self {
        Self::new(|_, _| {
            Err(AiError::Api {
                status: 400,
                body: "bad request".to_string(),
            })
        })
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_messages(&self) -> Vec<Message> {
        self.last_messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn complete(
        &self,
        messages: Vec<Message>,
        _temperature: f32,
        _max_tokens: u32,
    ) -> Result<String, AiError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let result = (self.respond)(call, &messages);
        *self.last_messages.lock().unwrap() = messages;
        result
    }
}
