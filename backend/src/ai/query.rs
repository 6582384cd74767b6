//! # Query Service
//!
//! Turns stored document text and a question into an answer from the
//! configured completion provider.
//!
//! The service never returns an error to the HTTP layer once a request has
//! passed validation. A missing provider, a provider failure and a document
//! without text all come back as a [`QueryResponse`] whose `status` says what
//! happened; only `Answered` carries provider output.
//!
//! The same provider plumbing backs the per-document summary and keyword
//! endpoints and the background enrichment job.

use common::model::query::{AnswerStatus, DocumentRef, QueryResponse};
use log::{info, warn};
use std::sync::Arc;

use super::provider::{complete_with_retry, CompletionProvider, Message, RetryPolicy};
use crate::config::AiConfig;
use crate::storage::db::DocumentText;

pub const UNAVAILABLE_ANSWER: &str =
    "AI service is not available. Please configure an AI provider API key.";
pub const DEGRADED_ANSWER: &str =
    "Sorry, the AI service could not answer right now. Please try again in a few minutes.";
pub const NO_DOCUMENTS_ANSWER: &str =
    "No documents have been uploaded yet. Please upload some PDF files first.";
pub const MAX_KEYWORDS: usize = 10;

const SYSTEM_PROMPT: &str = "You answer questions about documents uploaded by the user. \
    Base every answer on the document content you are given. \
    If the answer cannot be found in the document, say so.";

const SUMMARY_MAX_TOKENS: u32 = 300;
const KEYWORDS_MAX_TOKENS: u32 = 100;

/// Result of a single provider round trip.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Answered(String),
    Unavailable,
    /// Carries the provider error message.
    Degraded(String),
}

impl Completion {
    pub fn status(&self) -> AnswerStatus {
        match self {
            Completion::Answered(_) => AnswerStatus::Answered,
            Completion::Unavailable => AnswerStatus::Unavailable,
            Completion::Degraded(_) => AnswerStatus::Degraded,
        }
    }
}

#[derive(Clone)]
pub struct QueryService {
    provider: Option<Arc<dyn CompletionProvider>>,
    temperature: f32,
    max_tokens: u32,
    context_chars: usize,
    retry: RetryPolicy,
}

impl QueryService {
    pub fn new(provider: Option<Arc<dyn CompletionProvider>>, config: &AiConfig) -> Self {
        Self {
            provider,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            context_chars: config.context_chars,
            retry: RetryPolicy::new(config.max_retries),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn is_available(&self) -> bool {
        self.provider.is_some()
    }

    pub fn provider_name(&self) -> Option<String> {
        self.provider.as_ref().map(|p| p.name().to_string())
    }

    /// Answers `question` from `texts`.
    ///
    /// With `document_id` set, `texts` holds exactly that document (possibly
    /// without text); otherwise it holds every document that has text.
    pub async fn answer(
        &self,
        question: &str,
        document_id: Option<i64>,
        texts: &[DocumentText],
    ) -> QueryResponse {
        let document_info: Vec<DocumentRef> = texts
            .iter()
            .map(|t| DocumentRef {
                id: t.id,
                filename: t.stored_name.clone(),
                original_filename: t.original_name.clone(),
            })
            .collect();

        let mut response = QueryResponse {
            query: question.to_string(),
            status: AnswerStatus::NoDocuments,
            answer: NO_DOCUMENTS_ANSWER.to_string(),
            success: false,
            provider: self.provider_name(),
            model_used: self.provider.as_ref().map(|p| p.model().to_string()),
            documents_searched: 0,
            document_info,
            context_info: String::new(),
            context_truncated: false,
            document_id_queried: document_id,
            error: None,
            fallback: None,
        };

        let readable: Vec<&DocumentText> =
            texts.iter().filter(|t| !t.content.trim().is_empty()).collect();

        if readable.is_empty() {
            if let (Some(id), Some(doc)) = (document_id, texts.first()) {
                response.status = AnswerStatus::NoContent;
                response.answer = format!(
                    "Document {} ({}) has no readable text content, so it cannot be queried.",
                    id, doc.original_name
                );
            }
            return response;
        }

        let (context, truncated) = build_context(&readable, self.context_chars);
        response.documents_searched = readable.len();
        response.context_truncated = truncated;
        response.context_info = match readable.as_slice() {
            [single] => format!("Analyzing document: {}", single.original_name),
            many => format!("Analyzing {} documents", many.len()),
        };

        match self
            .complete(build_prompt(&context, question), self.max_tokens)
            .await
        {
            Completion::Answered(answer) => {
                response.status = AnswerStatus::Answered;
                response.answer = answer;
                response.success = true;
            }
            Completion::Unavailable => {
                response.status = AnswerStatus::Unavailable;
                response.answer = UNAVAILABLE_ANSWER.to_string();
                response.fallback = Some(fallback_answer(question, &context));
            }
            Completion::Degraded(error) => {
                response.status = AnswerStatus::Degraded;
                response.answer = DEGRADED_ANSWER.to_string();
                response.error = Some(error);
                response.fallback = Some(fallback_answer(question, &context));
            }
        }

        response
    }

    pub async fn summarize(&self, text: &str) -> Completion {
        let (content, _) = truncate_chars(text, self.context_chars);
        let prompt = format!(
            "Please provide a concise summary of the following document content:\n\n{}\n\n\
             Summary should be informative and capture the main points of the document.",
            content
        );
        self.complete(vec![Message::user(prompt)], SUMMARY_MAX_TOKENS)
            .await
    }

    /// Up to [`MAX_KEYWORDS`] keywords; `Answered` holds the raw provider text.
    pub async fn keywords(&self, text: &str) -> (Completion, Vec<String>) {
        let (content, _) = truncate_chars(text, self.context_chars);
        let prompt = format!(
            "Extract the most important keywords and phrases from the following document \
             content. Return them as a comma-separated list:\n\n{}\n\nKeywords:",
            content
        );
        let completion = self
            .complete(vec![Message::user(prompt)], KEYWORDS_MAX_TOKENS)
            .await;
        let keywords = match &completion {
            Completion::Answered(raw) => parse_keywords(raw),
            _ => Vec::new(),
        };
        (completion, keywords)
    }

    async fn complete(&self, messages: Vec<Message>, max_tokens: u32) -> Completion {
        let Some(provider) = self.provider.as_ref() else {
            return Completion::Unavailable;
        };

        match complete_with_retry(
            provider.as_ref(),
            messages,
            self.temperature,
            max_tokens,
            self.retry,
        )
        .await
        {
            Ok(text) if !text.trim().is_empty() => {
                info!("{} answered ({} chars)", provider.name(), text.len());
                Completion::Answered(text.trim().to_string())
            }
            Ok(_) => {
                warn!("{} returned an empty response", provider.name());
                Completion::Degraded("Provider returned an empty response".to_string())
            }
            Err(e) => {
                warn!("{} request failed: {}", provider.name(), e);
                Completion::Degraded(e.to_string())
            }
        }
    }
}

/// Joins document texts with a blank line, capped at `max_chars` characters
/// (0 disables the cap). Returns the context and whether it was cut.
pub fn build_context(texts: &[&DocumentText], max_chars: usize) -> (String, bool) {
    let joined = texts
        .iter()
        .map(|t| t.content.trim())
        .collect::<Vec<_>>()
        .join("\n\n");
    let (context, truncated) = truncate_chars(&joined, max_chars);
    (context.to_string(), truncated)
}

fn truncate_chars(text: &str, max_chars: usize) -> (&str, bool) {
    if max_chars == 0 {
        return (text, false);
    }
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => (&text[..idx], true),
        None => (text, false),
    }
}

pub fn build_prompt(context: &str, question: &str) -> Vec<Message> {
    vec![
        Message::system(SYSTEM_PROMPT),
        Message::user(format!(
            "Based on the following document content, please answer the user's question.\n\n\
             Document Content:\n{}\n\n\
             User Question: {}\n\n\
             Please provide a clear, concise answer based on the document content. \
             If the answer cannot be found in the document, please say so.",
            context, question
        )),
    ]
}

/// Splits a comma separated provider answer into at most [`MAX_KEYWORDS`] entries.
pub fn parse_keywords(raw: &str) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for keyword in raw.split([',', '\n']) {
        let keyword = keyword
            .trim()
            .trim_start_matches(['-', '*', '•'])
            .trim()
            .trim_end_matches('.');
        if keyword.is_empty() || keywords.iter().any(|k| k.eq_ignore_ascii_case(keyword)) {
            continue;
        }
        keywords.push(keyword.to_string());
        if keywords.len() == MAX_KEYWORDS {
            break;
        }
    }
    keywords
}

/// Local answer used when the provider cannot help.
pub fn fallback_answer(question: &str, context: &str) -> String {
    let question_lower = question.to_lowercase();
    let mentions = |words: &[&str]| words.iter().any(|w| question_lower.contains(w));

    if mentions(&["summary", "summarize", "what is", "about"]) {
        let head: String = context.chars().take(500).collect();
        let sentences: Vec<&str> = head
            .split('.')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .take(3)
            .collect();
        format!("Based on the document content: {}...", sentences.join(". "))
    } else if mentions(&["length", "size", "how long", "how many"]) {
        format!(
            "Document statistics: approximately {} words and {} characters.",
            context.split_whitespace().count(),
            context.chars().count()
        )
    } else {
        format!(
            "Your question '{}' relates to the document content, but AI processing is \
             currently unavailable. Please try again later.",
            question
        )
    }
}
