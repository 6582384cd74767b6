//! # Background Enrichment
//!
//! After an upload with readable text, a job asks the AI provider for a
//! summary and a keyword list and folds them into the document metadata:
//!
//! - the summary becomes the description, but only if the document has none;
//! - keywords that pass the tag rules are appended to the existing tags.
//!
//! The job reports `InProgress(1)` after the summary, `InProgress(2)` after
//! the keywords, then `Completed` or `Failed`. Nothing the provider returns
//! can overwrite metadata the user typed in.

use common::jobs::JobStatus;
use common::model::document::Document;
use log::{info, warn};
use uuid::Uuid;

use crate::ai::query::{Completion, QueryService};
use crate::job_controller::state::JobsState;
use crate::storage::db::{DocumentStore, StoreError};
use crate::validation::{sanitize_description, sanitize_tags};

/// Documents with fewer characters of text are not worth a provider call.
pub const MIN_ENRICH_CHARS: usize = 50;

pub fn should_enrich(text: &str) -> bool {
    text.trim().chars().count() > MIN_ENRICH_CHARS
}

/// Registers a job for `document` and spawns it. Returns the job id.
pub async fn schedule_enrichment(
    jobs: &JobsState,
    store: DocumentStore,
    query: QueryService,
    document_id: i64,
    text: String,
) -> String {
    let job_id = Uuid::new_v4().to_string();
    jobs.register(&job_id).await;

    let jobs = jobs.clone();
    let job_id_for_task = job_id.clone();
    tokio::spawn(async move {
        let status = run_enrichment(&jobs, &job_id_for_task, store, &query, document_id, &text).await;
        match &status {
            JobStatus::Completed(msg) => info!("Enrichment of document {}: {}", document_id, msg),
            JobStatus::Failed(msg) => warn!("Enrichment of document {} failed: {}", document_id, msg),
            _ => {}
        }
        jobs.report(&job_id_for_task, status).await;
    });

    job_id
}

async fn run_enrichment(
    jobs: &JobsState,
    job_id: &str,
    store: DocumentStore,
    query: &QueryService,
    document_id: i64,
    text: &str,
) -> JobStatus {
    let summary = match query.summarize(text).await {
        Completion::Answered(summary) => Some(summary),
        Completion::Unavailable => None,
        Completion::Degraded(e) => {
            warn!("Summary for document {} failed: {}", document_id, e);
            None
        }
    };
    jobs.report(job_id, JobStatus::InProgress(1)).await;

    let (_, keywords) = query.keywords(text).await;
    jobs.report(job_id, JobStatus::InProgress(2)).await;

    if summary.is_none() && keywords.is_empty() {
        return JobStatus::Failed("AI provider returned neither a summary nor keywords".to_string());
    }

    let handle = tokio::task::spawn_blocking(move || {
        apply_enrichment(&store, document_id, summary, &keywords)
    });

    match handle.await {
        Ok(Ok(document)) => JobStatus::Completed(format!(
            "Document {} enriched: {} tags",
            document.id,
            document.tags.len()
        )),
        Ok(Err(e)) => JobStatus::Failed(e.to_string()),
        Err(e) => JobStatus::Failed(format!("Task join error: {}", e)),
    }
}

/// Writes a generated summary and keywords into the document metadata.
/// The store decides on the description and merges the tags inside one
/// transaction, so a concurrent user edit is never overwritten.
pub fn apply_enrichment(
    store: &DocumentStore,
    document_id: i64,
    summary: Option<String>,
    keywords: &[String],
) -> Result<Document, StoreError> {
    let description = summary.as_deref().and_then(sanitize_description);
    store.apply_enrichment(document_id, description.as_deref(), |current| {
        sanitize_tags(current.iter().chain(keywords.iter()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::mock::MockProvider;
    use crate::config::Config;
    use crate::storage::db::NewDocument;
    use common::model::document::ExtractionStatus;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    fn store_with(description: Option<&str>) -> (TempDir, DocumentStore, Document) {
        let dir = TempDir::new().unwrap();
        let store = DocumentStore::open(dir.path().join("test.sqlite")).unwrap();
        let doc = store
            .create(&NewDocument {
                stored_name: "id_report.pdf".into(),
                original_name: "report.pdf".into(),
                file_path: "uploads/id_report.pdf".into(),
                content: "Revenue grew 10% compared with last year across all regions.".into(),
                file_size: 100,
                page_count: 1,
                checksum: "abc".into(),
                extraction_status: ExtractionStatus::Ok,
                description: description.map(str::to_string),
                tags: vec!["finance".into()],
            })
            .unwrap();
        (dir, store, doc)
    }

    #[test]
    fn threshold_counts_trimmed_characters() {
        assert!(!should_enrich(&format!("  {}  ", "a".repeat(MIN_ENRICH_CHARS))));
        assert!(should_enrich(&"a".repeat(MIN_ENRICH_CHARS + 1)));
    }

    #[test]
    fn summary_fills_only_missing_description() {
        let (_dir, store, doc) = store_with(None);
        let keywords = vec!["Revenue".to_string(), "FINANCE".to_string(), "<bad>".to_string()];

        let updated =
            apply_enrichment(&store, doc.id, Some("Revenue grew.".into()), &keywords).unwrap();
        assert_eq!(updated.description.as_deref(), Some("Revenue grew."));
        assert_eq!(updated.tags, vec!["finance", "Revenue"]);

        let (_dir2, store2, doc2) = store_with(Some("typed by user"));
        let kept = apply_enrichment(&store2, doc2.id, Some("generated".into()), &[]).unwrap();
        assert_eq!(kept.description.as_deref(), Some("typed by user"));
    }

    #[test]
    fn edit_made_while_the_provider_answers_is_kept() {
        let (_dir, store, doc) = store_with(None);
        let summary = Some("Revenue grew.".to_string());

        store
            .update_metadata(doc.id, Some("typed by user".into()), Some(vec!["audit".into()]))
            .unwrap();

        let updated =
            apply_enrichment(&store, doc.id, summary, &["revenue".to_string()]).unwrap();
        assert_eq!(updated.description.as_deref(), Some("typed by user"));
        assert_eq!(updated.tags, vec!["audit", "revenue"]);
    }

    #[actix_web::test]
    async fn job_completes_and_updates_the_document() {
        let (_dir, store, doc) = store_with(None);
        let jobs = JobsState::start();
        let provider = Arc::new(MockProvider::replying("revenue, growth"));
        let query = QueryService::new(Some(provider), &Config::default().ai);

        let job_id =
            schedule_enrichment(&jobs, store.clone(), query, doc.id, doc.content.clone()).await;

        let mut finished = None;
        for _ in 0..200 {
            match jobs.status(&job_id).await {
                Some(status) if status.is_finished() => {
                    finished = Some(status);
                    break;
                }
                _ => tokio::time::sleep(Duration::from_millis(5)).await,
            }
        }

        assert!(matches!(finished, Some(JobStatus::Completed(_))));
        let updated = store.get(doc.id).unwrap();
        assert_eq!(updated.description.as_deref(), Some("revenue, growth"));
        assert_eq!(updated.tags, vec!["finance", "revenue", "growth"]);
    }

    #[actix_web::test]
    async fn job_fails_when_provider_gives_nothing() {
        let (_dir, store, doc) = store_with(None);
        let jobs = JobsState::start();
        let query = QueryService::new(Some(Arc::new(MockProvider::broken())), &Config::default().ai);

        let job_id = schedule_enrichment(&jobs, store.clone(), query, doc.id, doc.content).await;

        let mut finished = None;
        for _ in 0..200 {
            match jobs.status(&job_id).await {
                Some(status) if status.is_finished() => {
                    finished = Some(status);
                    break;
                }
                _ => tokio::time::sleep(Duration::from_millis(5)).await,
            }
        }

        assert!(matches!(finished, Some(JobStatus::Failed(_))));
        assert_eq!(store.get(doc.id).unwrap().description, None);
    }
}
