//! Processing several documents concurrently.
//!
//! Documents are independent: a rejected document never affects the
//! others. Results are keyed by document id; the order in which documents
//! complete is unspecified.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::task::JoinSet;

use crate::pipeline::engine::{Engine, Processed};
use crate::pipeline::report::{DocumentReport, Rejection, batch_exit_code};
use crate::translate::Translator;

/// One document of a batch.
#[derive(Debug, Clone)]
pub struct BatchItem {
    /// Key of the document in the results
    pub id: String,
    pub input: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub documents: BTreeMap<String, DocumentReport>,
}

impl BatchReport {
    pub fn exit_code(&self) -> i32 {
        batch_exit_code(self.documents.values())
    }

    pub fn delivered(&self) -> usize {
        self.documents.values().filter(|r| r.is_delivered()).count()
    }
}

/// Transform in-memory documents; results keyed by document id.
pub async fn run_in_memory<T>(
    engine: Arc<Engine<T>>,
    documents: Vec<(String, Vec<u8>)>,
) -> BTreeMap<String, Processed>
where
    T: Translator + 'static,
{
    let mut set = JoinSet::new();
    for (id, bytes) in documents {
        let engine = Arc::clone(&engine);
        set.spawn(async move {
            let processed = engine.transform(&id, bytes).await;
            (id, processed)
        });
    }

    let mut results = BTreeMap::new();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((id, processed)) => {
                results.insert(id, processed);
            },
            Err(e) => log::error!("batch task failed: {}", e),
        }
    }
    results
}

/// Transform files; each delivered document is written to its output path.
pub async fn run_files<T>(engine: Arc<Engine<T>>, items: Vec<BatchItem>) -> BatchReport
where
    T: Translator + 'static,
{
    let mut set = JoinSet::new();
    for item in items {
        let engine = Arc::clone(&engine);
        set.spawn(async move {
            let report = match engine.transform_file(&item.input, &item.output).await {
                Ok(processed) => processed.report,
                Err(e) => DocumentReport::rejected(item.id.as_str(), Rejection::Internal(e.to_string())),
            };
            (item.id, report)
        });
    }

    let mut batch = BatchReport::default();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((id, report)) => {
                batch.documents.insert(id, report);
            },
            Err(e) => log::error!("batch task failed: {}", e),
        }
    }
    log::info!(
        "batch finished: {} of {} documents delivered",
        batch.delivered(),
        batch.documents.len()
    );
    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::pipeline::report::DocumentOutcome;
    use crate::translate::IdentityTranslator;

    #[tokio::test]
    async fn test_rejections_are_isolated() {
        let engine = Arc::new(Engine::new(EngineConfig::default(), IdentityTranslator));
        let documents = vec![
            ("a".to_string(), b"not a zip".to_vec()),
            ("b".to_string(), Vec::new()),
        ];
        let results = run_in_memory(engine, documents).await;
        assert_eq!(results.len(), 2);
        for processed in results.values() {
            assert!(matches!(
                processed.report.outcome,
                DocumentOutcome::Rejected(Rejection::Format(_))
            ));
            assert!(processed.output.is_none());
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Arc::new(Engine::new(EngineConfig::default(), IdentityTranslator));
        let items = vec![BatchItem {
            id: "missing".into(),
            input: dir.path().join("absent.pptx"),
            output: dir.path().join("out.pptx"),
        }];
        let report = run_files(engine, items).await;
        assert_eq!(report.delivered(), 0);
        assert_eq!(report.exit_code(), 1);
        assert!(!dir.path().join("out.pptx").exists());
    }
}
