//! Retrying, cancellable translation requests.

use std::collections::{HashMap, HashSet};

use tokio_util::sync::CancellationToken;

use crate::config::RetryConfig;
use crate::translate::{TranslatedElement, TranslationElement, TranslationError, Translator};

/// Translate a batch with up to `policy.attempts` attempts.
///
/// Elements whose text is blank are not sent and come back unchanged.
/// Each attempt is bounded by `policy.timeout()`; the delay between
/// attempts starts at `policy.backoff()` and doubles. Output is returned in
/// input order. Cancellation aborts the current attempt or backoff
/// immediately.
pub async fn translate_with_retry<T: Translator>(
    translator: &T,
    context: &str,
    elements: &[TranslationElement],
    policy: &RetryConfig,
    cancel: &CancellationToken,
) -> Result<Vec<TranslatedElement>, TranslationError> {
    let sent: Vec<TranslationElement> = elements
        .iter()
        .filter(|e| !e.text.trim().is_empty())
        .cloned()
        .collect();

    let mut translated = HashMap::new();
    if !sent.is_empty() {
        translated = attempt_all(translator, context, &sent, policy, cancel).await?;
    }

    Ok(elements
        .iter()
        .map(|e| TranslatedElement {
            id: e.id.clone(),
            text: translated.remove(&e.id).unwrap_or_else(|| e.text.clone()),
        })
        .collect())
}

async fn attempt_all<T: Translator>(
    translator: &T,
    context: &str,
    sent: &[TranslationElement],
    policy: &RetryConfig,
    cancel: &CancellationToken,
) -> Result<HashMap<String, String>, TranslationError> {
    let attempts = policy.attempts.max(1);
    let timeout = policy.timeout();
    let mut delay = policy.backoff();

    let mut attempt = 1;
    loop {
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(TranslationError::Cancelled),
            result = tokio::time::timeout(timeout, translator.translate_batch(context, sent)) => {
                result.unwrap_or(Err(TranslationError::Timeout(timeout)))
            }
        };

        let error = match outcome.and_then(|out| match_outputs(sent, out)) {
            Ok(translated) => {
                log::debug!(
                    "{}: translated {} elements on attempt {}",
                    translator.name(),
                    sent.len(),
                    attempt
                );
                return Ok(translated);
            },
            Err(error) => error,
        };
        if attempt >= attempts {
            log::warn!(
                "{}: giving up after {} attempts: {}",
                translator.name(),
                attempt,
                error
            );
            return Err(error);
        }

        log::warn!(
            "{}: attempt {} failed ({}), retrying in {:?}",
            translator.name(),
            attempt,
            error,
            delay
        );
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(TranslationError::Cancelled),
            _ = tokio::time::sleep(delay) => {}
        }
        delay = delay.saturating_mul(2);
        attempt += 1;
    }
}

/// Check that every sent id came back exactly once.
fn match_outputs(
    sent: &[TranslationElement],
    outputs: Vec<TranslatedElement>,
) -> Result<HashMap<String, String>, TranslationError> {
    let mut pending: HashSet<&str> = sent.iter().map(|e| e.id.as_str()).collect();
    let mut translated = HashMap::with_capacity(outputs.len());
    for output in outputs {
        if !pending.remove(output.id.as_str()) {
            return Err(TranslationError::UnexpectedOutput { id: output.id });
        }
        translated.insert(output.id, output.text);
    }
    match sent.iter().find(|e| pending.contains(e.id.as_str())) {
        Some(missing) => Err(TranslationError::MissingOutput {
            id: missing.id.clone(),
        }),
        None => Ok(translated),
    }
}
