//! JSON-over-HTTP translation backend.
//!
//! Request body:
//!
//! ```json
//! {"target_locale": "ar-SA", "context": "Slide 2: Results",
//!  "elements": [{"id": "3#p0", "role": "title", "text": "Results"}]}
//! ```
//!
//! The response carries `{"elements": [{"id": "3#p0", "text": "..."}]}`.

use std::env;

use serde::{Deserialize, Serialize};

use crate::translate::{TranslatedElement, TranslationElement, TranslationError, Translator};

/// Endpoint URL
pub const ENDPOINT_VAR: &str = "MIRRORDECK_HTTP_ENDPOINT";
/// Optional bearer token
pub const TOKEN_VAR: &str = "MIRRORDECK_HTTP_TOKEN";

#[derive(Debug, Clone)]
pub struct HttpTranslator {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
    target_locale: String,
}

#[derive(Debug, Serialize)]
struct BatchRequest<'a> {
    target_locale: &'a str,
    context: &'a str,
    elements: &'a [TranslationElement],
}

#[derive(Debug, Deserialize)]
struct BatchResponse {
    elements: Vec<TranslatedElement>,
}

impl HttpTranslator {
    pub fn new(endpoint: impl Into<String>, token: Option<String>, target_locale: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            token,
            target_locale: target_locale.into(),
        }
    }

    /// Build from `MIRRORDECK_HTTP_ENDPOINT` and `MIRRORDECK_HTTP_TOKEN`.
    pub fn from_env(target_locale: impl Into<String>) -> Result<Self, TranslationError> {
        let endpoint = env::var(ENDPOINT_VAR)
            .map_err(|_| TranslationError::Backend(format!("{} is not set", ENDPOINT_VAR)))?;
        Ok(Self::new(endpoint, env::var(TOKEN_VAR).ok(), target_locale))
    }
}

impl Translator for HttpTranslator {
    fn name(&self) -> &str {
        "http"
    }

    async fn translate_batch(
        &self,
        context: &str,
        elements: &[TranslationElement],
    ) -> Result<Vec<TranslatedElement>, TranslationError> {
        let body = BatchRequest {
            target_locale: &self.target_locale,
            context,
            elements,
        };
        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TranslationError::Backend(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(TranslationError::Backend(format!(
                "{} returned {}: {}",
                self.endpoint, status, text
            )));
        }
        let parsed: BatchResponse = response
            .json()
            .await
            .map_err(|e| TranslationError::Backend(e.to_string()))?;
        Ok(parsed.elements)
    }
}
