//! Built-in translators.

use crate::ooxml::pptx::Role;
use crate::translate::{TranslatedElement, TranslationElement, TranslationError, Translator};

/// Returns every text unchanged. Useful to mirror a deck without
/// translating it.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTranslator;

impl Translator for IdentityTranslator {
    fn name(&self) -> &str {
        "identity"
    }

    async fn translate_batch(
        &self,
        _context: &str,
        elements: &[TranslationElement],
    ) -> Result<Vec<TranslatedElement>, TranslationError> {
        Ok(elements
            .iter()
            .map(|e| TranslatedElement {
                id: e.id.clone(),
                text: e.text.clone(),
            })
            .collect())
    }
}

/// Deterministic Arabic sample text tagged with the element id, for
/// checking that every translation lands in the right container.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockTranslator;

impl MockTranslator {
    fn sample(role: Role) -> &'static str {
        match role {
            Role::Title | Role::ChartTitle => "إطار التحول الاستراتيجي",
            Role::Heading => "النتائج الرئيسية والتوصيات",
            Role::Annotation => "ملاحظة",
            Role::ChartSeries => "السلسلة",
            Role::ChartLabel => "الفئة",
            Role::Body | Role::TableCell => "تحسين الكفاءة التشغيلية بنسبة 25%",
        }
    }

    pub fn translate_one(element: &TranslationElement) -> String {
        format!("{} (#{})", Self::sample(element.role), element.id)
    }
}

impl Translator for MockTranslator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn translate_batch(
        &self,
        _context: &str,
        elements: &[TranslationElement],
    ) -> Result<Vec<TranslatedElement>, TranslationError> {
        Ok(elements
            .iter()
            .map(|e| TranslatedElement {
                id: e.id.clone(),
                text: Self::translate_one(e),
            })
            .collect())
    }
}

/// The translators selectable by name.
#[derive(Debug, Clone)]
pub enum BuiltinTranslator {
    Identity(IdentityTranslator),
    Mock(MockTranslator),
    #[cfg(feature = "http")]
    Http(crate::translate::HttpTranslator),
}

impl Translator for BuiltinTranslator {
    fn name(&self) -> &str {
        match self {
            BuiltinTranslator::Identity(t) => t.name(),
            BuiltinTranslator::Mock(t) => t.name(),
            #[cfg(feature = "http")]
            BuiltinTranslator::Http(t) => t.name(),
        }
    }

    async fn translate_batch(
        &self,
        context: &str,
        elements: &[TranslationElement],
    ) -> Result<Vec<TranslatedElement>, TranslationError> {
        match self {
            BuiltinTranslator::Identity(t) => t.translate_batch(context, elements).await,
            BuiltinTranslator::Mock(t) => t.translate_batch(context, elements).await,
            #[cfg(feature = "http")]
            BuiltinTranslator::Http(t) => t.translate_batch(context, elements).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_tags_each_element() {
        let elements = vec![
            TranslationElement {
                id: "3#p0".into(),
                role: Role::Title,
                text: "Strategy".into(),
            },
            TranslationElement {
                id: "5:r0c1#p1".into(),
                role: Role::TableCell,
                text: "Margin".into(),
            },
        ];
        let out = BuiltinTranslator::Mock(MockTranslator)
            .translate_batch("Slide 1", &elements)
            .await
            .unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].id, "3#p0");
        assert!(out[0].text.ends_with("(#3#p0)"));
        assert!(out[1].text.starts_with("تحسين"));
    }

    #[tokio::test]
    async fn test_identity_keeps_text() {
        let elements = [TranslationElement {
            id: "1#p0".into(),
            role: Role::Body,
            text: "unchanged".into(),
        }];
        let out = IdentityTranslator.translate_batch("", &elements).await.unwrap();
        assert_eq!(out[0].text, "unchanged");
    }
}
