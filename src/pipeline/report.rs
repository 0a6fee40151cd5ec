//! Per-document outcome.

use serde::Serialize;

use crate::ooxml::error::{InjectionError, ValidationError};

/// Why a document produced no output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum Rejection {
    /// The input is not a usable package
    Format(String),
    /// The rebuilt package has a dangling relationship
    Validation(String),
    /// The slide selection does not fit the presentation
    Selection(String),
    /// Processing stopped unexpectedly
    Internal(String),
}

impl Rejection {
    pub fn reason(&self) -> &str {
        match self {
            Rejection::Format(r)
            | Rejection::Validation(r)
            | Rejection::Selection(r)
            | Rejection::Internal(r) => r,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DocumentOutcome {
    Complete,
    /// Delivered, with warnings
    Partial,
    Rejected(Rejection),
}

/// A non-fatal problem, attributed to a part and, where known, an element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub part: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
    pub message: String,
}

impl Warning {
    pub fn new(part: impl Into<String>, element: Option<String>, message: impl ToString) -> Self {
        Self {
            part: part.into(),
            element,
            message: message.to_string(),
        }
    }

    pub fn injection(part: &str, error: &InjectionError) -> Self {
        Self::new(part, Some(error.id().to_string()), error)
    }

    pub fn validation(error: &ValidationError) -> Self {
        match error {
            ValidationError::DanglingRelationship { part, .. }
            | ValidationError::SerializationRoundtripFailed { part, .. } => {
                Self::new(part.as_str(), None, error)
            },
            ValidationError::IncompleteInjection { part, id } => {
                Self::new(part.as_str(), Some(id.clone()), error)
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    /// Slides selected for transformation
    pub slides: usize,
    pub charts: usize,
    /// Shapes whose placement was mirrored
    pub shapes_mirrored: usize,
    pub shapes_flipped: usize,
    pub tables_reversed: usize,
    pub bar_charts_reversed: usize,
    pub records: usize,
    pub records_injected: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentReport {
    pub document: String,
    pub outcome: DocumentOutcome,
    pub warnings: Vec<Warning>,
    pub statistics: Statistics,
}

impl DocumentReport {
    pub fn rejected(document: impl Into<String>, rejection: Rejection) -> Self {
        log::error!("rejected: {}", rejection.reason());
        Self {
            document: document.into(),
            outcome: DocumentOutcome::Rejected(rejection),
            warnings: Vec::new(),
            statistics: Statistics::default(),
        }
    }

    /// A delivered document: `Complete` without warnings, `Partial` with.
    pub fn delivered(document: impl Into<String>, warnings: Vec<Warning>, statistics: Statistics) -> Self {
        let outcome = if warnings.is_empty() {
            DocumentOutcome::Complete
        } else {
            DocumentOutcome::Partial
        };
        Self {
            document: document.into(),
            outcome,
            warnings,
            statistics,
        }
    }

    #[inline]
    pub fn is_delivered(&self) -> bool {
        !matches!(self.outcome, DocumentOutcome::Rejected(_))
    }

    /// Process exit code for this outcome.
    ///
    /// 0 complete, 2 partial, 3 rejected input, 4 failed validation, 1 for
    /// anything else.
    pub fn exit_code(&self) -> i32 {
        match &self.outcome {
            DocumentOutcome::Complete => 0,
            DocumentOutcome::Partial => 2,
            DocumentOutcome::Rejected(Rejection::Format(_)) => 3,
            DocumentOutcome::Rejected(Rejection::Validation(_)) => 4,
            DocumentOutcome::Rejected(_) => 1,
        }
    }

    /// Element ids named by warnings.
    pub fn affected_elements(&self) -> impl Iterator<Item = &str> + '_ {
        self.warnings.iter().filter_map(|w| w.element.as_deref())
    }
}

/// Combined exit code of several documents; the most severe wins.
pub fn batch_exit_code<'a>(reports: impl IntoIterator<Item = &'a DocumentReport>) -> i32 {
    const SEVERITY: [i32; 5] = [0, 2, 1, 3, 4];
    reports
        .into_iter()
        .map(DocumentReport::exit_code)
        .max_by_key(|code| SEVERITY.iter().position(|c| c == code))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_follows_warnings() {
        let complete = DocumentReport::delivered("a.pptx", Vec::new(), Statistics::default());
        assert_eq!(complete.outcome, DocumentOutcome::Complete);
        assert_eq!(complete.exit_code(), 0);

        let error = InjectionError::UnmatchedRecord { id: "7".into() };
        let partial = DocumentReport::delivered(
            "a.pptx",
            vec![Warning::injection("/ppt/slides/slide1.xml", &error)],
            Statistics::default(),
        );
        assert_eq!(partial.outcome, DocumentOutcome::Partial);
        assert_eq!(partial.exit_code(), 2);
        assert_eq!(partial.affected_elements().collect::<Vec<_>>(), ["7"]);
    }

    #[test]
    fn test_exit_codes() {
        let format = DocumentReport::rejected("a", Rejection::Format("not a zip".into()));
        let validation = DocumentReport::rejected("b", Rejection::Validation("rId9".into()));
        let selection = DocumentReport::rejected("c", Rejection::Selection("slide 9".into()));
        assert_eq!(format.exit_code(), 3);
        assert_eq!(validation.exit_code(), 4);
        assert_eq!(selection.exit_code(), 1);
        assert!(!format.is_delivered());

        let complete = DocumentReport::delivered("d", Vec::new(), Statistics::default());
        assert_eq!(batch_exit_code([&complete, &format, &selection]), 3);
        assert_eq!(batch_exit_code([&complete]), 0);
        assert_eq!(batch_exit_code(std::iter::empty()), 0);
    }

    #[test]
    fn test_serializes_for_audit() {
        let report = DocumentReport::rejected("a", Rejection::Format("bad".into()));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcome"]["status"], "rejected");
        assert_eq!(json["outcome"]["kind"], "format");
    }
}
