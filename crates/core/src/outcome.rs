use serde::{Deserialize, Serialize};

use crate::datatypes::{CodeableConcept, Meta, Narrative, code_enum};
use crate::registry::{Resource, ResourceType};

code_enum! {
    /// Severity of the issue
    pub enum IssueSeverity {
        Fatal => "fatal",
        Error => "error",
        Warning => "warning",
        Information => "information",
        Success => "success",
    }
}

impl Default for IssueSeverity {
    fn default() -> Self {
        IssueSeverity::Error
    }
}

code_enum! {
    /// Type of issue
    pub enum IssueType {
        Invalid => "invalid",
        Structure => "structure",
        Required => "required",
        Value => "value",
        Invariant => "invariant",
        Security => "security",
        Login => "login",
        Unknown => "unknown",
        Expired => "expired",
        Forbidden => "forbidden",
        Suppressed => "suppressed",
        Processing => "processing",
        NotSupported => "not-supported",
        Duplicate => "duplicate",
        MultipleMatches => "multiple-matches",
        NotFound => "not-found",
        Deleted => "deleted",
        TooLong => "too-long",
        CodeInvalid => "code-invalid",
        Extension => "extension",
        TooCostly => "too-costly",
        BusinessRule => "business-rule",
        Conflict => "conflict",
        Incomplete => "incomplete",
        Transient => "transient",
        LockError => "lock-error",
        NoStore => "no-store",
        Exception => "exception",
        Timeout => "timeout",
        Throttled => "throttled",
        Informational => "informational",
        Success => "success",
    }
}

impl Default for IssueType {
    fn default() -> Self {
        IssueType::Unknown
    }
}

/// A single issue reported by an OperationOutcome
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationOutcomeIssue {
    pub severity: IssueSeverity,
    pub code: IssueType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub expression: Vec<String>,
}

impl OperationOutcomeIssue {
    /// Text describing this issue: diagnostics first, then the details concept
    pub fn text(&self) -> Option<&str> {
        self.diagnostics
            .as_deref()
            .filter(|d| !d.is_empty())
            .or_else(|| self.details.as_ref().and_then(CodeableConcept::display))
    }
}

/// FHIR OperationOutcome resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OperationOutcome {
    pub resource_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Narrative>,

    pub issue: Vec<OperationOutcomeIssue>,
}

impl Default for OperationOutcome {
    fn default() -> Self {
        Self {
            resource_type: "OperationOutcome".to_string(),
            id: None,
            meta: None,
            text: None,
            issue: Vec::new(),
        }
    }
}

impl OperationOutcome {
    /// Outcome with a single error-severity issue
    pub fn error(code: IssueType, message: &str) -> Self {
        Self {
            text: Some(Narrative::generated(message)),
            issue: vec![OperationOutcomeIssue {
                severity: IssueSeverity::Error,
                code,
                diagnostics: Some(message.to_string()),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self::error(IssueType::NotFound, message)
    }

    pub fn invalid(message: &str) -> Self {
        Self::error(IssueType::Invalid, message)
    }

    /// Human-readable text of this outcome.
    ///
    /// The narrative `div` wins when present. Otherwise the text of every
    /// issue is joined with `"; "`. Empty when the outcome says nothing.
    pub fn display_text(&self) -> String {
        if let Some(div) = self.text.as_ref().map(|t| t.div.trim()) {
            if !div.is_empty() {
                return div.to_string();
            }
        }

        self.issue
            .iter()
            .filter_map(OperationOutcomeIssue::text)
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// True when any issue is fatal or an error
    pub fn has_errors(&self) -> bool {
        self.issue
            .iter()
            .any(|i| matches!(i.severity, IssueSeverity::Fatal | IssueSeverity::Error))
    }
}

impl Resource for OperationOutcome {
    const RESOURCE_TYPE: ResourceType = ResourceType::OperationOutcome;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}
