//! Request and response messages.
//!
//! Requests arrive as JSON objects tagged by `operation`; responses are the
//! operation payload or an [`ErrorResponse`] carrying an HTTP-style status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use terminology_engine::{
    ConceptDetails, ExpandedConcept, SubsumptionOutcome, TerminologyError, TranslationMatch,
    ValidationResult,
};
use terminology_types::PublicationStatus;
use uuid::Uuid;

/// Look up a code in a code system.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupRequest {
    /// Code system URL.
    pub system: String,
    /// Code system version.
    #[serde(default)]
    pub version: Option<String>,
    /// The code to look up.
    pub code: String,
    /// Property codes to return.
    #[serde(default, rename = "property")]
    pub properties: Vec<String>,
}

/// Validate a code against a code system.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateCodeRequest {
    /// Code system URL.
    pub system: String,
    /// Code system version.
    #[serde(default)]
    pub version: Option<String>,
    /// The code to validate.
    pub code: String,
    /// Display to check against the concept's display.
    #[serde(default)]
    pub display: Option<String>,
}

/// Validate a code against a value set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateValueSetCodeRequest {
    /// Value set URL.
    #[serde(default)]
    pub url: Option<String>,
    /// Value set id; takes precedence over `url`.
    #[serde(default)]
    pub id: Option<String>,
    /// The code to validate.
    pub code: String,
    /// System the code must come from.
    #[serde(default)]
    pub system: Option<String>,
    /// Display to check against the member's display.
    #[serde(default)]
    pub display: Option<String>,
}

/// Test subsumption between two codes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubsumesRequest {
    /// Code system URL.
    pub system: String,
    /// Code system version.
    #[serde(default)]
    pub version: Option<String>,
    /// The potential ancestor.
    pub code_a: String,
    /// The potential descendant.
    pub code_b: String,
}

/// Expand a value set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandRequest {
    /// Value set URL.
    #[serde(default)]
    pub url: Option<String>,
    /// Value set id; takes precedence over `url`.
    #[serde(default)]
    pub id: Option<String>,
    /// Case-insensitive text matched against code or display.
    #[serde(default)]
    pub filter: Option<String>,
    /// Index of the first entry to return.
    #[serde(default)]
    pub offset: usize,
    /// Maximum entries to return.
    #[serde(default)]
    pub count: Option<usize>,
    /// Language whose designation replaces the display when present.
    #[serde(default)]
    pub display_language: Option<String>,
    /// Whether designations are copied onto expanded entries.
    #[serde(default)]
    pub include_designations: bool,
}

/// Translate a code through a concept map.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest {
    /// Concept map URL.
    #[serde(default)]
    pub url: Option<String>,
    /// Concept map id; takes precedence over `url`.
    #[serde(default)]
    pub id: Option<String>,
    /// The source code.
    pub code: String,
    /// System of the source code.
    #[serde(default, alias = "system")]
    pub source_system: Option<String>,
    /// Restrict matches to this target system.
    #[serde(default, alias = "targetsystem")]
    pub target_system: Option<String>,
}

/// Any request, tagged by `operation`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "operation")]
pub enum Request {
    /// `lookup`
    #[serde(rename = "lookup")]
    Lookup(LookupRequest),
    /// `validate-code`
    #[serde(rename = "validate-code")]
    ValidateCode(ValidateCodeRequest),
    /// `validate-code-in-value-set`
    #[serde(rename = "validate-code-in-value-set")]
    ValidateValueSetCode(ValidateValueSetCodeRequest),
    /// `subsumes`
    #[serde(rename = "subsumes")]
    Subsumes(SubsumesRequest),
    /// `expand`
    #[serde(rename = "expand")]
    Expand(ExpandRequest),
    /// `translate`
    #[serde(rename = "translate")]
    Translate(TranslateRequest),
}

impl Request {
    /// Returns the operation name.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Lookup(_) => "lookup",
            Self::ValidateCode(_) => "validate-code",
            Self::ValidateValueSetCode(_) => "validate-code-in-value-set",
            Self::Subsumes(_) => "subsumes",
            Self::Expand(_) => "expand",
            Self::Translate(_) => "translate",
        }
    }
}

/// Subsumption answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubsumesResponse {
    /// Relationship of code A to code B.
    pub outcome: SubsumptionOutcome,
}

/// Translation answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslateResponse {
    /// True if any match is usable (not `unmatched` or `disjoint`).
    pub result: bool,
    /// Every target of the matched element.
    #[serde(rename = "match")]
    pub matches: Vec<TranslationMatch>,
}

/// The expansion block of an expanded value set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueSetExpansion {
    /// `urn:uuid:` identifier unique to this expansion.
    pub identifier: String,
    /// When the expansion was produced.
    pub timestamp: DateTime<Utc>,
    /// Size of the full expansion before pagination.
    pub total: usize,
    /// Page offset, omitted when zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    /// The page of members.
    pub contains: Vec<ExpandedConcept>,
}

/// A value set returned by `expand`, carrying its expansion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandedValueSet {
    /// Always `ValueSet`.
    pub resource_type: &'static str,
    /// Fresh id for this result.
    pub id: Uuid,
    /// URL of the expanded value set.
    pub url: String,
    /// Name of the expanded value set.
    pub name: String,
    /// Status of the expanded value set.
    pub status: PublicationStatus,
    /// The expansion.
    pub expansion: ValueSetExpansion,
}

/// A failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    /// HTTP-style status: 404 for missing definitions, codes and
    /// translations, 400 for malformed requests.
    pub status: u16,
    /// Human-readable reason.
    pub message: String,
}

impl ErrorResponse {
    /// Creates a 400 response.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: 400,
            message: message.into(),
        }
    }
}

impl From<TerminologyError> for ErrorResponse {
    fn from(err: TerminologyError) -> Self {
        let status = match err {
            TerminologyError::DefinitionNotFound { .. }
            | TerminologyError::CodeNotFound { .. }
            | TerminologyError::TranslationNotFound { .. } => 404,
            TerminologyError::InvalidInput(_) => 400,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

/// Any response. Serializes as the bare payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    /// `lookup` result.
    Lookup(ConceptDetails),
    /// `validate-code` or `validate-code-in-value-set` result.
    Validation(ValidationResult),
    /// `subsumes` result.
    Subsumes(SubsumesResponse),
    /// `expand` result.
    Expand(ExpandedValueSet),
    /// `translate` result.
    Translate(TranslateResponse),
    /// Failure.
    Error(ErrorResponse),
}

impl Response {
    /// Returns true for [`Response::Error`].
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl From<ErrorResponse> for Response {
    fn from(err: ErrorResponse) -> Self {
        Self::Error(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terminology_engine::DefinitionKind;

    #[test]
    fn test_request_dispatch_on_operation() {
        let json = r#"{"operation": "subsumes", "system": "http://ex/cs", "codeA": "A2", "codeB": "A2a"}"#;
        let request: Request = serde_json::from_str(json).unwrap();
        assert_eq!(request.operation(), "subsumes");
        assert!(matches!(request, Request::Subsumes(ref r) if r.code_b == "A2a"));

        let json = r#"{"operation": "expand", "id": "vs-1", "displayLanguage": "de", "includeDesignations": true}"#;
        let request: Request = serde_json::from_str(json).unwrap();
        match request {
            Request::Expand(r) => {
                assert_eq!(r.display_language.as_deref(), Some("de"));
                assert!(r.include_designations);
                assert_eq!(r.offset, 0);
            }
            other => panic!("unexpected request: {:?}", other),
        }
    }

    #[test]
    fn test_request_rejects_unknown_operation_and_missing_fields() {
        assert!(serde_json::from_str::<Request>(r#"{"operation": "delete"}"#).is_err());
        assert!(
            serde_json::from_str::<Request>(r#"{"operation": "lookup", "system": "x"}"#).is_err()
        );
    }

    #[test]
    fn test_translate_request_aliases() {
        let json = r#"{"operation": "translate", "url": "http://ex/cm", "code": "X", "system": "http://ex/cs1", "targetsystem": "http://ex/cs2"}"#;
        match serde_json::from_str::<Request>(json).unwrap() {
            Request::Translate(r) => {
                assert_eq!(r.source_system.as_deref(), Some("http://ex/cs1"));
                assert_eq!(r.target_system.as_deref(), Some("http://ex/cs2"));
            }
            other => panic!("unexpected request: {:?}", other),
        }
    }

    #[test]
    fn test_error_status_mapping() {
        let not_found = ErrorResponse::from(TerminologyError::DefinitionNotFound {
            kind: DefinitionKind::ConceptMap,
            identifier: "cm".to_string(),
        });
        assert_eq!(not_found.status, 404);

        let translation = ErrorResponse::from(TerminologyError::TranslationNotFound {
            code: "Z".to_string(),
            system: None,
        });
        assert_eq!(translation.status, 404);

        let invalid = ErrorResponse::from(TerminologyError::InvalidInput(
            "url or id is required".to_string(),
        ));
        assert_eq!(invalid.status, 400);
        assert_eq!(invalid.message, "Invalid input: url or id is required");
    }

    #[test]
    fn test_response_serializes_bare_payload() {
        let response = Response::Subsumes(SubsumesResponse {
            outcome: SubsumptionOutcome::SubsumedBy,
        });
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            serde_json::json!({"outcome": "subsumed-by"})
        );

        let response = Response::from(ErrorResponse::bad_request("nope"));
        assert!(response.is_error());
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            serde_json::json!({"status": 400, "message": "nope"})
        );
    }
}
