//! Request handling.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use terminology_engine::{
    has_usable_match, CodeSystemResolver, ConceptDetails, DefinitionKind, DefinitionStore,
    ExpandedConcept, ExpansionParams, InMemoryStore, TerminologyEngine, TerminologyError,
    TerminologyResult, ValidationResult,
};
use terminology_types::{CodeSystemDefinition, ConceptMapDefinition, ValueSetDefinition};
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::protocol::{
    ErrorResponse, ExpandRequest, ExpandedValueSet, LookupRequest, Request, Response,
    SubsumesRequest, SubsumesResponse, TranslateRequest, TranslateResponse,
    ValidateCodeRequest, ValidateValueSetCodeRequest, ValueSetExpansion,
};

/// Terminology request server.
///
/// Resolves definitions through the shared store, runs the engine, and turns
/// results and failures into [`Response`] values. Cloning is cheap.
#[derive(Clone)]
pub struct TerminologyServer {
    store: Arc<InMemoryStore>,
    engine: TerminologyEngine,
    config: ServerConfig,
}

impl std::fmt::Debug for TerminologyServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminologyServer")
            .field("store", &self.store)
            .field("config", &self.config)
            .finish()
    }
}

impl TerminologyServer {
    /// Creates a new server with the given store and default configuration.
    pub fn new(store: InMemoryStore) -> Self {
        Self::with_config(store, ServerConfig::default())
    }

    /// Creates a new server with the given store and configuration.
    pub fn with_config(store: InMemoryStore, config: ServerConfig) -> Self {
        Self {
            store: Arc::new(store),
            engine: TerminologyEngine::new(),
            config,
        }
    }

    /// Returns a reference to the store.
    pub fn store(&self) -> &InMemoryStore {
        &self.store
    }

    /// Returns the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    // ═══════════════════════════════════════════════════════════════════════
    // DEFINITION RESOLUTION
    // ═══════════════════════════════════════════════════════════════════════

    fn code_system(
        &self,
        url: &str,
        version: Option<&str>,
    ) -> TerminologyResult<&CodeSystemDefinition> {
        require(url, "system")?;
        self.store
            .code_system(url, version)
            .ok_or_else(|| TerminologyError::DefinitionNotFound {
                kind: DefinitionKind::CodeSystem,
                identifier: match version {
                    Some(v) => format!("{}|{}", url, v),
                    None => url.to_string(),
                },
            })
    }

    fn value_set(
        &self,
        url: Option<&str>,
        id: Option<&str>,
    ) -> TerminologyResult<&ValueSetDefinition> {
        match identifier(url, id).ok_or_else(missing_identifier)? {
            Identifier::Id(id) => self
                .store
                .value_set_by_id(id)
                .ok_or_else(|| not_found(DefinitionKind::ValueSet, id)),
            Identifier::Url(url) => self
                .store
                .value_set_by_url(url)
                .ok_or_else(|| not_found(DefinitionKind::ValueSet, url)),
        }
    }

    fn concept_map(&self, identifier: Identifier<'_>) -> TerminologyResult<&ConceptMapDefinition> {
        match identifier {
            Identifier::Id(id) => self
                .store
                .concept_map_by_id(id)
                .ok_or_else(|| not_found(DefinitionKind::ConceptMap, id)),
            Identifier::Url(url) => self
                .store
                .concept_map_by_url(url)
                .ok_or_else(|| not_found(DefinitionKind::ConceptMap, url)),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // OPERATIONS
    // ═══════════════════════════════════════════════════════════════════════

    /// Looks up a code in a code system.
    pub fn lookup(&self, request: &LookupRequest) -> TerminologyResult<ConceptDetails> {
        require(&request.code, "code")?;
        let code_system = self.code_system(&request.system, request.version.as_deref())?;
        self.engine.lookup(code_system, &request.code, &request.properties)
    }

    /// Validates a code against a code system.
    pub fn validate_code(
        &self,
        request: &ValidateCodeRequest,
    ) -> TerminologyResult<ValidationResult> {
        require(&request.code, "code")?;
        let code_system = self.code_system(&request.system, request.version.as_deref())?;
        Ok(self
            .engine
            .validate_code(code_system, &request.code, request.display.as_deref()))
    }

    /// Validates a code against a value set.
    pub fn validate_value_set_code(
        &self,
        request: &ValidateValueSetCodeRequest,
    ) -> TerminologyResult<ValidationResult> {
        require(&request.code, "code")?;
        let value_set = self.value_set(request.url.as_deref(), request.id.as_deref())?;
        Ok(self.engine.validate_code_in_value_set(
            value_set,
            self.store.as_ref(),
            &request.code,
            request.system.as_deref(),
            request.display.as_deref(),
        ))
    }

    /// Tests subsumption between two codes.
    pub fn subsumes(&self, request: &SubsumesRequest) -> TerminologyResult<SubsumesResponse> {
        require(&request.code_a, "codeA")?;
        require(&request.code_b, "codeB")?;
        let code_system = self.code_system(&request.system, request.version.as_deref())?;
        let outcome = self
            .engine
            .subsumes(code_system, &request.code_a, &request.code_b)?;
        Ok(SubsumesResponse { outcome })
    }

    /// Expands a value set into a new value set carrying the expansion.
    pub fn expand(&self, request: &ExpandRequest) -> TerminologyResult<ExpandedValueSet> {
        let value_set = self.value_set(request.url.as_deref(), request.id.as_deref())?;
        let params = ExpansionParams {
            filter: request.filter.clone(),
            offset: request.offset,
            count: request.count.or(self.config.default_count),
        };

        let expansion = self.engine.expand(value_set, self.store.as_ref(), &params);
        let contains = expansion
            .contains
            .into_iter()
            .map(|c| {
                present(
                    c,
                    request.display_language.as_deref(),
                    request.include_designations,
                )
            })
            .collect();

        Ok(ExpandedValueSet {
            resource_type: "ValueSet",
            id: Uuid::new_v4(),
            url: value_set.url.clone(),
            name: value_set.name.clone(),
            status: value_set.status,
            expansion: ValueSetExpansion {
                identifier: format!("urn:uuid:{}", Uuid::new_v4()),
                timestamp: Utc::now(),
                total: expansion.total,
                offset: Some(expansion.offset).filter(|&o| o > 0),
                contains,
            },
        })
    }

    /// Translates a code through a concept map.
    ///
    /// Without a url or id, every stored concept map is tried in URL order
    /// and the first one that translates the code answers.
    pub fn translate(&self, request: &TranslateRequest) -> TerminologyResult<TranslateResponse> {
        require(&request.code, "code")?;
        let source_system = request.source_system.as_deref();
        let target_system = request.target_system.as_deref();

        let matches = match identifier(request.url.as_deref(), request.id.as_deref()) {
            Some(identifier) => {
                let concept_map = self.concept_map(identifier)?;
                self.engine
                    .translate(concept_map, &request.code, source_system, target_system)?
            }
            None => self
                .store
                .concept_maps()
                .into_iter()
                .find_map(|concept_map| {
                    self.engine
                        .translate(concept_map, &request.code, source_system, target_system)
                        .ok()
                })
                .ok_or_else(|| TerminologyError::TranslationNotFound {
                    code: request.code.clone(),
                    system: request.source_system.clone(),
                })?,
        };
        Ok(TranslateResponse {
            result: has_usable_match(&matches),
            matches,
        })
    }

    // ═══════════════════════════════════════════════════════════════════════
    // DISPATCH
    // ═══════════════════════════════════════════════════════════════════════

    /// Runs any request, converting failures into error responses.
    pub fn handle(&self, request: &Request) -> Response {
        let start = Instant::now();
        let result = match request {
            Request::Lookup(r) => self.lookup(r).map(Response::Lookup),
            Request::ValidateCode(r) => self.validate_code(r).map(Response::Validation),
            Request::ValidateValueSetCode(r) => {
                self.validate_value_set_code(r).map(Response::Validation)
            }
            Request::Subsumes(r) => self.subsumes(r).map(Response::Subsumes),
            Request::Expand(r) => self.expand(r).map(Response::Expand),
            Request::Translate(r) => self.translate(r).map(Response::Translate),
        };

        let elapsed_us = start.elapsed().as_micros() as u64;
        match result {
            Ok(response) => {
                tracing::debug!(operation = request.operation(), elapsed_us, "Request completed");
                response
            }
            Err(err) => {
                tracing::debug!(
                    operation = request.operation(),
                    elapsed_us,
                    "Request failed: {}",
                    err
                );
                Response::Error(err.into())
            }
        }
    }

    /// Parses and runs one JSON request. Malformed JSON is a 400 response.
    pub fn handle_json(&self, json: &str) -> Response {
        match serde_json::from_str::<Request>(json) {
            Ok(request) => self.handle(&request),
            Err(e) => {
                tracing::debug!("Rejected malformed request: {}", e);
                ErrorResponse::bad_request(format!("Invalid request: {}", e)).into()
            }
        }
    }
}

enum Identifier<'a> {
    Id(&'a str),
    Url(&'a str),
}

/// Picks the id when given, else the url. Empty strings count as absent.
fn identifier<'a>(url: Option<&'a str>, id: Option<&'a str>) -> Option<Identifier<'a>> {
    let non_empty = |s: &&str| !s.is_empty();
    match (id.filter(non_empty), url.filter(non_empty)) {
        (Some(id), _) => Some(Identifier::Id(id)),
        (None, Some(url)) => Some(Identifier::Url(url)),
        (None, None) => None,
    }
}

fn missing_identifier() -> TerminologyError {
    TerminologyError::InvalidInput("either url or id must be provided".to_string())
}

fn require(value: &str, name: &str) -> TerminologyResult<()> {
    if value.is_empty() {
        return Err(TerminologyError::InvalidInput(format!("{} is required", name)));
    }
    Ok(())
}

fn not_found(kind: DefinitionKind, identifier: &str) -> TerminologyError {
    TerminologyError::DefinitionNotFound {
        kind,
        identifier: identifier.to_string(),
    }
}

/// Applies the presentation options to one expanded entry.
fn present(
    mut concept: ExpandedConcept,
    display_language: Option<&str>,
    include_designations: bool,
) -> ExpandedConcept {
    if let Some(lang) = display_language {
        let localized = concept
            .designations
            .iter()
            .find(|d| d.language.as_deref() == Some(lang))
            .map(|d| d.value.clone());
        if localized.is_some() {
            concept.display = localized;
        }
    }
    if !include_designations {
        concept.designations.clear();
    }
    concept
}

#[cfg(test)]
mod tests {
    use super::*;
    use terminology_engine::SubsumptionOutcome;
    use terminology_types::{
        Compose, Concept, ConceptMapRelationship, Designation, Element, Group, Include,
        PublicationStatus, Target,
    };

    fn make_test_store() -> InMemoryStore {
        let mut alpha = Concept::new("A1", "Alpha");
        alpha.designations.push(Designation {
            language: Some("de".to_string()),
            use_: None,
            value: "Alfa".to_string(),
        });
        let mut beta = Concept::new("A2", "Beta");
        beta.children.push(Concept::new("A2a", "Beta Child"));

        let mut store = InMemoryStore::new();
        store.insert_code_system(CodeSystemDefinition {
            url: "http://ex/cs".to_string(),
            version: Some("1".to_string()),
            name: "Example".to_string(),
            concept: vec![alpha, beta],
            ..Default::default()
        });
        store.insert_value_set(ValueSetDefinition {
            id: Some("vs-1".to_string()),
            url: "http://ex/vs".to_string(),
            name: "ExampleSet".to_string(),
            status: PublicationStatus::Active,
            compose: Some(Compose {
                include: vec![Include::whole_system("http://ex/cs")],
                exclude: Vec::new(),
            }),
            ..Default::default()
        });
        store.insert_concept_map(ConceptMapDefinition {
            id: Some("cm-1".to_string()),
            url: "http://ex/cm".to_string(),
            group: vec![Group::new(
                "http://ex/cs1",
                "http://ex/cs2",
                vec![
                    Element::new("X", vec![Target::new("Y", ConceptMapRelationship::Equivalent)]),
                    Element::new("N", vec![Target::new("M", ConceptMapRelationship::Unmatched)]),
                ],
            )],
            ..Default::default()
        });
        store
    }

    fn make_test_server() -> TerminologyServer {
        TerminologyServer::new(make_test_store())
    }

    #[test]
    fn test_lookup_and_missing_code_system() {
        let server = make_test_server();
        let details = server
            .lookup(&LookupRequest {
                system: "http://ex/cs".to_string(),
                code: "A2a".to_string(),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(details.name, "Example");
        assert_eq!(details.version.as_deref(), Some("1"));

        let err = server
            .lookup(&LookupRequest {
                system: "http://ex/cs".to_string(),
                version: Some("9".to_string()),
                code: "A1".to_string(),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "CodeSystem not found: http://ex/cs|9");
    }

    #[test]
    fn test_validate_code_requests() {
        let server = make_test_server();
        let result = server
            .validate_code(&ValidateCodeRequest {
                system: "http://ex/cs".to_string(),
                code: "A1".to_string(),
                display: Some("WrongName".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert!(result.valid);
        assert!(result.message.is_some());

        let result = server
            .validate_value_set_code(&ValidateValueSetCodeRequest {
                url: Some("http://ex/vs".to_string()),
                code: "A2a".to_string(),
                system: Some("http://ex/cs".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert!(result.valid);
        assert_eq!(result.expected_display.as_deref(), Some("Beta Child"));
    }

    #[test]
    fn test_subsumes_request() {
        let server = make_test_server();
        let response = server
            .subsumes(&SubsumesRequest {
                system: "http://ex/cs".to_string(),
                code_a: "A2a".to_string(),
                code_b: "A2".to_string(),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(response.outcome, SubsumptionOutcome::SubsumedBy);
    }

    #[test]
    fn test_expand_builds_expanded_value_set() {
        let server = make_test_server();
        let vs = server
            .expand(&ExpandRequest {
                id: Some("vs-1".to_string()),
                offset: 1,
                count: Some(2),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(vs.url, "http://ex/vs");
        assert_eq!(vs.name, "ExampleSet");
        assert_eq!(vs.status, PublicationStatus::Active);
        assert!(vs.expansion.identifier.starts_with("urn:uuid:"));
        assert_eq!(vs.expansion.total, 3);
        assert_eq!(vs.expansion.offset, Some(1));
        let codes: Vec<&str> = vs.expansion.contains.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["A2", "A2a"]);

        let json = serde_json::to_value(&vs).unwrap();
        assert_eq!(json["resourceType"], "ValueSet");
        assert!(json["expansion"]["timestamp"].is_string());
    }

    #[test]
    fn test_expand_presentation_options() {
        let server = make_test_server();
        let request = ExpandRequest {
            url: Some("http://ex/vs".to_string()),
            count: Some(1),
            ..Default::default()
        };

        let plain = server.expand(&request).unwrap();
        let first = &plain.expansion.contains[0];
        assert_eq!(first.display.as_deref(), Some("Alpha"));
        assert!(first.designations.is_empty());
        assert_eq!(plain.expansion.offset, None);

        let localized = server
            .expand(&ExpandRequest {
                display_language: Some("de".to_string()),
                include_designations: true,
                ..request
            })
            .unwrap();
        let first = &localized.expansion.contains[0];
        assert_eq!(first.display.as_deref(), Some("Alfa"));
        assert_eq!(first.designations.len(), 1);
    }

    #[test]
    fn test_expand_uses_default_count() {
        let config = ServerConfig {
            default_count: Some(1),
            ..Default::default()
        };
        let server = TerminologyServer::with_config(make_test_store(), config);
        let vs = server
            .expand(&ExpandRequest {
                id: Some("vs-1".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(vs.expansion.total, 3);
        assert_eq!(vs.expansion.contains.len(), 1);
    }

    #[test]
    fn test_expand_requires_identifier() {
        let server = make_test_server();
        let err = server.expand(&ExpandRequest::default()).unwrap_err();
        assert!(matches!(err, TerminologyError::InvalidInput(_)));

        let err = server
            .expand(&ExpandRequest {
                url: Some("http://ex/missing".to_string()),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(
            err,
            TerminologyError::DefinitionNotFound {
                kind: DefinitionKind::ValueSet,
                ..
            }
        ));
    }

    #[test]
    fn test_translate_result_flag() {
        let server = make_test_server();
        let request = TranslateRequest {
            id: Some("cm-1".to_string()),
            code: "X".to_string(),
            ..Default::default()
        };

        let response = server.translate(&request).unwrap();
        assert!(response.result);
        assert_eq!(response.matches[0].code.as_deref(), Some("Y"));

        let response = server
            .translate(&TranslateRequest {
                code: "N".to_string(),
                ..request.clone()
            })
            .unwrap();
        assert!(!response.result);

        let err = server
            .translate(&TranslateRequest {
                code: "Z".to_string(),
                ..request
            })
            .unwrap_err();
        assert!(matches!(err, TerminologyError::TranslationNotFound { .. }));
    }

    #[test]
    fn test_translate_without_identifier_searches_every_map() {
        let mut store = make_test_store();
        store.insert_concept_map(ConceptMapDefinition {
            url: "http://ex/cm-other".to_string(),
            group: vec![Group::new(
                "http://ex/cs3",
                "http://ex/cs4",
                vec![Element::new(
                    "P",
                    vec![Target::new("Q", ConceptMapRelationship::Equivalent)],
                )],
            )],
            ..Default::default()
        });
        let server = TerminologyServer::new(store);

        let response = server.handle_json(
            r#"{"operation": "translate", "code": "X", "system": "http://ex/cs1"}"#,
        );
        match response {
            Response::Translate(r) => {
                assert!(r.result);
                assert_eq!(r.matches[0].system.as_deref(), Some("http://ex/cs2"));
                assert_eq!(r.matches[0].code.as_deref(), Some("Y"));
            }
            other => panic!("unexpected response: {:?}", other),
        }

        let response = server
            .translate(&TranslateRequest {
                code: "P".to_string(),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(response.matches[0].code.as_deref(), Some("Q"));

        let err = server
            .translate(&TranslateRequest {
                code: "X".to_string(),
                source_system: Some("http://ex/cs3".to_string()),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, TerminologyError::TranslationNotFound { .. }));
    }

    #[test]
    fn test_handle_maps_failures_to_status() {
        let server = make_test_server();

        let response = server
            .handle_json(r#"{"operation": "lookup", "system": "http://ex/cs", "code": "Q"}"#);
        assert_eq!(
            response,
            Response::Error(ErrorResponse {
                status: 404,
                message: "Code Q not found in system http://ex/cs".to_string(),
            })
        );

        let response = server.handle_json(r#"{"operation": "translate", "code": "Z"}"#);
        assert!(matches!(response, Response::Error(ErrorResponse { status: 404, .. })));

        let response = server.handle_json(r#"{"operation": "expand", "filter": "a"}"#);
        assert!(matches!(response, Response::Error(ErrorResponse { status: 400, .. })));

        let response = server.handle_json("not json");
        assert!(matches!(response, Response::Error(ErrorResponse { status: 400, .. })));
    }
}
