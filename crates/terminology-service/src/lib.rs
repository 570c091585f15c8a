//! # terminology-service
//!
//! Request layer for terminology queries.
//!
//! This crate resolves definitions loaded by the terminology-engine crate,
//! runs the engine operations, and turns results and failures into JSON
//! response payloads. The `terminology-server` binary serves them over HTTP
//! with axum, answering failures with 404 or 400 status codes.

#![warn(missing_docs)]

mod config;
mod http;
mod protocol;
mod server;

pub use config::{
    ServerConfig, DATA_PATH_VAR, DEFAULT_COUNT_VAR, DEFAULT_DATA_PATH, DEFAULT_PORT, PORT_VAR,
};
pub use http::router;
pub use protocol::{
    ErrorResponse, ExpandRequest, ExpandedValueSet, LookupRequest, Request, Response,
    SubsumesRequest, SubsumesResponse, TranslateRequest, TranslateResponse,
    ValidateCodeRequest, ValidateValueSetCodeRequest, ValueSetExpansion,
};
pub use server::TerminologyServer;
