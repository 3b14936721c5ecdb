//! Procmine: client library for a process-mining platform's event log API.
//!
//! The library wraps the platform's REST endpoints for listing, uploading,
//! appending to, deleting and downloading event logs, and infers the
//! column semantics descriptors the upload endpoints require.
//!
//! # Design
//!
//! - **Synchronous**: each operation is one blocking round trip; the
//!   client holds no mutable state beyond its immutable configuration.
//! - **Permissive inference**: unknown columns degrade to generic
//!   attributes so uploads never hard-fail on unrecognized names.
//! - **Errors as-is**: non-2xx statuses and malformed bodies surface
//!   directly; nothing is retried or recovered internally.
//!
//! # Example
//!
//! ```no_run
//! use procmine::{Client, ClientConfig, DataTable, RequestOptions, DEFAULT_TIME_FORMAT};
//!
//! let config = ClientConfig::new("https", "backend.example.com", "my-token");
//! let client = Client::connect(config).unwrap();
//!
//! let events = DataTable::from_csv_path("events.csv").unwrap();
//! client
//!     .upload_log("invoices", &events, None, DEFAULT_TIME_FORMAT, RequestOptions::new())
//!     .unwrap();
//! ```

pub mod client;
pub mod error;
pub mod logs;
pub mod response;
pub mod semantics;
pub mod table;
pub mod transport;

pub use client::{Client, ClientConfig, UserProfile};
pub use error::{ProcmineError, Result};
pub use logs::{
    DeletionOutcome, EventLogExport, LogRef, LogSelector, DEFAULT_TIME_FORMAT, DEFAULT_TIME_ZONE,
};
pub use semantics::{
    infer_case_semantics, infer_event_semantics, AttributeType, FieldSemantics,
    SemanticsInferencer,
};
pub use table::DataTable;
pub use transport::{
    ApiRequest, FormPart, HttpTransport, Method, MockTransport, RawResponse, RequestOptions,
    Transport,
};
