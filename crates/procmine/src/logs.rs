//! Event log operations: listing, lookup, upload, append, delete and
//! enriched download.

use std::io::Read;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use crate::client::Client;
use crate::error::{ProcmineError, Result};
use crate::response::{decode_json, expect_success};
use crate::semantics::{
    detect_timestamp_columns, infer_case_semantics, infer_event_semantics, FieldSemantics,
};
use crate::table::DataTable;
use crate::transport::{ApiRequest, FormPart, RawResponse, RequestOptions};

/// Default timestamp format in the platform's notation.
pub const DEFAULT_TIME_FORMAT: &str = "yyyy-MM-dd HH:mm:ss";

/// Time zone field sent with uploads.
pub const DEFAULT_TIME_ZONE: &str = "Europe/Berlin";

/// A log as returned by the listing endpoints.
///
/// Never cached; lookups re-fetch the catalog on every call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRef {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// Selects an existing log by backend id or by unique name.
#[derive(Debug, Clone, Copy)]
pub enum LogSelector<'a> {
    Id(&'a str),
    Name(&'a str),
}

/// Outcome of one deletion within [`Client::delete_logs`].
#[derive(Debug)]
pub struct DeletionOutcome {
    pub log_id: String,
    pub result: Result<RawResponse>,
}

/// A downloaded, enriched event log.
///
/// Every column is left as untyped strings; `timestamp_columns` names the
/// ones whose values unambiguously parse as timestamps.
#[derive(Debug, Clone)]
pub struct EventLogExport {
    pub table: DataTable,
    pub timestamp_columns: Vec<String>,
}

impl Client {
    /// List every log visible to the caller.
    pub fn list_logs(&self) -> Result<Vec<LogRef>> {
        let response = self.transport().execute(ApiRequest::get("/api/logs"))?;
        decode_json(&expect_success(response)?)
    }

    /// List only the logs owned by the caller.
    pub fn list_user_logs(&self) -> Result<Vec<LogRef>> {
        let path = format!("/api/users/{}/logs", self.profile().id);
        let response = self.transport().execute(ApiRequest::get(path))?;
        decode_json(&expect_success(response)?)
    }

    /// Ids of every log whose name matches the regex `pattern`.
    ///
    /// An empty result is valid; no match is not an error here.
    pub fn find_log_ids(&self, pattern: &str) -> Result<Vec<String>> {
        let matcher = Regex::new(pattern)?;
        Ok(self
            .list_logs()?
            .into_iter()
            .filter(|log| matcher.is_match(&log.name))
            .map(|log| log.id)
            .collect())
    }

    /// Id of the single log with exactly the name `name`.
    ///
    /// Uniqueness is a precondition the caller must establish, e.g. by
    /// namespacing uploads; zero or multiple matches fail with
    /// [`ProcmineError::AmbiguousName`] carrying the observed count.
    pub fn find_log_id(&self, name: &str) -> Result<String> {
        let mut ids: Vec<String> = self
            .list_logs()?
            .into_iter()
            .filter(|log| log.name == name)
            .map(|log| log.id)
            .collect();
        if ids.len() == 1 {
            Ok(ids.remove(0))
        } else {
            Err(ProcmineError::AmbiguousName {
                name: name.to_string(),
                matches: ids.len(),
            })
        }
    }

    /// Upload an event log, inferring semantics for both tables.
    ///
    /// Timestamp columns are rendered in `time_format` before
    /// serialization so the CSV matches the descriptor it travels with.
    pub fn upload_log(
        &self,
        name: &str,
        events: &DataTable,
        cases: Option<&DataTable>,
        time_format: &str,
        options: RequestOptions,
    ) -> Result<RawResponse> {
        let (events, event_semantics) = infer_event_semantics(events, time_format);
        let event_csv = events.to_csv()?;

        match cases {
            Some(cases) => {
                let (cases, case_semantics) = infer_case_semantics(cases);
                let case_csv = cases.to_csv()?;
                self.upload_log_prepared(
                    name,
                    &event_csv,
                    &event_semantics,
                    Some((&case_csv, &case_semantics)),
                    DEFAULT_TIME_ZONE,
                    options,
                )
            }
            None => self.upload_log_prepared(
                name,
                &event_csv,
                &event_semantics,
                None,
                DEFAULT_TIME_ZONE,
                options,
            ),
        }
    }

    /// Upload an event log from already-serialized CSV and prepared
    /// semantics.
    ///
    /// The multipart body always carries the event file and event
    /// semantics; the case-attribute file and case semantics are included
    /// only together.
    pub fn upload_log_prepared(
        &self,
        name: &str,
        event_csv: &str,
        event_semantics: &[FieldSemantics],
        case: Option<(&str, &[FieldSemantics])>,
        time_zone: &str,
        options: RequestOptions,
    ) -> Result<RawResponse> {
        let mut request = ApiRequest::post("/api/logs/csv-case-attributes-event-semantics")
            .with_part(FormPart::csv_file("eventCSVFile", name, event_csv))
            .with_part(FormPart::text(
                "eventSemantics",
                serde_json::to_string(event_semantics)?,
            ))
            .with_part(FormPart::text("logName", name))
            .with_part(FormPart::text("timeZone", time_zone));

        if let Some((case_csv, case_semantics)) = case {
            request = request
                .with_part(FormPart::csv_file(
                    "caseAttributeFile",
                    format!("{}_case_attributes", name),
                    case_csv,
                ))
                .with_part(FormPart::text(
                    "caseSemantics",
                    serde_json::to_string(case_semantics)?,
                ));
        }

        let response = self.transport().execute(request.with_options(options))?;
        expect_success(response)
    }

    /// Upload an event log from open readers with prepared semantics.
    ///
    /// The log is named `{prefix}{digest}` from the event stream's
    /// content, so repeated uploads of identical data collide on purpose.
    /// Readers are read to the end but never closed; that stays the
    /// caller's responsibility. Returns the chosen name with the response.
    pub fn upload_log_stream(
        &self,
        log: &mut dyn Read,
        log_semantics: &[FieldSemantics],
        case: Option<(&mut dyn Read, &[FieldSemantics])>,
        prefix: &str,
        options: RequestOptions,
    ) -> Result<(String, RawResponse)> {
        let event_csv = read_stream(log, "event stream")?;
        let name = format!("{}{}", prefix, content_digest(&event_csv));

        let response = match case {
            Some((case_reader, case_semantics)) => {
                let case_csv = read_stream(case_reader, "case attribute stream")?;
                self.upload_log_prepared(
                    &name,
                    &event_csv,
                    log_semantics,
                    Some((&case_csv, case_semantics)),
                    DEFAULT_TIME_ZONE,
                    options,
                )?
            }
            None => self.upload_log_prepared(
                &name,
                &event_csv,
                log_semantics,
                None,
                DEFAULT_TIME_ZONE,
                options,
            )?,
        };

        Ok((name, response))
    }

    /// Append events to an existing log. Case attributes are untouched.
    pub fn append_events(
        &self,
        log_id: &str,
        events: &DataTable,
        time_format: &str,
        options: RequestOptions,
    ) -> Result<RawResponse> {
        let (events, event_semantics) = infer_event_semantics(events, time_format);
        let request = ApiRequest::post(format!("/api/logs/{}/csv", log_id))
            .with_part(FormPart::csv_file(
                "eventCSVFile",
                "event-file",
                events.to_csv()?,
            ))
            .with_part(FormPart::text(
                "eventSemantics",
                serde_json::to_string(&event_semantics)?,
            ))
            .with_options(options);

        let response = self.transport().execute(request)?;
        expect_success(response)
    }

    /// Append case attributes to an existing log.
    pub fn append_case_attributes(
        &self,
        log_id: &str,
        cases: &DataTable,
        options: RequestOptions,
    ) -> Result<RawResponse> {
        let (cases, case_semantics) = infer_case_semantics(cases);
        let request = ApiRequest::post(format!("/api/logs/{}/csv-case-attributes", log_id))
            .with_part(FormPart::csv_file(
                "caseAttributeFile",
                "case-attribute-file",
                cases.to_csv()?,
            ))
            .with_part(FormPart::text(
                "caseSemantics",
                serde_json::to_string(&case_semantics)?,
            ))
            .with_options(options);

        let response = self.transport().execute(request)?;
        expect_success(response)
    }

    /// Delete one log by id.
    pub fn delete_log(&self, log_id: &str, options: RequestOptions) -> Result<RawResponse> {
        let request = ApiRequest::delete(format!("/api/logs/{}", log_id)).with_options(options);
        let response = self.transport().execute(request)?;
        expect_success(response)
    }

    /// Delete every log whose name matches the regex `pattern`.
    ///
    /// One listing round trip, then one deletion per match, sequentially.
    /// Not atomic: a failure partway through leaves the remaining logs in
    /// place, and every per-log outcome is returned so partial failure is
    /// observable rather than fatal.
    pub fn delete_logs(
        &self,
        pattern: &str,
        options: RequestOptions,
    ) -> Result<Vec<DeletionOutcome>> {
        let log_ids = self.find_log_ids(pattern)?;
        Ok(log_ids
            .into_iter()
            .map(|log_id| {
                let result = self.delete_log(&log_id, options.clone());
                DeletionOutcome { log_id, result }
            })
            .collect())
    }

    /// Download the enriched event log as a table.
    ///
    /// Issues the fixed-shape filter request (no exclusions, full trace
    /// set, conformance checking on) and reconstructs the returned CSV.
    /// A name selector that matches nothing fails with
    /// [`ProcmineError::NotFound`].
    pub fn download_event_log(&self, selector: LogSelector<'_>) -> Result<EventLogExport> {
        let log_id = match selector {
            LogSelector::Id(id) => id.to_string(),
            LogSelector::Name(name) => self.find_log_id(name).map_err(|e| match e {
                ProcmineError::AmbiguousName { name, matches: 0 } => {
                    ProcmineError::NotFound(name)
                }
                other => other,
            })?,
        };

        let filter = serde_json::to_string(&event_csv_filter(&log_id))?;
        let request = ApiRequest::get("/api/eventCsvWithFilter").with_query("request", filter);
        let response = expect_success(self.transport().execute(request)?)?;

        let table = DataTable::from_csv_str(&response.text())?;
        let timestamp_columns = detect_timestamp_columns(&table);
        Ok(EventLogExport {
            table,
            timestamp_columns,
        })
    }
}

/// The fixed filter shape for enriched CSV exports.
fn event_csv_filter(log_id: &str) -> Value {
    json!({
        "activityExclusionFilter": [],
        "includeHeader": true,
        "includeLogId": false,
        "logId": log_id,
        "edgeThreshold": 1,
        "traceFilterSequence": [],
        "runConformance": true,
        "graphControl": {
            "sizeControl": "Frequency",
            "colorControl": "AverageDuration"
        }
    })
}

fn read_stream(reader: &mut dyn Read, context: &str) -> Result<String> {
    let mut contents = String::new();
    reader
        .read_to_string(&mut contents)
        .map_err(|e| ProcmineError::Io {
            context: context.to_string(),
            source: e,
        })?;
    Ok(contents)
}

/// Short hex digest used to derive stream-upload log names.
fn content_digest(contents: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(contents.as_bytes());
    let digest = hasher.finalize();
    format!("{:x}", digest)[..16].to_string()
}
