//! Column semantics inference for event logs and case attribute tables.
//!
//! The remote service binds semantics descriptors to CSV columns
//! positionally, so the descriptor list produced here always has one entry
//! per column, in the same order as the table it was derived from.
//! Classification is permissive: a column that matches no known role
//! degrades to a generic attribute instead of failing the upload.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::table::DataTable;

/// Value type of a generic attribute column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    String,
    Number,
    Boolean,
    Date,
}

/// Semantic descriptor for a single table column.
///
/// Serializes to the JSON shape the remote expects in the
/// `eventSemantics` and `caseSemantics` multipart fields, e.g.
/// `{"type": "Timestamp", "name": "Start", "format": "yyyy-MM-dd HH:mm:ss"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FieldSemantics {
    /// Case identifier joining events into traces.
    CaseId { name: String },
    /// The activity/action performed by an event.
    Activity { name: String },
    /// An event timestamp, rendered in the platform's format notation.
    Timestamp { name: String, format: String },
    /// Any other column, carried along with an inferred value type.
    OtherAttribute {
        name: String,
        #[serde(rename = "attributeType")]
        attribute_type: AttributeType,
    },
}

impl FieldSemantics {
    /// The column name this descriptor refers to.
    pub fn name(&self) -> &str {
        match self {
            FieldSemantics::CaseId { name }
            | FieldSemantics::Activity { name }
            | FieldSemantics::Timestamp { name, .. }
            | FieldSemantics::OtherAttribute { name, .. } => name,
        }
    }
}

/// Well-known column roles matched by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NamedRole {
    CaseId,
    Activity,
    Timestamp,
}

/// Infers column semantics from column names and values.
pub struct SemanticsInferencer {
    role_patterns: Vec<(Regex, NamedRole)>,
}

impl SemanticsInferencer {
    /// Create an inferencer with the built-in naming conventions.
    pub fn new() -> Self {
        Self {
            role_patterns: Self::build_role_patterns(),
        }
    }

    /// Build patterns for inferring a column role from its name.
    fn build_role_patterns() -> Vec<(Regex, NamedRole)> {
        vec![
            // Case identifier patterns
            (Regex::new(r"(?i)^(case[_\s-]?id|case[_\s-]?key|case|trace[_\s-]?id)$").unwrap(), NamedRole::CaseId),
            // Activity patterns
            (Regex::new(r"(?i)^(activity|action|event|task|operation|step)$").unwrap(), NamedRole::Activity),
            // Timestamp patterns
            (Regex::new(r"(?i)^(timestamp|datetime|date[_\s-]?time|time|date|start|complete|end)$").unwrap(), NamedRole::Timestamp),
            (Regex::new(r"(?i)^(start|end|completion)[_\s-]?(time|date|timestamp)$").unwrap(), NamedRole::Timestamp),
        ]
    }

    /// Derive event semantics for every column of `table`.
    ///
    /// Returns a copy of the table with timestamp columns re-rendered in
    /// `time_format` (platform notation, e.g. `yyyy-MM-dd HH:mm:ss`) and a
    /// descriptor list aligned with the returned table's column order. The
    /// input table is left untouched.
    pub fn infer_event_semantics(
        &self,
        table: &DataTable,
        time_format: &str,
    ) -> (DataTable, Vec<FieldSemantics>) {
        let mut out = table.clone();
        let mut descriptors = Vec::with_capacity(table.column_count());

        for (index, header) in table.headers.iter().enumerate() {
            let descriptor = match self.role_for_name(header) {
                Some(NamedRole::CaseId) => FieldSemantics::CaseId {
                    name: header.clone(),
                },
                Some(NamedRole::Activity) => FieldSemantics::Activity {
                    name: header.clone(),
                },
                Some(NamedRole::Timestamp) => {
                    render_timestamp_column(&mut out, index, time_format);
                    FieldSemantics::Timestamp {
                        name: header.clone(),
                        format: time_format.to_string(),
                    }
                }
                None => FieldSemantics::OtherAttribute {
                    name: header.clone(),
                    attribute_type: infer_attribute_type(table, index),
                },
            };
            descriptors.push(descriptor);
        }

        (out, descriptors)
    }

    /// Derive case-attribute semantics for every column of `table`.
    ///
    /// The case id is the join key to the event log: columns matching the
    /// case id convention get that role, everything else is a generic
    /// attribute. When no column matches, the first column is assumed to
    /// be the identifier.
    pub fn infer_case_semantics(&self, table: &DataTable) -> (DataTable, Vec<FieldSemantics>) {
        let mut descriptors: Vec<FieldSemantics> = table
            .headers
            .iter()
            .enumerate()
            .map(|(index, header)| {
                if self.role_for_name(header) == Some(NamedRole::CaseId) {
                    FieldSemantics::CaseId {
                        name: header.clone(),
                    }
                } else {
                    FieldSemantics::OtherAttribute {
                        name: header.clone(),
                        attribute_type: infer_attribute_type(table, index),
                    }
                }
            })
            .collect();

        let has_case_id = descriptors
            .iter()
            .any(|d| matches!(d, FieldSemantics::CaseId { .. }));
        if !has_case_id {
            if let Some(first) = descriptors.first_mut() {
                *first = FieldSemantics::CaseId {
                    name: first.name().to_string(),
                };
            }
        }

        (table.clone(), descriptors)
    }

    /// Match a column name against the role conventions.
    fn role_for_name(&self, name: &str) -> Option<NamedRole> {
        self.role_patterns
            .iter()
            .find(|(pattern, _)| pattern.is_match(name.trim()))
            .map(|(_, role)| *role)
    }
}

impl Default for SemanticsInferencer {
    fn default() -> Self {
        Self::new()
    }
}

/// Derive event semantics with the default naming conventions.
pub fn infer_event_semantics(
    table: &DataTable,
    time_format: &str,
) -> (DataTable, Vec<FieldSemantics>) {
    SemanticsInferencer::new().infer_event_semantics(table, time_format)
}

/// Derive case-attribute semantics with the default naming conventions.
pub fn infer_case_semantics(table: &DataTable) -> (DataTable, Vec<FieldSemantics>) {
    SemanticsInferencer::new().infer_case_semantics(table)
}

static BOOLEAN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(true|false|yes|no|y|n|t|f)$").unwrap());

static DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4}-\d{2}-\d{2}|\d{1,2}[./]\d{1,2}[./]\d{4})$").unwrap());

/// Datetime layouts tried when normalizing timestamp values.
const DATETIME_LAYOUTS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
];

/// Date-only layouts, promoted to midnight when rendered as datetimes.
const DATE_LAYOUTS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y", "%m/%d/%Y", "%Y/%m/%d"];

/// Parse a timestamp value in any of the recognized layouts.
pub(crate) fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }
    for layout in DATETIME_LAYOUTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, layout) {
            return Some(dt);
        }
    }
    for layout in DATE_LAYOUTS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, layout) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Platform format tokens mapped to chrono specifiers, longest first.
const FORMAT_TOKENS: &[(&str, &str)] = &[
    ("yyyy", "%Y"),
    ("SSS", "%3f"),
    ("yy", "%y"),
    ("MM", "%m"),
    ("dd", "%d"),
    ("HH", "%H"),
    ("hh", "%I"),
    ("mm", "%M"),
    ("ss", "%S"),
    ("a", "%p"),
    ("Z", "%z"),
];

/// Translate the platform's time format notation into a chrono format
/// string. Unknown characters pass through as literals.
pub(crate) fn platform_to_chrono(format: &str) -> String {
    let mut out = String::with_capacity(format.len());
    let mut rest = format;
    'outer: while !rest.is_empty() {
        for (token, spec) in FORMAT_TOKENS {
            if let Some(tail) = rest.strip_prefix(token) {
                out.push_str(spec);
                rest = tail;
                continue 'outer;
            }
        }
        let ch = rest.chars().next().unwrap();
        if ch == '%' {
            out.push_str("%%");
        } else {
            out.push(ch);
        }
        rest = &rest[ch.len_utf8()..];
    }
    out
}

/// Re-render one column's values in the requested format. Values that do
/// not parse as timestamps are left unchanged.
fn render_timestamp_column(table: &mut DataTable, index: usize, time_format: &str) {
    let layout = platform_to_chrono(time_format);
    for row in &mut table.rows {
        if let Some(cell) = row.get_mut(index) {
            if let Some(parsed) = parse_timestamp(cell) {
                *cell = parsed.format(&layout).to_string();
            }
        }
    }
}

/// Infer the value type of a generic attribute column from its contents.
fn infer_attribute_type(table: &DataTable, index: usize) -> AttributeType {
    let values: Vec<&str> = table
        .column_values(index)
        .filter(|v| !DataTable::is_null_value(v))
        .collect();

    if values.is_empty() {
        return AttributeType::String;
    }
    if values.iter().all(|v| v.trim().parse::<f64>().is_ok()) {
        return AttributeType::Number;
    }
    if values.iter().all(|v| BOOLEAN_PATTERN.is_match(v.trim())) {
        return AttributeType::Boolean;
    }
    if values.iter().all(|v| DATE_PATTERN.is_match(v.trim())) {
        return AttributeType::Date;
    }
    AttributeType::String
}

/// Names of columns whose non-null values all parse as timestamps.
///
/// Used when reconstructing a downloaded event log: everything stays a
/// string except columns that are unambiguously temporal.
pub(crate) fn detect_timestamp_columns(table: &DataTable) -> Vec<String> {
    table
        .headers
        .iter()
        .enumerate()
        .filter(|(index, _)| {
            let mut seen = 0usize;
            for value in table.column_values(*index) {
                if DataTable::is_null_value(value) {
                    continue;
                }
                if parse_timestamp(value).is_none() {
                    return false;
                }
                seen += 1;
            }
            seen > 0
        })
        .map(|(_, header)| header.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_table(headers: Vec<&str>, rows: Vec<Vec<&str>>) -> DataTable {
        DataTable::new(
            headers.into_iter().map(String::from).collect(),
            rows.into_iter()
                .map(|r| r.into_iter().map(String::from).collect())
                .collect(),
        )
    }

    #[test]
    fn test_recognized_roles() {
        let table = make_table(
            vec!["Case_ID", "Activity", "Timestamp"],
            vec![vec!["c1", "register", "2024-01-15T10:30:00"]],
        );
        let (_, semantics) = infer_event_semantics(&table, "yyyy-MM-dd HH:mm:ss");

        assert_eq!(
            semantics,
            vec![
                FieldSemantics::CaseId {
                    name: "Case_ID".to_string()
                },
                FieldSemantics::Activity {
                    name: "Activity".to_string()
                },
                FieldSemantics::Timestamp {
                    name: "Timestamp".to_string(),
                    format: "yyyy-MM-dd HH:mm:ss".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_descriptor_order_matches_columns() {
        let table = make_table(
            vec!["cost", "case", "note", "start"],
            vec![vec!["12.5", "c1", "ok", "2024-01-15 08:00:00"]],
        );
        let (out, semantics) = infer_event_semantics(&table, "yyyy-MM-dd");

        assert_eq!(semantics.len(), table.column_count());
        for (descriptor, header) in semantics.iter().zip(&out.headers) {
            assert_eq!(descriptor.name(), header);
        }
    }

    #[test]
    fn test_unrecognized_columns_degrade_to_attributes() {
        let table = make_table(
            vec!["cost", "approved", "due", "comment"],
            vec![
                vec!["12.5", "true", "2024-01-15", "fine"],
                vec!["7", "false", "2024-02-01", "also fine"],
            ],
        );
        let (_, semantics) = infer_event_semantics(&table, "yyyy-MM-dd HH:mm:ss");

        let types: Vec<_> = semantics
            .iter()
            .map(|d| match d {
                FieldSemantics::OtherAttribute { attribute_type, .. } => *attribute_type,
                other => panic!("expected attribute, got {:?}", other),
            })
            .collect();
        assert_eq!(
            types,
            vec![
                AttributeType::Number,
                AttributeType::Boolean,
                AttributeType::Date,
                AttributeType::String,
            ]
        );
    }

    #[test]
    fn test_timestamp_rendering() {
        let table = make_table(
            vec!["case_id", "timestamp"],
            vec![
                vec!["c1", "2024-01-15T10:30:00"],
                vec!["c2", "not-a-date"],
            ],
        );
        let (out, _) = infer_event_semantics(&table, "yyyy-MM-dd HH:mm:ss");

        assert_eq!(out.get(0, 1), Some("2024-01-15 10:30:00"));
        // Unparseable values degrade gracefully instead of failing.
        assert_eq!(out.get(1, 1), Some("not-a-date"));
        // The input table is never mutated.
        assert_eq!(table.get(0, 1), Some("2024-01-15T10:30:00"));
    }

    #[test]
    fn test_platform_format_translation() {
        assert_eq!(platform_to_chrono("yyyy-MM-dd HH:mm:ss"), "%Y-%m-%d %H:%M:%S");
        assert_eq!(platform_to_chrono("dd.MM.yy"), "%d.%m.%y");
        assert_eq!(platform_to_chrono("HH:mm:ss.SSS"), "%H:%M:%S.%3f");
    }

    #[test]
    fn test_case_semantics_without_named_id() {
        let table = make_table(
            vec!["customer", "segment"],
            vec![vec!["c1", "retail"], vec!["c2", "corporate"]],
        );
        let (_, semantics) = infer_case_semantics(&table);

        assert_eq!(
            semantics[0],
            FieldSemantics::CaseId {
                name: "customer".to_string()
            }
        );
        assert!(matches!(
            semantics[1],
            FieldSemantics::OtherAttribute { .. }
        ));
    }

    #[test]
    fn test_semantics_json_shape() {
        let semantics = vec![
            FieldSemantics::CaseId {
                name: "case_id".to_string(),
            },
            FieldSemantics::Timestamp {
                name: "start".to_string(),
                format: "yyyy-MM-dd".to_string(),
            },
            FieldSemantics::OtherAttribute {
                name: "cost".to_string(),
                attribute_type: AttributeType::Number,
            },
        ];
        let json = serde_json::to_string(&semantics).unwrap();
        assert_eq!(
            json,
            r#"[{"type":"CaseId","name":"case_id"},{"type":"Timestamp","name":"start","format":"yyyy-MM-dd"},{"type":"OtherAttribute","name":"cost","attributeType":"number"}]"#
        );
    }

    #[test]
    fn test_detect_timestamp_columns() {
        let table = make_table(
            vec!["case_id", "started", "cost"],
            vec![
                vec!["c1", "2024-01-15 08:00:00", "10"],
                vec!["c2", "2024-01-16 09:00:00", "20"],
            ],
        );
        assert_eq!(detect_timestamp_columns(&table), vec!["started"]);
    }
}
