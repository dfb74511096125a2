//! CSV export and import of finalized annotations.
//!
//! The format is one header row followed by one row per annotation:
//!
//! ```text
//! timeline,label,begin,end,duration,comment
//! Gaze,Look,1000,2000,1000,"first \""look\"""
//! ```
//!
//! Times are integer milliseconds. Double quotes inside comments are written
//! as `\"` and the field is then quoted like any other field holding the
//! delimiter, a quote or a newline. Import resolves timelines and labels by
//! name and silently skips rows it cannot place; the returned
//! [`ImportReport`] counts them.
//!
//! Export ends rows with `\n`. Import accepts `\n` and `\r\n` alike, so
//! files written with CRLF endings by other tools read back unchanged.

use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use tracing::{debug, info, warn};

use crate::error::{CoreError, CsvError};
use crate::timeline::{EventId, TimelineId, TimelineRegistry};

pub const CSV_HEADERS: [&str; 6] = ["timeline", "label", "begin", "end", "duration", "comment"];

/// Delimiters tried when the configured one does not fit the header.
pub const DELIMITER_CANDIDATES: [char; 4] = [',', ';', '\t', '|'];

const REQUIRED: [&str; 4] = ["timeline", "label", "begin", "end"];

/// Counts gathered while importing rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped_unknown_timeline: usize,
    pub skipped_unknown_label: usize,
}

impl ImportReport {
    pub fn skipped(&self) -> usize {
        self.skipped_unknown_timeline + self.skipped_unknown_label
    }
}

// ── Export ───────────────────────────────────────────────────────────

/// Render every finalized annotation, timelines in name order and
/// annotations in start order.
pub fn to_csv_string(registry: &TimelineRegistry, delimiter: char) -> String {
    let mut out = String::new();
    push_row(&mut out, CSV_HEADERS.iter().map(|h| h.to_string()), delimiter);
    for timeline in registry.timelines_by_name() {
        for a in timeline.annotations() {
            push_row(
                &mut out,
                [
                    timeline.name().to_string(),
                    timeline.label_of(a).unwrap_or_default().to_string(),
                    a.start_time.to_string(),
                    a.end_time.to_string(),
                    a.duration_ms().to_string(),
                    a.comment.replace('"', "\\\""),
                ],
                delimiter,
            );
        }
    }
    out
}

/// Write the CSV to `writer`. Returns the number of annotation rows.
pub fn export_csv<W: Write>(registry: &TimelineRegistry, writer: &mut W, delimiter: char) -> Result<usize, CoreError> {
    let rows: usize = registry.timelines().iter().map(|t| t.annotations().len()).sum();
    writer.write_all(to_csv_string(registry, delimiter).as_bytes())?;
    writer.flush()?;
    debug!(rows, "annotations exported");
    Ok(rows)
}

fn push_row(out: &mut String, fields: impl IntoIterator<Item = String>, delimiter: char) {
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            out.push(delimiter);
        }
        out.push_str(&escape_field(&field, delimiter));
    }
    out.push('\n');
}

fn escape_field(value: &str, delimiter: char) -> String {
    if value.contains(delimiter) || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

// ── Import ───────────────────────────────────────────────────────────

/// Read CSV rows from `reader` into the registry.
pub fn import_csv<R: Read>(
    registry: &mut TimelineRegistry,
    reader: &mut R,
    delimiter: char,
) -> Result<ImportReport, CoreError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    import_csv_str(registry, &text, delimiter)
}

/// Import rows into timelines and labels that already exist.
///
/// Rows naming an unknown timeline or label are skipped. Every row is
/// validated before anything is inserted, so a malformed number leaves the
/// registry untouched. Imported intervals are not checked against existing
/// annotations.
///
/// # Errors
/// [`CsvError::Empty`], [`CsvError::MissingColumn`] or
/// [`CsvError::InvalidNumber`].
pub fn import_csv_str(
    registry: &mut TimelineRegistry,
    text: &str,
    delimiter: char,
) -> Result<ImportReport, CoreError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let header_line = text.lines().next().filter(|l| !l.trim().is_empty()).ok_or(CsvError::Empty)?;
    let delimiter = sniff_delimiter(header_line, delimiter);

    let mut records = parse_records(text, delimiter).into_iter();
    let header = records.next().ok_or(CsvError::Empty)?;
    let columns = Columns::locate(&header.fields)?;

    let mut report = ImportReport::default();
    let mut pending: Vec<(TimelineId, EventId, i64, i64, String)> = Vec::new();

    for record in records {
        let field = |index: Option<usize>| index.and_then(|i| record.fields.get(i)).map_or("", String::as_str);
        let timeline_name = field(Some(columns.timeline));
        let label = field(Some(columns.label));

        let Some(timeline) = registry.timeline_by_name(timeline_name) else {
            debug!(line = record.line, timeline = timeline_name, "row skipped: unknown timeline");
            report.skipped_unknown_timeline += 1;
            continue;
        };
        let Some(event) = timeline.event_by_name(label) else {
            debug!(line = record.line, timeline = timeline_name, label, "row skipped: unknown label");
            report.skipped_unknown_label += 1;
            continue;
        };

        let begin = parse_ms(field(Some(columns.begin)), record.line, "begin")?;
        let end = parse_ms(field(Some(columns.end)), record.line, "end")?;
        if let Ok(duration) = field(columns.duration).trim().parse::<i64>() {
            if duration != end - begin {
                warn!(line = record.line, begin, end, duration, "duration column disagrees with end - begin");
            }
        }
        let comment = field(columns.comment).replace("\\\"", "\"");
        pending.push((timeline.id(), event.id, begin, end, comment));
    }

    for (timeline, event, begin, end, comment) in pending {
        registry.timeline_mut(timeline)?.insert_finalized(event, begin, end, comment);
        report.imported += 1;
    }
    if report.imported > 0 {
        registry.mark_dirty();
    }
    info!(
        imported = report.imported,
        skipped_unknown_timeline = report.skipped_unknown_timeline,
        skipped_unknown_label = report.skipped_unknown_label,
        "csv import finished"
    );
    Ok(report)
}

fn parse_ms(value: &str, line: usize, column: &'static str) -> Result<i64, CsvError> {
    value.trim().parse().map_err(|_| CsvError::InvalidNumber {
        line,
        column,
        value: value.to_string(),
    })
}

/// Pick the delimiter that splits the header into the expected columns,
/// preferring `preferred`.
pub fn sniff_delimiter(header: &str, preferred: char) -> char {
    let fits = |delimiter: char| {
        let fields = split_line(header, delimiter);
        REQUIRED
            .iter()
            .all(|required| fields.iter().any(|f| f.trim() == *required))
    };
    if fits(preferred) {
        return preferred;
    }
    DELIMITER_CANDIDATES
        .into_iter()
        .find(|&c| fits(c))
        .unwrap_or(preferred)
}

struct Columns {
    timeline: usize,
    label: usize,
    begin: usize,
    end: usize,
    duration: Option<usize>,
    comment: Option<usize>,
}

impl Columns {
    fn locate(header: &[String]) -> Result<Self, CsvError> {
        let find = |name: &str| header.iter().position(|h| h.trim() == name);
        let require = |name: &'static str| find(name).ok_or(CsvError::MissingColumn(name));
        Ok(Self {
            timeline: require("timeline")?,
            label: require("label")?,
            begin: require("begin")?,
            end: require("end")?,
            duration: find("duration"),
            comment: find("comment"),
        })
    }
}

/// A parsed row and the line it starts on (1-based).
#[derive(Debug, PartialEq)]
struct Record {
    line: usize,
    fields: Vec<String>,
}

fn split_line(line: &str, delimiter: char) -> Vec<String> {
    parse_records(line, delimiter)
        .into_iter()
        .next()
        .map(|r| r.fields)
        .unwrap_or_default()
}

/// Split text into records. Quoted fields may hold the delimiter, doubled
/// quotes and line breaks. Blank lines are dropped.
fn parse_records(text: &str, delimiter: char) -> Vec<Record> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    // A quote opens a quoted field only as its first character; elsewhere
    // it is literal text.
    let mut at_field_start = true;
    let mut line = 1;
    let mut record_line = 1;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                if ch == '\n' {
                    line += 1;
                }
                current.push(ch);
            }
        } else if ch == '"' && at_field_start {
            in_quotes = true;
            at_field_start = false;
        } else if ch == delimiter {
            fields.push(std::mem::take(&mut current));
            at_field_start = true;
        } else if ch == '\r' && chars.peek() == Some(&'\n') {
            // CRLF; the '\n' ends the record.
        } else if ch == '\n' {
            fields.push(std::mem::take(&mut current));
            finish_record(&mut records, std::mem::take(&mut fields), record_line);
            line += 1;
            record_line = line;
            at_field_start = true;
        } else {
            current.push(ch);
            at_field_start = false;
        }
    }
    if !current.is_empty() || !fields.is_empty() {
        fields.push(current);
        finish_record(&mut records, fields, record_line);
    }
    records
}

fn finish_record(records: &mut Vec<Record>, fields: Vec<String>, line: usize) {
    let blank = fields.len() == 1 && fields[0].trim().is_empty();
    if !blank {
        records.push(Record { line, fields });
    }
}
