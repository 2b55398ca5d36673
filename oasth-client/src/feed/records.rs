//! Parsing of the delimited-record responses.
//!
//! The static endpoints wrap every record in parentheses and separate
//! records with a comma: `(f,f,...),(f,f,...)`. Fields are positional and
//! records of one endpoint all share a layout, so each endpoint declares a
//! typed record struct whose [`FromRecord`] impl names every positional
//! field it reads; one generic decoder drives them all and attaches the
//! endpoint name and the raw record to every failure.

use chrono::NaiveTime;

use super::error::FeedError;

/// Splits a response body into its raw records.
///
/// Splits on the `),` substring that closes one record and opens the next,
/// then strips the remaining wrapping parenthesis on each side, removes
/// decorative quote characters and normalises `", "` to `","` so the later
/// field split on commas is unambiguous. The first chunk has no leading
/// delimiter and the last no trailing one; both come out as plain records.
pub(crate) fn split_records(body: &str) -> Vec<String> {
    body.split("),")
        .map(|chunk| {
            let chunk = chunk.strip_prefix('(').unwrap_or(chunk);
            let chunk = chunk.strip_suffix(')').unwrap_or(chunk);
            chunk.replace('"', "").replace(", ", ",")
        })
        .collect()
}

/// A field conversion failure, before endpoint context is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FieldError {
    pub field: &'static str,
    pub reason: String,
}

impl FieldError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Typed positional access into one split record.
///
/// Field access is strictly positional; unused trailing fields are simply
/// never read. Every accessor pairs the index with a field name so a
/// conversion failure identifies what was expected there.
pub(crate) struct RecordView<'a> {
    fields: Vec<&'a str>,
}

impl<'a> RecordView<'a> {
    pub fn new(record: &'a str) -> Self {
        Self {
            fields: record.split(',').collect(),
        }
    }

    /// The raw text of a field.
    pub fn text(&self, index: usize, field: &'static str) -> Result<&'a str, FieldError> {
        self.fields
            .get(index)
            .copied()
            .ok_or_else(|| FieldError::new(field, format!("missing positional field {index}")))
    }

    /// A field converted to an unsigned integer (ids, order indexes).
    pub fn int(&self, index: usize, field: &'static str) -> Result<u32, FieldError> {
        let raw = self.text(index, field)?;
        raw.parse()
            .map_err(|_| FieldError::new(field, format!("{raw:?} is not an integer")))
    }

    /// A field converted to a signed integer.
    pub fn signed_int(&self, index: usize, field: &'static str) -> Result<i32, FieldError> {
        let raw = self.text(index, field)?;
        raw.parse()
            .map_err(|_| FieldError::new(field, format!("{raw:?} is not an integer")))
    }

    /// A field converted to a floating-point number (coordinates).
    pub fn float(&self, index: usize, field: &'static str) -> Result<f64, FieldError> {
        let raw = self.text(index, field)?;
        raw.parse()
            .map_err(|_| FieldError::new(field, format!("{raw:?} is not a number")))
    }

    /// A time-of-day field that may hold the literal `"null"`.
    ///
    /// The literal marks a deliberately absent observation and is distinct
    /// from a missing field, which is still an error.
    pub fn time_or_null(
        &self,
        index: usize,
        field: &'static str,
    ) -> Result<Option<NaiveTime>, FieldError> {
        let raw = self.text(index, field)?;
        if raw == "null" {
            return Ok(None);
        }
        parse_wire_time(raw)
            .map(Some)
            .ok_or_else(|| FieldError::new(field, format!("{raw:?} is not a time of day")))
    }
}

/// Departure times come as `HH:MM:SS` or `HH:MM`.
fn parse_wire_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}

/// A typed record decoded from one endpoint.
///
/// The implementation is the endpoint's schema: every positional field the
/// endpoint uses is declared once, by index, name and target type.
pub(crate) trait FromRecord: Sized {
    fn from_record(view: &RecordView<'_>) -> Result<Self, FieldError>;
}

/// Decodes every record of a response body, in order.
///
/// Field-count and type validation happen here, per record; any failure
/// names the endpoint, the raw record and the offending field.
pub(crate) fn decode_records<T: FromRecord>(
    endpoint: &'static str,
    body: &str,
) -> Result<Vec<T>, FeedError> {
    split_records(body)
        .into_iter()
        .map(|record| {
            let view = RecordView::new(&record);
            T::from_record(&view).map_err(|e| FeedError::MalformedRecord {
                endpoint,
                record: record.clone(),
                reason: format!("field {}: {}", e.field, e.reason),
            })
        })
        .collect()
}
