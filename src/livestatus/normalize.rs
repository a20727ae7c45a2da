//! Row-to-record normalization.
//!
//! Livestatus `OutputFormat: json` returns an array of arrays. This module zips each data
//! row against the header to produce an array of objects.
//!
//! Rows whose length differs from the header are truncated to the shorter of the two.

use serde_json::{Map, Value};

use crate::livestatus::query::HeaderSource;
use crate::livestatus::types::GatewayError;

/// One normalized row.
pub type Record = Map<String, Value>;

/// Reshape a successful response body into records.
pub fn normalize(body: &[u8], header: &HeaderSource) -> Result<Vec<Record>, GatewayError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let rows: Vec<Vec<Value>> = serde_json::from_slice(body)
        .map_err(|e| GatewayError::Protocol(format!("response is not an array of rows: {}", e)))?;

    let mut rows = rows.into_iter();
    let names: Vec<String> = match header {
        HeaderSource::CallerSupplied(names) => names.clone(),
        HeaderSource::DaemonSupplied => match rows.next() {
            Some(header_row) => header_row
                .into_iter()
                .map(|v| match v {
                    Value::String(s) => Ok(s),
                    other => Err(GatewayError::Protocol(format!(
                        "header row contains non-string column name {}",
                        other
                    ))),
                })
                .collect::<Result<_, _>>()?,
            None => return Ok(Vec::new()),
        },
    };

    let records = rows
        .enumerate()
        .map(|(index, row)| {
            if row.len() != names.len() {
                tracing::debug!(
                    row = index,
                    row_len = row.len(),
                    header_len = names.len(),
                    "Row length differs from header, truncating"
                );
            }
            names.iter().cloned().zip(row).collect::<Record>()
        })
        .collect::<Vec<_>>();

    tracing::trace!(records = records.len(), "Response normalized");
    Ok(records)
}
