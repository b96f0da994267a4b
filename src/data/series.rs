//! Completed dataset and its derived metadata

use super::row::{Header, Row};
use crate::error::{Result, TelemetryError};

/// Summary derived once after ingestion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesMetadata {
    /// First numeric timestamp in file order, NaN if there is none
    pub initial_timestamp: f64,
    /// Last numeric timestamp in file order, NaN if there is none
    pub final_timestamp: f64,
    pub row_count: usize,
    /// Rows per time unit; NaN for an empty series, infinite for zero elapsed time
    pub implied_sample_rate: f64,
}

impl SeriesMetadata {
    pub fn from_rows(rows: &[Row], timestamp_index: usize) -> Self {
        let initial_timestamp = rows
            .iter()
            .find_map(|r| r.number(timestamp_index))
            .unwrap_or(f64::NAN);
        let final_timestamp = rows
            .iter()
            .rev()
            .find_map(|r| r.number(timestamp_index))
            .unwrap_or(f64::NAN);
        let row_count = rows.len();
        let implied_sample_rate = if row_count == 0 {
            f64::NAN
        } else {
            row_count as f64 / (final_timestamp - initial_timestamp)
        };

        Self {
            initial_timestamp,
            final_timestamp,
            row_count,
            implied_sample_rate,
        }
    }

    /// Duration covered by the series, 0 when undefined
    pub fn total_elapsed(&self) -> f64 {
        let elapsed = self.final_timestamp - self.initial_timestamp;
        if elapsed.is_finite() && elapsed > 0.0 {
            elapsed
        } else {
            0.0
        }
    }

    /// Sample rate usable for arithmetic
    pub fn sample_rate(&self) -> Option<f64> {
        let rate = self.implied_sample_rate;
        (rate.is_finite() && rate > 0.0).then_some(rate)
    }
}

/// An ingested file: header, rows in file order and metadata.
///
/// Shared behind `Arc` once published and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Dataset {
    header: Header,
    rows: Vec<Row>,
    metadata: SeriesMetadata,
    timestamp_index: usize,
    message_index: Option<usize>,
}

impl Dataset {
    /// Assemble a dataset, resolving the timestamp and message columns by name
    pub fn new(
        header: Header,
        rows: Vec<Row>,
        timestamp_column: &str,
        message_column: &str,
    ) -> Result<Self> {
        let timestamp_index = header.index_of(timestamp_column).ok_or_else(|| {
            TelemetryError::MissingTimestampColumn {
                column: timestamp_column.to_string(),
            }
        })?;
        let message_index = header.index_of(message_column);
        Ok(Self::from_parts(header, rows, timestamp_index, message_index))
    }

    pub(crate) fn from_parts(
        header: Header,
        rows: Vec<Row>,
        timestamp_index: usize,
        message_index: Option<usize>,
    ) -> Self {
        let metadata = SeriesMetadata::from_rows(&rows, timestamp_index);
        Self {
            header,
            rows,
            metadata,
            timestamp_index,
            message_index,
        }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn metadata(&self) -> &SeriesMetadata {
        &self.metadata
    }

    pub fn timestamp_index(&self) -> usize {
        self.timestamp_index
    }

    pub fn message_index(&self) -> Option<usize> {
        self.message_index
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Timestamp of `row` relative to the first timestamp
    pub fn relative_time(&self, row: &Row) -> Option<f64> {
        row.number(self.timestamp_index)
            .map(|t| t - self.metadata.initial_timestamp)
    }

    /// Event rows carry a non-empty message
    pub fn is_event(&self, row: &Row) -> bool {
        row.has_message(self.message_index)
    }

    /// Message text of an event row
    pub fn message(&self, row: &Row) -> Option<String> {
        if !self.is_event(row) {
            return None;
        }
        self.message_index
            .and_then(|i| row.get(i))
            .map(|v| v.to_string())
    }
}
