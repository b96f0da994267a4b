//! Chunked ingestion of raw delimited text
//!
//! [`ChunkedIngestor`] is an explicit state machine: each [`ChunkedIngestor::step`]
//! parses at most `chunk_rows` lines and returns, so the host can go back to its
//! event loop between chunks. The ingestor owns the raw text and remembers the
//! byte range of every non-empty line, which avoids copying the lines up front.

use super::row::{Header, Row, parse_row};
use super::series::Dataset;
use super::store::LoadToken;
use crate::config::Config;
use crate::constants::ingest::PROGRESS_COMPLETE;
use crate::error::{Result, TelemetryError};
use std::ops::Range;
use std::sync::Arc;
use std::time::Instant;

/// Outcome of one ingestion step
#[derive(Debug, Clone)]
pub enum IngestStep {
    /// More lines remain; progress is 0-100
    InProgress { progress: f32 },
    /// All lines parsed
    Done(Arc<Dataset>),
    /// A newer load started; this run will never produce a dataset
    Cancelled,
}

pub struct ChunkedIngestor {
    text: String,
    /// Byte ranges of the trimmed, non-empty lines; index 0 is the header
    lines: Vec<Range<usize>>,
    header: Header,
    delimiter: char,
    chunk_rows: usize,
    timestamp_index: usize,
    message_index: Option<usize>,
    pos: usize,
    rows: Vec<Row>,
    progress: f32,
    token: LoadToken,
    started: Instant,
    finished: Option<Arc<Dataset>>,
}

impl ChunkedIngestor {
    /// Prepare ingestion of `text`.
    ///
    /// Fails before any row is parsed if there is no header line or the header
    /// lacks the configured timestamp column.
    pub fn new(text: impl Into<String>, config: &Config, token: LoadToken) -> Result<Self> {
        Self::start(text, config, || token)
    }

    /// Like [`ChunkedIngestor::new`], but `issue_token` only runs once the
    /// header has been accepted, so a rejected input never claims a load.
    pub fn start(
        text: impl Into<String>,
        config: &Config,
        issue_token: impl FnOnce() -> LoadToken,
    ) -> Result<Self> {
        let text = text.into();
        let lines = line_ranges(&text);
        let first = lines.first().cloned().ok_or(TelemetryError::EmptyFile)?;

        let header = Header::parse(&text[first], config.delimiter);
        let timestamp_index = header.index_of(&config.timestamp_column).ok_or_else(|| {
            TelemetryError::MissingTimestampColumn {
                column: config.timestamp_column.clone(),
            }
        })?;
        let message_index = header.index_of(&config.message_column);
        let token = issue_token();

        tracing::debug!(
            "Ingesting {} data lines x {} cols (load #{})",
            lines.len() - 1,
            header.len(),
            token.generation()
        );

        Ok(Self {
            rows: Vec::with_capacity(lines.len() - 1),
            text,
            lines,
            header,
            delimiter: config.delimiter,
            chunk_rows: config.chunk_rows.max(1),
            timestamp_index,
            message_index,
            pos: 1,
            progress: 0.0,
            token,
            started: Instant::now(),
            finished: None,
        })
    }

    /// Parse the next chunk.
    ///
    /// After completion every further call returns the same `Done` snapshot.
    pub fn step(&mut self) -> IngestStep {
        if let Some(dataset) = &self.finished {
            return IngestStep::Done(Arc::clone(dataset));
        }
        if !self.token.is_current() {
            tracing::warn!(
                "Load #{} cancelled at line {} of {}",
                self.token.generation(),
                self.pos,
                self.lines.len()
            );
            return IngestStep::Cancelled;
        }

        let total = self.lines.len();
        let end = self.pos.saturating_add(self.chunk_rows).min(total);
        {
            profiling::scope!("parse_chunk");
            for range in &self.lines[self.pos..end] {
                self.rows
                    .push(parse_row(&self.header, &self.text[range.clone()], self.delimiter));
            }
        }
        self.pos = end;
        self.progress = (self.pos as f32 / total as f32).min(1.0) * PROGRESS_COMPLETE;

        if self.pos < total {
            return IngestStep::InProgress {
                progress: self.progress,
            };
        }

        let dataset = Arc::new(self.finish());
        self.finished = Some(Arc::clone(&dataset));
        IngestStep::Done(dataset)
    }

    fn finish(&mut self) -> Dataset {
        let rows = std::mem::take(&mut self.rows);
        let dataset = Dataset::from_parts(
            self.header.clone(),
            rows,
            self.timestamp_index,
            self.message_index,
        );
        // The raw text is no longer needed once every line is parsed
        self.text = String::new();
        self.lines = Vec::new();

        tracing::debug!(
            "Ingested {} rows x {} cols in {:?}",
            dataset.metadata().row_count,
            dataset.header().len(),
            self.started.elapsed()
        );
        dataset
    }

    /// Step until done, collecting every reported progress value.
    ///
    /// Fails with [`TelemetryError::Superseded`] if a newer load started.
    pub fn run_to_completion(&mut self) -> Result<(Arc<Dataset>, Vec<f32>)> {
        let mut progress = Vec::new();
        loop {
            match self.step() {
                IngestStep::InProgress { progress: p } => progress.push(p),
                IngestStep::Done(dataset) => {
                    progress.push(self.progress);
                    return Ok((dataset, progress));
                }
                IngestStep::Cancelled => return Err(TelemetryError::Superseded),
            }
        }
    }

    /// Last reported progress, 0-100
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn token(&self) -> &LoadToken {
        &self.token
    }
}

/// Byte ranges of every trimmed, non-empty line
fn line_ranges(text: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut offset = 0;
    for raw in text.split_inclusive('\n') {
        let start = offset;
        offset += raw.len();

        let leading = raw.len() - raw.trim_start().len();
        let line = raw.trim();
        if !line.is_empty() {
            ranges.push(start + leading..start + leading + line.len());
        }
    }
    ranges
}

/// Run an ingestion to completion in one go.
///
/// Returns the dataset and every progress value reported along the way,
/// ending with 100.
pub fn ingest_all(text: &str, config: &Config) -> Result<(Arc<Dataset>, Vec<f32>)> {
    ChunkedIngestor::new(text, config, LoadToken::detached())?.run_to_completion()
}
