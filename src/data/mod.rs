//! Ingestion pipeline: row parsing, chunked ingestion and the published dataset

pub mod ingest;
pub mod row;
pub mod series;
pub mod store;

pub use ingest::{ChunkedIngestor, IngestStep, ingest_all};
pub use row::{Header, Row, Value, parse_row};
pub use series::{Dataset, SeriesMetadata};
pub use store::{LoadToken, SeriesStore};
