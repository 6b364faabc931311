//! Record source
//!
//! Reads the input CSV lazily. A blocking reader task parses rows and feeds a
//! bounded channel; the engine consumes the other end as a stream, so at
//! most `capacity` rows are buffered ahead of the workers.

use crate::core::record::InputRecord;
use futures::stream::BoxStream;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

const UTF8_BOM: char = '\u{feff}';

/// Failures reading the source. Always fatal to the run.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read header row: {0}")]
    Header(#[source] csv::Error),

    #[error("Failed to read data row {row}: {source}")]
    Row {
        row: u64,
        #[source]
        source: csv::Error,
    },

    #[error("Reader task failed: {0}")]
    Reader(String),
}

/// Stream of input records as consumed by the execution engine
pub type RecordStream = BoxStream<'static, Result<InputRecord, SourceError>>;

/// Wrap already-materialized records as a [`RecordStream`]
pub fn stream_from_records(records: Vec<InputRecord>) -> RecordStream {
    Box::pin(futures::stream::iter(records.into_iter().map(Ok)))
}

/// CSV file reader with a header row
pub struct CsvRecordSource<R = File> {
    reader: csv::Reader<R>,
    headers: Vec<String>,
    capacity: usize,
}

impl CsvRecordSource<File> {
    /// Open a CSV file and read its header row
    pub fn open(path: impl AsRef<Path>, delimiter: u8, capacity: usize) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SourceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Opened record source {:?}", path);
        Self::from_reader(file, delimiter, capacity)
    }
}

impl<R: Read + Send + 'static> CsvRecordSource<R> {
    pub fn from_reader(reader: R, delimiter: u8, capacity: usize) -> Result<Self, SourceError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(SourceError::Header)?
            .iter()
            .enumerate()
            .map(|(i, name)| {
                if i == 0 {
                    name.trim_start_matches(UTF8_BOM).to_string()
                } else {
                    name.to_string()
                }
            })
            .collect();

        Ok(Self {
            reader,
            headers,
            capacity: capacity.max(1),
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Start the reader task and return the record stream.
    ///
    /// Rows are numbered from 1. Cells missing from short rows become absent
    /// values; extra cells beyond the header are ignored. A read error ends
    /// the stream after being yielded.
    pub fn into_stream(self) -> RecordStream {
        let (tx, rx) = mpsc::channel(self.capacity);
        let Self {
            mut reader,
            headers,
            ..
        } = self;

        let handle = tokio::task::spawn_blocking(move || {
            let mut row = 0u64;
            for result in reader.records() {
                row += 1;
                let item = match result {
                    Ok(cells) => {
                        if cells.len() > headers.len() {
                            debug!(row, "Ignoring {} extra cells", cells.len() - headers.len());
                        }
                        let fields = headers
                            .iter()
                            .enumerate()
                            .map(|(i, name)| (name.clone(), cells.get(i).map(str::to_string)))
                            .collect();
                        Ok(InputRecord::new(row, fields))
                    }
                    Err(source) => Err(SourceError::Row { row, source }),
                };
                let failed = item.is_err();
                if tx.blocking_send(item).is_err() {
                    debug!(row, "Record consumer went away; stopping reader");
                    return;
                }
                if failed {
                    return;
                }
            }
            debug!(rows = row, "Record source exhausted");
        });

        let records = ReceiverStream::new(rx);
        // Surface a panicked reader as a final error item instead of a silent end
        let tail = futures::stream::once(async move {
            match handle.await {
                Ok(()) => None,
                Err(e) => {
                    warn!("Record reader task failed: {}", e);
                    Some(Err(SourceError::Reader(e.to_string())))
                }
            }
        })
        .filter_map(|item| item);

        Box::pin(records.chain(tail))
    }
}
