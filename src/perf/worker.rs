//! Background worker for file reading
//!
//! Reading a large log from disk is the only blocking operation in the loading
//! path, so it runs on its own thread. Parsing stays on the caller's side and is
//! stepped cooperatively by [`crate::data::ChunkedIngestor`].

use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};
use std::thread::{self, JoinHandle};

use crate::error::TelemetryError;

/// Requests that can be sent to the background worker
pub enum WorkerRequest {
    /// Read a file into memory as text
    ReadFile { request_id: u64, path: PathBuf },
    /// Shutdown the worker
    Shutdown,
}

/// Results returned from the background worker
pub enum WorkerResult {
    /// File read successfully
    FileRead {
        request_id: u64,
        path: PathBuf,
        text: String,
    },
    /// The file could not be read
    Failed {
        request_id: u64,
        error: TelemetryError,
    },
}

impl WorkerResult {
    pub fn request_id(&self) -> u64 {
        match self {
            WorkerResult::FileRead { request_id, .. } | WorkerResult::Failed { request_id, .. } => {
                *request_id
            }
        }
    }
}

/// Background worker that processes requests off the main thread
pub struct BackgroundWorker {
    tx: Sender<WorkerRequest>,
    rx: Receiver<WorkerResult>,
    handle: Option<JoinHandle<()>>,
    next_request: u64,
}

impl BackgroundWorker {
    /// Spawn a new background worker thread
    pub fn spawn() -> Self {
        let (req_tx, req_rx) = channel::<WorkerRequest>();
        let (res_tx, res_rx) = channel::<WorkerResult>();

        let handle = thread::spawn(move || {
            Self::worker_loop(req_rx, res_tx);
        });

        Self {
            tx: req_tx,
            rx: res_rx,
            handle: Some(handle),
            next_request: 0,
        }
    }

    fn worker_loop(rx: Receiver<WorkerRequest>, tx: Sender<WorkerResult>) {
        while let Ok(request) = rx.recv() {
            let result = match request {
                WorkerRequest::ReadFile { request_id, path } => Self::read_file(request_id, path),
                WorkerRequest::Shutdown => break,
            };

            if tx.send(result).is_err() {
                break;
            }
        }
    }

    fn read_file(request_id: u64, path: PathBuf) -> WorkerResult {
        profiling::scope!("read_file");

        match std::fs::read_to_string(&path) {
            Ok(text) => {
                tracing::debug!("Read {} bytes from {}", text.len(), path.display());
                WorkerResult::FileRead {
                    request_id,
                    path,
                    text,
                }
            }
            Err(e) => WorkerResult::Failed {
                request_id,
                error: TelemetryError::FetchFailure {
                    source_name: path.display().to_string(),
                    reason: e.to_string(),
                },
            },
        }
    }

    /// Queue a file read; returns the id its result will carry
    pub fn read_file_async(&mut self, path: PathBuf) -> u64 {
        self.next_request += 1;
        let request_id = self.next_request;
        self.request(WorkerRequest::ReadFile { request_id, path });
        request_id
    }

    /// Send a request to the worker (non-blocking)
    pub fn request(&self, req: WorkerRequest) {
        let _ = self.tx.send(req);
    }

    /// Poll for completed work (non-blocking)
    pub fn poll(&self) -> Option<WorkerResult> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => None,
        }
    }
}

impl Drop for BackgroundWorker {
    fn drop(&mut self) {
        let _ = self.tx.send(WorkerRequest::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Default for BackgroundWorker {
    fn default() -> Self {
        Self::spawn()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::{Duration, Instant};
    use tempfile::Builder;

    fn wait_for(worker: &BackgroundWorker) -> WorkerResult {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(result) = worker.poll() {
                return result;
            }
            assert!(Instant::now() < deadline, "worker did not answer");
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_worker_file_read() {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "timestamp,v").unwrap();
        writeln!(file, "0,1").unwrap();
        file.flush().unwrap();

        let mut worker = BackgroundWorker::spawn();
        let id = worker.read_file_async(file.path().to_path_buf());

        match wait_for(&worker) {
            WorkerResult::FileRead {
                request_id, text, ..
            } => {
                assert_eq!(request_id, id);
                assert_eq!(text, "timestamp,v\n0,1\n");
            }
            WorkerResult::Failed { error, .. } => panic!("unexpected failure: {}", error),
        }
    }

    #[test]
    fn test_worker_missing_file() {
        let mut worker = BackgroundWorker::spawn();
        let id = worker.read_file_async(PathBuf::from("/definitely/not/here.csv"));

        let result = wait_for(&worker);
        assert_eq!(result.request_id(), id);
        assert!(matches!(
            result,
            WorkerResult::Failed {
                error: TelemetryError::FetchFailure { .. },
                ..
            }
        ));
    }
}
