//! Archive download for a submitted job.
//!
//! The server gives no completion signal, so the download waits a fixed
//! interval first. The body is streamed into a temporary file beside the
//! destination and renamed into place only once fully written.
use crate::config::ClientConfig;
use crate::error::RetrievalError;
use crate::extract::JobId;
use crate::session::{HttpRequest, Session};
use serde::Serialize;
use std::io::{self, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

pub const ARTIFACT_DIR: &str = "/hypubout";
const ACCEPTED_CONTENT_TYPES: [&str; 2] = ["application/zip", "application/octet-stream"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetrievedArtifact {
    pub job_id: JobId,
    pub path: PathBuf,
    pub bytes: u64,
    pub content_type: Option<String>,
}

pub fn artifact_url(session: &Session, job_id: &JobId) -> String {
    session.url(&format!("{ARTIFACT_DIR}/{}", job_id.artifact_file_name()))
}

/// Download into a fresh session, for a job submitted earlier.
pub fn fetch_artifact(
    job_id: &JobId,
    config: &ClientConfig,
    destination: &Path,
) -> Result<RetrievedArtifact, RetrievalError> {
    let mut session = Session::open(config).map_err(RetrievalError::Transport)?;
    retrieve_artifact(job_id, &mut session, destination, config.retrieval_delay())
}

/// Wait `delay`, then stream `gis_<id>.zip` to `destination` through the
/// submitting session. On any failure `destination` is left untouched.
pub fn retrieve_artifact(
    job_id: &JobId,
    session: &mut Session,
    destination: &Path,
    delay: Duration,
) -> Result<RetrievedArtifact, RetrievalError> {
    if !delay.is_zero() {
        tracing::info!(job_id = %job_id, delay_secs = delay.as_secs_f64(), "waiting before download");
        thread::sleep(delay);
    }

    let url = artifact_url(session, job_id);
    tracing::info!(job_id = %job_id, url = %url, "downloading artifact");
    let start = Instant::now();
    let response = session
        .send(HttpRequest::get(url))
        .map_err(RetrievalError::Transport)?;
    if !response.is_success() {
        tracing::warn!(job_id = %job_id, status = response.status, "artifact download rejected");
        return Err(RetrievalError::RetrievalFailed {
            status: response.status,
        });
    }

    let content_type = response.content_type().map(str::to_string);
    if !is_archive_content_type(content_type.as_deref()) {
        tracing::warn!(
            job_id = %job_id,
            content_type = content_type.as_deref().unwrap_or(""),
            "unexpected content type; saving anyway"
        );
    }

    let bytes = write_atomically(destination, response.into_reader())?;
    tracing::info!(
        job_id = %job_id,
        path = %destination.display(),
        bytes,
        elapsed_ms = start.elapsed().as_millis(),
        "artifact saved"
    );
    Ok(RetrievedArtifact {
        job_id: job_id.clone(),
        path: destination.to_path_buf(),
        bytes,
        content_type,
    })
}

pub fn is_archive_content_type(content_type: Option<&str>) -> bool {
    let Some(content_type) = content_type else {
        return false;
    };
    let lowered = content_type.to_ascii_lowercase();
    ACCEPTED_CONTENT_TYPES
        .iter()
        .any(|accepted| lowered.contains(accepted))
}

/// Stream into a temp file in the destination directory, then rename.
/// The temp file is removed on any error.
fn write_atomically(destination: &Path, body: Box<dyn Read>) -> Result<u64, RetrievalError> {
    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let io_err = |source: std::io::Error| RetrievalError::Io {
        path: destination.to_path_buf(),
        source,
    };

    let mut temp = tempfile::Builder::new()
        .prefix(".windscan-")
        .suffix(".part")
        .tempfile_in(dir)
        .map_err(io_err)?;

    let mut body = TrackedBody::new(body);
    let written = match io::copy(&mut body, &mut temp) {
        Ok(written) => written,
        Err(err) if body.failed => {
            return Err(RetrievalError::Transport(
                anyhow::Error::new(err).context("read artifact body"),
            ))
        }
        Err(err) => return Err(io_err(err)),
    };
    temp.flush().map_err(io_err)?;
    temp.as_file().sync_all().map_err(io_err)?;
    temp.persist(destination).map_err(|err| io_err(err.error))?;
    Ok(written)
}

/// Remembers whether the body itself failed, so a copy error can be blamed
/// on the network or on the local file.
struct TrackedBody<R> {
    inner: R,
    failed: bool,
}

impl<R: Read> TrackedBody<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            failed: false,
        }
    }
}

impl<R: Read> Read for TrackedBody<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf).inspect_err(|err| {
            if err.kind() != ErrorKind::Interrupted {
                self.failed = true;
            }
        })
    }
}
