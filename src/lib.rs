//! Drive the NOAA READY HYSPLIT trajectory form from Rust.
//!
//! A job is submitted by posting four form pages in order through one
//! cookie-carrying [`Session`]; the job id is recovered from the final page and
//! the GIS archive is downloaded through the same session.
//!
//! ```no_run
//! use windscan::{retrieve_artifact, submit_job_with_config, ClientConfig, JobParameters};
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = ClientConfig::default();
//! let params = JobParameters::new(41.98, -87.90, 22, 10, 29, 22);
//! let mut submission = submit_job_with_config(&params, &config)?;
//! let destination = Path::new(".").join(submission.job_id.artifact_file_name());
//! retrieve_artifact(
//!     &submission.job_id,
//!     &mut submission.session,
//!     &destination,
//!     config.retrieval_delay(),
//! )?;
//! # Ok(())
//! # }
//! ```
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod form;
pub mod params;
pub mod retrieve;
pub mod session;
pub mod workflow;

pub use config::{load_config, ClientConfig};
pub use error::{RetrievalError, StepFailure, SubmissionError};
pub use extract::{extract_job_id, JobId, Strategy};
pub use form::Form;
pub use params::{Direction, JobParameters, ParameterError, TrajectoryOptions};
pub use retrieve::{fetch_artifact, retrieve_artifact, RetrievedArtifact};
pub use session::{HttpRequest, HttpResponse, Method, Session, Transport, UreqTransport};
pub use workflow::{submit_job, submit_job_with_config, FormStep, Submission};
