//! Job submission over one session.
//!
//! The READY server builds up the run definition across four form pages and
//! keys it by cookie, so the pages are posted strictly in order through the
//! same [`Session`]. A failed page ends the submission: its state is
//! meaningless without the pages before it, so a retry has to start over with
//! a fresh session.
//!
//! ```text
//! Start -> Step1 -> Step2 -> Step3 -> Step4 -> IdentifierExtracted -> Success
//!            \________\________\________\_____________\____________-> Failed
//! ```
mod steps;

pub use steps::{FormStep, RUN_TYPE_PAGE};

use crate::config::ClientConfig;
use crate::error::{StepFailure, SubmissionError};
use crate::extract::{extract_job_id, JobId, Strategy};
use crate::params::{DerivedFields, JobParameters};
use crate::session::{HttpRequest, HttpResponse, Session};
use std::thread;
use std::time::{Duration, Instant};

/// A submitted job and the session that submitted it.
pub struct Submission {
    pub job_id: JobId,
    /// Still open; the archive download reuses its cookies.
    pub session: Session,
    pub strategy: Strategy,
}

/// Validate, open a fresh session, and submit.
pub fn submit_job_with_config(
    params: &JobParameters,
    config: &ClientConfig,
) -> Result<Submission, SubmissionError> {
    params.validate()?;
    let session = Session::open(config).map_err(|err| SubmissionError::StepFailed {
        step: FormStep::SelectRunType.number(),
        cause: StepFailure::Transport(err),
    })?;
    submit_job(params, session, config.step_pause())
}

/// Post the four form pages in order and recover the job id from the last
/// response. `step_pause` is slept after each intermediate page.
pub fn submit_job(
    params: &JobParameters,
    mut session: Session,
    step_pause: Duration,
) -> Result<Submission, SubmissionError> {
    let derived = params.derive()?;
    tracing::info!(
        lat = params.latitude,
        lon = params.longitude,
        data_file = %derived.data_file_name,
        "submitting trajectory job"
    );

    let start = Instant::now();
    for step in FormStep::PREPARATION {
        let response = post_step(&mut session, step, params, &derived)?;
        // Drain so the next page is never posted before this one completed.
        response.text().map_err(|err| step_transport(step, err))?;
        if !step_pause.is_zero() {
            thread::sleep(step_pause);
        }
    }

    let last = FormStep::SubmitJob;
    let response = post_step(&mut session, last, params, &derived)?;
    let final_url = response.final_url.clone();
    let body = response.text().map_err(|err| step_transport(last, err))?;

    let Some((job_id, strategy)) = extract_job_id(&body, &final_url) else {
        tracing::warn!(final_url = %final_url, body_bytes = body.len(), "job id not found");
        return Err(SubmissionError::IdentifierNotFound { final_url });
    };
    tracing::info!(
        job_id = %job_id,
        strategy = strategy.label(),
        elapsed_ms = start.elapsed().as_millis(),
        "job submitted"
    );
    Ok(Submission {
        job_id,
        session,
        strategy,
    })
}

fn post_step(
    session: &mut Session,
    step: FormStep,
    params: &JobParameters,
    derived: &DerivedFields,
) -> Result<HttpResponse, SubmissionError> {
    let request = HttpRequest::post_form(session.url(step.path()), step.form(params, derived))
        .header("cache-control", "max-age=0")
        .header("sec-fetch-user", "?1")
        .header("referer", session.url(step.referer_path()));
    tracing::debug!(step = step.number(), url = %request.url, "posting form page");

    let response = session
        .send(request)
        .map_err(|err| step_transport(step, err))?;
    if !response.is_success() {
        tracing::warn!(step = step.number(), status = response.status, "form page rejected");
        return Err(SubmissionError::StepFailed {
            step: step.number(),
            cause: StepFailure::Status(response.status),
        });
    }
    tracing::info!(step = step.number(), status = response.status, "form page accepted");
    Ok(response)
}

fn step_transport(step: FormStep, err: anyhow::Error) -> SubmissionError {
    tracing::warn!(step = step.number(), error = %format!("{err:#}"), "form page failed");
    SubmissionError::StepFailed {
        step: step.number(),
        cause: StepFailure::Transport(err),
    }
}
