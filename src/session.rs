//! One conversation with the READY server.
//!
//! The CGI scripts keep per-visitor state keyed by cookie, so every request of
//! a job has to go through the same [`Session`]. The HTTP client sits behind
//! [`Transport`] so tests can record traffic without a network.
use crate::config::ClientConfig;
use crate::form::Form;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::io::Read;
use std::time::Instant;
use ureq::ResponseExt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    /// Lower-case header names; applied after the session's browser headers.
    pub headers: Vec<(String, String)>,
    pub form: Option<Form>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            form: None,
        }
    }

    pub fn post_form(url: impl Into<String>, form: Form) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: vec![(
                "content-type".to_string(),
                "application/x-www-form-urlencoded".to_string(),
            )],
            form: Some(form),
        }
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_ascii_lowercase(), value.into()));
        self
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

pub struct HttpResponse {
    pub status: u16,
    /// URL after redirects were followed.
    pub final_url: String,
    /// Lower-case header names.
    pub headers: BTreeMap<String, String>,
    body: Box<dyn Read>,
}

impl std::fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("final_url", &self.final_url)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

impl HttpResponse {
    pub fn new(
        status: u16,
        final_url: impl Into<String>,
        headers: BTreeMap<String, String>,
        body: Box<dyn Read>,
    ) -> Self {
        Self {
            status,
            final_url: final_url.into(),
            headers,
            body,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Raw body stream for large payloads.
    pub fn into_reader(self) -> Box<dyn Read> {
        self.body
    }

    pub fn text(self) -> Result<String> {
        let mut bytes = Vec::new();
        let mut body = self.body;
        body.read_to_end(&mut bytes).context("read response body")?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Executes requests while keeping cookie state between calls.
pub trait Transport: Send {
    fn execute(&mut self, request: &HttpRequest) -> Result<HttpResponse>;
}

/// `ureq` agent with its cookie jar; redirects are followed by the agent.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(config: &ClientConfig) -> Self {
        let agent_config = ureq::Agent::config_builder()
            .timeout_global(Some(config.timeout()))
            .http_status_as_error(false)
            .max_redirects(config.max_redirects)
            .build();
        Self {
            agent: ureq::Agent::new_with_config(agent_config),
        }
    }
}

impl Transport for UreqTransport {
    fn execute(&mut self, request: &HttpRequest) -> Result<HttpResponse> {
        let result = match request.method {
            Method::Get => {
                let mut builder = self.agent.get(request.url.as_str());
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()
            }
            Method::Post => {
                let mut builder = self.agent.post(request.url.as_str());
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                let body = request.form.as_ref().map(Form::encode).unwrap_or_default();
                builder.send(body.as_bytes())
            }
        };
        let response = result.with_context(|| format!("request {}", request.url))?;

        let status = response.status().as_u16();
        let final_url = response.get_uri().to_string();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.into_body().into_reader();
        Ok(HttpResponse::new(status, final_url, headers, Box::new(body)))
    }
}

/// Owned per-job session: base URL, browser headers and the transport.
pub struct Session {
    base_url: String,
    headers: BTreeMap<String, String>,
    transport: Box<dyn Transport>,
}

impl Session {
    /// Fresh session with an empty cookie jar.
    pub fn open(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_transport(
            config,
            Box::new(UreqTransport::new(config)),
        ))
    }

    pub fn with_transport(config: &ClientConfig, transport: Box<dyn Transport>) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            headers: config.headers.clone(),
            transport,
        }
    }

    /// Absolute URL for a server path such as `/hypub-bin/traj1.pl`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send with the browser header set applied first. A non-2xx status is
    /// returned as a response; only transport failures are errors.
    pub fn send(&mut self, mut request: HttpRequest) -> Result<HttpResponse> {
        let mut headers: Vec<(String, String)> = self
            .headers
            .iter()
            .filter(|(name, _)| request.header_value(name).is_none())
            .map(|(name, value)| (name.to_ascii_lowercase(), value.clone()))
            .collect();
        headers.append(&mut request.headers);
        request.headers = headers;

        let start = Instant::now();
        let response = self.transport.execute(&request)?;
        tracing::debug!(
            url = %request.url,
            status = response.status,
            final_url = %response.final_url,
            elapsed_ms = start.elapsed().as_millis(),
            "request complete"
        );
        Ok(response)
    }
}
