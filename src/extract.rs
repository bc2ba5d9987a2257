//! Job id recovery from the step 4 response.
//!
//! The server may answer with a meta refresh, a plain link to the results
//! page, or an HTTP redirect straight to it. Strategies are tried in that
//! order and the first match wins.
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

pub const RESULTS_PATH: &str = "/hypub-bin/trajresults.pl";
const JOB_ID_PARAM: &str = "jobidno";

/// Numeric id the server assigns to a submitted run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Accepts non-empty ASCII digit strings only.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn artifact_file_name(&self) -> String {
        format!("gis_{}.zip", self.0)
    }

    pub fn results_url(&self, base_url: &str) -> String {
        format!("{base_url}{RESULTS_PATH}?{JOB_ID_PARAM}={}", self.0)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    MetaRefresh,
    Anchor,
    FinalUrl,
}

impl Strategy {
    pub const ORDER: [Strategy; 3] = [Strategy::MetaRefresh, Strategy::Anchor, Strategy::FinalUrl];

    pub fn label(self) -> &'static str {
        match self {
            Strategy::MetaRefresh => "meta_refresh",
            Strategy::Anchor => "anchor",
            Strategy::FinalUrl => "final_url",
        }
    }

    pub fn extract(self, body: &str, final_url: &str) -> Option<JobId> {
        match self {
            Strategy::MetaRefresh => capture_job_id(meta_refresh_pattern(), body),
            Strategy::Anchor => capture_job_id(anchor_pattern(), body),
            Strategy::FinalUrl => job_id_from_url(final_url),
        }
    }
}

/// Run every strategy in order; returns the id and the strategy that found it.
pub fn extract_job_id(body: &str, final_url: &str) -> Option<(JobId, Strategy)> {
    Strategy::ORDER
        .into_iter()
        .find_map(|strategy| strategy.extract(body, final_url).map(|id| (id, strategy)))
}

fn meta_refresh_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)CONTENT="\d+;\s*URL=[^"]*/hypub-bin/trajresults\.pl\?jobidno=(\d+)""#)
            .expect("meta refresh pattern")
    })
}

fn anchor_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)<a\s[^>]*?href="[^"]*/hypub-bin/trajresults\.pl\?jobidno=(\d+)""#)
            .expect("anchor pattern")
    })
}

fn capture_job_id(pattern: &Regex, body: &str) -> Option<JobId> {
    pattern
        .captures(body)
        .and_then(|caps| caps.get(1))
        .and_then(|m| JobId::parse(m.as_str()))
}

fn job_id_from_url(final_url: &str) -> Option<JobId> {
    let parsed = url::Url::parse(final_url).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == JOB_ID_PARAM)
        .and_then(|(_, value)| JobId::parse(&value))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUBMIT_URL: &str = "https://www.ready.noaa.gov/hypub-bin/traj2.pl";

    #[test]
    fn meta_refresh_wins() {
        let body = r#"<html><head><META HTTP-EQUIV="Refresh" CONTENT="3; URL=/ready2-bin/../hypub-bin/trajresults.pl?jobidno=12345"></head>
<body><a href="/hypub-bin/trajresults.pl?jobidno=99999">results</a></body></html>"#;
        let (id, strategy) = extract_job_id(body, SUBMIT_URL).unwrap();
        assert_eq!(id.as_str(), "12345");
        assert_eq!(strategy, Strategy::MetaRefresh);
    }

    #[test]
    fn meta_refresh_is_case_insensitive() {
        let body = r#"<meta http-equiv="refresh" content="0;url=https://www.ready.noaa.gov/HYPUB-BIN/TRAJRESULTS.PL?JOBIDNO=42">"#;
        let (id, _) = extract_job_id(body, SUBMIT_URL).unwrap();
        assert_eq!(id.as_str(), "42");
    }

    #[test]
    fn anchor_used_without_meta_refresh() {
        let body = r#"<p>Your job is running. <A HREF="https://www.ready.noaa.gov/hypub-bin/trajresults.pl?jobidno=67890">View results</A></p>"#;
        let (id, strategy) = extract_job_id(body, SUBMIT_URL).unwrap();
        assert_eq!(id.as_str(), "67890");
        assert_eq!(strategy, Strategy::Anchor);
    }

    #[test]
    fn anchor_href_need_not_be_first_attribute() {
        let body = r#"<p><a target="_blank" class="result"
href="https://www.ready.noaa.gov/hypub-bin/trajresults.pl?jobidno=31337">View results</a></p>"#;
        let (id, strategy) = extract_job_id(body, SUBMIT_URL).unwrap();
        assert_eq!(id.as_str(), "31337");
        assert_eq!(strategy, Strategy::Anchor);
    }

    #[test]
    fn anchor_match_stays_inside_one_tag() {
        let body = r#"<a name="top">x</a><p href="/hypub-bin/trajresults.pl?jobidno=8">"#;
        assert!(Strategy::Anchor.extract(body, SUBMIT_URL).is_none());
    }

    #[test]
    fn final_url_used_when_body_has_no_link() {
        let final_url = "https://www.ready.noaa.gov/hypub-bin/trajresults.pl?jobidno=555";
        let (id, strategy) = extract_job_id("<html>processing</html>", final_url).unwrap();
        assert_eq!(id.as_str(), "555");
        assert_eq!(strategy, Strategy::FinalUrl);
    }

    #[test]
    fn nothing_recognized_returns_none() {
        assert!(extract_job_id("<html>error</html>", SUBMIT_URL).is_none());
        assert!(extract_job_id("", "not a url").is_none());
        let final_url = "https://www.ready.noaa.gov/hypub-bin/trajresults.pl?jobidno=abc";
        assert!(extract_job_id("", final_url).is_none());
    }

    #[test]
    fn each_strategy_is_independent() {
        let anchor_only = r#"<a href="/hypub-bin/trajresults.pl?jobidno=7">x</a>"#;
        assert!(Strategy::MetaRefresh.extract(anchor_only, SUBMIT_URL).is_none());
        assert_eq!(
            Strategy::Anchor.extract(anchor_only, SUBMIT_URL),
            JobId::parse("7")
        );
        assert!(Strategy::FinalUrl.extract(anchor_only, SUBMIT_URL).is_none());
    }

    #[test]
    fn job_id_names_artifact_and_results_page() {
        let id = JobId::parse(" 12345 ").unwrap();
        assert_eq!(id.artifact_file_name(), "gis_12345.zip");
        assert_eq!(
            id.results_url("https://www.ready.noaa.gov"),
            "https://www.ready.noaa.gov/hypub-bin/trajresults.pl?jobidno=12345"
        );
        assert!(JobId::parse("").is_none());
        assert!(JobId::parse("12a").is_none());
    }
}
