//! Push job: where a snapshot goes and under which grouping key
//!
//! A job is identified on the gateway by its name plus the ordered grouping
//! labels, all encoded into the URL path:
//! `<gateway>/metrics/job/<job>/<label>/<value>/...`

use crate::domain::errors::PushError;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use prometheus::proto::MetricFamily;
use std::fmt;
use std::str::FromStr;
use url::Url;

const JOB_LABEL: &str = "job";

/// HTTP method used for the push
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PushMethod {
    /// Replace every metric stored under the grouping key
    #[default]
    Put,
    /// Replace only metrics with the same name
    Post,
}

impl PushMethod {
    pub fn as_http(&self) -> reqwest::Method {
        match self {
            PushMethod::Put => reqwest::Method::PUT,
            PushMethod::Post => reqwest::Method::POST,
        }
    }
}

impl fmt::Display for PushMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PushMethod::Put => write!(f, "PUT"),
            PushMethod::Post => write!(f, "POST"),
        }
    }
}

impl FromStr for PushMethod {
    type Err = PushError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "put" => Ok(PushMethod::Put),
            "post" => Ok(PushMethod::Post),
            _ => Err(PushError::InvalidMethod(s.to_string())),
        }
    }
}

/// One push to one gateway under one grouping key
#[derive(Debug, Clone)]
pub struct PushJob {
    gateway_url: String,
    job: String,
    grouping: Vec<(String, String)>,
    method: PushMethod,
}

impl PushJob {
    pub fn new(gateway_url: impl Into<String>, job: impl Into<String>) -> Self {
        Self {
            gateway_url: gateway_url.into(),
            job: job.into(),
            grouping: Vec::new(),
            method: PushMethod::default(),
        }
    }

    /// Add a grouping label. Setting an existing name again replaces its value
    /// in place, so the path order follows first insertion.
    pub fn grouping(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.grouping.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.grouping.push((name, value)),
        }
        self
    }

    pub fn method(mut self, method: PushMethod) -> Self {
        self.method = method;
        self
    }

    pub fn job_name(&self) -> &str {
        &self.job
    }

    pub fn grouping_labels(&self) -> &[(String, String)] {
        &self.grouping
    }

    pub fn push_method(&self) -> PushMethod {
        self.method
    }

    /// Full gateway endpoint for this job, validating job and label names
    pub fn endpoint(&self) -> Result<Url, PushError> {
        if self.job.is_empty() {
            return Err(PushError::InvalidJob {
                reason: "job name must not be empty".to_string(),
            });
        }
        for (name, _) in &self.grouping {
            if !is_valid_label_name(name) || name == JOB_LABEL {
                return Err(PushError::InvalidGroupingLabel { name: name.clone() });
            }
        }

        let mut url = normalize_gateway_url(&self.gateway_url)?;
        {
            let mut segments = url.path_segments_mut().map_err(|_| PushError::InvalidGatewayUrl {
                url: self.gateway_url.clone(),
                reason: "URL cannot carry a path".to_string(),
            })?;
            segments.pop_if_empty().push("metrics");

            let labels = std::iter::once((JOB_LABEL, self.job.as_str()))
                .chain(self.grouping.iter().map(|(n, v)| (n.as_str(), v.as_str())));
            for (name, value) in labels {
                let (name, value) = encode_label(name, value);
                segments.push(&name).push(&value);
            }
        }
        Ok(url)
    }

    /// Reject metrics that already carry the `job` label or a grouping label:
    /// the gateway would silently overwrite them.
    pub fn check_label_conflicts(&self, families: &[MetricFamily]) -> Result<(), PushError> {
        for family in families {
            for metric in family.get_metric() {
                for pair in metric.get_label() {
                    let label = pair.name();
                    if label == JOB_LABEL || self.grouping.iter().any(|(n, _)| n == label) {
                        return Err(PushError::LabelConflict {
                            metric: family.name().to_string(),
                            label: label.to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

/// Prepend `http://` when no scheme is given and drop trailing slashes
pub fn normalize_gateway_url(raw: &str) -> Result<Url, PushError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };
    let url = Url::parse(&with_scheme).map_err(|e| PushError::InvalidGatewayUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(PushError::InvalidGatewayUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme {}", other),
        }),
    }
}

// Empty values, values containing '/' and the dot segments `.` and `..`
// cannot live in a path segment.
fn encode_label(name: &str, value: &str) -> (String, String) {
    if value.is_empty() {
        (format!("{}@base64", name), "=".to_string())
    } else if value.contains('/') || value == "." || value == ".." {
        (format!("{}@base64", name), URL_SAFE_NO_PAD.encode(value))
    } else {
        (name.to_string(), value.to_string())
    }
}

fn is_valid_label_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
