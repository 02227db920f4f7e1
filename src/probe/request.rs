//! Probe request parsing and validation.

use super::ProbeError;
use crate::config::ProbeConfig;
use crate::labels::NamedPath;
use crate::path::PathExpression;
use reqwest::Url;
use std::collections::HashSet;

/// A validated probe request.
#[derive(Debug, Clone)]
pub struct ProbeRequest {
    /// Remote JSON endpoint.
    pub target: Url,
    /// Path of the primary value.
    pub value_path: PathExpression,
    /// Labels attached to the primary value, in request order.
    pub labels: Vec<NamedPath>,
    /// Additional values exported without labels.
    pub fields: Vec<NamedPath>,
    /// Scaling factor for every gauge.
    pub multiplier: f64,
}

impl ProbeRequest {
    /// Validates query parameters.
    ///
    /// Single-valued parameters use their first occurrence; `label` and
    /// `field` may repeat. An empty `jsonpath` counts as absent.
    pub fn from_query<'a, I>(params: I, config: &ProbeConfig) -> Result<Self, ProbeError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut target = None;
        let mut jsonpath = None;
        let mut multiple = None;
        let mut labels = Vec::new();
        let mut fields = Vec::new();

        for (key, value) in params {
            match key {
                "target" => {
                    target.get_or_insert(value);
                }
                "jsonpath" => {
                    jsonpath.get_or_insert(value);
                }
                "multiple" => {
                    multiple.get_or_insert(value);
                }
                "label" => labels.push(named_path("label", value)?),
                "field" => fields.push(named_path("field", value)?),
                _ => {}
            }
        }

        let target = parse_target(target.filter(|t| !t.is_empty()))?;

        let value_path = match jsonpath.filter(|p| !p.is_empty()) {
            Some(path) => path,
            None => {
                let default = config
                    .default_jsonpath
                    .as_deref()
                    .ok_or(ProbeError::MissingParameter("jsonpath"))?;
                tracing::debug!(path = %default, "Using default jsonpath");
                default
            }
        };
        let value_path = PathExpression::compile(value_path).map_err(|source| {
            ProbeError::InvalidPathExpression {
                parameter: "jsonpath",
                source,
            }
        })?;

        if config.strict_labels {
            check_collisions("label", &labels)?;
            check_collisions("field", &fields)?;
        }

        Ok(Self {
            target,
            value_path,
            labels,
            fields,
            multiplier: parse_multiplier(multiple),
        })
    }
}

/// Parses the `multiple` parameter.
///
/// Anything that is not a finite float falls back to `1.0`; a bad multiplier
/// never fails a probe.
pub fn parse_multiplier(raw: Option<&str>) -> f64 {
    match raw.map(str::parse::<f64>) {
        Some(Ok(m)) if m.is_finite() => m,
        Some(_) => {
            tracing::debug!(multiple = ?raw, "Ignoring invalid multiplier");
            1.0
        }
        None => 1.0,
    }
}

fn parse_target(raw: Option<&str>) -> Result<Url, ProbeError> {
    let raw = raw.ok_or(ProbeError::MissingParameter("target"))?;
    let url = Url::parse(raw).map_err(|e| ProbeError::InvalidParameter {
        parameter: "target",
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(ProbeError::InvalidParameter {
            parameter: "target",
            reason: format!("unsupported scheme `{scheme}`"),
        }),
    }
}

fn named_path(parameter: &'static str, value: &str) -> Result<NamedPath, ProbeError> {
    NamedPath::parse(value)
        .map_err(|source| ProbeError::InvalidPathExpression { parameter, source })
}

fn check_collisions(kind: &'static str, paths: &[NamedPath]) -> Result<(), ProbeError> {
    let mut seen = HashSet::new();
    for named in paths {
        if !seen.insert(named.name.as_str()) {
            return Err(ProbeError::LabelCollision {
                kind,
                name: named.name.clone(),
            });
        }
    }
    Ok(())
}
