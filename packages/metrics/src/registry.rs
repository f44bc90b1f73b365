//! Compile-time registry of deployments.
//!
//! Each entry is a `(id, toml_content)` pair embedded via `include_str!`.
//! Adding a new study area requires creating a TOML file in
//! `deployments/` and adding a corresponding entry here.

use tract_explorer_metrics_models::Deployment;

use crate::MetricsError;

/// Number of registered deployments. Enforced by a test.
#[cfg(test)]
const EXPECTED_DEPLOYMENT_COUNT: usize = 1;

/// Embedded TOML deployment definitions.
const DEPLOYMENT_TOMLS: &[(&str, &str)] =
    &[("baton_rouge", include_str!("../deployments/baton_rouge.toml"))];

/// Id of the deployment used when none is requested.
pub const DEFAULT_DEPLOYMENT: &str = "baton_rouge";

/// Returns all registered deployments.
///
/// # Panics
///
/// Panics if any embedded TOML file fails to parse. Since these are
/// compile-time constants, parse failures indicate a development error
/// and are caught by the tests below.
#[must_use]
pub fn all_deployments() -> Vec<Deployment> {
    DEPLOYMENT_TOMLS
        .iter()
        .map(|(name, toml_str)| parse(name, toml_str))
        .collect()
}

/// Returns the deployment with the given id.
///
/// # Errors
///
/// Returns [`MetricsError::UnknownDeployment`] if no such deployment is
/// embedded.
pub fn deployment(id: &str) -> Result<Deployment, MetricsError> {
    DEPLOYMENT_TOMLS
        .iter()
        .find(|(name, _)| *name == id)
        .map(|(name, toml_str)| parse(name, toml_str))
        .ok_or_else(|| MetricsError::UnknownDeployment { id: id.to_string() })
}

/// Ids of all embedded deployments.
#[must_use]
pub fn deployment_ids() -> Vec<&'static str> {
    DEPLOYMENT_TOMLS.iter().map(|(name, _)| *name).collect()
}

fn parse(name: &str, toml_str: &str) -> Deployment {
    toml::de::from_str(toml_str)
        .unwrap_or_else(|e| panic!("Failed to parse deployment '{name}': {e}"))
}
