// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for faqdesk

use std::path::PathBuf;
use thiserror::Error;

/// No knowledge-base source could be found at startup.
///
/// This is the only fatal error in the system: without a knowledge base
/// there is nothing to answer from, so the process must not start serving.
#[derive(Debug, Error)]
#[error(
    "no knowledge base found: neither {} nor {} exists",
    json_path.display(),
    csv_path.display()
)]
pub struct ConfigurationError {
    /// Primary (JSON) source that was tried first
    pub json_path: PathBuf,
    /// Secondary (CSV) source that was tried as fallback
    pub csv_path: PathBuf,
}

/// The interaction log could not be appended to.
///
/// Never propagated into the query path; surfaced as a diagnostic only.
#[derive(Debug, Error)]
#[error("failed to append interaction log at {}: {source}", path.display())]
pub struct LogWriteError {
    pub path: PathBuf,
    #[source]
    pub source: anyhow::Error,
}
