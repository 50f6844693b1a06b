// ─────────────────────────────────────────────────────────────────────
// SSPIKE Rates — Error
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SspikeError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error in {path} at line {line}: {message}")]
    Parse {
        path: String,
        line: usize,
        message: String,
    },

    #[error("Input precondition violated: {0}")]
    Precondition(String),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Unknown detector: {0}")]
    UnknownDetector(String),

    #[error("Unknown supernova model: {0}")]
    UnknownModel(String),

    #[error("Detector {detector} has no {target} target count")]
    MissingTargets { detector: String, target: String },
}

pub type SspikeResult<T> = Result<T, SspikeError>;
