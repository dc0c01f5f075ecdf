//! Error kinds for the solver core (spec §7).

use thiserror::Error;

/// The four error kinds the core distinguishes: configuration, tree-build,
/// programming-invariant, and numeric-rounding warnings.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("config error: {message}")]
    Config { message: String },

    #[error("build error: {reason}")]
    Build { reason: String },

    #[error("invariant violated: {message}")]
    Invariant { message: String },

    #[error("numeric warning: {detail}")]
    Numeric { detail: String },
}

impl SolverError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn build(reason: impl Into<String>) -> Self {
        Self::Build {
            reason: reason.into(),
        }
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        Self::Invariant {
            message: message.into(),
        }
    }

    pub fn numeric(detail: impl Into<String>) -> Self {
        Self::Numeric {
            detail: detail.into(),
        }
    }
}

pub type SolverResult<T> = Result<T, SolverError>;
