//! Errors raised while producing and delivering reports.
//!
//! Per-friend failures ([`TaskError`]) are only logged; callers of
//! [`Dispatcher::dispatch`](crate::Dispatcher::dispatch) see a single
//! [`DispatchError`].
use thiserror::Error;

use crate::TaskStage;

/// The report text could not be built.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error("total due to \"{spender}\" does not fit in an amount")]
    Overflow { spender: String },
}

/// The document renderer could not produce a document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("font error: {0}")]
    Font(String),
    #[error("failed to write document: {0}")]
    Write(String),
}

/// The mail transport refused or failed to deliver a message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    #[error("invalid message: {0}")]
    Message(String),
    #[error("smtp error: {0}")]
    Smtp(String),
}

/// Why a single friend's task failed.
#[derive(Error, Debug)]
pub enum TaskFailure {
    #[error("no email address at this position")]
    MissingEmail,
    #[error("no distribution entry")]
    MissingLedger,
    #[error(transparent)]
    Formatting(#[from] ReportError),
    #[error(transparent)]
    Rendering(#[from] RenderError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[derive(Error, Debug)]
#[error("report for \"{friend}\" failed while {stage}: {failure}")]
pub struct TaskError {
    pub friend: String,
    pub stage: TaskStage,
    pub failure: TaskFailure,
}

impl TaskError {
    pub(crate) fn new(friend: &str, stage: TaskStage, failure: impl Into<TaskFailure>) -> Self {
        Self {
            friend: friend.to_string(),
            stage,
            failure: failure.into(),
        }
    }
}

/// Outcome of a failed dispatch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// `friends`, `friendEmails` or `distribution` was absent or empty.
    /// Nothing was sent.
    #[error("Missing required data.")]
    MissingData,
    /// At least one report could not be delivered.
    #[error("{failed} of {total} reports could not be delivered")]
    Delivery { failed: usize, total: usize },
    #[error("dispatcher misconfigured: {0}")]
    Config(String),
}
