//! Per-friend distribution reports: formatting, PDF rendering and delivery.
//!
//! [`Dispatcher::dispatch`] is the entry point. For every friend it formats
//! the ledger with [`format_report`], renders it with a [`DocumentRenderer`]
//! and hands both to a [`MailTransport`]. All friends are processed
//! concurrently and the outcome is reported as a single success or failure.

pub use dispatch::{
    ATTACHMENT_CONTENT_TYPE, ATTACHMENT_NAME, DispatchReport, Dispatcher, DispatcherBuilder,
    EmailTask, TaskStage, plan_tasks,
};
pub use error::{DispatchError, RenderError, ReportError, TaskError, TaskFailure, TransportError};
pub use render::{DocumentRenderer, PageSize, PdfConfig, PdfRenderer, layout_pages};
pub use report::{format_report, subject_for, total_due};
pub use smtp::{SmtpSettings, SmtpTransport};
pub use transport::{MailAttachment, MailTransport, OutgoingMail};

mod dispatch;
mod error;
mod render;
mod report;
mod smtp;
mod transport;
