use std::{fmt, sync::Arc};

use engine::{Distribution, SpenderLedger};
use tokio::task::JoinSet;

use crate::{
    DispatchError, DocumentRenderer, MailAttachment, MailTransport, OutgoingMail, PdfRenderer,
    TaskError, TaskFailure, format_report, subject_for,
};

pub const ATTACHMENT_NAME: &str = "distribution_details.pdf";
pub const ATTACHMENT_CONTENT_TYPE: &str = "application/pdf";

/// Where a report task is in its life cycle.
///
/// A task moves `Pending -> Formatting -> Rendering -> Sending` and ends
/// either delivered or failed in the stage it had reached. There are no
/// retries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskStage {
    Pending,
    Formatting,
    Rendering,
    Sending,
}

impl fmt::Display for TaskStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TaskStage::Pending => "pending",
            TaskStage::Formatting => "formatting",
            TaskStage::Rendering => "rendering",
            TaskStage::Sending => "sending",
        })
    }
}

/// One friend's report: who it is for, where it goes and what it says.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmailTask {
    pub friend: String,
    pub email: String,
    pub ledger: SpenderLedger,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: usize,
}

/// Pair the roster positionally with emails and ledgers.
///
/// One entry per friend. A friend without an email at the same position, or
/// without an entry in `distribution`, yields an error entry. Emails beyond
/// the end of `friends` are ignored.
pub fn plan_tasks(
    friends: &[String],
    emails: &[String],
    distribution: &Distribution,
) -> Vec<Result<EmailTask, TaskError>> {
    friends
        .iter()
        .enumerate()
        .map(|(index, friend)| -> Result<EmailTask, TaskError> {
            let email = emails
                .get(index)
                .ok_or_else(|| {
                    TaskError::new(friend, TaskStage::Pending, TaskFailure::MissingEmail)
                })?;
            let ledger = distribution
                .get(friend)
                .ok_or_else(|| {
                    TaskError::new(friend, TaskStage::Pending, TaskFailure::MissingLedger)
                })?;
            Ok(EmailTask {
                friend: friend.clone(),
                email: email.clone(),
                ledger: ledger.clone(),
            })
        })
        .collect()
}

/// Formats, renders and emails one report per friend.
///
/// The sender address, transport and renderer are fixed at construction.
#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn MailTransport>,
    renderer: Arc<dyn DocumentRenderer>,
    sender: String,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("sender", &self.sender)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Return a builder for `Dispatcher`.
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::default()
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// Send every friend their report.
    ///
    /// Fails with [`DispatchError::MissingData`] before doing anything when
    /// any input is empty. Otherwise all tasks run concurrently and this
    /// returns once every one of them has finished; a single failed task
    /// turns the whole dispatch into [`DispatchError::Delivery`].
    pub async fn dispatch(
        &self,
        friends: &[String],
        emails: &[String],
        distribution: &Distribution,
    ) -> Result<DispatchReport, DispatchError> {
        if friends.is_empty() || emails.is_empty() || distribution.is_empty() {
            return Err(DispatchError::MissingData);
        }

        let planned = plan_tasks(friends, emails, distribution);
        let total = planned.len();
        let mut failed = 0;
        let mut tasks = JoinSet::new();

        for task in planned {
            match task {
                Ok(task) => {
                    tasks.spawn(run_task(
                        task,
                        self.sender.clone(),
                        Arc::clone(&self.transport),
                        Arc::clone(&self.renderer),
                    ));
                }
                Err(err) => {
                    tracing::error!("{err}");
                    failed += 1;
                }
            }
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(friend)) => tracing::debug!(friend = %friend, "report delivered"),
                Ok(Err(err)) => {
                    tracing::error!("{err}");
                    failed += 1;
                }
                Err(err) => {
                    tracing::error!("report task did not complete: {err}");
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            tracing::error!("failed to send {failed} of {total} distribution emails");
            return Err(DispatchError::Delivery { failed, total });
        }

        tracing::info!("sent {total} distribution emails");
        Ok(DispatchReport { delivered: total })
    }
}

async fn run_task(
    task: EmailTask,
    sender: String,
    transport: Arc<dyn MailTransport>,
    renderer: Arc<dyn DocumentRenderer>,
) -> Result<String, TaskError> {
    let EmailTask {
        friend,
        email,
        ledger,
    } = task;

    tracing::debug!(friend = %friend, stage = %TaskStage::Formatting, "report task");
    let body = format_report(&friend, &ledger)
        .map_err(|err| TaskError::new(&friend, TaskStage::Formatting, err))?;

    tracing::debug!(friend = %friend, stage = %TaskStage::Rendering, "report task");
    let document = renderer
        .render(&body)
        .map_err(|err| TaskError::new(&friend, TaskStage::Rendering, err))?;

    tracing::debug!(friend = %friend, stage = %TaskStage::Sending, "report task");
    transport
        .send(OutgoingMail {
            to: email,
            from: sender,
            subject: subject_for(&friend),
            body,
            attachment: MailAttachment {
                filename: ATTACHMENT_NAME.to_string(),
                content_type: ATTACHMENT_CONTENT_TYPE.to_string(),
                content: document,
            },
        })
        .await
        .map_err(|err| TaskError::new(&friend, TaskStage::Sending, err))?;

    Ok(friend)
}

/// The builder for `Dispatcher`
#[derive(Default)]
pub struct DispatcherBuilder {
    transport: Option<Arc<dyn MailTransport>>,
    renderer: Option<Arc<dyn DocumentRenderer>>,
    sender: Option<String>,
}

impl DispatcherBuilder {
    /// Pass the required mail transport
    pub fn transport(mut self, transport: Arc<dyn MailTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Override the document renderer (a default [`PdfRenderer`] otherwise)
    pub fn renderer(mut self, renderer: Arc<dyn DocumentRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Pass the required `From` address
    pub fn sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    /// Construct `Dispatcher`
    pub fn build(self) -> Result<Dispatcher, DispatchError> {
        let transport = self
            .transport
            .ok_or_else(|| DispatchError::Config("missing mail transport".to_string()))?;
        let sender = self
            .sender
            .filter(|sender| !sender.trim().is_empty())
            .ok_or_else(|| DispatchError::Config("missing sender address".to_string()))?;

        Ok(Dispatcher {
            transport,
            renderer: self
                .renderer
                .unwrap_or_else(|| Arc::new(PdfRenderer::default())),
            sender,
        })
    }
}
