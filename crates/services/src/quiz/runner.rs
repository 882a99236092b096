use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::session::{PendingAdvance, QuizSession};
use crate::error::QuizError;

enum Command {
    Start,
    Restart,
    Submit {
        choice: bool,
        reply: oneshot::Sender<Result<bool, QuizError>>,
    },
    Advance(PendingAdvance),
}

/// Cloneable input side of a running quiz.
#[derive(Clone)]
pub struct QuizHandle {
    commands: mpsc::UnboundedSender<Command>,
}

impl QuizHandle {
    /// # Errors
    ///
    /// Returns `QuizError::RunnerStopped` if the runner task has ended.
    pub fn start(&self) -> Result<(), QuizError> {
        self.send(Command::Start)
    }

    /// # Errors
    ///
    /// Returns `QuizError::RunnerStopped` if the runner task has ended.
    pub fn restart(&self) -> Result<(), QuizError> {
        self.send(Command::Restart)
    }

    /// Answer the pending question; resolves to whether it was correct.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoActiveQuestion` if nothing is awaiting an answer,
    /// or `QuizError::RunnerStopped` if the runner task has ended.
    pub async fn submit_answer(&self, choice: bool) -> Result<bool, QuizError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Submit { choice, reply })?;
        rx.await.map_err(|_| QuizError::RunnerStopped)?
    }

    fn send(&self, command: Command) -> Result<(), QuizError> {
        self.commands
            .send(command)
            .map_err(|_| QuizError::RunnerStopped)
    }
}

/// Drives a `QuizSession` on its own task.
///
/// Inputs and dwell timers share one queue, so the session handles exactly
/// one event at a time. The post-answer dwell is a spawned sleep that is
/// aborted on restart; a stale `Advance` that was already queued is rejected
/// by the session's ticket check.
pub struct QuizRunner {
    session: QuizSession,
    answer_dwell: Duration,
    commands: mpsc::UnboundedReceiver<Command>,
    loopback: mpsc::WeakUnboundedSender<Command>,
    pending: Option<(PendingAdvance, JoinHandle<()>)>,
}

impl QuizRunner {
    /// Spawn the runner. The task ends once every `QuizHandle` is dropped and
    /// yields the session back.
    #[must_use]
    pub fn spawn(session: QuizSession, answer_dwell: Duration) -> (QuizHandle, JoinHandle<QuizSession>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let runner = Self {
            session,
            answer_dwell,
            commands: rx,
            loopback: tx.downgrade(),
            pending: None,
        };
        let task = tokio::spawn(runner.run());
        (QuizHandle { commands: tx }, task)
    }

    async fn run(mut self) -> QuizSession {
        while let Some(command) = self.commands.recv().await {
            self.handle(command).await;
        }
        self.cancel_pending();
        log::debug!("quiz runner stopped");
        self.session
    }

    async fn handle(&mut self, command: Command) {
        match command {
            Command::Start => {
                self.cancel_pending();
                if let Err(err) = self.session.start().await {
                    log::debug!("round did not start: {err}");
                }
            }
            Command::Restart => {
                self.cancel_pending();
                if let Err(err) = self.session.restart().await {
                    log::debug!("round did not restart: {err}");
                }
            }
            Command::Submit { choice, reply } => {
                let outcome = self.session.submit_answer(choice).map(|answered| {
                    self.schedule_advance(answered.advance);
                    answered.is_correct
                });
                if reply.send(outcome).is_err() {
                    log::debug!("answer caller went away");
                }
            }
            Command::Advance(pending) => {
                if self.pending.as_ref().is_some_and(|(p, _)| *p == pending) {
                    self.pending = None;
                }
                if let Err(err) = self.session.advance(pending).await {
                    log::debug!("advance failed: {err}");
                }
            }
        }
    }

    fn schedule_advance(&mut self, pending: PendingAdvance) {
        self.cancel_pending();
        let loopback = self.loopback.clone();
        let dwell = self.answer_dwell;
        let task = tokio::spawn(async move {
            tokio::time::sleep(dwell).await;
            let Some(commands) = loopback.upgrade() else {
                log::debug!("runner gone before advance {pending:?}");
                return;
            };
            if commands.send(Command::Advance(pending)).is_err() {
                log::debug!("runner stopped before advance {pending:?}");
            }
        });
        self.pending = Some((pending, task));
    }

    fn cancel_pending(&mut self) {
        if let Some((pending, task)) = self.pending.take() {
            log::debug!("cancelling scheduled advance {pending:?}");
            task.abort();
        }
    }
}
