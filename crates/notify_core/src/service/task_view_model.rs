//! UI-facing adapter over the shared task store.
//!
//! # Responsibility
//! - Expose the live task list as a synchronously readable value.
//! - Turn add/update/delete calls into fire-and-forget background work.
//!
//! # Invariants
//! - Mutation methods never block and never report errors to the caller;
//!   failures are logged and dropped.
//! - Mutations from one view-model are applied in call order.
//! - Dropping the view-model cancels its worker; the store lives on.

use crate::model::task::Task;
use crate::service::task_store::{StoreResult, TaskSnapshot, TaskStore, TaskSubscription};
use log::{error, warn};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

#[derive(Debug)]
enum Mutation {
    Add(Task),
    Update(Task),
    Delete(Task),
}

impl Mutation {
    fn op_name(&self) -> &'static str {
        match self {
            Self::Add(_) => "add",
            Self::Update(_) => "update",
            Self::Delete(_) => "delete",
        }
    }

    fn apply(&self, store: &TaskStore) -> StoreResult<()> {
        match self {
            Self::Add(task) | Self::Update(task) => store.upsert(task).map(|_| ()),
            Self::Delete(task) => store.delete(task).map(|_| ()),
        }
    }
}

enum Command {
    Apply(Mutation),
    /// Acknowledged once every earlier command has been processed.
    Barrier(oneshot::Sender<()>),
}

/// View-model for task list screens.
pub struct TaskViewModel {
    store: Arc<TaskStore>,
    commands: mpsc::UnboundedSender<Command>,
    worker: JoinHandle<()>,
}

impl TaskViewModel {
    /// Binds a view-model to a shared store; background work runs on `runtime`.
    pub fn new(store: Arc<TaskStore>, runtime: &Handle) -> Self {
        let (commands, receiver) = mpsc::unbounded_channel();
        let worker = runtime.spawn(run_worker(Arc::clone(&store), receiver));
        Self {
            store,
            commands,
            worker,
        }
    }

    /// Current task list. Empty until the first task exists.
    pub fn tasks(&self) -> TaskSnapshot {
        self.store.snapshot()
    }

    /// Fresh receiver for UI refresh loops.
    pub fn subscribe(&self) -> TaskSubscription {
        self.store.subscribe()
    }

    /// Persists a new task (or replaces one with the same id).
    pub fn add(&self, task: Task) {
        self.enqueue(Mutation::Add(task));
    }

    /// Saves edited title/description.
    ///
    /// Create-or-replace by id: an edit to a task that was never saved (or
    /// whose row is gone) creates the row instead of being lost.
    pub fn update(&self, task: Task) {
        self.enqueue(Mutation::Update(task));
    }

    /// Removes the stored row with the task's id; unknown ids are a no-op.
    pub fn delete(&self, task: Task) {
        self.enqueue(Mutation::Delete(task));
    }

    /// Resolves after every mutation requested before this call finished.
    ///
    /// Returns immediately when the worker is no longer running.
    pub async fn settled(&self) {
        let (done, wait) = oneshot::channel();
        if self.commands.send(Command::Barrier(done)).is_err() {
            return;
        }
        let _ = wait.await;
    }

    fn enqueue(&self, mutation: Mutation) {
        let op = mutation.op_name();
        if self.commands.send(Command::Apply(mutation)).is_err() {
            warn!("event=task_mutation module=view_model status=dropped op={op} reason=worker_stopped");
        }
    }
}

impl Drop for TaskViewModel {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

async fn run_worker(store: Arc<TaskStore>, mut commands: mpsc::UnboundedReceiver<Command>) {
    while let Some(command) = commands.recv().await {
        match command {
            Command::Barrier(done) => {
                let _ = done.send(());
            }
            Command::Apply(mutation) => {
                let op = mutation.op_name();
                let store = Arc::clone(&store);
                match tokio::task::spawn_blocking(move || mutation.apply(&store)).await {
                    Ok(Ok(())) => {}
                    Ok(Err(err)) => warn!(
                        "event=task_mutation module=view_model status=dropped op={op} error={err}"
                    ),
                    Err(err) => error!(
                        "event=task_mutation module=view_model status=error op={op} error_code=join_failed error={err}"
                    ),
                }
            }
        }
    }
}
