mod alert_actor;
mod sync_actor;

pub use alert_actor::{AlertActor, BudgetAlert};
pub use sync_actor::SyncActor;

use tokio::sync::oneshot;
use tokio::task::{JoinError, JoinHandle};

/// Owns a spawned observer task.
pub struct ActorHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>
}

impl ActorHandle {
    fn new(shutdown: oneshot::Sender<()>, task: JoinHandle<()>) -> Self {
        Self { shutdown, task }
    }

    /// Signals the task to stop and waits for it to finish.
    pub async fn despawn(self) -> Result<(), JoinError> {
        //NOTE: The task may already have stopped because its source channel closed, so a failed send is fine.
        let _ = self.shutdown.send(());
        self.task.await
    }
}
