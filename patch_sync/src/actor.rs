//! Single-flight intent queue.
//!
//! One task owns the [`CollectionManager`]; every [`PatchConsole`] clone
//! sends intents over a bounded channel and waits on a oneshot reply. The
//! task handles one intent at a time, so at most one remote mutation is in
//! flight and confirmations settle in the order intents were sent.

use tokio::sync::{mpsc, oneshot};

use crate::error::SyncError;
use crate::manager::{CollectionManager, Confirm, DELETE_PROMPT};
use crate::model::FieldEdit;
use crate::protocol::Settings;
use crate::reorder::DragState;
use crate::remote::PatchRemote;
use crate::state::Snapshot;

type Reply<T> = oneshot::Sender<Result<T, SyncError>>;

pub enum Intent {
    Load(Reply<()>),
    Create {
        name: String,
        tempo: i32,
        reply: Reply<()>,
    },
    UpdateField {
        index: usize,
        edit: FieldEdit,
        reply: Reply<()>,
    },
    CheckIndex {
        index: usize,
        reply: Reply<()>,
    },
    Delete {
        index: usize,
        reply: Reply<()>,
    },
    Reorder {
        from: usize,
        to: usize,
        reply: Reply<()>,
    },
    DragStart {
        index: usize,
        reply: Reply<()>,
    },
    DragCancel(Reply<()>),
    Drop {
        target: usize,
        reply: Reply<()>,
    },
    LoadSettings(Reply<Settings>),
    SaveSettings {
        settings: Settings,
        reply: Reply<()>,
    },
    Snapshot(Reply<Snapshot>),
    DragState(Reply<DragState>),
}

#[derive(Clone)]
pub struct PatchConsole {
    tx: mpsc::Sender<Intent>,
}

impl PatchConsole {
    /// Spawns the owning task on the current tokio runtime.
    pub fn spawn<R>(manager: CollectionManager<R>, queue_cap: usize) -> Self
    where
        R: PatchRemote + 'static,
    {
        let (tx, rx) = mpsc::channel(queue_cap.max(1));
        tokio::spawn(run(rx, manager));
        Self { tx }
    }

    async fn request<T>(&self, make: impl FnOnce(Reply<T>) -> Intent) -> Result<T, SyncError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| SyncError::ConsoleClosed)?;
        rx.await.map_err(|_| SyncError::ConsoleClosed)?
    }

    pub async fn load(&self) -> Result<(), SyncError> {
        self.request(Intent::Load).await
    }

    pub async fn create(&self, name: impl Into<String>, tempo: i32) -> Result<(), SyncError> {
        let name = name.into();
        self.request(|reply| Intent::Create { name, tempo, reply })
            .await
    }

    pub async fn update_field(&self, index: usize, edit: FieldEdit) -> Result<(), SyncError> {
        self.request(|reply| Intent::UpdateField { index, edit, reply })
            .await
    }

    /// Confirmation is asked here, on the caller's side, so the owning task
    /// never waits on the user. The index is checked first so nobody is asked
    /// about a row that is not there. Returns `Ok(false)` when declined.
    pub async fn delete(&self, index: usize, confirm: &dyn Confirm) -> Result<bool, SyncError> {
        self.request(|reply| Intent::CheckIndex { index, reply })
            .await?;
        if !confirm.confirm(DELETE_PROMPT) {
            return Ok(false);
        }
        self.request(|reply| Intent::Delete { index, reply })
            .await
            .map(|_| true)
    }

    pub async fn reorder(&self, from: usize, to: usize) -> Result<(), SyncError> {
        self.request(|reply| Intent::Reorder { from, to, reply })
            .await
    }

    pub async fn drag_start(&self, index: usize) -> Result<(), SyncError> {
        self.request(|reply| Intent::DragStart { index, reply })
            .await
    }

    pub async fn drag_cancel(&self) -> Result<(), SyncError> {
        self.request(Intent::DragCancel).await
    }

    pub async fn drop_on(&self, target: usize) -> Result<(), SyncError> {
        self.request(|reply| Intent::Drop { target, reply }).await
    }

    pub async fn load_settings(&self) -> Result<Settings, SyncError> {
        self.request(Intent::LoadSettings).await
    }

    pub async fn save_settings(&self, settings: Settings) -> Result<(), SyncError> {
        self.request(|reply| Intent::SaveSettings { settings, reply })
            .await
    }

    pub async fn snapshot(&self) -> Result<Snapshot, SyncError> {
        self.request(Intent::Snapshot).await
    }

    pub async fn drag_state(&self) -> Result<DragState, SyncError> {
        self.request(Intent::DragState).await
    }
}

pub async fn run<R: PatchRemote>(mut rx: mpsc::Receiver<Intent>, mut manager: CollectionManager<R>) {
    while let Some(intent) = rx.recv().await {
        match intent {
            Intent::Load(reply) => {
                let _ = reply.send(manager.load().await);
            }
            Intent::Create { name, tempo, reply } => {
                let _ = reply.send(manager.create(&name, tempo).await);
            }
            Intent::UpdateField { index, edit, reply } => {
                let _ = reply.send(manager.update_field(index, edit).await);
            }
            Intent::CheckIndex { index, reply } => {
                let _ = reply.send(manager.check_index(index));
            }
            Intent::Delete { index, reply } => {
                let _ = reply.send(manager.delete_confirmed(index).await);
            }
            Intent::Reorder { from, to, reply } => {
                let _ = reply.send(manager.reorder(from, to).await);
            }
            Intent::DragStart { index, reply } => {
                manager.drag_start(index);
                let _ = reply.send(Ok(()));
            }
            Intent::DragCancel(reply) => {
                manager.drag_cancel();
                let _ = reply.send(Ok(()));
            }
            Intent::Drop { target, reply } => {
                let _ = reply.send(manager.drop_on(target).await);
            }
            Intent::LoadSettings(reply) => {
                let _ = reply.send(manager.load_settings().await);
            }
            Intent::SaveSettings { settings, reply } => {
                let _ = reply.send(manager.save_settings(settings).await);
            }
            Intent::Snapshot(reply) => {
                let _ = reply.send(Ok(manager.snapshot()));
            }
            Intent::DragState(reply) => {
                let _ = reply.send(Ok(manager.drag_state()));
            }
        }
    }
    tracing::debug!("patch console closed");
}
