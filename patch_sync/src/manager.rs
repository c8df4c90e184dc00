use std::sync::Arc;

use crate::error::{RemoteError, SyncError};
use crate::model::{self, FieldEdit};
use crate::notify::{Notification, NotificationSink};
use crate::protocol::Settings;
use crate::remote::PatchRemote;
use crate::reorder::{self, DragSession, DragState};
use crate::state::{Checkpoint, PatchList, Snapshot};

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this patch?";

/// Asks the user before something destructive happens.
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Owns the local patch list and runs every intent as
/// optimistic-update-then-confirm against the device.
///
/// Indices taken by the public methods are view indices (blank slots
/// skipped); they are resolved to device positions before anything is
/// touched.
pub struct CollectionManager<R> {
    remote: R,
    list: PatchList,
    drag: DragSession,
    settings: Option<Settings>,
    sink: Arc<dyn NotificationSink>,
}

impl<R: PatchRemote> CollectionManager<R> {
    pub fn new(remote: R, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            remote,
            list: PatchList::new(),
            drag: DragSession::default(),
            settings: None,
            sink,
        }
    }

    pub fn list(&self) -> &PatchList {
        &self.list
    }

    pub fn snapshot(&self) -> Snapshot {
        self.list.snapshot()
    }

    pub fn settings(&self) -> Option<Settings> {
        self.settings
    }

    pub fn drag_state(&self) -> DragState {
        self.drag.state()
    }

    pub async fn load(&mut self) -> Result<(), SyncError> {
        match self.remote.list().await {
            Ok(patches) => {
                tracing::debug!(count = patches.len(), "patches loaded");
                self.list.reconcile(patches);
                Ok(())
            }
            Err(e) => Err(self.remote_failed("Error loading patches", e)),
        }
    }

    pub async fn create(&mut self, name: &str, tempo: i32) -> Result<(), SyncError> {
        let patch = match model::validate(name, tempo) {
            Ok(p) => p,
            Err(e) => return Err(self.rejected(e.into())),
        };

        if let Err(e) = self.remote.create(&patch).await {
            return Err(self.remote_failed("Error creating patch", e));
        }

        // Position is assigned by the device; only a reload shows where.
        if let Err(e) = self.load().await {
            tracing::warn!(error = %e, "reload after create failed");
        }
        tracing::info!(name = %patch.name, tempo = patch.tempo, "patch created");
        self.sink.notify(Notification::success("Patch created"));
        Ok(())
    }

    pub async fn update_field(&mut self, index: usize, edit: FieldEdit) -> Result<(), SyncError> {
        let raw = self.resolve(index)?;
        if let Err(e) = edit.validate() {
            return Err(self.rejected(e.into()));
        }

        let checkpoint = self
            .list
            .apply_optimistic(|entries| edit.apply(&mut entries[raw].patch));
        let patch = self.list.entries()[raw].patch.clone();

        match self.remote.update_at(raw, &patch).await {
            Ok(()) => {
                self.list.confirm();
                tracing::info!(index = raw, ?edit, "patch updated");
                self.sink.notify(Notification::success("Patch updated"));
                Ok(())
            }
            Err(e) => {
                let err = self.remote_failed("Error updating patch", e);
                self.restore(checkpoint).await;
                Err(err)
            }
        }
    }

    /// Fails, and notifies, when `index` names no visible patch.
    pub fn check_index(&self, index: usize) -> Result<(), SyncError> {
        self.resolve(index).map(|_| ())
    }

    /// Returns `Ok(false)` when the user declined.
    pub async fn delete(&mut self, index: usize, confirm: &dyn Confirm) -> Result<bool, SyncError> {
        self.resolve(index)?;
        if !confirm.confirm(DELETE_PROMPT) {
            tracing::debug!(index, "delete declined");
            return Ok(false);
        }
        self.delete_confirmed(index).await.map(|_| true)
    }

    /// Deletes without asking; the caller already obtained confirmation.
    pub async fn delete_confirmed(&mut self, index: usize) -> Result<(), SyncError> {
        let raw = self.resolve(index)?;

        if let Err(e) = self.remote.delete_at(raw).await {
            return Err(self.remote_failed("Error deleting patch", e));
        }

        // Later slots shift on the device; reload rather than guess.
        if let Err(e) = self.load().await {
            tracing::warn!(error = %e, "reload after delete failed");
        }
        tracing::info!(index = raw, "patch deleted");
        self.sink.notify(Notification::success("Patch deleted"));
        Ok(())
    }

    pub fn drag_start(&mut self, index: usize) {
        self.drag.start(index);
    }

    pub fn drag_cancel(&mut self) {
        self.drag.cancel();
    }

    pub async fn drop_on(&mut self, target: usize) -> Result<(), SyncError> {
        match self.drag.drop_on(target) {
            Some((from, to)) => self.reorder(from, to).await,
            None => Ok(()),
        }
    }

    pub async fn reorder(&mut self, from: usize, to: usize) -> Result<(), SyncError> {
        let planned = match reorder::plan_move(&self.list, from, to) {
            Ok(p) => p,
            Err(e) => {
                self.drag.finish();
                return Err(self.rejected(e));
            }
        };
        let Some(mv) = planned else {
            self.drag.finish();
            return Ok(());
        };

        self.drag.begin_commit(from, to);
        let checkpoint = self
            .list
            .apply_optimistic(|entries| reorder::move_item(entries, mv.from, mv.to));
        let patches = self.list.patches();

        let result = match self.remote.reorder(&patches).await {
            Ok(()) => {
                self.list.confirm();
                tracing::info!(from = mv.from, to = mv.to, "patches reordered");
                self.sink.notify(Notification::success("Patches reordered"));
                Ok(())
            }
            Err(e) => {
                let err = self.remote_failed("Error reordering patches", e);
                self.drag.reloading();
                self.restore(checkpoint).await;
                Err(err)
            }
        };
        self.drag.finish();
        result
    }

    pub async fn load_settings(&mut self) -> Result<Settings, SyncError> {
        match self.remote.get_settings().await {
            Ok(s) => {
                self.settings = Some(s);
                Ok(s)
            }
            Err(e) => Err(self.remote_failed("Error loading settings", e)),
        }
    }

    pub async fn save_settings(&mut self, settings: Settings) -> Result<(), SyncError> {
        if let Err(e) = model::validate_settings(&settings) {
            return Err(self.rejected(e.into()));
        }
        match self.remote.set_settings(&settings).await {
            Ok(()) => {
                self.settings = Some(settings);
                tracing::info!(brightness = settings.brightness, "settings saved");
                self.sink.notify(Notification::success("Settings saved"));
                Ok(())
            }
            Err(e) => Err(self.remote_failed("Error saving settings", e)),
        }
    }

    fn resolve(&self, index: usize) -> Result<usize, SyncError> {
        self.list.raw_index(index).ok_or_else(|| {
            self.rejected(SyncError::IndexOutOfRange {
                index,
                len: self.list.view_len(),
            })
        })
    }

    /// Drops an unconfirmed optimistic change: reload from the device, or,
    /// if the device cannot be reached either, put the checkpoint back.
    async fn restore(&mut self, checkpoint: Checkpoint) {
        if self.load().await.is_err() {
            tracing::warn!("reload failed, restoring last confirmed list");
            self.list.rollback(checkpoint);
        }
    }

    fn rejected(&self, err: SyncError) -> SyncError {
        self.sink.notify(Notification::error(err.to_string()));
        err
    }

    fn remote_failed(&self, context: &str, err: RemoteError) -> SyncError {
        tracing::warn!(error = %err, "{context}");
        self.sink.notify(Notification::error(format!("{context}: {err}")));
        err.into()
    }
}
