use crate::error::RemoteError;
use crate::protocol::{Patch, Settings};
use async_trait::async_trait;

/// The device's REST surface. Records are addressed by position only.
#[async_trait]
pub trait PatchRemote: Send + Sync {
    async fn list(&self) -> Result<Vec<Patch>, RemoteError>;

    /// Appends; the device picks the position (end of list).
    async fn create(&self, patch: &Patch) -> Result<(), RemoteError>;

    async fn update_at(&self, index: usize, patch: &Patch) -> Result<(), RemoteError>;

    /// Later records shift down by one.
    async fn delete_at(&self, index: usize) -> Result<(), RemoteError>;

    /// Replaces the whole stored order with `patches`.
    async fn reorder(&self, patches: &[Patch]) -> Result<(), RemoteError>;

    async fn get_settings(&self) -> Result<Settings, RemoteError>;

    async fn set_settings(&self, settings: &Settings) -> Result<(), RemoteError>;
}

#[async_trait]
impl<R: PatchRemote + ?Sized> PatchRemote for std::sync::Arc<R> {
    async fn list(&self) -> Result<Vec<Patch>, RemoteError> {
        (**self).list().await
    }

    async fn create(&self, patch: &Patch) -> Result<(), RemoteError> {
        (**self).create(patch).await
    }

    async fn update_at(&self, index: usize, patch: &Patch) -> Result<(), RemoteError> {
        (**self).update_at(index, patch).await
    }

    async fn delete_at(&self, index: usize) -> Result<(), RemoteError> {
        (**self).delete_at(index).await
    }

    async fn reorder(&self, patches: &[Patch]) -> Result<(), RemoteError> {
        (**self).reorder(patches).await
    }

    async fn get_settings(&self) -> Result<Settings, RemoteError> {
        (**self).get_settings().await
    }

    async fn set_settings(&self, settings: &Settings) -> Result<(), RemoteError> {
        (**self).set_settings(settings).await
    }
}
