// Folder Locks
// Serializes resolutions that target the same folder coordinate

use crate::records::FolderCoordinate;

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per folder coordinate.
///
/// Two resolutions of the same folder would otherwise both observe a
/// missing artifact and launch the solver twice. Different folders never
/// contend.
#[derive(Debug, Clone, Default)]
pub struct FolderLocks {
    locks: Arc<Mutex<HashMap<FolderCoordinate, Arc<Mutex<()>>>>>,
}

impl FolderLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `folder`; released when the guard drops
    pub async fn acquire(&self, folder: &FolderCoordinate) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks
                .entry(folder.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    #[tokio::test]
    async fn test_same_folder_is_exclusive() {
        let locks = FolderLocks::new();
        let folder = FolderCoordinate::new("1", "1");

        let guard = locks.acquire(&folder).await;
        let second = tokio::time::timeout(Duration::from_millis(50), locks.acquire(&folder)).await;
        assert!(second.is_err(), "second acquire should wait");

        drop(guard);
        let third = tokio::time::timeout(Duration::from_millis(500), locks.acquire(&folder)).await;
        assert!(third.is_ok());
    }

    #[tokio::test]
    async fn test_different_folders_do_not_contend() {
        let locks = FolderLocks::new();
        let _a = locks.acquire(&FolderCoordinate::new("1", "1")).await;
        let b = tokio::time::timeout(
            Duration::from_millis(500),
            locks.acquire(&FolderCoordinate::new("1", "2")),
        )
        .await;
        assert!(b.is_ok());
    }
}
