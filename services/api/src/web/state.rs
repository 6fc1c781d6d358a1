//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::adapters::{InMemoryFileTransfer, ToastAdapter};
use crate::config::Config;
use portal_core::ports::{FileTransferService, KeyValueStore, PasswordHasher, PortResult};
use portal_core::Portal;
use std::sync::Arc;
use tokio::sync::Mutex;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
///
/// The portal sits behind a single mutex, so requests touch the stores one at
/// a time in arrival order.
pub struct AppState {
    pub config: Arc<Config>,
    pub portal: Mutex<Portal>,
    pub files: Arc<dyn FileTransferService>,
    pub toasts: Arc<ToastAdapter>,
}

impl AppState {
    /// Loads the portal from `kv` and wires the in-process adapters around it.
    pub async fn initialize(
        config: Arc<Config>,
        kv: Arc<dyn KeyValueStore>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> PortResult<Self> {
        let toasts = Arc::new(ToastAdapter::new(config.toast_ttl));
        let files: Arc<dyn FileTransferService> =
            Arc::new(InMemoryFileTransfer::new(config.transfer_delay));
        let portal = Portal::init(kv, hasher, toasts.clone()).await?;

        Ok(Self {
            config,
            portal: Mutex::new(portal),
            files,
            toasts,
        })
    }
}
