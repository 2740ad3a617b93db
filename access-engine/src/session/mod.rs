//! Editor sessions
//!
//! A session owns the local state of one editor screen (a role's module
//! assignment, a root's privilege matrix, one module's role privileges).
//! Methods take `&self`; state sits behind a mutex that is never held across
//! an await, and per-kind in-flight guards reject overlapping calls.

mod module_privileges;
mod privilege_matrix;
mod role_access;

pub use module_privileges::{ModulePrivilegeEditor, PrivilegeEntry};
pub use privilege_matrix::{CloseDecision, PrivilegeMatrixSession};
pub use role_access::RoleAccessSession;

use crate::error::{EngineResult, Operation};
use crate::sync::{InFlight, InFlightGuard, SyncClient};
use uuid::Uuid;

/// Per-session bookkeeping shared by every editor
#[derive(Debug)]
pub struct SessionContext {
    sync: SyncClient,
    loading: InFlight,
    saving: InFlight,
    toggling: InFlight,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionContext {
    pub fn new() -> Self {
        Self {
            sync: SyncClient::new(),
            loading: InFlight::new(Operation::Load),
            saving: InFlight::new(Operation::Save),
            toggling: InFlight::new(Operation::Toggle),
        }
    }

    pub fn sync(&self) -> &SyncClient {
        &self.sync
    }

    pub fn session_id(&self) -> Uuid {
        self.sync.session_id()
    }

    pub fn begin_load(&self) -> EngineResult<InFlightGuard<'_>> {
        self.sync.ensure_open()?;
        self.loading.try_begin()
    }

    pub fn begin_save(&self) -> EngineResult<InFlightGuard<'_>> {
        self.sync.ensure_open()?;
        self.saving.try_begin()
    }

    /// Optimistic toggles are guarded apart from explicit saves
    pub fn begin_toggle(&self) -> EngineResult<InFlightGuard<'_>> {
        self.sync.ensure_open()?;
        self.toggling.try_begin()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_busy()
    }

    pub fn is_saving(&self) -> bool {
        self.saving.is_busy()
    }

    pub fn is_toggling(&self) -> bool {
        self.toggling.is_busy()
    }

    pub fn close(&self) {
        self.sync.close();
    }

    pub fn is_closed(&self) -> bool {
        self.sync.is_closed()
    }
}
