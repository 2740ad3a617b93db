//! Privilege matrix editor
//!
//! Shows one row of four flags per module under a hierarchy root. The tree
//! and the matrix are independent reads and are fetched concurrently. Saves
//! go out as a full replacement and only re-baseline the change detector once
//! the backend accepts them.

use super::SessionContext;
use crate::backend::{AccessBackend, accepted};
use crate::config::EngineConfig;
use crate::diff::{self, FlagsSnapshot};
use crate::error::{EngineResult, Operation};
use crate::privileges;
use crate::sync::InFlight;
use crate::tree::ModuleTree;
use crate::validation::{MAX_NAME_LEN, validate_required_text};
use parking_lot::Mutex;
use shared::ModuleId;
use shared::models::{CatalogCreate, PrivilegeFlags, PrivilegeKind, PrivilegeSaveRow};
use std::sync::Arc;
use uuid::Uuid;

/// What closing the editor should do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDecision {
    /// Nothing unsaved, close right away
    Close,
    /// Unsaved edits exist; ask before discarding them
    ConfirmDiscard,
}

#[derive(Debug, Default)]
struct MatrixState {
    tree: ModuleTree,
    baseline: FlagsSnapshot,
}

pub struct PrivilegeMatrixSession<B: ?Sized> {
    backend: Arc<B>,
    root_id: ModuleId,
    config: EngineConfig,
    ctx: SessionContext,
    provisioning: InFlight,
    state: Mutex<MatrixState>,
}

impl<B: AccessBackend + ?Sized> PrivilegeMatrixSession<B> {
    pub async fn open(
        backend: Arc<B>,
        root_id: ModuleId,
        config: EngineConfig,
    ) -> EngineResult<Self> {
        let session = Self {
            backend,
            root_id,
            config,
            ctx: SessionContext::new(),
            provisioning: InFlight::new(Operation::CreateCatalog),
            state: Mutex::new(MatrixState::default()),
        };
        session.reload().await?;
        Ok(session)
    }

    /// Fetch tree and matrix concurrently and rebuild the view
    ///
    /// If either read fails nothing is replaced.
    pub async fn reload(&self) -> EngineResult<()> {
        let _loading = self.ctx.begin_load()?;
        let reads = async {
            tokio::try_join!(
                self.backend
                    .fetch_tree(Some(self.root_id), self.config.include_inactive),
                self.backend.fetch_privilege_matrix(self.root_id),
            )
        };
        let (nodes, matrix) = self.ctx.sync().fetch(Operation::Load, reads).await?;

        let mut tree = ModuleTree::build_anchored(nodes, self.root_id)?;
        privileges::apply_to_tree(&mut tree, &privileges::flags_by_module(&matrix));
        let baseline = diff::snapshot(&tree);

        tracing::info!(
            session_id = %self.ctx.session_id(),
            root_id = self.root_id,
            modules = tree.len(),
            matrix_entries = matrix.len(),
            "Privilege matrix loaded"
        );
        *self.state.lock() = MatrixState { tree, baseline };
        Ok(())
    }

    pub fn root_id(&self) -> ModuleId {
        self.root_id
    }

    pub fn session_id(&self) -> Uuid {
        self.ctx.session_id()
    }

    pub fn is_loading(&self) -> bool {
        self.ctx.is_loading()
    }

    pub fn is_saving(&self) -> bool {
        self.ctx.is_saving()
    }

    pub fn with_tree<R>(&self, read: impl FnOnce(&ModuleTree) -> R) -> R {
        read(&self.state.lock().tree)
    }

    pub fn flags(&self, module_id: ModuleId) -> EngineResult<PrivilegeFlags> {
        Ok(self.state.lock().tree.find(module_id)?.flags())
    }

    pub fn toggle_flag(
        &self,
        module_id: ModuleId,
        kind: PrivilegeKind,
        value: bool,
    ) -> EngineResult<()> {
        self.ctx.sync().ensure_open()?;
        self.state.lock().tree.set_flag(module_id, kind, value)
    }

    pub fn set_flags(&self, module_id: ModuleId, flags: PrivilegeFlags) -> EngineResult<()> {
        self.ctx.sync().ensure_open()?;
        self.state.lock().tree.set_flags(module_id, flags)
    }

    pub fn has_unsaved_changes(&self) -> bool {
        let state = self.state.lock();
        diff::has_changes(&state.tree, &state.baseline)
    }

    /// Modules whose flags differ from the last loaded or saved state
    pub fn changed_modules(&self) -> Vec<ModuleId> {
        let state = self.state.lock();
        diff::snapshot(&state.tree).changed_since(&state.baseline)
    }

    /// Rows a save would send
    pub fn save_rows(&self) -> Vec<PrivilegeSaveRow> {
        privileges::build_save_rows(&self.state.lock().tree)
    }

    /// Send every module's flags; the baseline moves only on success
    pub async fn save(&self) -> EngineResult<()> {
        let _saving = self.ctx.begin_save()?;
        let (rows, sent) = {
            let state = self.state.lock();
            (
                privileges::build_save_rows(&state.tree),
                diff::snapshot(&state.tree),
            )
        };
        let changed = sent.changed_since(&self.state.lock().baseline).len();

        let call = async {
            accepted(
                self.backend
                    .save_privilege_matrix(self.root_id, &rows)
                    .await?,
            )
        };
        self.ctx
            .sync()
            .commit_then_confirm(Operation::Save, call, |_| {
                self.state.lock().baseline = sent.clone();
            })
            .await?;

        tracing::info!(
            session_id = %self.ctx.session_id(),
            root_id = self.root_id,
            rows = rows.len(),
            changed,
            "Privilege matrix saved"
        );
        Ok(())
    }

    /// Provision a default catalog on a module, then reload the matrix
    pub async fn create_catalog(&self, module_id: ModuleId, name: &str) -> EngineResult<()> {
        validate_required_text(name, "catalog name", MAX_NAME_LEN)?;
        self.state.lock().tree.find(module_id)?;
        let _provisioning = self.provisioning.try_begin()?;

        let catalog = CatalogCreate {
            name: name.trim().to_string(),
            actions: self.config.catalog_actions.clone(),
            active: self.config.catalog_active,
        };
        self.ctx
            .sync()
            .fetch(
                Operation::CreateCatalog,
                async {
                    accepted(
                        self.backend
                            .create_privilege_catalog(module_id, &catalog)
                            .await?,
                    )
                },
            )
            .await?;

        tracing::info!(
            session_id = %self.ctx.session_id(),
            module_id,
            catalog = %catalog.name,
            "Privilege catalog created"
        );
        self.reload().await
    }

    /// Whether the editor can close without asking
    pub fn request_close(&self) -> CloseDecision {
        if self.has_unsaved_changes() {
            CloseDecision::ConfirmDiscard
        } else {
            CloseDecision::Close
        }
    }

    /// Close, discarding unsaved edits and any late results
    pub fn close(&self) {
        self.ctx.close();
    }

    pub fn is_closed(&self) -> bool {
        self.ctx.is_closed()
    }
}
