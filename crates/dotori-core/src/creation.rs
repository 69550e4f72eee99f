use std::cell::RefCell;
use std::future::Future;
use std::rc::Weak;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::error::{ApiError, CreationError};
use crate::model::{NodeId, Tree, TreeNode};
use crate::store::TreeStore;

/// Name given to every freshly created folder ("untitled").
pub const DEFAULT_FOLDER_NAME: &str = "제목없음";

/// Body of a create-folder call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFolderRequest {
    pub parent_id: NodeId,
    pub name: String,
    /// Position among the parent's children; always the end.
    pub index: usize,
}

/// Response of a create-folder call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderCreated {
    pub folder_id: NodeId,
}

/// The remote folder service.
pub trait FolderApi {
    fn create_folder(
        &self,
        request: CreateFolderRequest,
    ) -> impl Future<Output = Result<FolderCreated, ApiError>>;
}

/// Where failed creations get reported.
pub trait ErrorReporter {
    fn report(&self, error: &CreationError);
}

/// Reports through `tracing` at error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, error: &CreationError) {
        error!(%error, "folder creation failed");
    }
}

/// How one creation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Creation {
    /// The folder exists remotely and is now in the tree.
    Committed(NodeId),
    /// Nothing was added to the tree; the error has been reported.
    Failed(CreationError),
    /// The store went away while the request was in flight.
    Abandoned,
}

/// Creates folders remotely and commits them locally once confirmed.
///
/// No node is shown before the folder service answers, so a failure never
/// needs rolling back. Calls for the same parent are not serialized: two
/// quick calls send two requests computed from the same sibling count.
#[derive(Debug, Clone)]
pub struct CreationFlow<R = TracingReporter> {
    default_name: String,
    reporter: R,
}

impl Default for CreationFlow<TracingReporter> {
    fn default() -> Self {
        Self::new()
    }
}

impl CreationFlow<TracingReporter> {
    pub fn new() -> Self {
        Self::with_reporter(TracingReporter)
    }
}

impl<R: ErrorReporter> CreationFlow<R> {
    pub fn with_reporter(reporter: R) -> Self {
        Self {
            default_name: DEFAULT_FOLDER_NAME.to_string(),
            reporter,
        }
    }

    /// Use another name for new folders.
    pub fn with_default_name(mut self, name: impl Into<String>) -> Self {
        self.default_name = name.into();
        self
    }

    /// Build the request appending a folder under `parent_id`.
    pub fn request_for(
        &self,
        tree: &Tree,
        parent_id: &NodeId,
    ) -> Result<CreateFolderRequest, CreationError> {
        match tree.children_len(parent_id) {
            Some(index) => Ok(CreateFolderRequest {
                parent_id: parent_id.clone(),
                name: self.default_name.clone(),
                index,
            }),
            None => {
                let e = CreationError::UnknownParent(parent_id.clone());
                self.reporter.report(&e);
                Err(e)
            }
        }
    }

    /// Apply the folder service's answer to `request`.
    ///
    /// On success the new folder is committed as the parent's last child. On
    /// failure the error is reported and the store is not touched.
    pub fn complete(
        &self,
        store: &mut TreeStore,
        request: &CreateFolderRequest,
        outcome: Result<FolderCreated, ApiError>,
    ) -> Creation {
        let result = outcome.map_err(CreationError::from).and_then(|created| {
            let node = TreeNode::new(created.folder_id.clone(), request.name.clone());
            store.commit_new_node(&request.parent_id, node)?;
            Ok(created.folder_id)
        });

        match result {
            Ok(id) => {
                info!(%id, parent = %request.parent_id, index = request.index, "folder created");
                Creation::Committed(id)
            }
            Err(e) => {
                self.reporter.report(&e);
                Creation::Failed(e)
            }
        }
    }

    /// Create a folder under `parent_id` and commit it once the folder
    /// service confirms.
    ///
    /// The store is only borrowed around the await, never across it, so
    /// other gestures keep working while the request is in flight.
    pub async fn create_folder<A: FolderApi>(
        &self,
        api: &A,
        store: &Weak<RefCell<TreeStore>>,
        parent_id: &NodeId,
    ) -> Creation {
        let request = {
            let Some(store) = store.upgrade() else {
                return Creation::Abandoned;
            };
            let store = store.borrow();
            match self.request_for(store.tree(), parent_id) {
                Ok(request) => request,
                Err(e) => return Creation::Failed(e),
            }
        };

        let outcome = api.create_folder(request.clone()).await;

        let Some(store) = store.upgrade() else {
            debug!(parent = %parent_id, "folder creation finished after the store was dropped");
            return Creation::Abandoned;
        };
        let mut store = store.borrow_mut();
        self.complete(&mut store, &request, outcome)
    }
}
