pub mod creation;
pub mod error;
pub mod interaction;
pub mod model;
pub mod query;
pub mod render;
pub mod snapshot;
pub mod store;

pub use creation::{
    CreateFolderRequest, Creation, CreationFlow, DEFAULT_FOLDER_NAME, ErrorReporter, FolderApi,
    FolderCreated, TracingReporter,
};
pub use error::{ApiError, CreationError, FetchError, TreeError};
pub use interaction::{ColumnSpan, Gesture, GestureTarget, Intent, RowHit};
pub use model::{NodeId, Tree, TreeNode};
pub use query::FolderQuery;
pub use render::{TreeItemHandler, VisibleRow};
pub use snapshot::TreeSnapshot;
pub use store::TreeStore;
