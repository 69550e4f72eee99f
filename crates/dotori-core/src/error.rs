use thiserror::Error;

use crate::model::NodeId;

/// A tree shape violation, either in a fetched snapshot or in a commit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("root node '{0}' is missing")]
    MissingRoot(NodeId),

    #[error("item keyed '{key}' carries id '{id}'")]
    KeyMismatch { key: String, id: NodeId },

    #[error("node '{parent}' lists unknown child '{child}'")]
    DanglingChild { parent: NodeId, child: NodeId },

    /// Listed twice in one children list, or under two parents.
    #[error("node '{0}' is listed as a child more than once")]
    DuplicateChild(NodeId),

    #[error("root node '{0}' is listed as a child")]
    RootAsChild(NodeId),

    #[error("node '{0}' is its own ancestor")]
    Cycle(NodeId),

    #[error("parent node '{0}' does not exist")]
    UnknownParent(NodeId),

    #[error("node '{0}' already exists")]
    DuplicateId(NodeId),

    #[error("new node '{0}' must not have children")]
    PopulatedNode(NodeId),
}

/// Failure talking to the remote folder service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),

    #[error("server responded {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode response: {0}")]
    Decode(String),
}

/// Failure of one folder creation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreationError {
    #[error("cannot create a folder under unknown parent '{0}'")]
    UnknownParent(NodeId),

    #[error("remote folder API failed: {0}")]
    Api(#[from] ApiError),

    #[error("could not commit new folder: {0}")]
    Commit(#[from] TreeError),
}

/// Failure of the initial folder tree fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("invalid folder tree: {0}")]
    Invalid(#[from] TreeError),
}
