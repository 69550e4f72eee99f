use std::sync::mpsc;
use std::thread;

use dotori_core::{
    ApiError, CreateFolderRequest, FetchError, FolderApi, FolderCreated, FolderQuery, Tree,
};
use tracing::debug;

use crate::client::HttpFolderClient;

/// Command sent from the UI thread to the executor thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderCmd {
    FetchTree,
    CreateFolder(CreateFolderRequest),
}

/// Result received from the executor thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderResult {
    TreeFetched(Result<Tree, FetchError>),
    FolderCreated {
        request: CreateFolderRequest,
        outcome: Result<FolderCreated, ApiError>,
    },
}

/// Sender/Receiver pair for communicating with the executor.
pub struct FolderExecutor {
    pub sender: mpsc::Sender<FolderCmd>,
    pub receiver: mpsc::Receiver<FolderResult>,
}

impl FolderExecutor {
    /// Spawn the background executor thread with a tokio runtime.
    pub fn spawn(client: HttpFolderClient) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel::<FolderCmd>();
        let (result_tx, result_rx) = mpsc::channel::<FolderResult>();

        thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("Failed to create tokio runtime");

            rt.block_on(async move {
                while let Ok(cmd) = cmd_rx.recv() {
                    let result = execute(&client, cmd).await;
                    if result_tx.send(result).is_err() {
                        debug!("folder view is gone, dropping executor result");
                        break;
                    }
                }
            });
        });

        Self::from_channels(cmd_tx, result_rx)
    }

    /// Wrap an existing channel pair, e.g. one driven by hand.
    pub fn from_channels(
        sender: mpsc::Sender<FolderCmd>,
        receiver: mpsc::Receiver<FolderResult>,
    ) -> Self {
        Self { sender, receiver }
    }

    /// Send a command (non-blocking).
    pub fn send(&self, cmd: FolderCmd) -> Result<(), mpsc::SendError<FolderCmd>> {
        self.sender.send(cmd)
    }

    /// Try to receive a result (non-blocking).
    pub fn try_recv(&self) -> Option<FolderResult> {
        self.receiver.try_recv().ok()
    }
}

/// Run one command against the folder service.
async fn execute<C: FolderQuery + FolderApi>(client: &C, cmd: FolderCmd) -> FolderResult {
    match cmd {
        FolderCmd::FetchTree => FolderResult::TreeFetched(client.fetch_folder_tree().await),
        FolderCmd::CreateFolder(request) => {
            let outcome = client.create_folder(request.clone()).await;
            FolderResult::FolderCreated { request, outcome }
        }
    }
}
