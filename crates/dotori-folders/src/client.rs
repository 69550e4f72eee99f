use dotori_core::{
    ApiError, CreateFolderRequest, FetchError, FolderApi, FolderCreated, FolderQuery, Tree,
    TreeSnapshot,
};
use serde::de::DeserializeOwned;

/// Path of the folder collection, relative to the API base URL.
const FOLDERS_PATH: &str = "/folder";

/// Folder service client over HTTP + JSON.
#[derive(Debug, Clone)]
pub struct HttpFolderClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFolderClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn folders_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), FOLDERS_PATH)
    }
}

impl FolderQuery for HttpFolderClient {
    async fn fetch_folder_tree(&self) -> Result<Tree, FetchError> {
        let response = self
            .client
            .get(self.folders_url())
            .send()
            .await
            .map_err(network)?;
        let snapshot: TreeSnapshot = read_json(response).await?;
        Ok(Tree::try_from(snapshot)?)
    }
}

impl FolderApi for HttpFolderClient {
    async fn create_folder(&self, request: CreateFolderRequest) -> Result<FolderCreated, ApiError> {
        let response = self
            .client
            .post(self.folders_url())
            .json(&request)
            .send()
            .await
            .map_err(network)?;
        read_json(response).await
    }
}

fn network(e: reqwest::Error) -> ApiError {
    ApiError::Network(e.to_string())
}

/// Decode a JSON body, turning non-2xx answers into [`ApiError::Status`].
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|e| ApiError::Network(format!("Failed to read response body: {e}")))?;

    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            body: String::from_utf8_lossy(&bytes).to_string(),
        });
    }

    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
}
