use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use futures::StreamExt;
use isolator_core::{
    CreateProfileRequest, ErrorBody, ImportReceipt, Profile, ProfileArchive, ProfileList,
    ProfileStatusReport,
};
use reqwest::{multipart, Client, Response};
use serde::de::DeserializeOwned;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::error::ApiError;

mod encoding;

pub use encoding::encode_path_segment;

/// The REST contract of the sandbox backend.
#[async_trait::async_trait]
pub trait ProfilesBackend: Send + Sync + 'static {
    async fn list_profiles(&self) -> Result<Vec<Profile>, ApiError>;
    async fn create_profile(&self, request: &CreateProfileRequest) -> Result<(), ApiError>;
    async fn start_profile(&self, name: &str) -> Result<(), ApiError>;
    async fn stop_profile(&self, name: &str) -> Result<(), ApiError>;
    async fn delete_profile(&self, name: &str) -> Result<(), ApiError>;
    async fn profile_status(&self, name: &str) -> Result<ProfileStatusReport, ApiError>;
    async fn import_profile(&self, archive: &ProfileArchive) -> Result<ImportReceipt, ApiError>;
    /// Location of the downloadable archive. Consumed by navigation, never fetched here.
    fn export_url(&self, name: &str) -> String;
}

/// Shared client with the backend timeout applied.
pub fn default_http_client() -> reqwest::Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(isolator_config::HTTP_TIMEOUT_SECS))
        .user_agent(concat!("isolator/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// File name an exported archive of `name` is saved under.
pub fn export_file_name(name: &str) -> String {
    format!("{}.zip", name.replace(['/', '\\'], "_"))
}

/// `reqwest` implementation of [`ProfilesBackend`].
#[derive(Clone)]
pub struct HttpProfilesBackend {
    client: Client,
    base: String,
}

impl HttpProfilesBackend {
    /// `base_url` is the origin (optionally with a path prefix) that serves `/api/...`.
    pub fn new(client: Client, base_url: &str) -> Result<Self, ApiError> {
        let parsed = reqwest::Url::parse(base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }

        let base = parsed.as_str().trim_end_matches('/').to_string();
        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn collection_url(&self) -> String {
        format!("{}/api/profiles", self.base)
    }

    fn profile_url(&self, name: &str, suffix: Option<&str>) -> String {
        let mut url = format!("{}/api/profiles/{}", self.base, encode_path_segment(name));
        if let Some(suffix) = suffix {
            url.push('/');
            url.push_str(suffix);
        }
        url
    }

    /// Stream `url` into `target`, returning the number of bytes written.
    ///
    /// Written to a `.part` file next to `target` first and renamed once
    /// complete; the `.part` file is removed on any failure.
    pub async fn download_url(&self, url: &str, target: &Utf8Path) -> Result<u64, ApiError> {
        debug!("downloading {url}");

        let resp = self.client.get(url).send().await?;
        let resp = ensure_success(resp).await?;

        if let Some(parent) = target.parent().filter(|p| !p.as_str().is_empty()) {
            tokio::fs::create_dir_all(parent.as_std_path()).await?;
        }
        let tmp_path = Utf8PathBuf::from(format!("{target}.part"));

        match stream_to_file(resp, &tmp_path, target).await {
            Ok(written) => {
                debug!("{url} saved to {target} ({written} bytes)");
                Ok(written)
            }
            Err(e) => {
                let _ = tokio::fs::remove_file(tmp_path.as_std_path()).await;
                Err(e)
            }
        }
    }

    async fn send_expecting_success(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<Response, ApiError> {
        let resp = request.send().await?;
        ensure_success(resp).await
    }
}

/// Map any non-2xx response to [`ApiError::Application`], carrying the
/// `error` field of the body when there is one.
async fn ensure_success(resp: Response) -> Result<Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let url = resp.url().to_string();
    let body = resp.bytes().await.unwrap_or_default();
    let message = serde_json::from_slice::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.error)
        .filter(|m| !m.trim().is_empty());

    warn!(
        "{url} answered {status}: {}",
        message.as_deref().unwrap_or("<no message>")
    );
    Err(ApiError::Application {
        status: status.as_u16(),
        message,
    })
}

async fn stream_to_file(
    resp: Response,
    tmp_path: &Utf8Path,
    target: &Utf8Path,
) -> Result<u64, ApiError> {
    let mut file = File::create(tmp_path.as_std_path()).await?;
    let mut stream = resp.bytes_stream();
    let mut written = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    drop(file);

    tokio::fs::rename(tmp_path.as_std_path(), target.as_std_path()).await?;
    Ok(written)
}

async fn decode_json<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    let url = resp.url().to_string();
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(format!("{url}: {e}")))
}

#[async_trait::async_trait]
impl ProfilesBackend for HttpProfilesBackend {
    async fn list_profiles(&self) -> Result<Vec<Profile>, ApiError> {
        let resp = self
            .send_expecting_success(self.client.get(self.collection_url()))
            .await?;
        let list: ProfileList = decode_json(resp).await?;
        Ok(list.profiles)
    }

    async fn create_profile(&self, request: &CreateProfileRequest) -> Result<(), ApiError> {
        debug!("creating profile {}", request.name);
        self.send_expecting_success(self.client.post(self.collection_url()).json(request))
            .await?;
        Ok(())
    }

    async fn start_profile(&self, name: &str) -> Result<(), ApiError> {
        debug!("starting profile {name}");
        self.send_expecting_success(self.client.post(self.profile_url(name, Some("start"))))
            .await?;
        Ok(())
    }

    async fn stop_profile(&self, name: &str) -> Result<(), ApiError> {
        debug!("stopping profile {name}");
        self.send_expecting_success(self.client.post(self.profile_url(name, Some("stop"))))
            .await?;
        Ok(())
    }

    async fn delete_profile(&self, name: &str) -> Result<(), ApiError> {
        debug!("deleting profile {name}");
        self.send_expecting_success(self.client.delete(self.profile_url(name, None)))
            .await?;
        Ok(())
    }

    async fn profile_status(&self, name: &str) -> Result<ProfileStatusReport, ApiError> {
        let resp = self
            .send_expecting_success(self.client.get(self.profile_url(name, Some("status"))))
            .await?;
        decode_json(resp).await
    }

    async fn import_profile(&self, archive: &ProfileArchive) -> Result<ImportReceipt, ApiError> {
        debug!(
            "uploading archive {} ({} bytes)",
            archive.file_name,
            archive.bytes.len()
        );
        let part = multipart::Part::bytes(archive.bytes.clone()).file_name(archive.file_name.clone());
        let form = multipart::Form::new().part("file", part);
        let url = format!("{}/import", self.collection_url());

        let resp = self
            .send_expecting_success(self.client.post(url).multipart(form))
            .await?;
        decode_json(resp).await
    }

    fn export_url(&self, name: &str) -> String {
        self.profile_url(name, Some("export"))
    }
}
