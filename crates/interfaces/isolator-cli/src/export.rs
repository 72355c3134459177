use std::sync::{Mutex, MutexGuard, PoisonError};

use camino::{Utf8Path, Utf8PathBuf};
use isolator_app_core::ExportNavigator;
use isolator_infra::{export_file_name, ApiError, HttpProfilesBackend};
use percent_encoding::percent_decode_str;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

type Download = JoinHandle<Result<Utf8PathBuf, ApiError>>;

/// Terminal stand-in for browser navigation: every export URL handed over is
/// downloaded into a directory.
pub struct ExportDownloader {
    backend: HttpProfilesBackend,
    dest_dir: Utf8PathBuf,
    downloads: Mutex<Vec<Download>>,
}

impl ExportDownloader {
    pub fn new(backend: HttpProfilesBackend, dest_dir: Utf8PathBuf) -> Self {
        Self {
            backend,
            dest_dir,
            downloads: Mutex::new(Vec::new()),
        }
    }

    pub fn dest_dir(&self) -> &Utf8Path {
        &self.dest_dir
    }

    fn downloads(&self) -> MutexGuard<'_, Vec<Download>> {
        self.downloads.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wait for every download started so far.
    pub async fn finish(&self) -> anyhow::Result<Vec<Utf8PathBuf>> {
        let pending: Vec<Download> = std::mem::take(&mut *self.downloads());
        let mut saved = Vec::with_capacity(pending.len());
        for download in pending {
            saved.push(download.await??);
        }
        Ok(saved)
    }
}

/// Profile name carried in an `.../<name>/export` URL.
pub fn profile_from_export_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next()?;
    let mut segments = path.trim_end_matches('/').rsplit('/');
    if segments.next()? != "export" {
        return None;
    }
    let name = segments.next().filter(|s| !s.is_empty())?;
    Some(percent_decode_str(name).decode_utf8_lossy().into_owned())
}

impl ExportNavigator for ExportDownloader {
    fn navigate(&self, url: &str) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("no async runtime: export {url} not downloaded");
            return;
        };

        let name = profile_from_export_url(url).unwrap_or_else(|| "profile".to_string());
        let target = self.dest_dir.join(export_file_name(&name));
        let backend = self.backend.clone();
        let url = url.to_string();
        debug!("queueing export download {url} -> {target}");

        let download = runtime.spawn(async move {
            backend.download_url(&url, &target).await?;
            Ok(target)
        });
        self.downloads().push(download);
    }
}
