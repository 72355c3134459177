pub mod commands;
pub mod export;
pub mod prompt;
pub mod render;

use anyhow::Context;
use camino::Utf8PathBuf;
use isolator_app_core::{SessionConfig, SessionController};
use isolator_infra::HttpProfilesBackend;

use crate::export::ExportDownloader;

/// A dashboard session talking to a real backend over HTTP.
pub type Session = SessionController<HttpProfilesBackend, ExportDownloader>;

/// Build a session against `base_url`. Exports are saved into `export_dir`.
pub fn connect(
    base_url: &str,
    config: SessionConfig,
    export_dir: Utf8PathBuf,
) -> anyhow::Result<Session> {
    let client = isolator_infra::default_http_client().context("Failed to build HTTP client")?;
    let backend = HttpProfilesBackend::new(client, base_url)
        .with_context(|| format!("Invalid backend URL {base_url}"))?;
    let downloader = ExportDownloader::new(backend.clone(), export_dir);
    Ok(SessionController::new(backend, downloader, config))
}
