use std::future::Future;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use indicatif::{ProgressBar, ProgressStyle};
use isolator_app_core::{
    polling::LOAD_FAILED_MESSAGE, ActionError, NotificationId, RefreshOutcome, Severity,
};
use isolator_core::{ImportReceipt, ProfileArchive, ProfileStatusReport};
use tracing::debug;

use crate::render::{render_dashboard, render_notification, render_status};
use crate::Session;

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

async fn with_spinner<T>(message: String, fut: impl Future<Output = T>) -> T {
    let pb = spinner(message);
    let out = fut.await;
    pb.finish_and_clear();
    out
}

/// Echo success notifications; errors surface through `Err`.
fn print_successes(session: &Session) {
    for n in session.notifications().snapshot() {
        if n.severity == Severity::Success {
            println!("{}", render_notification(&n));
        }
    }
}

/// `Ok(false)` when the operator declined.
fn settle(session: &Session, res: Result<(), ActionError>) -> Result<bool> {
    match res {
        Ok(()) => {
            print_successes(session);
            Ok(true)
        }
        Err(ActionError::Cancelled) => {
            println!(":: Cancelled.");
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn cmd_list(session: &Session) -> Result<()> {
    let outcome = with_spinner("Loading profiles...".into(), session.poller().refresh_now()).await;
    if outcome == RefreshOutcome::Failed {
        bail!(LOAD_FAILED_MESSAGE);
    }
    print!("{}", render_dashboard(&session.view()));
    Ok(())
}

pub async fn cmd_status(session: &Session, name: &str) -> Result<ProfileStatusReport> {
    let report = session.status(name).await?;
    println!("{}", render_status(&report));
    Ok(report)
}

pub async fn cmd_create(session: &Session, name: &str, location: Option<&str>) -> Result<()> {
    let res = with_spinner(
        format!("Creating {}...", name.trim()),
        session.create(name, location),
    )
    .await;
    settle(session, res).map(drop)
}

pub async fn cmd_start(session: &Session, name: &str) -> Result<()> {
    let res = with_spinner(format!("Starting {name}..."), session.start(name)).await;
    settle(session, res).map(drop)
}

pub async fn cmd_stop(session: &Session, name: &str) -> Result<()> {
    let res = with_spinner(format!("Stopping {name}..."), session.stop(name)).await;
    settle(session, res).map(drop)
}

/// Needs a prompt responder bound to the session's confirmation gate.
/// Returns whether the profile was deleted.
pub async fn cmd_delete(session: &Session, name: &str) -> Result<bool> {
    let res = session.delete(name).await;
    settle(session, res)
}

pub async fn cmd_export(session: &Session, name: &str) -> Result<Utf8PathBuf> {
    session.export(name)?;
    let saved = with_spinner(
        format!("Downloading export of {name}..."),
        session.navigator().finish(),
    )
    .await
    .with_context(|| format!("Failed to export profile {name}"))?;

    let Some(path) = saved.into_iter().next() else {
        bail!("Export of {name} was not started");
    };
    println!(":: Saved export to {path}");
    Ok(path)
}

pub async fn cmd_import(session: &Session, file: &Utf8Path) -> Result<ImportReceipt> {
    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {file}"))?;
    let archive = ProfileArchive {
        file_name: file.file_name().unwrap_or_default().to_string(),
        bytes,
    };
    debug!("importing {} ({} bytes)", archive.file_name, archive.bytes.len());

    let receipt = with_spinner(format!("Importing {file}..."), session.import(archive)).await?;
    print_successes(session);
    if let Some(path) = &receipt.path {
        println!("   Path: {path}");
    }
    Ok(receipt)
}

/// Poll until `shutdown` resolves, reprinting the dashboard whenever the
/// profile list changes and echoing every new notification.
pub async fn cmd_watch(session: &Session, shutdown: impl Future<Output = ()>) -> Result<()> {
    let mut profiles = session.profiles().subscribe();
    let mut notifications = session.notifications().subscribe();
    let mut last_seen: Option<NotificationId> = None;

    session.start_polling();
    println!(
        ":: Watching {} every {:?} (Ctrl-C to quit)",
        session.backend().base_url(),
        session.poller().period()
    );

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            changed = profiles.changed() => {
                if changed.is_err() {
                    break;
                }
                println!();
                print!("{}", render_dashboard(&session.view()));
            }
            changed = notifications.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = notifications.borrow_and_update().clone();
                let seen = last_seen;
                for n in current.iter().filter(|n| seen.map_or(true, |s| n.id > s)) {
                    println!("{}", render_notification(n));
                    last_seen = Some(n.id);
                }
            }
        }
    }

    session.stop_polling();
    Ok(())
}
