pub use isolator_infra::ProfilesBackend;

/// Where an export request goes: a browser navigation, a download, etc.
///
/// Fire-and-forget; the session does not track what happens next.
pub trait ExportNavigator: Send + Sync + 'static {
    fn navigate(&self, url: &str);
}

impl<F> ExportNavigator for F
where
    F: Fn(&str) + Send + Sync + 'static,
{
    fn navigate(&self, url: &str) {
        self(url)
    }
}
