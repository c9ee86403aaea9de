use tokio::sync::oneshot;
use tracing::warn;

/// Receives the data URI of a captured frame
pub type SnapshotCallback = Box<dyn FnOnce(String) + Send>;

/// Stage renderer provided by the host
pub trait Renderer: Send + Sync {
    /// Schedules a capture of the next frame; `callback` runs at most once.
    /// There is no way to cancel a request.
    fn request_snapshot(&self, callback: SnapshotCallback);
}

/// Requests one snapshot and waits for it.
///
/// Resolves exactly once. A renderer that drops the callback without calling it
/// resolves to an empty string.
pub async fn capture(renderer: &dyn Renderer) -> String {
    let (tx, rx) = oneshot::channel();
    renderer.request_snapshot(Box::new(move |uri| {
        // receiver gone means nobody is waiting anymore
        let _ = tx.send(uri);
    }));

    rx.await.unwrap_or_else(|_| {
        warn!("Renderer dropped the snapshot request");
        String::new()
    })
}
