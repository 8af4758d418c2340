use std::{future::Future, sync::OnceLock};

use tokio::{
    runtime::{Builder, Handle, Runtime},
    task::JoinHandle,
};
use tracing::error;

static RUNTIME: OnceLock<Option<Runtime>> = OnceLock::new();

/// Handle of the ambient runtime, or of a lazily started background one when
/// called from plain threads.
pub(crate) fn handle() -> Option<Handle> {
    if let Ok(handle) = Handle::try_current() {
        return Some(handle);
    }
    RUNTIME
        .get_or_init(|| match Builder::new_multi_thread().enable_all().build() {
            Ok(runtime) => Some(runtime),
            Err(err) => {
                error!("Failed to start background runtime: {err}");
                None
            }
        })
        .as_ref()
        .map(|runtime| runtime.handle().clone())
}

pub(crate) fn spawn<F>(future: F) -> Option<JoinHandle<F::Output>>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    handle().map(|handle| handle.spawn(future))
}
