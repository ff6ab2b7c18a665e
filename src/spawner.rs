//! Where detached background refreshes run.

use std::io;
use std::thread;

const REFRESH_THREAD_NAME: &str = "renewable-refresh";

/// Runs a detached, blocking refresh job.
///
/// The job is never joined or awaited; its only effect is on the renewable
/// that spawned it.
#[derive(Clone, Debug, Default)]
pub enum Spawner {
    /// A fresh named OS thread per refresh.
    #[default]
    Thread,
    /// Tokio's blocking pool of the given runtime.
    Tokio(tokio::runtime::Handle),
}

impl Spawner {
    /// Tokio if called inside a runtime, a plain thread otherwise.
    pub fn current() -> Self {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => Spawner::Tokio(handle),
            Err(_) => Spawner::Thread,
        }
    }

    pub(crate) fn spawn<F>(&self, job: F) -> io::Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        match self {
            Spawner::Thread => thread::Builder::new()
                .name(REFRESH_THREAD_NAME.to_string())
                .spawn(job)
                .map(drop),
            Spawner::Tokio(handle) => {
                drop(handle.spawn_blocking(job));
                Ok(())
            }
        }
    }
}
