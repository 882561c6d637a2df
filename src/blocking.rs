//! blocking
//!
//! Run libgit2 work from async code.
//!
//! Every native call blocks the calling thread until it completes. [`run`]
//! moves a closure onto tokio's blocking pool so an async caller does not
//! stall a runtime worker. There is no cancellation: dropping the returned
//! future detaches the task, and the native work still runs to completion.
//!
//! Handles are `Send`, so they can be moved into the closure and returned
//! from it.
//!
//! # Example
//!
//! ```no_run
//! use gitbind::{blocking, Repository};
//!
//! # async fn example() -> Result<(), gitbind::Error> {
//! let oid = blocking::run(|| {
//!     let repo = Repository::open("/path/to/repo")?;
//!     repo.blob(b"content\n")
//! })
//! .await?;
//! # Ok(())
//! # }
//! ```

use tracing::debug;

use crate::error::Error;

/// Run `f` on the blocking pool and wait for its result.
///
/// # Errors
///
/// Whatever `f` returns, or [`Error::Blocking`] if the task panicked or the
/// runtime cancelled it.
///
/// # Panics
///
/// Panics if called outside a tokio runtime.
pub async fn run<F, T>(f: F) -> Result<T, Error>
where
    F: FnOnce() -> Result<T, Error> + Send + 'static,
    T: Send + 'static,
{
    debug!("dispatching native work to blocking pool");
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result,
        Err(e) => Err(Error::Blocking {
            message: e.to_string(),
        }),
    }
}
