use anyhow::Result;

/// The sandboxed package manager this core delegates installation to.
///
/// `install` is the one suspension point in a resolution call; it fetches
/// and installs the requested specifiers into the runtime and raises on
/// unrecoverable failure. With `keep_going` the backend keeps installing
/// the remaining packages after an individual failure instead of aborting
/// the batch. Backends report progress through `tracing` events, which the
/// orchestrator captures for the duration of the call.
#[allow(async_fn_in_trait)]
pub trait PackageManager {
    async fn install(&self, specs: &[String], keep_going: bool) -> Result<()>;

    /// Force the runtime to re-discover newly installed modules rather than
    /// trusting a stale "not found" cache.
    fn invalidate_caches(&self);
}

impl<M: PackageManager> PackageManager for &M {
    async fn install(&self, specs: &[String], keep_going: bool) -> Result<()> {
        M::install(self, specs, keep_going).await
    }

    fn invalidate_caches(&self) {
        M::invalidate_caches(self);
    }
}
