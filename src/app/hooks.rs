//! Application lifecycle hooks.

use super::AppStatus;

/// Observer of application lifecycle events.
///
/// Hooks are registered on the builder and fire synchronously, in
/// registration order. `after_loaded` and `on_ready` may veto startup by
/// returning an error message; status change notifications are fire-and-forget.
pub trait AppHook: Send + Sync {
    fn name(&self) -> &str;

    fn on_status_change(&self, previous: AppStatus, current: AppStatus) {
        let _ = (previous, current);
    }

    /// All units finished loading; `order` is the sequence actually loaded.
    fn after_loaded(&self, order: &[String]) -> Result<(), String> {
        let _ = order;
        Ok(())
    }

    /// The application reached [`AppStatus::Ready`].
    fn on_ready(&self) -> Result<(), String> {
        Ok(())
    }
}
