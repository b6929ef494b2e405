use crate::events::SessionEvent;

/// Event sink the session emits into — a Tauri event bridge, a test
/// collector, a CLI printer. Implementations must be cheap and non-blocking;
/// emission happens on the session actor's message loop.
pub trait SessionRuntime: Send + Sync {
    fn emit(&self, event: SessionEvent);
}
