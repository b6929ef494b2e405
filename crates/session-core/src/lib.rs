mod events;
mod fsm;
mod runtime;
mod session;

pub use events::SessionEvent;
pub use fsm::{Effect, Phase, SchedulerFsm};
pub use runtime::SessionRuntime;
pub use session::{Session, SessionConfig};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to spawn session actor: {0}")]
    SpawnFailed(String),

    #[error("session actor is no longer running")]
    SessionClosed,

    #[error("session rpc failed: {0}")]
    RpcFailed(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
