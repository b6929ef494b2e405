use std::sync::Arc;
use std::time::Duration;

use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use scriba_transcript::{
    AttributionRecord, CommitOutcome, FragmentFilter, SpeakerClassifier, StreamFragment,
    TranscriptSnapshot, UtteranceLedger,
};

use crate::events::SessionEvent;
use crate::fsm::{Effect, Phase, SchedulerFsm};
use crate::runtime::SessionRuntime;
use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Quiet period after the last utterance before a classification fires.
    pub debounce: Duration,
    /// Unclassified-utterance count at which the debounce is skipped and a
    /// classification dispatches immediately.
    pub backlog_threshold: usize,
    /// Pause between a completed classification and the follow-up pass owed
    /// to input that arrived mid-flight.
    pub retrigger_cooldown: Duration,
    /// Upper bound on a mid-session classifier call.
    pub classify_timeout: Duration,
    /// Upper bound on the terminal flush classification; past this the call
    /// is treated as failed rather than awaited indefinitely.
    pub flush_grace: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(1500),
            backlog_threshold: 3,
            retrigger_cooldown: Duration::from_secs(1),
            classify_timeout: Duration::from_secs(30),
            flush_grace: Duration::from_secs(10),
        }
    }
}

// ── Actor ────────────────────────────────────────────────────────────────────

enum SessionMsg {
    Fragment(String),
    DebounceElapsed(u64),
    CooldownElapsed(u64),
    Settled {
        watermark: usize,
        result: std::result::Result<Vec<AttributionRecord>, String>,
    },
    Flush(RpcReplyPort<TranscriptSnapshot>),
    Snapshot(RpcReplyPort<TranscriptSnapshot>),
}

struct SessionArgs {
    session_id: String,
    runtime: Arc<dyn SessionRuntime>,
    classifier: Arc<dyn SpeakerClassifier>,
    config: SessionConfig,
}

struct SessionState {
    session_id: String,
    runtime: Arc<dyn SessionRuntime>,
    classifier: Arc<dyn SpeakerClassifier>,
    config: SessionConfig,
    filter: FragmentFilter,
    ledger: Arc<UtteranceLedger>,
    fsm: SchedulerFsm,
    debounce_generation: u64,
    cooldown_generation: u64,
    flush_replies: Vec<RpcReplyPort<TranscriptSnapshot>>,
}

impl SessionState {
    fn emit_snapshot(&self) {
        self.runtime.emit(SessionEvent::TranscriptUpdated {
            session_id: self.session_id.clone(),
            snapshot: self.ledger.project(),
        });
    }

    fn dispatch(&self, myself: &ActorRef<SessionMsg>, grace: Duration) {
        let watermark = self.ledger.len();
        let utterances = self.ledger.all_texts();
        let context = self.ledger.classified_records();
        let classifier = self.classifier.clone();
        let myself = myself.clone();

        tracing::debug!(watermark, count = utterances.len(), "classification_dispatched");

        tokio::spawn(async move {
            let result =
                match tokio::time::timeout(grace, classifier.classify(&utterances, &context)).await
                {
                    Ok(Ok(records)) => Ok(records),
                    Ok(Err(error)) => Err(error.to_string()),
                    Err(_) => Err(format!("classification timed out after {grace:?}")),
                };
            let _ = myself.send_message(SessionMsg::Settled { watermark, result });
        });
    }

    fn apply(&mut self, myself: &ActorRef<SessionMsg>, effect: Effect) {
        match effect {
            Effect::None => {}
            Effect::ArmDebounce => {
                self.debounce_generation += 1;
                let generation = self.debounce_generation;
                let _ = myself.send_after(self.config.debounce, move || {
                    SessionMsg::DebounceElapsed(generation)
                });
            }
            Effect::ArmCooldown => {
                self.cooldown_generation += 1;
                let generation = self.cooldown_generation;
                let _ = myself.send_after(self.config.retrigger_cooldown, move || {
                    SessionMsg::CooldownElapsed(generation)
                });
            }
            Effect::Dispatch => self.dispatch(myself, self.config.classify_timeout),
            Effect::DispatchFinal => self.dispatch(myself, self.config.flush_grace),
        }
    }

    /// Invalidate any armed debounce/cooldown timer. Fire-and-forget timers
    /// are not aborted; their messages arrive with a stale generation and
    /// are ignored.
    fn cancel_timers(&mut self) {
        self.debounce_generation += 1;
        self.cooldown_generation += 1;
    }

    fn finish(&mut self) {
        let snapshot = self.ledger.project();
        self.runtime.emit(SessionEvent::Flushed {
            session_id: self.session_id.clone(),
            snapshot: snapshot.clone(),
        });
        for reply in self.flush_replies.drain(..) {
            let _ = reply.send(snapshot.clone());
        }
        tracing::info!("session_flushed");
    }
}

struct SessionActor;

#[ractor::async_trait]
impl Actor for SessionActor {
    type Msg = SessionMsg;
    type State = SessionState;
    type Arguments = SessionArgs;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> std::result::Result<Self::State, ActorProcessingErr> {
        Ok(SessionState {
            session_id: args.session_id,
            runtime: args.runtime,
            classifier: args.classifier,
            config: args.config,
            filter: FragmentFilter::new(),
            ledger: Arc::new(UtteranceLedger::new()),
            fsm: SchedulerFsm::new(),
            debounce_generation: 0,
            cooldown_generation: 0,
            flush_replies: Vec::new(),
        })
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> std::result::Result<(), ActorProcessingErr> {
        let span = session_span(&state.session_id);
        let _guard = span.enter();

        match message {
            SessionMsg::Fragment(raw) => {
                let cleaned = state.filter.filter(&raw);
                if cleaned.is_empty() {
                    tracing::debug!("fragment_discarded_by_filter");
                    return Ok(());
                }

                match state.ledger.append(&cleaned) {
                    Some(index) => {
                        tracing::debug!(index, "utterance_appended");
                        state.emit_snapshot();
                        let effect = state.fsm.on_fragment(
                            state.ledger.unclassified_count(),
                            state.config.backlog_threshold,
                        );
                        state.apply(&myself, effect);
                    }
                    None => {
                        tracing::debug!("fragment_rejected_after_freeze");
                    }
                }
            }

            SessionMsg::DebounceElapsed(generation) => {
                if generation != state.debounce_generation {
                    return Ok(());
                }
                let effect = state.fsm.on_debounce();
                state.apply(&myself, effect);
            }

            SessionMsg::CooldownElapsed(generation) => {
                if generation != state.cooldown_generation {
                    return Ok(());
                }
                let effect = state.fsm.on_cooldown(
                    state.ledger.unclassified_count(),
                    state.config.backlog_threshold,
                );
                state.apply(&myself, effect);
            }

            SessionMsg::Settled { watermark, result } => {
                match result {
                    Ok(records) => match state.ledger.commit(watermark, records) {
                        CommitOutcome::Applied => {
                            tracing::debug!(watermark, "classification_committed");
                            state.emit_snapshot();
                        }
                        CommitOutcome::StaleDropped => {
                            tracing::debug!(watermark, "stale_classification_dropped");
                        }
                    },
                    Err(error) => {
                        tracing::warn!(%error, "classification_failed");
                        state.runtime.emit(SessionEvent::ClassificationFailed {
                            session_id: state.session_id.clone(),
                            error,
                        });
                    }
                }

                let was_final = state.fsm.phase() == Phase::FinalInFlight;
                let effect = state.fsm.on_settled();
                if was_final {
                    state.finish();
                } else {
                    state.apply(&myself, effect);
                }
            }

            SessionMsg::Flush(reply) => {
                state.ledger.freeze();
                state.cancel_timers();

                if state.fsm.is_terminal() {
                    let _ = reply.send(state.ledger.project());
                    return Ok(());
                }

                tracing::info!("session_flush_requested");
                state.flush_replies.push(reply);

                let effect = state.fsm.on_flush();
                if effect == Effect::DispatchFinal {
                    if state.ledger.is_empty() {
                        // nothing was ever said; no classifier call needed
                        let _ = state.fsm.on_settled();
                        state.finish();
                    } else {
                        state.apply(&myself, effect);
                    }
                }
            }

            SessionMsg::Snapshot(reply) => {
                let _ = reply.send(state.ledger.project());
            }
        }
        Ok(())
    }
}

fn session_span(session_id: &str) -> tracing::Span {
    tracing::info_span!("session", session_id = %session_id)
}

// ── Public handle ────────────────────────────────────────────────────────────

/// Handle to one recording session's attribution pipeline.
///
/// Created at recording start, fed final transcript fragments throughout,
/// and flushed exactly once at recording stop. The underlying actor owns the
/// ledger and the scheduling state machine; all methods are safe to call
/// from any task.
pub struct Session {
    actor: ActorRef<SessionMsg>,
    session_id: String,
}

impl Session {
    pub async fn spawn(
        runtime: Arc<dyn SessionRuntime>,
        classifier: Arc<dyn SpeakerClassifier>,
        config: SessionConfig,
    ) -> Result<Self> {
        let session_id = uuid::Uuid::new_v4().to_string();
        let args = SessionArgs {
            session_id: session_id.clone(),
            runtime,
            classifier,
            config,
        };

        let (actor, _handle) = Actor::spawn(None, SessionActor, args)
            .await
            .map_err(|e| Error::SpawnFailed(format!("{e:?}")))?;

        Ok(Self { actor, session_id })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Feed one transport event. Interim fragments are ignored; final ones
    /// are filtered and appended. Never blocks on classification — the
    /// append path stays available even while the classifier is failing.
    pub fn fragment(&self, fragment: StreamFragment) -> Result<()> {
        let Some(text) = fragment.into_final_text() else {
            return Ok(());
        };
        self.actor
            .cast(SessionMsg::Fragment(text))
            .map_err(|_| Error::SessionClosed)
    }

    /// The best currently-known transcript view.
    pub async fn snapshot(&self) -> Result<TranscriptSnapshot> {
        ractor::call!(self.actor, SessionMsg::Snapshot).map_err(|_| Error::RpcFailed("snapshot"))
    }

    /// Stop recording: freeze the ledger, await any in-flight
    /// classification, force one terminal classification over the entire
    /// ledger, and return the terminal snapshot. Idempotent.
    pub async fn flush(&self) -> Result<TranscriptSnapshot> {
        ractor::call!(self.actor, SessionMsg::Flush).map_err(|_| Error::RpcFailed("flush"))
    }

    pub fn stop(&self) {
        self.actor.stop(None);
    }
}
