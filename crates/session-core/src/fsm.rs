//! Scheduling state machine for speaker classification.
//!
//! Decides *when* to invoke the classifier: debounce while the speaker is
//! mid-exchange, escape to an immediate dispatch when the unclassified
//! backlog grows, and never allow two requests in flight at once. The
//! machine is pure — it owns no timers and makes no calls; it returns an
//! [`Effect`] the session actor executes (arm a timer, dispatch a request).
//! Timer staleness is the actor's problem, handled with generation counters.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// Quiet-period timer armed; restarted on every new utterance.
    Debouncing,
    /// Exactly one classification request outstanding. `retrigger` records
    /// that input arrived mid-flight and another pass is owed.
    InFlight { retrigger: bool },
    /// Post-completion pause before honoring a retrigger, so back-to-back
    /// classifier calls don't hammer the provider.
    Cooldown,
    /// Flush requested while a request was in flight; its result is awaited
    /// before the terminal full-ledger classification.
    Draining,
    /// The terminal full-ledger classification is outstanding.
    FinalInFlight,
    /// Terminal. No further scheduling activity is accepted.
    Flushed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    ArmDebounce,
    ArmCooldown,
    Dispatch,
    DispatchFinal,
}

pub struct SchedulerFsm {
    phase: Phase,
}

impl SchedulerFsm {
    pub fn new() -> Self {
        Self { phase: Phase::Idle }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_terminal(&self) -> bool {
        self.phase == Phase::Flushed
    }

    /// A new utterance entered the ledger.
    pub fn on_fragment(&mut self, backlog: usize, threshold: usize) -> Effect {
        match self.phase {
            Phase::Idle | Phase::Debouncing => {
                if backlog >= threshold {
                    // backlog pressure overrides latency preference
                    self.phase = Phase::InFlight { retrigger: false };
                    Effect::Dispatch
                } else {
                    self.phase = Phase::Debouncing;
                    Effect::ArmDebounce
                }
            }
            Phase::InFlight { .. } => {
                self.phase = Phase::InFlight { retrigger: true };
                Effect::None
            }
            // backlog is re-evaluated when the cooldown expires
            Phase::Cooldown => Effect::None,
            Phase::Draining | Phase::FinalInFlight | Phase::Flushed => Effect::None,
        }
    }

    /// The debounce timer fired. Stale fires must be filtered out by the
    /// caller before reaching here.
    pub fn on_debounce(&mut self) -> Effect {
        match self.phase {
            Phase::Debouncing => {
                self.phase = Phase::InFlight { retrigger: false };
                Effect::Dispatch
            }
            _ => Effect::None,
        }
    }

    /// The post-completion cooldown elapsed; re-evaluate the backlog.
    pub fn on_cooldown(&mut self, backlog: usize, threshold: usize) -> Effect {
        match self.phase {
            Phase::Cooldown => {
                if backlog >= threshold {
                    self.phase = Phase::InFlight { retrigger: false };
                    Effect::Dispatch
                } else if backlog > 0 {
                    self.phase = Phase::Debouncing;
                    Effect::ArmDebounce
                } else {
                    self.phase = Phase::Idle;
                    Effect::None
                }
            }
            _ => Effect::None,
        }
    }

    /// The outstanding classification settled (committed, dropped stale, or
    /// failed — the machine does not distinguish; mutual exclusion must be
    /// released either way).
    pub fn on_settled(&mut self) -> Effect {
        match self.phase {
            Phase::InFlight { retrigger: false } => {
                self.phase = Phase::Idle;
                Effect::None
            }
            Phase::InFlight { retrigger: true } => {
                self.phase = Phase::Cooldown;
                Effect::ArmCooldown
            }
            Phase::Draining => {
                self.phase = Phase::FinalInFlight;
                Effect::DispatchFinal
            }
            Phase::FinalInFlight => {
                self.phase = Phase::Flushed;
                Effect::None
            }
            _ => Effect::None,
        }
    }

    /// Recording stopped. One terminal classification over the entire ledger
    /// is forced, after any in-flight request completes.
    pub fn on_flush(&mut self) -> Effect {
        match self.phase {
            Phase::Idle | Phase::Debouncing | Phase::Cooldown => {
                self.phase = Phase::FinalInFlight;
                Effect::DispatchFinal
            }
            Phase::InFlight { .. } => {
                self.phase = Phase::Draining;
                Effect::None
            }
            Phase::Draining | Phase::FinalInFlight | Phase::Flushed => Effect::None,
        }
    }
}

impl Default for SchedulerFsm {
    fn default() -> Self {
        Self::new()
    }
}
