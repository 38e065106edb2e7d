//! # States, events, and the transition table.
//!
//! The lifecycle is modeled as one flat enum plus a pure transition
//! function. The acquiring phase (Idle, FetchingDaily, FetchingCurrent)
//! is a family of states rather than a nested machine; membership is
//! expressed by [`MachineState::is_acquiring`], which is how Shutdown
//! applies uniformly to all three.
//!
//! ```text
//!  Off ──Start──► Starting ──Idle──► Idle ◄──Idle── FetchingDaily
//!                                    │  ▲                 ▲
//!                                    │  └─Idle── FetchingCurrent
//!                                    │                    ▲
//!                                    ├──Daily─────────────┘ (to FetchingDaily)
//!                                    └──ReadCurrent──► FetchingCurrent
//!
//!  any acquiring state ──Shutdown──► Stopping ──Shutdown──► Off
//! ```
//!
//! Combinations absent from the table are discarded by the dispatcher,
//! not errors. `Terminate` never appears here: it is handled directly by
//! the worker as an unconditional kill switch.

/// Lifecycle state of the acquisition machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineState {
    /// Not running; the terminal state after shutdown.
    Off,
    /// Warm-up: initial fetches run and the cadence is armed.
    Starting,
    /// Acquiring, parked until the next timed event fires.
    Idle,
    /// Acquiring, a daily-resolution fetch is in progress.
    FetchingDaily,
    /// Acquiring, a current-resolution fetch is in progress.
    FetchingCurrent,
    /// Winding down: pending timed events are being drained.
    Stopping,
}

impl MachineState {
    /// True for the states that make up the acquiring phase.
    pub fn is_acquiring(&self) -> bool {
        matches!(
            self,
            MachineState::Idle | MachineState::FetchingDaily | MachineState::FetchingCurrent
        )
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            MachineState::Off => "off",
            MachineState::Starting => "starting",
            MachineState::Idle => "idle",
            MachineState::FetchingDaily => "fetching_daily",
            MachineState::FetchingCurrent => "fetching_current",
            MachineState::Stopping => "stopping",
        }
    }
}

/// Event driving the acquisition machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineEvent {
    /// Leave Off and begin the warm-up.
    Start,
    /// Fetch finished (or warm-up finished); park until the next event.
    Idle,
    /// Timed trigger for a current-resolution fetch.
    ReadCurrent,
    /// Timed trigger for a daily-resolution fetch.
    Daily,
    /// Orderly wind-down request (also injected on process signals).
    Shutdown,
    /// Unconditional stop of the worker, bypassing the wind-down.
    Terminate,
}

impl MachineEvent {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            MachineEvent::Start => "start",
            MachineEvent::Idle => "idle",
            MachineEvent::ReadCurrent => "read_current",
            MachineEvent::Daily => "daily",
            MachineEvent::Shutdown => "shutdown",
            MachineEvent::Terminate => "terminate",
        }
    }
}

/// Pure transition table. `None` means the event is discarded in this state.
pub(crate) fn transition(state: MachineState, event: MachineEvent) -> Option<MachineState> {
    use MachineEvent as E;
    use MachineState as S;

    match (state, event) {
        (S::Off, E::Start) => Some(S::Starting),
        (S::Starting, E::Idle) => Some(S::Idle),
        (S::Idle, E::Daily) => Some(S::FetchingDaily),
        (S::Idle, E::ReadCurrent) => Some(S::FetchingCurrent),
        (S::FetchingDaily, E::Idle) => Some(S::Idle),
        (S::FetchingCurrent, E::Idle) => Some(S::Idle),
        (s, E::Shutdown) if s.is_acquiring() => Some(S::Stopping),
        (S::Stopping, E::Shutdown) => Some(S::Off),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use MachineEvent as E;
    use MachineState as S;

    #[test]
    fn test_happy_path_transitions() {
        assert_eq!(transition(S::Off, E::Start), Some(S::Starting));
        assert_eq!(transition(S::Starting, E::Idle), Some(S::Idle));
        assert_eq!(transition(S::Idle, E::Daily), Some(S::FetchingDaily));
        assert_eq!(transition(S::FetchingDaily, E::Idle), Some(S::Idle));
        assert_eq!(transition(S::Idle, E::ReadCurrent), Some(S::FetchingCurrent));
        assert_eq!(transition(S::FetchingCurrent, E::Idle), Some(S::Idle));
    }

    #[test]
    fn test_shutdown_applies_to_every_acquiring_state() {
        for s in [S::Idle, S::FetchingDaily, S::FetchingCurrent] {
            assert_eq!(transition(s, E::Shutdown), Some(S::Stopping), "{s:?}");
        }
        assert_eq!(transition(S::Stopping, E::Shutdown), Some(S::Off));
    }

    #[test]
    fn test_unmapped_combinations_are_discarded() {
        assert_eq!(transition(S::Off, E::Shutdown), None);
        assert_eq!(transition(S::Off, E::Daily), None);
        assert_eq!(transition(S::Starting, E::Start), None);
        assert_eq!(transition(S::Starting, E::ReadCurrent), None);
        assert_eq!(transition(S::Idle, E::Start), None);
        assert_eq!(transition(S::FetchingDaily, E::Daily), None);
        assert_eq!(transition(S::FetchingCurrent, E::ReadCurrent), None);
        assert_eq!(transition(S::Stopping, E::Idle), None);
    }

    #[test]
    fn test_terminate_never_appears_in_the_table() {
        for s in [
            S::Off,
            S::Starting,
            S::Idle,
            S::FetchingDaily,
            S::FetchingCurrent,
            S::Stopping,
        ] {
            assert_eq!(transition(s, E::Terminate), None);
        }
    }

    #[test]
    fn test_acquiring_membership() {
        assert!(S::Idle.is_acquiring());
        assert!(S::FetchingDaily.is_acquiring());
        assert!(S::FetchingCurrent.is_acquiring());
        assert!(!S::Off.is_acquiring());
        assert!(!S::Starting.is_acquiring());
        assert!(!S::Stopping.is_acquiring());
    }
}
