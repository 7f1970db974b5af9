//! Diagnostic events from move generation and game play.
//!
//! Every event is logged through `tracing`. A caller may also register a
//! [`TraceHook`] on a [`Game`](crate::Game) to receive the same events as
//! typed values, e.g. to drive a debug view.

use std::fmt;
use std::sync::Arc;

use chess_core::Move;

/// Why a pseudo-legal move was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The move leaves one of the mover's kings attacked.
    KingLeftAttacked,
    /// A capture was available, so quiet moves are not allowed.
    CaptureAvailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    PseudoLegalGenerated { count: usize },
    MoveRejected { mv: Move, reason: RejectReason },
    MandatoryCapture { captures: usize, discarded: usize },
    MoveApplied { mv: Move, san: String },
    MoveRetracted { mv: Move },
}

pub type TraceHook = Arc<dyn Fn(&TraceEvent) + Send + Sync>;

/// Fans events out to `tracing` and to an optional hook.
#[derive(Clone, Default)]
pub struct Tracer {
    hook: Option<TraceHook>,
}

impl Tracer {
    pub fn new(hook: Option<TraceHook>) -> Self {
        Tracer { hook }
    }

    /// A tracer that only logs.
    pub const fn disabled() -> Self {
        Tracer { hook: None }
    }

    pub fn has_hook(&self) -> bool {
        self.hook.is_some()
    }

    /// True when a hook is registered or `tracing` records trace-level
    /// events. Per-move events are only built when this holds.
    pub fn is_enabled(&self) -> bool {
        self.has_hook() || tracing::enabled!(tracing::Level::TRACE)
    }

    pub fn emit(&self, event: TraceEvent) {
        match &event {
            TraceEvent::PseudoLegalGenerated { count } => {
                tracing::trace!(count, "generated pseudo-legal moves");
            }
            TraceEvent::MoveRejected { mv, reason } => {
                tracing::trace!(mv = %mv, ?reason, "rejected move");
            }
            TraceEvent::MandatoryCapture {
                captures,
                discarded,
            } => {
                tracing::debug!(captures, discarded, "capture is mandatory");
            }
            TraceEvent::MoveApplied { mv, san } => {
                tracing::debug!(mv = %mv, san = %san, "applied move");
            }
            TraceEvent::MoveRetracted { mv } => {
                tracing::debug!(mv = %mv, "retracted move");
            }
        }
        if let Some(hook) = &self.hook {
            hook(&event);
        }
    }
}

impl fmt::Debug for Tracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracer")
            .field("hook", &self.hook.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::{Color, Piece, Square};
    use std::sync::Mutex;

    #[test]
    fn hook_receives_events() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let tracer = Tracer::new(Some(Arc::new(move |event: &TraceEvent| {
            sink.lock().unwrap().push(event.clone());
        })));
        assert!(tracer.has_hook());
        assert!(tracer.is_enabled());

        let mv = Move::new(Square::E1, Square::F1, Piece::King, Color::White);
        tracer.emit(TraceEvent::PseudoLegalGenerated { count: 3 });
        tracer.emit(TraceEvent::MoveRetracted { mv });

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1], TraceEvent::MoveRetracted { mv });
    }

    #[test]
    fn disabled_tracer_has_no_hook() {
        let tracer = Tracer::disabled();
        assert!(!tracer.has_hook());
        assert!(!tracer.is_enabled());
        tracer.emit(TraceEvent::PseudoLegalGenerated { count: 0 });
    }
}
