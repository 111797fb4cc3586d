//! Generation-tagged request sequencing.
//!
//! [`RequestSequencer`] guarantees that at most one submitted request is
//! authoritative. Each [`begin`](RequestSequencer::begin) cancels the
//! previous request's handle, bumps a monotonic generation counter and
//! returns an envelope tagged with the new generation. When a request
//! finishes, [`settle`](RequestSequencer::settle) compares its tag with the
//! current generation:
//!
//! | Tag | Completion | Settlement | In-flight |
//! |-----|------------|------------|-----------|
//! | stale, or current already settled | any | `Discarded` | untouched |
//! | current | success | `Applied` | cleared |
//! | current | cancelled | `Cancelled` (silent) | cleared |
//! | current | failure | `Failed` (user-visible) | cleared |
//!
//! Cancellation is best-effort. The tag comparison alone decides whether
//! a response is applied, so a transport that ignores the cancel signal
//! still cannot overwrite a newer result.
//!
//! The sequencer holds no runtime types; the cancel signal is abstracted
//! behind [`CancelHandle`] and the caller drives the async request.

/// Signal used to ask an in-flight request to stop.
pub trait CancelHandle {
    fn cancel(&self);
}

/// Tag issued for one submission.
#[derive(Debug, Clone)]
pub struct RequestEnvelope<H> {
    pub generation: u64,
    pub cancel: H,
}

/// How a request finished, as seen by the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion<T> {
    Succeeded(T),
    Cancelled,
    Failed(String),
}

/// What the caller should do with a finished request.
#[derive(Debug, Clone, PartialEq)]
pub enum Settlement<T> {
    /// Current request succeeded; apply the value.
    Applied(T),
    /// Current request failed; surface the message.
    Failed(String),
    /// Current request was cancelled; nothing to report.
    Cancelled,
    /// A newer request has started; ignore entirely.
    Discarded,
}

impl<T> Settlement<T> {
    pub fn is_discarded(&self) -> bool {
        matches!(self, Settlement::Discarded)
    }
}

#[derive(Debug)]
pub struct RequestSequencer<H> {
    current: u64,
    active: Option<H>,
    in_flight: bool,
}

impl<H> Default for RequestSequencer<H> {
    fn default() -> Self {
        Self {
            current: 0,
            active: None,
            in_flight: false,
        }
    }
}

impl<H: CancelHandle + Clone> RequestSequencer<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Supersede any active request and issue a new generation.
    pub fn begin(&mut self, handle: H) -> RequestEnvelope<H> {
        if let Some(previous) = self.active.take() {
            previous.cancel();
        }
        self.current += 1;
        self.active = Some(handle.clone());
        self.in_flight = true;
        RequestEnvelope {
            generation: self.current,
            cancel: handle,
        }
    }

    /// Resolve a finished request against the current generation.
    ///
    /// Each generation settles at most once.
    pub fn settle<T>(&mut self, generation: u64, completion: Completion<T>) -> Settlement<T> {
        if generation != self.current || self.active.is_none() {
            return Settlement::Discarded;
        }
        self.in_flight = false;
        self.active = None;
        match completion {
            Completion::Succeeded(value) => Settlement::Applied(value),
            Completion::Cancelled => Settlement::Cancelled,
            Completion::Failed(message) => Settlement::Failed(message),
        }
    }

    /// Cancel the active request without starting a new one.
    ///
    /// The generation advances so the cancelled request's completion is
    /// discarded.
    pub fn cancel_active(&mut self) {
        if let Some(previous) = self.active.take() {
            previous.cancel();
            self.current += 1;
            self.in_flight = false;
        }
    }

    pub fn current_generation(&self) -> u64 {
        self.current
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct Flag(Rc<Cell<bool>>);

    impl CancelHandle for Flag {
        fn cancel(&self) {
            self.0.set(true);
        }
    }

    impl Flag {
        fn is_set(&self) -> bool {
            self.0.get()
        }
    }

    #[test]
    fn test_generations_are_monotonic() {
        let mut seq = RequestSequencer::new();
        let a = seq.begin(Flag::default());
        let b = seq.begin(Flag::default());
        let c = seq.begin(Flag::default());
        assert_eq!((a.generation, b.generation, c.generation), (1, 2, 3));
    }

    #[test]
    fn test_begin_cancels_previous() {
        let mut seq = RequestSequencer::new();
        let first = Flag::default();
        seq.begin(first.clone());
        assert!(!first.is_set());
        let second = Flag::default();
        seq.begin(second.clone());
        assert!(first.is_set());
        assert!(!second.is_set());
    }

    #[test]
    fn test_stale_result_is_discarded() {
        let mut seq = RequestSequencer::new();
        let a = seq.begin(Flag::default());
        let b = seq.begin(Flag::default());

        // A finishes after B started, success or failure alike.
        assert!(seq.settle(a.generation, Completion::Succeeded("a")).is_discarded());
        assert!(seq
            .settle::<&str>(a.generation, Completion::Failed("boom".into()))
            .is_discarded());
        assert!(seq.is_in_flight());

        assert_eq!(seq.settle(b.generation, Completion::Succeeded("b")), Settlement::Applied("b"));
        assert!(!seq.is_in_flight());
    }

    #[test]
    fn test_current_cancellation_is_silent() {
        let mut seq = RequestSequencer::new();
        let a = seq.begin(Flag::default());
        assert_eq!(seq.settle::<()>(a.generation, Completion::Cancelled), Settlement::Cancelled);
        assert!(!seq.is_in_flight());
    }

    #[test]
    fn test_current_failure_is_surfaced() {
        let mut seq = RequestSequencer::new();
        let a = seq.begin(Flag::default());
        assert_eq!(
            seq.settle::<()>(a.generation, Completion::Failed("503".into())),
            Settlement::Failed("503".into())
        );
        assert!(!seq.is_in_flight());
    }

    #[test]
    fn test_cancel_active_discards_pending() {
        let mut seq = RequestSequencer::new();
        let flag = Flag::default();
        let a = seq.begin(flag.clone());
        seq.cancel_active();
        assert!(flag.is_set());
        assert!(!seq.is_in_flight());
        assert!(seq.settle(a.generation, Completion::Succeeded(1)).is_discarded());
    }

    #[test]
    fn test_generation_settles_once() {
        let mut seq = RequestSequencer::new();
        let flag = Flag::default();
        let a = seq.begin(flag.clone());
        assert_eq!(seq.settle(a.generation, Completion::Succeeded(1)), Settlement::Applied(1));
        assert!(seq.settle(a.generation, Completion::Succeeded(2)).is_discarded());
        assert!(seq
            .settle::<i32>(a.generation, Completion::Failed("late".into()))
            .is_discarded());

        // Nothing left to cancel, so the generation stays put.
        seq.cancel_active();
        assert!(!flag.is_set());
        assert_eq!(seq.current_generation(), a.generation);
        assert!(seq.settle(0, Completion::Succeeded(3)).is_discarded());
    }

    #[test]
    fn test_settle_before_begin_is_discarded() {
        let mut seq = RequestSequencer::<Flag>::new();
        assert!(seq.settle(0, Completion::Succeeded(())).is_discarded());
        assert!(!seq.is_in_flight());
    }
}
