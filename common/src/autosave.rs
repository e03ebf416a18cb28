//! Sequencing for wizard saves.
//!
//! The wizard saves after every step change and again shortly after the
//! prospect stops typing, so a debounced save can be in flight while a
//! manual one starts. Each save takes a token from `SaveSequencer`; when a
//! response arrives it is applied only if no newer save has already been
//! acknowledged. Responses are never reordered or retried.

/// Quiet period after the last edit before an autosave fires.
pub const AUTOSAVE_DEBOUNCE_MS: u32 = 2_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SaveToken(u64);

impl SaveToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Newest acknowledged save; its result should be reflected in the UI.
    Applied,
    /// A newer save was already acknowledged; drop this response.
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Idle,
    Saving,
    Saved,
    Failed,
}

#[derive(Debug, Default, Clone)]
pub struct SaveSequencer {
    issued: u64,
    acknowledged: u64,
    in_flight: usize,
    last_error: Option<String>,
}

impl SaveSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves the token for a save about to be sent.
    pub fn begin(&mut self) -> SaveToken {
        self.issued += 1;
        self.in_flight += 1;
        SaveToken(self.issued)
    }

    /// Records a successful response.
    pub fn succeed(&mut self, token: SaveToken) -> SaveOutcome {
        self.finish();
        if token.0 <= self.acknowledged {
            return SaveOutcome::Stale;
        }
        self.acknowledged = token.0;
        self.last_error = None;
        SaveOutcome::Applied
    }

    /// Records a failed response. A failure older than the newest
    /// acknowledged save is irrelevant and reported as stale.
    pub fn fail(&mut self, token: SaveToken, message: impl Into<String>) -> SaveOutcome {
        self.finish();
        if token.0 <= self.acknowledged {
            return SaveOutcome::Stale;
        }
        self.last_error = Some(message.into());
        SaveOutcome::Applied
    }

    fn finish(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    pub fn latest_issued(&self) -> Option<SaveToken> {
        (self.issued > 0).then_some(SaveToken(self.issued))
    }

    pub fn is_saving(&self) -> bool {
        self.in_flight > 0
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn status(&self) -> SaveStatus {
        if self.in_flight > 0 {
            SaveStatus::Saving
        } else if self.last_error.is_some() {
            SaveStatus::Failed
        } else if self.acknowledged > 0 {
            SaveStatus::Saved
        } else {
            SaveStatus::Idle
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_order_response_is_stale() {
        let mut seq = SaveSequencer::new();
        let debounced = seq.begin();
        let manual = seq.begin();
        assert_eq!(seq.status(), SaveStatus::Saving);

        assert_eq!(seq.succeed(manual), SaveOutcome::Applied);
        assert_eq!(seq.succeed(debounced), SaveOutcome::Stale);
        assert_eq!(seq.status(), SaveStatus::Saved);
    }

    #[test]
    fn in_order_responses_all_apply() {
        let mut seq = SaveSequencer::new();
        let first = seq.begin();
        let second = seq.begin();
        assert_eq!(seq.succeed(first), SaveOutcome::Applied);
        assert_eq!(seq.succeed(second), SaveOutcome::Applied);
        assert_eq!(seq.latest_issued(), Some(second));
    }

    #[test]
    fn failure_is_cleared_by_newer_success_and_old_failure_ignored() {
        let mut seq = SaveSequencer::new();
        let a = seq.begin();
        let b = seq.begin();
        assert_eq!(seq.fail(a, "offline"), SaveOutcome::Applied);
        assert_eq!(seq.last_error(), Some("offline"));
        assert_eq!(seq.succeed(b), SaveOutcome::Applied);
        assert_eq!(seq.status(), SaveStatus::Saved);

        let c = seq.begin();
        let d = seq.begin();
        assert_eq!(seq.succeed(d), SaveOutcome::Applied);
        assert_eq!(seq.fail(c, "timeout"), SaveOutcome::Stale);
        assert_eq!(seq.last_error(), None);
    }
}
