//! Rental-request state machine.
//!
//! This module lives in `core` (zero internal deps) so it can be used by
//! both the repository layer and the auction engine.

/// Request status IDs matching `request_statuses` seed data (1-based
/// SMALLSERIAL).
///
/// The state machine is intentionally duplicated from the `db` crate's
/// `RequestStatus` enum because `core` must have zero internal deps.
pub mod state_machine {
    /// Returns the set of valid target status IDs reachable from `from_status`.
    ///
    /// Terminal states (Completed=4, Cancelled=5) return an empty slice
    /// because no further transitions are allowed.
    pub fn valid_transitions(from_status: i16) -> &'static [i16] {
        match from_status {
            // Pending -> AuctionActive, Cancelled
            1 => &[2, 5],
            // AuctionActive -> AuctionClosed (winner set), Cancelled (no bids)
            2 => &[3, 5],
            // AuctionClosed -> Completed
            3 => &[4],
            // Terminal states: Completed, Cancelled
            4 | 5 => &[],
            // Unknown status: no transitions allowed
            _ => &[],
        }
    }

    /// Check whether a transition from `from` to `to` is valid.
    pub fn can_transition(from: i16, to: i16) -> bool {
        valid_transitions(from).contains(&to)
    }

    /// Validate a state transition, returning an error message for invalid ones.
    pub fn validate_transition(from: i16, to: i16) -> Result<(), String> {
        if can_transition(from, to) {
            Ok(())
        } else {
            let from_name = status_name(from);
            let to_name = status_name(to);
            Err(format!(
                "Invalid transition: {from_name} ({from}) -> {to_name} ({to})"
            ))
        }
    }

    /// Human-readable name for a status ID (for error messages).
    fn status_name(id: i16) -> &'static str {
        match id {
            1 => "Pending",
            2 => "AuctionActive",
            3 => "AuctionClosed",
            4 => "Completed",
            5 => "Cancelled",
            _ => "Unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::state_machine::*;

    // -----------------------------------------------------------------------
    // Valid transitions
    // -----------------------------------------------------------------------

    #[test]
    fn pending_to_auction_active() {
        assert!(can_transition(1, 2));
    }

    #[test]
    fn active_to_closed() {
        assert!(can_transition(2, 3));
    }

    #[test]
    fn active_to_cancelled() {
        assert!(can_transition(2, 5));
    }

    #[test]
    fn closed_to_completed() {
        assert!(can_transition(3, 4));
    }

    // -----------------------------------------------------------------------
    // Invalid transitions
    // -----------------------------------------------------------------------

    #[test]
    fn closed_cannot_reopen() {
        assert!(!can_transition(3, 2));
    }

    #[test]
    fn cancelled_is_terminal() {
        assert!(valid_transitions(5).is_empty());
    }

    #[test]
    fn completed_is_terminal() {
        assert!(valid_transitions(4).is_empty());
    }

    #[test]
    fn active_cannot_complete_directly() {
        assert!(!can_transition(2, 4));
    }

    #[test]
    fn unknown_status_has_no_transitions() {
        assert!(valid_transitions(99).is_empty());
    }

    #[test]
    fn validate_transition_error_names_both_states() {
        let err = validate_transition(3, 2).unwrap_err();
        assert!(err.contains("AuctionClosed"));
        assert!(err.contains("AuctionActive"));
    }
}
