//! Auction winner selection.
//!
//! The winner of a closed auction is the pending bid with the minimum
//! total price; ties are broken by earliest submission time, then by
//! lowest bid id. The ordering is total and deterministic, never an
//! artifact of a storage query plan.

use crate::types::{DbId, Money, Timestamp};

/// The slice of a bid that winner selection needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BidCandidate {
    pub bid_id: DbId,
    pub total_price: Money,
    pub created_at: Timestamp,
}

/// Select the winning bid among `candidates`.
///
/// Returns `None` when there are no candidates (the request is cancelled
/// instead of closed).
pub fn select_winner(candidates: &[BidCandidate]) -> Option<&BidCandidate> {
    candidates
        .iter()
        .min_by_key(|c| (c.total_price, c.created_at, c.bid_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn candidate(bid_id: DbId, total_price: Money, secs: i64) -> BidCandidate {
        BidCandidate {
            bid_id,
            total_price,
            created_at: Utc.timestamp_opt(1_760_000_000 + secs, 0).unwrap(),
        }
    }

    #[test]
    fn empty_slice_has_no_winner() {
        assert!(select_winner(&[]).is_none());
    }

    #[test]
    fn single_bid_wins() {
        let bids = [candidate(1, 200_000, 0)];
        assert_eq!(select_winner(&bids).unwrap().bid_id, 1);
    }

    #[test]
    fn lowest_price_wins() {
        let bids = [
            candidate(1, 200_000, 0),
            candidate(2, 185_000, 10),
            candidate(3, 190_000, 20),
        ];
        assert_eq!(select_winner(&bids).unwrap().bid_id, 2);
    }

    #[test]
    fn tie_broken_by_earliest_submission() {
        // B1 at 200000, B2 and B3 tied at 185000: B2 was submitted first
        // and must always win.
        let bids = [
            candidate(1, 200_000, 0),
            candidate(2, 185_000, 10),
            candidate(3, 185_000, 20),
        ];
        assert_eq!(select_winner(&bids).unwrap().bid_id, 2);
    }

    #[test]
    fn tie_is_stable_regardless_of_input_order() {
        let mut bids = vec![
            candidate(3, 185_000, 20),
            candidate(1, 200_000, 0),
            candidate(2, 185_000, 10),
        ];
        assert_eq!(select_winner(&bids).unwrap().bid_id, 2);
        bids.reverse();
        assert_eq!(select_winner(&bids).unwrap().bid_id, 2);
    }

    #[test]
    fn identical_timestamps_fall_back_to_lowest_id() {
        let bids = [candidate(8, 185_000, 5), candidate(4, 185_000, 5)];
        assert_eq!(select_winner(&bids).unwrap().bid_id, 4);
    }
}
