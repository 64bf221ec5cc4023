use serde::Serialize;

use crate::domain::recognition::UserId;
use crate::ledger::{LedgerSnapshot, Tally};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub user_id: UserId,
    pub count: u64,
    pub rank: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LeaderboardSummary {
    pub top_givers: Vec<LeaderboardEntry>,
    pub top_receivers: Vec<LeaderboardEntry>,
}

impl LeaderboardSummary {
    pub fn is_empty(&self) -> bool {
        self.top_givers.is_empty() && self.top_receivers.is_empty()
    }
}

/// Highest counts first. Equal counts keep the tally's first-appearance order,
/// so ranks are positional rather than shared.
pub fn top_n(tally: &Tally, n: usize) -> Vec<LeaderboardEntry> {
    if n == 0 {
        return Vec::new();
    }

    let mut ranked: Vec<(&UserId, u64)> = tally.iter().collect();
    // sort_by is stable
    ranked.sort_by(|left, right| right.1.cmp(&left.1));

    ranked
        .into_iter()
        .take(n)
        .enumerate()
        .map(|(position, (user_id, count))| LeaderboardEntry {
            user_id: user_id.clone(),
            count,
            rank: position + 1,
        })
        .collect()
}

pub fn render_summary(ledger: &LedgerSnapshot, n: usize) -> LeaderboardSummary {
    LeaderboardSummary {
        top_givers: top_n(&ledger.given_counts, n),
        top_receivers: top_n(&ledger.received_counts, n),
    }
}

#[cfg(test)]
mod tests {
    use super::{render_summary, top_n, LeaderboardEntry};
    use crate::domain::recognition::UserId;
    use crate::ledger::{LedgerSnapshot, Tally};

    fn user(id: &str) -> UserId {
        UserId(id.to_owned())
    }

    fn scenario_ledger() -> LedgerSnapshot {
        let mut ledger = LedgerSnapshot::default();
        for (giver, receiver) in [("A", "B"), ("A", "C"), ("D", "B")] {
            ledger.record(&user(giver), &user(receiver));
        }
        ledger
    }

    #[test]
    fn top_receivers_match_recorded_scenario() {
        let ledger = scenario_ledger();

        assert_eq!(
            top_n(&ledger.received_counts, 2),
            vec![
                LeaderboardEntry { user_id: user("B"), count: 2, rank: 1 },
                LeaderboardEntry { user_id: user("C"), count: 1, rank: 2 },
            ]
        );
    }

    #[test]
    fn ties_keep_first_appearance_order() {
        let tally: Tally = [(user("late"), 1), (user("busy"), 3), (user("early"), 1)]
            .into_iter()
            .collect();

        let ranked = top_n(&tally, 10);
        let order: Vec<&str> = ranked.iter().map(|entry| entry.user_id.as_str()).collect();
        assert_eq!(order, vec!["busy", "late", "early"]);
        assert_eq!(ranked.iter().map(|entry| entry.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn truncates_to_requested_size_without_mutating_input() {
        let tally: Tally =
            (0..6).map(|index| (user(&format!("U{index}")), index as u64)).collect();
        let before = tally.clone();

        let ranked = top_n(&tally, 3);
        assert_eq!(ranked.len(), 3);
        assert!(ranked.windows(2).all(|pair| pair[0].count >= pair[1].count));
        assert_eq!(ranked[0].user_id.as_str(), "U5");
        assert_eq!(tally, before);

        assert_eq!(top_n(&tally, 50).len(), 6);
    }

    #[test]
    fn zero_limit_yields_empty_list() {
        assert!(top_n(&scenario_ledger().given_counts, 0).is_empty());
    }

    #[test]
    fn empty_ledger_renders_two_empty_lists() {
        let summary = render_summary(&LedgerSnapshot::default(), 5);
        assert!(summary.top_givers.is_empty());
        assert!(summary.top_receivers.is_empty());
        assert!(summary.is_empty());
    }

    #[test]
    fn summary_ranks_givers_and_receivers_independently() {
        let summary = render_summary(&scenario_ledger(), 1);
        assert_eq!(summary.top_givers, vec![LeaderboardEntry { user_id: user("A"), count: 2, rank: 1 }]);
        assert_eq!(
            summary.top_receivers,
            vec![LeaderboardEntry { user_id: user("B"), count: 2, rank: 1 }]
        );
    }
}
