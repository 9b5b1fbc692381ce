use dealroom_core::Money;
use dealroom_core::Round;

/// Inputs to the per-contestant scoring formula, captured at settlement.
#[derive(Debug, Clone, Copy)]
pub struct Outcome {
    pub final_winnings: Money,
    pub final_box_value: Money,
    pub round_dealt: Round,
    pub is_last_standing: bool,
    pub is_highest_winnings: bool,
    pub timeout_count: u32,
}

/// Pure scoring function mapping a settled outcome to points.
pub struct Scoring;

impl Scoring {
    pub fn points(outcome: Outcome) -> i64 {
        let mut pts = ((outcome.final_winnings / 100.0).floor() as i64).min(3_000);
        if outcome.final_winnings > outcome.final_box_value {
            pts += 200; // smart deal
        }
        if outcome.round_dealt >= 4 {
            pts += 150; // guts
        }
        if outcome.round_dealt <= 2 {
            pts -= 50; // early exit
        }
        if outcome.is_last_standing {
            pts += 200;
        }
        if outcome.is_highest_winnings {
            pts += 200;
        }
        pts -= 50 * outcome.timeout_count as i64;
        pts.max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Outcome {
        Outcome {
            final_winnings: 0.0,
            final_box_value: 0.0,
            round_dealt: 1,
            is_last_standing: false,
            is_highest_winnings: false,
            timeout_count: 0,
        }
    }

    #[test]
    fn winnings_floor_division_caps_at_3000() {
        let outcome = Outcome {
            final_winnings: 1_000_000.0,
            round_dealt: 3,
            ..base()
        };
        assert_eq!(Scoring::points(outcome), 3_000);
    }

    #[test]
    fn smart_deal_bonus() {
        let outcome = Outcome {
            final_winnings: 500.0,
            final_box_value: 10.0,
            round_dealt: 3,
            ..base()
        };
        // floor(500/100)=5, +200 smart deal = 205
        assert_eq!(Scoring::points(outcome), 205);
    }

    #[test]
    fn guts_and_early_exit_are_mutually_exclusive_by_round() {
        let guts = Outcome {
            round_dealt: 4,
            ..base()
        };
        assert_eq!(Scoring::points(guts), 150);
        let early = Outcome {
            round_dealt: 2,
            ..base()
        };
        assert_eq!(Scoring::points(early), 0); // -50 clamped at 0
    }

    #[test]
    fn last_standing_and_highest_winnings_stack() {
        let outcome = Outcome {
            is_last_standing: true,
            is_highest_winnings: true,
            round_dealt: 3,
            ..base()
        };
        assert_eq!(Scoring::points(outcome), 400);
    }

    #[test]
    fn timeout_penalty_accrues_per_count() {
        let outcome = Outcome {
            final_winnings: 1_000.0,
            round_dealt: 3,
            timeout_count: 3,
            ..base()
        };
        // floor(1000/100)=10, -150 timeouts = -140 -> clamped 0
        assert_eq!(Scoring::points(outcome), 0);
    }

    #[test]
    fn points_never_go_negative() {
        let outcome = Outcome {
            round_dealt: 1,
            timeout_count: 10,
            ..base()
        };
        assert_eq!(Scoring::points(outcome), 0);
    }

    #[test]
    fn scoring_is_a_pure_function() {
        let outcome = Outcome {
            final_winnings: 750.0,
            final_box_value: 100.0,
            round_dealt: 4,
            is_last_standing: false,
            is_highest_winnings: true,
            timeout_count: 1,
        };
        assert_eq!(Scoring::points(outcome), Scoring::points(outcome));
    }
}
