//! derived top-8 round boundaries (spec.md §4.2).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SideBoundary {
    pub top8: i32,
    pub bo5: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Top8 {
    pub winner: SideBoundary,
    pub loser: SideBoundary,
}

impl Top8 {
    /// derive from the set of all remote match rounds (spec.md §4.2).
    ///
    /// `start_bo5` is the signed boundary offset from the tournament's
    /// configuration. Ported from the original bracket bot's `_get_top8`
    /// (attributed there to Wonderfall's ATOS), which this implementation
    /// follows exactly rather than spec.md's looser prose, since spec.md
    /// leaves the clamp directions ambiguous.
    pub fn derive(rounds: &[i32], start_bo5: i32) -> Option<Self> {
        if rounds.is_empty() {
            return None;
        }
        let max_round = *rounds.iter().max().unwrap();
        let min_round = *rounds.iter().min().unwrap();

        let mut winner_top8 = max_round - 2;
        let mut loser_top8 = min_round + 2;
        if winner_top8 < 1 {
            winner_top8 = 1;
        }
        if loser_top8 > -1 {
            loser_top8 = -1;
        }

        let mut winner_bo5 = match start_bo5 {
            0 | 1 => winner_top8 + start_bo5,
            n if n > 1 => winner_top8 + n - 1,
            n => winner_top8 + n + 1,
        };
        let mut loser_bo5 = if start_bo5 > 1 {
            min_round
        } else {
            loser_top8 - start_bo5
        };

        if winner_bo5 > max_round {
            winner_bo5 = max_round;
        }
        if winner_bo5 < 1 {
            winner_bo5 = 1;
        }
        if loser_bo5 < min_round {
            loser_bo5 = min_round;
        }
        if loser_bo5 > -1 {
            loser_bo5 = -1;
        }

        Some(Top8 {
            winner: SideBoundary {
                top8: winner_top8,
                bo5: winner_bo5,
            },
            loser: SideBoundary {
                top8: loser_top8,
                bo5: loser_bo5,
            },
        })
    }

    /// whether `round` lies within the top-8 boundary on its side.
    pub fn contains(&self, round: i32) -> bool {
        if round == 0 {
            return false;
        }
        if round > 0 {
            round >= self.winner.top8
        } else {
            round <= self.loser.top8
        }
    }

    /// whether matches at `round` are played best-of-5.
    pub fn is_bo5(&self, round: i32) -> bool {
        if round == 0 {
            return false;
        }
        if round > 0 {
            round >= self.winner.bo5
        } else {
            round <= self.loser.bo5
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_basic_bracket() {
        let rounds = vec![1, 2, 3, 4, 5, -1, -2, -3, -4];
        let top8 = Top8::derive(&rounds, 0).unwrap();
        assert!(top8.winner.top8 >= 1);
        assert!(top8.loser.top8 <= -1);
        assert_eq!(top8.winner.top8, 3);
        assert_eq!(top8.loser.top8, -1);
    }

    #[test]
    fn derive_empty_rounds_is_none() {
        assert!(Top8::derive(&[], 0).is_none());
    }

    #[test]
    fn small_tournament_clamps_to_minimum() {
        let rounds = vec![1, -1];
        let top8 = Top8::derive(&rounds, 0).unwrap();
        assert_eq!(top8.winner.top8, 1);
        assert_eq!(top8.loser.top8, -1);
    }
}
