//! Leduc poker: six hands (two copies each of Jack, Queen, King), antes of 1,
//! a single betting street that starts "on the turn" since the hand is
//! decided by one dealt community card (spec §8, scenarios S2/S3). Grounded
//! in the source's `leduc_poker.cpp`.

use crate::card::{disjoint, id_from, suit_of, value_of, ActionId, CardSet, Player, Street};
use crate::game_rules::{ChanceInfo, GameRules, GameState, NodeType, SortedHandRank};

const STREET_START: ActionId = 0;
const FOLD: ActionId = 1;
const CHECK: ActionId = 2;
const CALL: ActionId = 3;
const BET: ActionId = 4;
const RAISE: ActionId = 5;

/// Two copies each of Jack, Queen, King, arbitrarily assigned the heart/spade
/// suits (suit is a bookkeeping label here, not a game-meaningful flush
/// dimension); consecutive pairs share a value.
fn possible_hands() -> [CardSet; 6] {
    [
        id_from(9, 2),
        id_from(9, 3),
        id_from(10, 2),
        id_from(10, 3),
        id_from(11, 2),
        id_from(11, 3),
    ]
    .map(|c| 1u64 << c)
}

pub struct Leduc {
    hands: [CardSet; 6],
    weights: Vec<f32>,
    use_isomorphism: bool,
}

impl Leduc {
    pub fn new(use_isomorphism: bool) -> Self {
        Self {
            hands: possible_hands(),
            weights: vec![1.0; 6],
            use_isomorphism,
        }
    }
}

impl Default for Leduc {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Non-pair hands rank by value; any pair ranks above every non-pair (the
/// community card never pairs with more than one range hand since each value
/// has exactly two cards and one is already on the board).
fn rank_of(hand_value: u8, board_value: u8) -> u32 {
    if hand_value == board_value {
        100 + hand_value as u32
    } else {
        hand_value as u32
    }
}

impl GameRules for Leduc {
    fn initial_state(&self) -> GameState {
        GameState {
            current_board: 0,
            total_wagers: [1, 1],
            dead_money: 0,
            player_to_act: Player::P0,
            last_action: STREET_START,
            // One street: play starts once the would-be preflop round has
            // already happened, i.e. "on the turn" in the shared Street enum.
            current_street: Street::Turn,
            previous_streets_wager: 1,
        }
    }

    fn dead_money(&self) -> i32 {
        0
    }

    fn node_type(&self, state: &GameState) -> NodeType {
        match state.last_action {
            STREET_START => NodeType::Decision,
            FOLD => NodeType::Fold,
            CHECK => {
                if state.player_to_act.opponent() == Player::P1 {
                    if state.current_street == Street::Turn {
                        NodeType::Chance
                    } else {
                        NodeType::Showdown
                    }
                } else {
                    NodeType::Decision
                }
            }
            CALL => {
                if state.current_street == Street::Turn {
                    NodeType::Chance
                } else {
                    NodeType::Showdown
                }
            }
            BET | RAISE => NodeType::Decision,
            _ => unreachable!("invalid Leduc action"),
        }
    }

    fn valid_actions(&self, state: &GameState) -> Vec<ActionId> {
        match state.last_action {
            STREET_START | CHECK => vec![CHECK, BET],
            BET => vec![FOLD, CALL, RAISE],
            RAISE => vec![FOLD, CALL],
            _ => unreachable!("valid_actions called on non-decision state"),
        }
    }

    fn state_after_decision(&self, state: &GameState, action: ActionId) -> GameState {
        let acting_player = state.player_to_act;
        let mut next = GameState {
            player_to_act: acting_player.opponent(),
            last_action: action,
            ..*state
        };
        // Bet size doubles once the community card is dealt (river here).
        let bet_amount = if state.current_street == Street::Turn { 2 } else { 4 };
        match action {
            FOLD | CHECK => {}
            CALL | BET => next.total_wagers[acting_player.index()] += bet_amount,
            RAISE => next.total_wagers[acting_player.index()] += 2 * bet_amount,
            _ => unreachable!("invalid Leduc action"),
        }
        next
    }

    fn chance_info(&self, board: CardSet) -> ChanceInfo {
        debug_assert_eq!(board, 0, "Leduc deals exactly one community card, from an empty board");
        let available = self.hands.iter().fold(0u64, |acc, &h| acc | h);
        let isomorphisms = if self.use_isomorphism { vec![vec![2, 3]] } else { vec![] };
        ChanceInfo { available, isomorphisms }
    }

    fn range_hands(&self, _player: Player) -> &[CardSet] {
        &self.hands
    }

    fn initial_range_weights(&self, _player: Player) -> &[f32] {
        &self.weights
    }

    fn valid_sorted_hand_ranks(&self, _player: Player, board: CardSet) -> Vec<SortedHandRank> {
        let board_value = value_of(board.trailing_zeros() as u8);
        let mut ranks: Vec<SortedHandRank> = self
            .hands
            .iter()
            .enumerate()
            .filter(|(_, &h)| disjoint(h, board))
            .map(|(i, &h)| SortedHandRank {
                rank: rank_of(value_of(h.trailing_zeros() as u8), board_value),
                index: i as u16,
            })
            .collect();
        ranks.sort_by_key(|r| r.rank);
        ranks
    }

    fn index_after_suit_swap(&self, _player: Player, hand_index: u16, parent: u8, child: u8) -> i32 {
        let hand = self.hands[hand_index as usize];
        let card = hand.trailing_zeros() as u8;
        let suit = suit_of(card);
        let new_suit = if suit == parent {
            child
        } else if suit == child {
            parent
        } else {
            return hand_index as i32;
        };
        let swapped = 1u64 << id_from(value_of(card), new_suit);
        self.hands
            .iter()
            .position(|&h| h == swapped)
            .map(|i| i as i32)
            .unwrap_or(-1)
    }

    fn action_name(&self, action: ActionId, _bet_raise_size: i32) -> String {
        match action {
            FOLD => "Fold",
            CHECK => "Check",
            CALL => "Call",
            BET => "Bet",
            RAISE => "Raise",
            _ => "???",
        }
        .to_string()
    }

    fn game_hand_size(&self) -> usize {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Tree;

    #[test]
    fn tree_shape_without_isomorphism() {
        let tree = Tree::build(&Leduc::new(false)).unwrap();
        // scenario S2
        assert_eq!(tree.all_nodes.len(), 465);
        assert_eq!(tree.num_decision_nodes(), 186);
    }

    #[test]
    fn tree_shape_with_isomorphism() {
        let tree = Tree::build(&Leduc::new(true)).unwrap();
        // scenario S3
        assert_eq!(tree.all_nodes.len(), 240);
        assert_eq!(tree.num_decision_nodes(), 96);
    }
}
