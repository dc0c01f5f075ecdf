//! Kuhn poker: the three-card toy game used as the solver's smallest
//! end-to-end fixture (spec §8, scenario S1). Grounded in the source's
//! `kuhn_poker.cpp`: one street (the whole hand plays out "on the river"),
//! no chance nodes, antes of 1 chip each.

use crate::card::{id_from, value_of, ActionId, CardSet, Player, Street};
use crate::game_rules::{ChanceInfo, GameRules, GameState, NodeType, SortedHandRank};

const GAME_START: ActionId = 0;
const FOLD: ActionId = 1;
const CHECK: ActionId = 2;
const CALL: ActionId = 3;
const BET: ActionId = 4;

/// Jack, Queen, King as three distinct single-card hands (suit is irrelevant).
fn possible_hands() -> [CardSet; 3] {
    [id_from(0, 0), id_from(1, 0), id_from(2, 0)].map(|c| 1u64 << c)
}

pub struct Kuhn {
    hands: [CardSet; 3],
    weights: Vec<f32>,
}

impl Kuhn {
    pub fn new() -> Self {
        Self {
            hands: possible_hands(),
            weights: vec![1.0; 3],
        }
    }
}

impl Default for Kuhn {
    fn default() -> Self {
        Self::new()
    }
}

impl GameRules for Kuhn {
    fn initial_state(&self) -> GameState {
        GameState {
            current_board: 0,
            total_wagers: [1, 1],
            dead_money: 0,
            player_to_act: Player::P0,
            last_action: GAME_START,
            // Kuhn has one street and no community cards, so play starts "on
            // the river".
            current_street: Street::River,
            previous_streets_wager: 1,
        }
    }

    fn dead_money(&self) -> i32 {
        0
    }

    fn node_type(&self, state: &GameState) -> NodeType {
        match state.last_action {
            GAME_START => NodeType::Decision,
            FOLD => NodeType::Fold,
            CHECK => {
                if state.player_to_act.opponent() == Player::P1 {
                    NodeType::Showdown
                } else {
                    NodeType::Decision
                }
            }
            CALL => NodeType::Showdown,
            BET => NodeType::Decision,
            _ => unreachable!("invalid Kuhn action"),
        }
    }

    fn valid_actions(&self, state: &GameState) -> Vec<ActionId> {
        match state.last_action {
            GAME_START | CHECK => vec![CHECK, BET],
            BET => vec![FOLD, CALL],
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
        if action == CALL || action == BET {
            next.total_wagers[acting_player.index()] += 1;
        }
        next
    }

    fn chance_info(&self, _board: CardSet) -> ChanceInfo {
        unreachable!("Kuhn poker has no chance nodes")
    }

    fn range_hands(&self, _player: Player) -> &[CardSet] {
        &self.hands
    }

    fn initial_range_weights(&self, _player: Player) -> &[f32] {
        &self.weights
    }

    fn valid_sorted_hand_ranks(&self, _player: Player, _board: CardSet) -> Vec<SortedHandRank> {
        let mut ranks: Vec<SortedHandRank> = self
            .hands
            .iter()
            .enumerate()
            .map(|(i, &h)| SortedHandRank {
                rank: value_of(h.trailing_zeros() as u8) as u32,
                index: i as u16,
            })
            .collect();
        ranks.sort_by_key(|r| r.rank);
        ranks
    }

    fn index_after_suit_swap(&self, _player: Player, hand_index: u16, _parent: u8, _child: u8) -> i32 {
        hand_index as i32
    }

    fn action_name(&self, action: ActionId, _bet_raise_size: i32) -> String {
        match action {
            FOLD => "Fold",
            CHECK => "Check",
            CALL => "Call",
            BET => "Bet",
            _ => "???",
        }
        .to_string()
    }

    fn game_hand_size(&self) -> usize {
        1
    }
}
