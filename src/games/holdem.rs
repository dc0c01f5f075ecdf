//! No-limit Hold'em with a configurable flop/turn/river bet tree (spec §8,
//! scenarios S4-S7). Grounded in the source's `holdem.cpp`/`config.hpp`: the
//! action set, node-type dispatch, and wager arithmetic mirror the original,
//! with a deliberate correction (see `DESIGN.md`): raises draw their sizes
//! from `raise_sizes`, never `bet_sizes`. `AllIn` is offered alongside the
//! configured bet/raise sizes whenever shoving would still be a distinct
//! action from calling -- i.e. until both wagers already sit at the
//! effective-stack cap, after which it would just duplicate `Call` and, if
//! offered, would never terminate the action sequence.

use crate::bet_size::{wagers_after_bet, wagers_after_raise};
use crate::card::{disjoint, id_from, set_size, suit_of, value_of, ActionId, CardSet, Player, PlayerArray, Street};
use crate::error::{SolverError, SolverResult};
use crate::game_rules::{ChanceInfo, GameRules, GameState, NodeType, SortedHandRank};
use crate::hand_evaluator::seven_card_hand_rank;

const STREET_START: ActionId = 0;
const FOLD: ActionId = 1;
const CHECK: ActionId = 2;
const CALL: ActionId = 3;
const BET0: ActionId = 4;
const BET1: ActionId = 5;
const BET2: ActionId = 6;
const RAISE0: ActionId = 7;
const RAISE1: ActionId = 8;
const RAISE2: ActionId = 9;
const ALL_IN: ActionId = 10;

const BET_ACTIONS: [ActionId; 3] = [BET0, BET1, BET2];
const RAISE_ACTIONS: [ActionId; 3] = [RAISE0, RAISE1, RAISE2];

/// Bet/raise sizes for one street, as integer percentages of the pot (spec §6).
#[derive(Debug, Clone, Default)]
pub struct StreetSizes {
    pub bet_sizes: Vec<i32>,
    pub raise_sizes: Vec<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct PlayerStreetSizes {
    pub flop: StreetSizes,
    pub turn: StreetSizes,
    pub river: StreetSizes,
}

impl PlayerStreetSizes {
    fn for_street(&self, street: Street) -> &StreetSizes {
        match street {
            Street::Flop => &self.flop,
            Street::Turn => &self.turn,
            Street::River => &self.river,
        }
    }
}

pub struct Settings {
    pub board: CardSet,
    pub starting_wager_per_player: i32,
    pub effective_stack_remaining: i32,
    pub dead_money_in_pot: i32,
    pub use_isomorphism: bool,
    /// Indexed by `Player::index()`: `[0]` is OOP (acts first each street),
    /// `[1]` is IP.
    pub actions: PlayerArray<PlayerStreetSizes>,
    pub range_hands: PlayerArray<Vec<CardSet>>,
    pub range_weights: PlayerArray<Vec<f32>>,
}

impl Settings {
    fn validate(&self) -> SolverResult<()> {
        let num_board_cards = set_size(self.board);
        if !(3..=5).contains(&num_board_cards) {
            return Err(SolverError::config(format!(
                "board must have 3, 4, or 5 cards, got {num_board_cards}"
            )));
        }
        for player_sizes in &self.actions {
            for street in [Street::Flop, Street::Turn, Street::River] {
                let sizes = player_sizes.for_street(street);
                for list in [&sizes.bet_sizes, &sizes.raise_sizes] {
                    if list.len() > crate::bet_size::MAX_SIZES_PER_STREET {
                        return Err(SolverError::config(format!(
                            "at most {} sizes per street, got {}",
                            crate::bet_size::MAX_SIZES_PER_STREET,
                            list.len()
                        )));
                    }
                    if list.iter().any(|&p| p <= 0) {
                        return Err(SolverError::config("bet/raise percentages must be positive"));
                    }
                }
            }
        }
        if self.starting_wager_per_player <= 0 || self.effective_stack_remaining <= 0 {
            return Err(SolverError::config("wagers and effective stack must be positive"));
        }
        if self.dead_money_in_pot < 0 {
            return Err(SolverError::config("dead money cannot be negative"));
        }
        Ok(())
    }

    fn starting_street(&self) -> Street {
        match set_size(self.board) {
            3 => Street::Flop,
            4 => Street::Turn,
            5 => Street::River,
            n => unreachable!("board size already validated, got {n}"),
        }
    }
}

pub struct Holdem {
    settings: Settings,
    starting_street: Street,
}

impl Holdem {
    pub fn new(settings: Settings) -> SolverResult<Self> {
        settings.validate()?;
        let starting_street = settings.starting_street();
        Ok(Self { settings, starting_street })
    }

    fn street_sizes(&self, state: &GameState) -> &StreetSizes {
        self.settings.actions[state.player_to_act.index()].for_street(state.current_street)
    }
}

impl GameRules for Holdem {
    fn initial_state(&self) -> GameState {
        GameState {
            current_board: self.settings.board,
            total_wagers: [self.settings.starting_wager_per_player; 2],
            dead_money: self.settings.dead_money_in_pot,
            player_to_act: Player::P0,
            last_action: STREET_START,
            current_street: self.starting_street,
            previous_streets_wager: self.settings.starting_wager_per_player,
        }
    }

    fn dead_money(&self) -> i32 {
        self.settings.dead_money_in_pot
    }

    fn node_type(&self, state: &GameState) -> NodeType {
        match state.last_action {
            STREET_START => NodeType::Decision,
            FOLD => NodeType::Fold,
            CHECK => {
                // player_to_act is who acts next; if that's P1, P0 just checked
                // and action continues. If P1's opponent (P0) is up next, P1
                // just checked after P0 did, closing the street.
                if state.player_to_act.opponent() == Player::P1 {
                    if state.current_street == Street::River {
                        NodeType::Showdown
                    } else {
                        NodeType::Chance
                    }
                } else {
                    NodeType::Decision
                }
            }
            CALL => {
                if state.current_street == Street::River {
                    NodeType::Showdown
                } else {
                    NodeType::Chance
                }
            }
            // An all-in only closes the street if it actually equalizes the
            // wagers (the acting player was calling an existing shove); an
            // all-in that raises over a smaller opposing wager leaves the
            // opponent with a decision.
            ALL_IN if state.total_wagers[0] == state.total_wagers[1] => {
                if state.current_street == Street::River {
                    NodeType::Showdown
                } else {
                    NodeType::Chance
                }
            }
            BET0 | BET1 | BET2 | RAISE0 | RAISE1 | RAISE2 | ALL_IN => NodeType::Decision,
            _ => unreachable!("invalid Hold'em action"),
        }
    }

    fn valid_actions(&self, state: &GameState) -> Vec<ActionId> {
        let sizes = self.street_sizes(state);
        let acting = state.player_to_act;
        let effective_stack = self.settings.effective_stack_remaining;
        let dead_money = self.settings.dead_money_in_pot;

        // Shoving is only a distinct action from calling/betting the
        // configured sizes when it actually pushes a stack neither player has
        // already reached; once both wagers sit at the cap, an "all-in"
        // would just duplicate a call.
        let all_in_is_live =
            state.total_wagers[0] < effective_stack && state.total_wagers[1] < effective_stack;

        match state.last_action {
            STREET_START | CHECK => {
                let mut actions = vec![CHECK];
                for (&action, &percentage) in BET_ACTIONS.iter().zip(sizes.bet_sizes.iter()) {
                    if wagers_after_bet(state.total_wagers, acting, percentage, dead_money, effective_stack).is_some() {
                        actions.push(action);
                    }
                }
                if all_in_is_live {
                    actions.push(ALL_IN);
                }
                actions
            }
            BET0 | BET1 | BET2 | RAISE0 | RAISE1 | RAISE2 | ALL_IN => {
                let mut actions = vec![FOLD, CALL];
                for (&action, &percentage) in RAISE_ACTIONS.iter().zip(sizes.raise_sizes.iter()) {
                    if wagers_after_raise(state.total_wagers, acting, percentage, dead_money, effective_stack).is_some() {
                        actions.push(action);
                    }
                }
                if all_in_is_live {
                    actions.push(ALL_IN);
                }
                actions
            }
            _ => unreachable!("valid_actions called on non-decision state"),
        }
    }

    fn state_after_decision(&self, state: &GameState, action: ActionId) -> GameState {
        let acting = state.player_to_act;
        let dead_money = self.settings.dead_money_in_pot;
        let effective_stack = self.settings.effective_stack_remaining;

        let mut next = GameState {
            player_to_act: acting.opponent(),
            last_action: action,
            ..*state
        };

        next.total_wagers = match action {
            FOLD | CHECK => state.total_wagers,
            CALL => {
                let mut w = state.total_wagers;
                w[acting.index()] = w[acting.opponent().index()];
                w
            }
            BET0 | BET1 | BET2 => {
                let idx = (action - BET0) as usize;
                let percentage = self.street_sizes(state).bet_sizes[idx];
                wagers_after_bet(state.total_wagers, acting, percentage, dead_money, effective_stack)
                    .expect("action was validated by valid_actions")
            }
            RAISE0 | RAISE1 | RAISE2 => {
                let idx = (action - RAISE0) as usize;
                let percentage = self.street_sizes(state).raise_sizes[idx];
                wagers_after_raise(state.total_wagers, acting, percentage, dead_money, effective_stack)
                    .expect("action was validated by valid_actions")
            }
            ALL_IN => {
                let mut w = state.total_wagers;
                w[acting.index()] = effective_stack;
                w
            }
            _ => unreachable!("invalid Hold'em action"),
        };
        next
    }

    fn chance_info(&self, board: CardSet) -> ChanceInfo {
        let mut value_mask_per_suit = [0u16; 4];
        let mut remaining = board;
        while remaining != 0 {
            let card = remaining.trailing_zeros() as u8;
            remaining &= !(1u64 << card);
            value_mask_per_suit[suit_of(card) as usize] |= 1 << value_of(card);
        }

        let isomorphisms = if self.settings.use_isomorphism {
            let mut classes: Vec<Vec<u8>> = Vec::new();
            for suit in 0..4u8 {
                if let Some(class) = classes
                    .iter_mut()
                    .find(|class| value_mask_per_suit[class[0] as usize] == value_mask_per_suit[suit as usize])
                {
                    class.push(suit);
                } else {
                    classes.push(vec![suit]);
                }
            }
            classes.into_iter().filter(|c| c.len() > 1).collect()
        } else {
            Vec::new()
        };

        ChanceInfo {
            available: crate::card::FULL_DECK & !board,
            isomorphisms,
        }
    }

    fn range_hands(&self, player: Player) -> &[CardSet] {
        &self.settings.range_hands[player.index()]
    }

    fn initial_range_weights(&self, player: Player) -> &[f32] {
        &self.settings.range_weights[player.index()]
    }

    fn valid_sorted_hand_ranks(&self, player: Player, board: CardSet) -> Vec<SortedHandRank> {
        let hands = &self.settings.range_hands[player.index()];
        let mut ranks: Vec<SortedHandRank> = hands
            .iter()
            .enumerate()
            .filter(|(_, &hand)| disjoint(hand, board))
            .map(|(i, &hand)| SortedHandRank {
                rank: seven_card_hand_rank(hand | board),
                index: i as u16,
            })
            .collect();
        ranks.sort_by_key(|r| r.rank);
        ranks
    }

    fn index_after_suit_swap(&self, player: Player, hand_index: u16, parent: u8, child: u8) -> i32 {
        let hands = &self.settings.range_hands[player.index()];
        let hand = hands[hand_index as usize];
        let mut remaining = hand;
        let mut swapped = 0u64;
        while remaining != 0 {
            let card = remaining.trailing_zeros() as u8;
            remaining &= !(1u64 << card);
            let suit = suit_of(card);
            let new_suit = if suit == parent {
                child
            } else if suit == child {
                parent
            } else {
                suit
            };
            swapped |= 1u64 << id_from(value_of(card), new_suit);
        }
        hands.iter().position(|&h| h == swapped).map(|i| i as i32).unwrap_or(-1)
    }

    fn action_name(&self, action: ActionId, bet_raise_size: i32) -> String {
        match action {
            FOLD => "Fold".to_string(),
            CHECK => "Check".to_string(),
            CALL => "Call".to_string(),
            ALL_IN => "AllIn".to_string(),
            BET0 | BET1 | BET2 => format!("Bet{bet_raise_size}"),
            RAISE0 | RAISE1 | RAISE2 => format!("Raise{bet_raise_size}"),
            _ => "???".to_string(),
        }
    }

    fn game_hand_size(&self) -> usize {
        2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::card_from_str;
    use crate::tree::Tree;

    fn board_of(cards: &[&str]) -> CardSet {
        cards.iter().fold(0u64, |set, c| set | (1u64 << card_from_str(c).unwrap()))
    }

    fn ax_range(player_holds: &[&str]) -> (Vec<CardSet>, Vec<f32>) {
        let hands: Vec<CardSet> = player_holds
            .iter()
            .map(|pair| {
                let c0 = card_from_str(&pair[0..2]).unwrap();
                let c1 = card_from_str(&pair[2..4]).unwrap();
                (1u64 << c0) | (1u64 << c1)
            })
            .collect();
        let weights = vec![1.0; hands.len()];
        (hands, weights)
    }

    fn no_sizes() -> PlayerStreetSizes {
        PlayerStreetSizes::default()
    }

    #[test]
    fn rainbow_flop_has_no_isomorphism_classes() {
        // S4: Ah 7c 2s has three distinct suits on board; only spades-free
        // diamond is left alone, so no suit has a size-2+ equivalence class.
        let (oop_hands, oop_weights) = ax_range(&["AsKs", "QdQh"]);
        let (ip_hands, ip_weights) = ax_range(&["KdKh", "JsTs"]);
        let settings = Settings {
            board: board_of(&["Ah", "7c", "2s"]),
            starting_wager_per_player: 10,
            effective_stack_remaining: 1000,
            dead_money_in_pot: 0,
            use_isomorphism: true,
            actions: [no_sizes(), no_sizes()],
            range_hands: [oop_hands, ip_hands],
            range_weights: [oop_weights, ip_weights],
        };
        let holdem = Holdem::new(settings).unwrap();
        let info = holdem.chance_info(holdem.initial_state().current_board);
        assert!(info.isomorphisms.is_empty());
    }

    #[test]
    fn monotone_flop_has_one_isomorphism_class_of_three() {
        // S5: Ah 7h 2h is monotone in hearts; the three suits absent from the
        // board (clubs, diamonds, spades) form one equivalence class.
        let (oop_hands, oop_weights) = ax_range(&["AsKs", "QdQc"]);
        let (ip_hands, ip_weights) = ax_range(&["KdKc", "JsTd"]);
        let settings = Settings {
            board: board_of(&["Ah", "7h", "2h"]),
            starting_wager_per_player: 10,
            effective_stack_remaining: 1000,
            dead_money_in_pot: 0,
            use_isomorphism: true,
            actions: [no_sizes(), no_sizes()],
            range_hands: [oop_hands, ip_hands],
            range_weights: [oop_weights, ip_weights],
        };
        let holdem = Holdem::new(settings).unwrap();
        let info = holdem.chance_info(holdem.initial_state().current_board);
        assert_eq!(info.isomorphisms.len(), 1);
        assert_eq!(info.isomorphisms[0].len(), 3);
    }

    #[test]
    fn river_start_goes_straight_to_decision_then_showdown() {
        let (oop_hands, oop_weights) = ax_range(&["AsKs", "QdQc"]);
        let (ip_hands, ip_weights) = ax_range(&["KdKh", "JsTd"]);
        let settings = Settings {
            board: board_of(&["Ah", "7h", "2h", "3d", "9c"]),
            starting_wager_per_player: 10,
            effective_stack_remaining: 1000,
            dead_money_in_pot: 0,
            use_isomorphism: false,
            actions: [no_sizes(), no_sizes()],
            range_hands: [oop_hands, ip_hands],
            range_weights: [oop_weights, ip_weights],
        };
        let holdem = Holdem::new(settings).unwrap();
        let tree = Tree::build(&holdem).unwrap();
        assert!(!tree.all_nodes.is_empty());
    }

    fn river_holdem(starting_wager: i32, effective_stack: i32, actions: PlayerStreetSizes) -> Holdem {
        let (oop_hands, oop_weights) = ax_range(&["AsKs", "QdQc"]);
        let (ip_hands, ip_weights) = ax_range(&["KdKh", "JsTd"]);
        let settings = Settings {
            board: board_of(&["Ah", "7h", "2h", "3d", "9c"]),
            starting_wager_per_player: starting_wager,
            effective_stack_remaining: effective_stack,
            dead_money_in_pot: 0,
            use_isomorphism: false,
            actions: [actions.clone(), actions],
            range_hands: [oop_hands, ip_hands],
            range_weights: [oop_weights, ip_weights],
        };
        Holdem::new(settings).unwrap()
    }

    #[test]
    fn fold_is_terminal_and_adds_no_wagers() {
        // S7: Check, Fold from wagers=12 each leaves terminal wagers at (12,12).
        let holdem = river_holdem(12, 1000, no_sizes());
        let after_check = holdem.state_after_decision(&holdem.initial_state(), CHECK);
        assert_eq!(holdem.node_type(&after_check), NodeType::Decision);
        let after_fold = holdem.state_after_decision(&after_check, FOLD);
        assert_eq!(holdem.node_type(&after_fold), NodeType::Fold);
        assert_eq!(after_fold.total_wagers, [12, 12]);
    }

    #[test]
    fn all_in_sized_bet_is_elided_from_valid_actions() {
        // S8: when a 33% bet would equal or exceed all-in, Bet33 is absent.
        let sizes = PlayerStreetSizes {
            flop: StreetSizes::default(),
            turn: StreetSizes::default(),
            river: StreetSizes {
                bet_sizes: vec![33],
                raise_sizes: vec![],
            },
        };
        let holdem = river_holdem(45, 50, sizes);
        let actions = holdem.valid_actions(&holdem.initial_state());
        assert!(!actions.contains(&BET0));
    }
}
