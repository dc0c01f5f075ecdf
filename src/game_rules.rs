//! The `GameRules` capability contract (spec §4.3, component C3) and the node
//! / game-state types the tree builder and CFR kernel share with it (spec §3).

use crate::card::{ActionId, CardSet, Player, PlayerArray, Street};

/// Mutable-per-branch game state, copied freely (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameState {
    pub current_board: CardSet,
    pub total_wagers: PlayerArray<i32>,
    pub dead_money: i32,
    pub player_to_act: Player,
    pub last_action: ActionId,
    pub current_street: Street,
    /// Shared wager level at entry of the current street.
    pub previous_streets_wager: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Chance,
    Decision,
    Fold,
    Showdown,
}

/// A hand's rank and its index into `range_hands`, as returned sorted
/// ascending by `valid_sorted_hand_ranks`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortedHandRank {
    pub rank: u32,
    pub index: u16,
}

/// Chance-node information: the cards still available to be dealt, and the
/// suit-equivalence classes under "same downstream subtree" (spec §4.3).
/// Classes of size 1 may be omitted.
#[derive(Debug, Clone)]
pub struct ChanceInfo {
    pub available: CardSet,
    pub isomorphisms: Vec<Vec<u8>>,
}

/// The abstract game contract the solver core consumes. Concrete games (Kuhn,
/// Leduc, Hold'em) implement this; the core never depends on a specific game.
pub trait GameRules: Sync {
    fn initial_state(&self) -> GameState;
    fn dead_money(&self) -> i32;
    fn node_type(&self, state: &GameState) -> NodeType;
    fn valid_actions(&self, state: &GameState) -> Vec<ActionId>;
    fn state_after_decision(&self, state: &GameState, action: ActionId) -> GameState;
    fn chance_info(&self, board: CardSet) -> ChanceInfo;
    fn range_hands(&self, player: Player) -> &[CardSet];
    fn initial_range_weights(&self, player: Player) -> &[f32];
    fn valid_sorted_hand_ranks(&self, player: Player, board: CardSet) -> Vec<SortedHandRank>;
    fn index_after_suit_swap(&self, player: Player, hand_index: u16, parent: u8, child: u8) -> i32;
    fn action_name(&self, action: ActionId, bet_raise_size: i32) -> String;

    /// Number of cards in a single hand: `1` for Kuhn/Leduc-style single-card
    /// games, `2` for Hold'em-style hole-card games. The core asserts this is
    /// one of those two values (spec §4.6.4).
    fn game_hand_size(&self) -> usize;
}

/// Records that suit `child`'s chance subtree was elided because it is
/// isomorphic to suit `parent`'s (spec §3, §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuitMapping {
    pub child: u8,
    pub parent: u8,
}

/// A tagged node in the flat tree array (spec §3). Children of any node live
/// contiguously starting at `children_offset`.
#[derive(Debug, Clone)]
pub enum Node {
    Chance {
        state: GameState,
        children_offset: usize,
        num_children: usize,
        available_cards: CardSet,
        /// The card dealt to reach each child, parallel to the contiguous
        /// child-index run at `children_offset` (one entry per emitted,
        /// non-isomorphic child; spec §4.4).
        dealt_cards: Vec<crate::card::Card>,
        suit_mappings: Vec<SuitMapping>,
    },
    Decision {
        state: GameState,
        children_offset: usize,
        num_children: usize,
        training_data_offset: usize,
    },
    Fold {
        state: GameState,
    },
    Showdown {
        state: GameState,
    },
}

impl Node {
    pub fn state(&self) -> &GameState {
        match self {
            Node::Chance { state, .. }
            | Node::Decision { state, .. }
            | Node::Fold { state }
            | Node::Showdown { state } => state,
        }
    }
}
