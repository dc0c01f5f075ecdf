//! Static game-tree construction with suit-isomorphism compression (spec §4.4,
//! component C4).

use crate::card::{disjoint, suit_of, CardSet, Player, PlayerArray};
use crate::cell::TrainingCell;
use crate::error::{SolverError, SolverResult};
use crate::game_rules::{GameRules, GameState, Node, NodeType, SuitMapping};

/// Owns the flat node array, per-player ranges, and the zero-initialized
/// training buffers mutated during CFR (spec §3).
pub struct Tree {
    pub all_nodes: Vec<Node>,
    /// Flat array of child node indices; a node's direct children occupy the
    /// contiguous range `[children_offset, children_offset + num_children)`.
    pub child_indices: Vec<usize>,
    pub range_hands: PlayerArray<Vec<CardSet>>,
    pub range_weights: PlayerArray<Vec<f32>>,
    pub range_size: PlayerArray<usize>,
    pub game_hand_size: usize,
    /// `same_hand_index_table[p][i] = j` iff player-`p` hand `i` equals
    /// player-opponent(`p`) hand `j`, else `-1`. Only meaningful when
    /// `game_hand_size == 2`.
    pub same_hand_index_table: PlayerArray<Vec<i32>>,
    pub dead_money: i32,
    pub total_range_weight: f64,
    pub all_regret_sums: TrainingCell<Vec<f32>>,
    pub all_strategy_sums: TrainingCell<Vec<f32>>,
    pub starting_street: crate::card::Street,
    num_decision_nodes: usize,
}

impl Tree {
    /// `true` for nodes still on the tree's starting street: these are the
    /// only nodes eligible for task-parallel fan-out (spec §5). Once a
    /// chance node deals a card the street advances past `starting_street`
    /// and every node below is traversed sequentially on the same worker.
    #[inline]
    pub fn is_parallel_eligible(&self, state: &GameState) -> bool {
        state.current_street == self.starting_street
            && self.starting_street != crate::card::Street::River
    }
}

struct Builder<'a> {
    rules: &'a dyn GameRules,
    nodes: Vec<Node>,
    child_indices: Vec<usize>,
    training_data_size: usize,
    range_size: PlayerArray<usize>,
    num_decision_nodes: usize,
    /// The "nothing forced me here" action tag a fresh street's first
    /// decision carries, reused as the `lastAction` of the state produced by
    /// a chance node (spec §4.4: "lastAction = street-start sentinel"). Every
    /// `GameRules` impl in this crate treats its initial action the same way
    /// node_type/valid_actions treat the post-deal one, so one sentinel
    /// serves both.
    street_start_action: crate::card::ActionId,
}

impl<'a> Builder<'a> {
    fn player_to_act_range_size(&self, state: &GameState) -> usize {
        self.range_size[state.player_to_act.index()]
    }

    /// Builds the subtree rooted at `state`, returning the index of its root
    /// node in `self.nodes` (post-order: children are pushed before parents,
    /// so the root is always the last element pushed for this call).
    fn build_node(&mut self, state: GameState) -> usize {
        match self.rules.node_type(&state) {
            NodeType::Decision => self.build_decision_node(state),
            NodeType::Chance => self.build_chance_node(state),
            NodeType::Fold => {
                self.nodes.push(Node::Fold { state });
                self.nodes.len() - 1
            }
            NodeType::Showdown => {
                self.nodes.push(Node::Showdown { state });
                self.nodes.len() - 1
            }
        }
    }

    fn build_decision_node(&mut self, state: GameState) -> usize {
        let actions = self.rules.valid_actions(&state);
        let mut child_roots = Vec::with_capacity(actions.len());
        for action in actions {
            let next_state = self.rules.state_after_decision(&state, action);
            child_roots.push(self.build_node(next_state));
        }

        let children_offset = self.child_indices.len();
        let num_children = child_roots.len();
        self.child_indices.extend(child_roots);

        let range_size = self.player_to_act_range_size(&state);
        let training_data_offset = self.training_data_size;
        self.training_data_size += num_children * range_size;
        self.num_decision_nodes += 1;

        self.nodes.push(Node::Decision {
            state,
            children_offset,
            num_children,
            training_data_offset,
        });
        self.nodes.len() - 1
    }

    fn build_chance_node(&mut self, state: GameState) -> usize {
        let info = self.rules.chance_info(state.current_board);

        // suit -> representative suit; singleton classes default to themselves.
        let mut representative = [0u8, 1, 2, 3];
        for class in &info.isomorphisms {
            let rep = *class.iter().min().expect("empty isomorphism class");
            for &s in class {
                representative[s as usize] = rep;
            }
        }

        let mut child_roots = Vec::new();
        let mut dealt_cards = Vec::new();
        let mut suit_mappings: Vec<SuitMapping> = Vec::new();
        let mut remaining = info.available;
        while remaining != 0 {
            let card = remaining.trailing_zeros() as u8;
            remaining &= !(1u64 << card);

            let suit = suit_of(card);
            let rep = representative[suit as usize];
            if suit == rep {
                let next_street = state
                    .current_street
                    .next()
                    .unwrap_or(state.current_street);
                let next_state = GameState {
                    current_board: state.current_board | (1u64 << card),
                    total_wagers: state.total_wagers,
                    dead_money: state.dead_money,
                    player_to_act: Player::P0,
                    last_action: self.street_start_action,
                    current_street: next_street,
                    previous_streets_wager: state.total_wagers[Player::P0.index()],
                };
                child_roots.push(self.build_node(next_state));
                dealt_cards.push(card);
            } else if !suit_mappings.iter().any(|m| m.child == suit) {
                suit_mappings.push(SuitMapping { child: suit, parent: rep });
            }
        }

        let children_offset = self.child_indices.len();
        let num_children = child_roots.len();
        self.child_indices.extend(child_roots);

        self.nodes.push(Node::Chance {
            state,
            children_offset,
            num_children,
            available_cards: info.available,
            dealt_cards,
            suit_mappings,
        });
        self.nodes.len() - 1
    }
}

fn total_range_weight(
    range_hands: &PlayerArray<Vec<CardSet>>,
    range_weights: &PlayerArray<Vec<f32>>,
    starting_board: CardSet,
) -> f64 {
    let mut total = 0.0f64;
    for (i, &h0) in range_hands[0].iter().enumerate() {
        if !disjoint(h0, starting_board) {
            continue;
        }
        let board_with_h0 = starting_board | h0;
        for (j, &h1) in range_hands[1].iter().enumerate() {
            if disjoint(board_with_h0, h1) {
                total += range_weights[0][i] as f64 * range_weights[1][j] as f64;
            }
        }
    }
    total
}

fn same_hand_index_table(range_hands: &PlayerArray<Vec<CardSet>>, player: Player) -> Vec<i32> {
    let own = &range_hands[player.index()];
    let other = &range_hands[player.opponent().index()];
    own.iter()
        .map(|&hand| {
            other
                .iter()
                .position(|&o| o == hand)
                .map(|j| j as i32)
                .unwrap_or(-1)
        })
        .collect()
}

impl Tree {
    /// Builds the full tree (skeleton plus zero-filled training buffers) from
    /// `rules`. Fails with `SolverError::Build` if the effective starting
    /// range has zero total weight (spec §7, `BuildError`).
    pub fn build(rules: &dyn GameRules) -> SolverResult<Tree> {
        let game_hand_size = rules.game_hand_size();
        if game_hand_size != 1 && game_hand_size != 2 {
            return Err(SolverError::invariant(format!(
                "game_hand_size must be 1 or 2, got {game_hand_size}"
            )));
        }

        let range_hands: PlayerArray<Vec<CardSet>> = [
            rules.range_hands(Player::P0).to_vec(),
            rules.range_hands(Player::P1).to_vec(),
        ];
        let range_weights: PlayerArray<Vec<f32>> = [
            rules.initial_range_weights(Player::P0).to_vec(),
            rules.initial_range_weights(Player::P1).to_vec(),
        ];
        let range_size: PlayerArray<usize> = [range_hands[0].len(), range_hands[1].len()];

        let initial_state = rules.initial_state();
        let starting_street = initial_state.current_street;

        let mut builder = Builder {
            rules,
            nodes: Vec::new(),
            child_indices: Vec::new(),
            training_data_size: 0,
            range_size,
            num_decision_nodes: 0,
            street_start_action: initial_state.last_action,
        };
        let root = builder.build_node(initial_state);
        assert_eq!(root, builder.nodes.len() - 1, "root must be last node built");

        let total_weight = total_range_weight(&range_hands, &range_weights, initial_state.current_board);
        if total_weight <= 0.0 {
            return Err(SolverError::build("total range weight is zero after build"));
        }

        let same_hand_index_table = [
            same_hand_index_table(&range_hands, Player::P0),
            same_hand_index_table(&range_hands, Player::P1),
        ];

        let training_data_size = builder.training_data_size;
        Ok(Tree {
            all_nodes: builder.nodes,
            child_indices: builder.child_indices,
            range_hands,
            range_weights,
            range_size,
            game_hand_size,
            same_hand_index_table,
            dead_money: rules.dead_money(),
            total_range_weight: total_weight,
            all_regret_sums: TrainingCell::new(vec![0.0; training_data_size]),
            all_strategy_sums: TrainingCell::new(vec![0.0; training_data_size]),
            starting_street,
            num_decision_nodes: builder.num_decision_nodes,
        })
    }

    #[inline]
    pub fn root_index(&self) -> usize {
        self.all_nodes.len() - 1
    }

    #[inline]
    pub fn children_of(&self, offset: usize, count: usize) -> &[usize] {
        &self.child_indices[offset..offset + count]
    }

    pub fn num_decision_nodes(&self) -> usize {
        self.num_decision_nodes
    }

    /// Byte accounting for user-facing `tree-size` reporting only (spec §4.4);
    /// not used by the traversal kernel.
    pub fn estimate_full_tree_size_bytes(&self) -> usize {
        let node_bytes = self.all_nodes.len() * std::mem::size_of::<Node>();
        let child_bytes = self.child_indices.len() * std::mem::size_of::<usize>();
        let training_bytes = (self.all_regret_sums.len() + self.all_strategy_sums.len())
            * std::mem::size_of::<f32>();
        node_bytes + child_bytes + training_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::kuhn::Kuhn;

    #[test]
    fn kuhn_tree_shape() {
        let tree = Tree::build(&Kuhn::new()).unwrap();
        // scenario S1: |allNodes| = 9, decision nodes = 4
        assert_eq!(tree.all_nodes.len(), 9);
        assert_eq!(tree.num_decision_nodes(), 4);
        assert_eq!(tree.root_index(), 8);
        assert!(tree.total_range_weight > 0.0);
    }
}
