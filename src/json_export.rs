//! JSON strategy export (spec §6): a recursive dump of the solved tree,
//! annotating each Decision node with the acting player, its valid action
//! names, and the converged average strategy per hand, and each terminal
//! node with how the hand ended.

use crate::card::card_to_string;
use crate::game_rules::{GameRules, Node};
use crate::kernel::average_strategy;
use crate::tree::Tree;
use serde_json::{json, Value};

fn board_string(board: crate::card::CardSet) -> String {
    let mut remaining = board;
    let mut cards = Vec::new();
    while remaining != 0 {
        let card = remaining.trailing_zeros() as u8;
        remaining &= !(1u64 << card);
        cards.push(card_to_string(card).unwrap_or_default());
    }
    cards.join(" ")
}

/// Concatenates a hand's cards into the spec §6 `hand_name` key, e.g. `"AsKs"`.
fn hand_name(hand: crate::card::CardSet) -> String {
    let mut remaining = hand;
    let mut cards = Vec::new();
    while remaining != 0 {
        let card = remaining.trailing_zeros() as u8;
        remaining &= !(1u64 << card);
        cards.push(card_to_string(card).unwrap_or_default());
    }
    cards.join("")
}

fn export_node(tree: &Tree, rules: &dyn GameRules, node_index: usize) -> Value {
    match &tree.all_nodes[node_index] {
        Node::Decision {
            state,
            children_offset,
            num_children,
            training_data_offset,
        } => {
            let actions = rules.valid_actions(state);
            debug_assert_eq!(actions.len(), *num_children);
            let range_size = tree.range_size[state.player_to_act.index()];
            let data_len = num_children * range_size;

            let mut strategy = vec![0.0f32; data_len];
            let strategy_sums = unsafe { tree.all_strategy_sums.slice(*training_data_offset, data_len) };
            average_strategy(strategy_sums, *num_children, range_size, &mut strategy);

            let child_indices = tree.children_of(*children_offset, *num_children);
            let action_names: Vec<String> = actions
                .iter()
                .zip(child_indices.iter())
                .map(|(&action, &child_index)| {
                    let acting = state.player_to_act.index();
                    let child_state = tree.all_nodes[child_index].state();
                    let bet_raise_size = child_state.total_wagers[acting] - state.total_wagers[acting];
                    rules.action_name(action, bet_raise_size)
                })
                .collect();

            let hands = &tree.range_hands[state.player_to_act.index()];
            let strategy_by_hand: serde_json::Map<String, Value> = hands
                .iter()
                .enumerate()
                .map(|(h, &hand)| {
                    let freqs: Vec<f32> = (0..*num_children).map(|a| strategy[a * range_size + h]).collect();
                    (hand_name(hand), json!(freqs))
                })
                .collect();

            let children: Vec<Value> = child_indices
                .iter()
                .map(|&child_index| export_node(tree, rules, child_index))
                .collect();

            json!({
                "NodeType": "Decision",
                "Player": format!("{}", state.player_to_act),
                "Board": board_string(state.current_board),
                "ValidActions": action_names,
                "Strategy": strategy_by_hand,
                "Children": children,
            })
        }
        Node::Chance {
            state,
            children_offset,
            num_children,
            dealt_cards,
            ..
        } => {
            let children: Vec<Value> = tree
                .children_of(*children_offset, *num_children)
                .iter()
                .zip(dealt_cards.iter())
                .map(|(&child_index, &card)| {
                    json!({
                        "Card": card_to_string(card).unwrap_or_default(),
                        "Node": export_node(tree, rules, child_index),
                    })
                })
                .collect();
            json!({
                "NodeType": "Chance",
                "Board": board_string(state.current_board),
                "Children": children,
            })
        }
        Node::Fold { state } => {
            let folder = state.player_to_act.opponent();
            let fwager = state.total_wagers[folder.index()];
            json!({
                "NodeType": "Fold",
                "Board": board_string(state.current_board),
                "Folder": format!("{}", folder),
                "PotWon": fwager + tree.dead_money,
            })
        }
        Node::Showdown { state } => json!({
            "NodeType": "Showdown",
            "Board": board_string(state.current_board),
            "Pot": state.total_wagers[0] + state.total_wagers[1] + tree.dead_money,
        }),
    }
}

/// Exports the full solved tree as a `serde_json::Value` (spec §6). Call
/// after `trainer::train` so `strategy` reflects the converged average
/// strategy rather than the zero-initialized training buffers.
pub fn export_tree(tree: &Tree, rules: &dyn GameRules) -> Value {
    export_node(tree, rules, tree.root_index())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::StackAllocator;
    use crate::games::kuhn::Kuhn;
    use crate::trainer::train;

    #[test]
    fn exports_a_trained_kuhn_tree() {
        let rules = Kuhn::new();
        let tree = Tree::build(&rules).unwrap();
        let alloc = StackAllocator::new(1);
        train(&tree, &rules, &alloc, 1000, 1000, 100.0, 2.0);

        let exported = export_tree(&tree, &rules);
        assert_eq!(exported["NodeType"], "Decision");
        assert!(exported["ValidActions"].as_array().unwrap().len() >= 2);
        assert!(exported["Strategy"].as_object().unwrap().contains_key("2c"));
    }
}
