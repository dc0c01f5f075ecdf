//! DCFR trainer loop (spec §4.6.6/§4.6.7, component C7): iterate discounted
//! regret matching over both heroes, periodically measure exploitability, and
//! report final EV/exploitability.

use crate::alloc::StackAllocator;
use crate::card::Player;
use crate::game_rules::GameRules;
use crate::kernel::{traverse, CfrMode, TrainingParams};
use crate::tree::Tree;

/// The trainer's fixed DCFR schedule (spec §4.6.7): `alpha=1.5, beta=0, gamma=2`.
const DCFR_ALPHA: f32 = 1.5;
const DCFR_BETA: f32 = 0.0;
const DCFR_GAMMA: f32 = 2.0;

/// `traverseFromRoot(hero, mode)` (spec §4.6.6): seeds `villain_reach` from
/// the rules' initial range weights and allocates `output_ev`.
pub fn traverse_from_root(tree: &Tree, rules: &dyn GameRules, hero: Player, mode: &CfrMode, alloc: &StackAllocator) -> Vec<f32> {
    let villain = hero.opponent();
    let villain_reach = tree.range_weights[villain.index()].clone();
    let mut output_ev = vec![0.0f32; tree.range_size[hero.index()]];
    traverse(tree, rules, tree.root_index(), hero, mode, &villain_reach, &mut output_ev, alloc);
    output_ev
}

/// `(Σ_h hero_weights[h]·output_ev[h]) / totalRangeWeight`, in `f64` (spec §4.6.6).
pub fn expected_value(tree: &Tree, rules: &dyn GameRules, hero: Player, alloc: &StackAllocator) -> f64 {
    let output_ev = traverse_from_root(tree, rules, hero, &CfrMode::ExpectedValue, alloc);
    let hero_weights = &tree.range_weights[hero.index()];
    let sum: f64 = output_ev
        .iter()
        .zip(hero_weights)
        .map(|(&ev, &w)| ev as f64 * w as f64)
        .sum();
    sum / tree.total_range_weight
}

/// Same normalization as `expected_value`, with `mode = BestResponse` (spec §4.6.6).
pub fn best_response_ev(tree: &Tree, rules: &dyn GameRules, hero: Player, alloc: &StackAllocator) -> f64 {
    let output_ev = traverse_from_root(tree, rules, hero, &CfrMode::BestResponse, alloc);
    let hero_weights = &tree.range_weights[hero.index()];
    let sum: f64 = output_ev
        .iter()
        .zip(hero_weights)
        .map(|(&ev, &w)| ev as f64 * w as f64)
        .sum();
    sum / tree.total_range_weight
}

/// Fast exploitability: `(BR(P0) + BR(P1) - deadMoney) / 2`, assuming exact
/// zero-sum (spec §4.6.6).
pub fn exploitability_fast(tree: &Tree, rules: &dyn GameRules, alloc: &StackAllocator) -> f64 {
    let br0 = best_response_ev(tree, rules, Player::P0, alloc);
    let br1 = best_response_ev(tree, rules, Player::P1, alloc);
    (br0 + br1 - tree.dead_money as f64) / 2.0
}

/// Exact exploitability: `((BR(P0)-EV(P0)) + (BR(P1)-EV(P1))) / 2`, which must
/// equal the fast form up to rounding at equilibrium (spec §4.6.6, Testable
/// Property #4).
pub fn exploitability_exact(tree: &Tree, rules: &dyn GameRules, alloc: &StackAllocator) -> f64 {
    let ev0 = expected_value(tree, rules, Player::P0, alloc);
    let ev1 = expected_value(tree, rules, Player::P1, alloc);
    let br0 = best_response_ev(tree, rules, Player::P0, alloc);
    let br1 = best_response_ev(tree, rules, Player::P1, alloc);
    ((br0 - ev0) + (br1 - ev1)) / 2.0
}

pub struct TrainingReport {
    pub iterations_run: u32,
    pub ev_p0: f64,
    pub ev_p1: f64,
    pub exploitability: f64,
}

/// Runs the DCFR loop: for `t = 1..=max_iterations`, traverse once per hero
/// with the discounted schedule, checking exploitability every
/// `check_frequency` iterations and stopping early once it falls at or below
/// `target_percent` of `starting_pot` (spec §4.6.7).
pub fn train(
    tree: &Tree,
    rules: &dyn GameRules,
    alloc: &StackAllocator,
    max_iterations: u32,
    check_frequency: u32,
    target_percent: f64,
    starting_pot: f64,
) -> TrainingReport {
    let started = std::time::Instant::now();
    let mut iterations_run = 0;
    for t in 1..=max_iterations {
        let params = TrainingParams::discounted(t, DCFR_ALPHA, DCFR_BETA, DCFR_GAMMA);
        let mode = CfrMode::Training(params);

        for &hero in &[Player::P0, Player::P1] {
            let villain = hero.opponent();
            let villain_reach = tree.range_weights[villain.index()].clone();
            let mut scratch = vec![0.0f32; tree.range_size[hero.index()]];
            traverse(tree, rules, tree.root_index(), hero, &mode, &villain_reach, &mut scratch, alloc);
        }
        iterations_run = t;

        if t % check_frequency == 0 {
            let exploitability = exploitability_fast(tree, rules, alloc).max(0.0);
            log::info!(
                "iteration {t}: exploitability={exploitability:.6}, elapsed={:.2?}",
                started.elapsed()
            );
            if starting_pot > 0.0 && (exploitability / starting_pot * 100.0) <= target_percent {
                break;
            }
        }
    }

    let ev_p0 = expected_value(tree, rules, Player::P0, alloc);
    let ev_p1 = expected_value(tree, rules, Player::P1, alloc);
    let exploitability = exploitability_fast(tree, rules, alloc).max(0.0);

    TrainingReport {
        iterations_run,
        ev_p0,
        ev_p1,
        exploitability,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::kuhn::Kuhn;
    use crate::games::leduc::Leduc;
    use crate::tree::Tree;
    use approx::assert_abs_diff_eq;

    #[test]
    fn kuhn_converges_to_known_value() {
        let rules = Kuhn::new();
        let tree = Tree::build(&rules).unwrap();
        let alloc = StackAllocator::new(1);
        let report = train(&tree, &rules, &alloc, 100_000, 10_000, 0.3, 2.0);
        assert_abs_diff_eq!(report.ev_p0, -1.0 / 18.0, epsilon = 0.02);
        assert_abs_diff_eq!(report.ev_p1, 1.0 / 18.0, epsilon = 0.02);
        assert!(report.exploitability <= 1e-2, "exploitability = {}", report.exploitability);
    }

    #[test]
    fn leduc_converges_to_known_value_with_and_without_isomorphism() {
        // S2/S3: both tree shapes must converge to the same EV/exploitability.
        for use_isomorphism in [false, true] {
            let rules = Leduc::new(use_isomorphism);
            let tree = Tree::build(&rules).unwrap();
            let alloc = StackAllocator::new(1);
            let report = train(&tree, &rules, &alloc, 10_000, 1_000, 0.3, 2.0);
            assert_abs_diff_eq!(report.ev_p0, -0.0856, epsilon = 0.01);
            assert!(report.exploitability <= 1e-2, "exploitability = {} (iso={use_isomorphism})", report.exploitability);
        }
    }
}
