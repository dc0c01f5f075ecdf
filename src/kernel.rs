//! The vectorized CFR traversal kernel (spec §4.6, component C6). This is the
//! hot loop: one call per (iteration, hero, node), operating over a player's
//! whole range at once rather than per-hand-pair, with card-blocking folded
//! in via inclusion/exclusion aggregates instead of an O(R_h·R_v) double loop.

use crate::alloc::{ScopedVector, StackAllocator};
use crate::card::{disjoint, id_from, suit_of, value_of, CardSet, Player};
use crate::game_rules::{GameRules, GameState, Node, SuitMapping};
use crate::tree::Tree;
use crate::utility::max;

/// Discounted-regret schedule (spec §4.6.1). Vanilla CFR and CFR+ are the
/// degenerate case `alpha_t = beta_t = gamma_t = 1`; CFR+ additionally clamps
/// regrets non-negative after the update.
#[derive(Debug, Clone, Copy)]
pub struct TrainingParams {
    pub alpha_t: f32,
    pub beta_t: f32,
    pub gamma_t: f32,
    pub clamp_regret_nonneg: bool,
}

impl TrainingParams {
    pub fn vanilla() -> Self {
        Self {
            alpha_t: 1.0,
            beta_t: 1.0,
            gamma_t: 1.0,
            clamp_regret_nonneg: false,
        }
    }

    pub fn cfr_plus() -> Self {
        Self {
            alpha_t: 1.0,
            beta_t: 1.0,
            gamma_t: 1.0,
            clamp_regret_nonneg: true,
        }
    }

    /// `alpha_t = t^alpha/(t^alpha+1)`, `beta_t = t^beta/(t^beta+1)`,
    /// `gamma_t = (t/(t+1))^gamma` (spec §4.6.1), at the trainer's fixed
    /// `alpha=1.5, beta=0, gamma=2` (spec §4.6.7).
    pub fn discounted(t: u32, alpha: f32, beta: f32, gamma: f32) -> Self {
        let tf = t as f32;
        let alpha_t = if alpha.is_infinite() {
            1.0
        } else {
            let ta = tf.powf(alpha);
            ta / (ta + 1.0)
        };
        let beta_t = {
            let tb = tf.powf(beta);
            tb / (tb + 1.0)
        };
        let gamma_t = (tf / (tf + 1.0)).powf(gamma);
        Self {
            alpha_t,
            beta_t,
            gamma_t,
            clamp_regret_nonneg: false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum CfrMode {
    Training(TrainingParams),
    ExpectedValue,
    BestResponse,
}

#[cfg(feature = "rayon")]
#[inline]
fn current_thread() -> usize {
    rayon::current_thread_index().unwrap_or(0)
}

#[cfg(not(feature = "rayon"))]
#[inline]
fn current_thread() -> usize {
    0
}

/// Splits `buf` into `n` equal chunks and fills chunk `k` via `compute(k,
/// chunk)`, in parallel when `parallel` and the `rayon` feature is enabled
/// (spec §4.6.2/§4.6.3, §5).
fn fan_out(parallel: bool, buf: &mut [f32], chunk_len: usize, compute: impl Fn(usize, &mut [f32]) + Sync) {
    #[cfg(feature = "rayon")]
    {
        if parallel {
            use rayon::prelude::*;
            buf.par_chunks_exact_mut(chunk_len)
                .enumerate()
                .for_each(|(k, row)| compute(k, row));
            return;
        }
    }
    let _ = parallel;
    buf.chunks_exact_mut(chunk_len)
        .enumerate()
        .for_each(|(k, row)| compute(k, row));
}

/// `sigma(a|i) = max(R(a,i),0) / sum_a max(R(a,i),0)`, uniform on a zero
/// denominator (spec §4.6.3, "current-strategy computation").
pub fn current_strategy(regret_slice: &[f32], num_actions: usize, range_size: usize, out: &mut [f32]) {
    for i in 0..range_size {
        let mut denom = 0.0f32;
        for a in 0..num_actions {
            denom += max(regret_slice[a * range_size + i], 0.0);
        }
        if denom <= 0.0 {
            let uniform = 1.0 / num_actions as f32;
            for a in 0..num_actions {
                out[a * range_size + i] = uniform;
            }
        } else {
            for a in 0..num_actions {
                out[a * range_size + i] = max(regret_slice[a * range_size + i], 0.0) / denom;
            }
        }
    }
}

/// `sigma_bar(a|i) = S(a,i) / sum_a S(a,i)`, uniform on a zero denominator
/// (spec §4.6.3, "average-strategy computation").
pub fn average_strategy(strategy_slice: &[f32], num_actions: usize, range_size: usize, out: &mut [f32]) {
    for i in 0..range_size {
        let mut denom = 0.0f32;
        for a in 0..num_actions {
            denom += strategy_slice[a * range_size + i];
        }
        if denom <= 0.0 {
            let uniform = 1.0 / num_actions as f32;
            for a in 0..num_actions {
                out[a * range_size + i] = uniform;
            }
        } else {
            for a in 0..num_actions {
                out[a * range_size + i] = strategy_slice[a * range_size + i] / denom;
            }
        }
    }
}

/// `V_total`/`V_card[c]` aggregates over a range restricted to hands disjoint
/// from `board` (spec §4.6.4), built in one pass instead of a pairwise loop.
struct BlockingAggregate {
    total: f32,
    per_card: [f32; 52],
}

impl BlockingAggregate {
    fn build(hands: &[CardSet], weights: &[f32], board: CardSet) -> Self {
        let mut total = 0.0f32;
        let mut per_card = [0.0f32; 52];
        for (j, &hand) in hands.iter().enumerate() {
            if !disjoint(hand, board) {
                continue;
            }
            let w = weights[j];
            total += w;
            let mut remaining = hand;
            while remaining != 0 {
                let c = remaining.trailing_zeros() as usize;
                remaining &= remaining - 1;
                per_card[c] += w;
            }
        }
        Self { total, per_card }
    }

    fn subtract_hand(&self, hand: CardSet) -> f32 {
        let mut sum = 0.0f32;
        let mut remaining = hand;
        while remaining != 0 {
            let c = remaining.trailing_zeros() as usize;
            remaining &= remaining - 1;
            sum += self.per_card[c];
        }
        sum
    }
}

/// Reach not blocked by `hand`, with the 2-card-game inclusion/exclusion
/// correction for the identical villain hand double-subtracted by
/// `subtract_hand` (spec §4.6.4).
fn unblocked_reach(agg: &BlockingAggregate, hand: CardSet, same_hand_index: i32, villain_reach: &[f32], game_hand_size: usize) -> f32 {
    let mut valid = agg.total - agg.subtract_hand(hand);
    if game_hand_size == 2 && same_hand_index >= 0 {
        valid += villain_reach[same_hand_index as usize];
    }
    valid
}

/// `traverse(node, constants, rules, villain_reach, output_ev, tree,
/// allocator)` (spec §4.6.1). `hero` is fixed for the whole call tree;
/// `output_ev[h]` is filled with hero's EV from `node_idx` onward.
#[allow(clippy::too_many_arguments)]
pub fn traverse(
    tree: &Tree,
    rules: &dyn GameRules,
    node_idx: usize,
    hero: Player,
    mode: &CfrMode,
    villain_reach: &[f32],
    output_ev: &mut [f32],
    alloc: &StackAllocator,
) {
    match &tree.all_nodes[node_idx] {
        Node::Chance {
            state,
            children_offset,
            num_children,
            dealt_cards,
            suit_mappings,
            available_cards,
        } => traverse_chance(
            tree,
            rules,
            state,
            *children_offset,
            *num_children,
            dealt_cards,
            suit_mappings,
            *available_cards,
            hero,
            mode,
            villain_reach,
            output_ev,
            alloc,
        ),
        Node::Decision {
            state,
            children_offset,
            num_children,
            training_data_offset,
        } => traverse_decision(
            tree,
            rules,
            state,
            *children_offset,
            *num_children,
            *training_data_offset,
            hero,
            mode,
            villain_reach,
            output_ev,
            alloc,
        ),
        Node::Fold { state } => traverse_fold(tree, rules, state, hero, villain_reach, output_ev),
        Node::Showdown { state } => traverse_showdown(tree, rules, state, hero, villain_reach, output_ev),
    }
}

#[allow(clippy::too_many_arguments)]
fn traverse_chance(
    tree: &Tree,
    rules: &dyn GameRules,
    state: &GameState,
    children_offset: usize,
    num_children: usize,
    dealt_cards: &[crate::card::Card],
    suit_mappings: &[SuitMapping],
    available_cards: CardSet,
    hero: Player,
    mode: &CfrMode,
    villain_reach: &[f32],
    output_ev: &mut [f32],
    alloc: &StackAllocator,
) {
    let villain = hero.opponent();
    let hero_size = tree.range_size[hero.index()];
    let villain_size = tree.range_size[villain.index()];
    let hero_hands = &tree.range_hands[hero.index()];
    let villain_hands = &tree.range_hands[villain.index()];
    let thread = current_thread();

    for ev in output_ev.iter_mut() {
        *ev = 0.0;
    }
    if num_children == 0 {
        return;
    }

    let denom = (crate::card::set_size(available_cards) as i32 - 2 * tree.game_hand_size as i32).max(1) as f32;

    // LIFO: ev_buf allocated after vr_buf, so it is released first.
    let mut vr_buf = ScopedVector::new(alloc, thread, num_children * villain_size);
    for (k, row) in vr_buf.as_mut_slice().chunks_exact_mut(villain_size).enumerate() {
        let card_set = crate::card::card_to_set(dealt_cards[k]);
        for (j, &hand) in villain_hands.iter().enumerate() {
            row[j] = if disjoint(hand, card_set) { villain_reach[j] / denom } else { 0.0 };
        }
    }
    let mut ev_buf = ScopedVector::new(alloc, thread, num_children * hero_size);

    let parallel = tree.is_parallel_eligible(state);
    let vr_slice = vr_buf.as_slice();
    fan_out(parallel, ev_buf.as_mut_slice(), hero_size, |k, row| {
        let child_idx = tree.child_indices[children_offset + k];
        let vr_row = &vr_slice[k * villain_size..(k + 1) * villain_size];
        traverse(tree, rules, child_idx, hero, mode, vr_row, row, alloc);
    });

    for (k, &dealt) in dealt_cards.iter().enumerate() {
        let card_set = crate::card::card_to_set(dealt);
        let ev_row = &ev_buf.as_slice()[k * hero_size..(k + 1) * hero_size];
        for (h, &hand) in hero_hands.iter().enumerate() {
            if disjoint(hand, card_set) {
                output_ev[h] += ev_row[h];
            }
        }
        let parent_suit = suit_of(dealt);
        for mapping in suit_mappings {
            if mapping.parent != parent_suit {
                continue;
            }
            let swapped_card = id_from(value_of(dealt), mapping.child);
            let swapped_set = crate::card::card_to_set(swapped_card);
            for (h, &hand) in hero_hands.iter().enumerate() {
                if !disjoint(hand, swapped_set) {
                    continue;
                }
                let h_prime = rules.index_after_suit_swap(hero, h as u16, mapping.parent, mapping.child);
                if h_prime >= 0 {
                    output_ev[h] += ev_row[h_prime as usize];
                }
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn traverse_decision(
    tree: &Tree,
    rules: &dyn GameRules,
    state: &GameState,
    children_offset: usize,
    num_children: usize,
    training_data_offset: usize,
    hero: Player,
    mode: &CfrMode,
    villain_reach: &[f32],
    output_ev: &mut [f32],
    alloc: &StackAllocator,
) {
    let acting = state.player_to_act;
    let thread = current_thread();
    let parallel = tree.is_parallel_eligible(state);

    if acting == hero {
        traverse_hero_decision(
            tree,
            rules,
            state,
            children_offset,
            num_children,
            training_data_offset,
            hero,
            mode,
            villain_reach,
            output_ev,
            alloc,
            thread,
            parallel,
        );
    } else {
        traverse_villain_decision(
            tree,
            rules,
            state,
            children_offset,
            num_children,
            training_data_offset,
            hero,
            mode,
            villain_reach,
            output_ev,
            alloc,
            thread,
            parallel,
        );
    }
}

#[allow(clippy::too_many_arguments)]
fn traverse_hero_decision(
    tree: &Tree,
    rules: &dyn GameRules,
    _state: &GameState,
    children_offset: usize,
    num_children: usize,
    training_data_offset: usize,
    hero: Player,
    mode: &CfrMode,
    villain_reach: &[f32],
    output_ev: &mut [f32],
    alloc: &StackAllocator,
    thread: usize,
    parallel: bool,
) {
    let hero_size = tree.range_size[hero.index()];
    let num_actions = num_children;

    if let CfrMode::BestResponse = mode {
        let mut ev_buf = ScopedVector::new(alloc, thread, num_actions * hero_size);
        fan_out(parallel, ev_buf.as_mut_slice(), hero_size, |a, row| {
            let child_idx = tree.child_indices[children_offset + a];
            traverse(tree, rules, child_idx, hero, mode, villain_reach, row, alloc);
        });
        for ev in output_ev.iter_mut() {
            *ev = f32::MIN;
        }
        for a in 0..num_actions {
            let row = &ev_buf.as_slice()[a * hero_size..(a + 1) * hero_size];
            for h in 0..hero_size {
                output_ev[h] = output_ev[h].max(row[h]);
            }
        }
        debug_assert!(output_ev.iter().all(|&ev| ev != f32::MIN), "hero hand left at BestResponse sentinel");
        return;
    }

    // sigma (training) or sigma_bar (EV) chosen from allRegretSums/allStrategySums.
    let mut sigma = ScopedVector::new(alloc, thread, num_actions * hero_size);
    match mode {
        CfrMode::Training(_) => {
            let regrets = unsafe { tree.all_regret_sums.slice(training_data_offset, num_actions * hero_size) };
            current_strategy(regrets, num_actions, hero_size, sigma.as_mut_slice());
        }
        CfrMode::ExpectedValue => {
            let strategies = unsafe { tree.all_strategy_sums.slice(training_data_offset, num_actions * hero_size) };
            average_strategy(strategies, num_actions, hero_size, sigma.as_mut_slice());
        }
        CfrMode::BestResponse => unreachable!(),
    }

    if let CfrMode::Training(params) = mode {
        let regrets = unsafe { tree.all_regret_sums.slice_mut(training_data_offset, num_actions * hero_size) };
        let strategies = unsafe { tree.all_strategy_sums.slice_mut(training_data_offset, num_actions * hero_size) };
        for r in regrets.iter_mut() {
            *r *= if *r > 0.0 { params.alpha_t } else { params.beta_t };
        }
        for s in strategies.iter_mut() {
            *s *= params.gamma_t;
        }
    }

    let mut ev_buf = ScopedVector::new(alloc, thread, num_actions * hero_size);
    fan_out(parallel, ev_buf.as_mut_slice(), hero_size, |a, row| {
        let child_idx = tree.child_indices[children_offset + a];
        traverse(tree, rules, child_idx, hero, mode, villain_reach, row, alloc);
    });

    for ev in output_ev.iter_mut() {
        *ev = 0.0;
    }
    for a in 0..num_actions {
        let row = &ev_buf.as_slice()[a * hero_size..(a + 1) * hero_size];
        let sigma_row = &sigma.as_slice()[a * hero_size..(a + 1) * hero_size];
        for h in 0..hero_size {
            output_ev[h] += row[h] * sigma_row[h];
        }
    }

    if let CfrMode::Training(params) = mode {
        let regrets = unsafe { tree.all_regret_sums.slice_mut(training_data_offset, num_actions * hero_size) };
        let strategies = unsafe { tree.all_strategy_sums.slice_mut(training_data_offset, num_actions * hero_size) };
        for a in 0..num_actions {
            let row = &ev_buf.as_slice()[a * hero_size..(a + 1) * hero_size];
            let sigma_row = &sigma.as_slice()[a * hero_size..(a + 1) * hero_size];
            for h in 0..hero_size {
                let idx = a * hero_size + h;
                let mut r = regrets[idx] + (row[h] - output_ev[h]);
                if params.clamp_regret_nonneg {
                    r = max(r, 0.0);
                }
                regrets[idx] = r;
                strategies[idx] += sigma_row[h];
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn traverse_villain_decision(
    tree: &Tree,
    rules: &dyn GameRules,
    _state: &GameState,
    children_offset: usize,
    num_children: usize,
    training_data_offset: usize,
    hero: Player,
    mode: &CfrMode,
    villain_reach: &[f32],
    output_ev: &mut [f32],
    alloc: &StackAllocator,
    thread: usize,
    parallel: bool,
) {
    let villain = hero.opponent();
    let hero_size = tree.range_size[hero.index()];
    let villain_size = tree.range_size[villain.index()];
    let num_actions = num_children;

    let mut sigma = ScopedVector::new(alloc, thread, num_actions * villain_size);
    match mode {
        CfrMode::Training(_) => {
            let regrets = unsafe { tree.all_regret_sums.slice(training_data_offset, num_actions * villain_size) };
            current_strategy(regrets, num_actions, villain_size, sigma.as_mut_slice());
        }
        CfrMode::ExpectedValue | CfrMode::BestResponse => {
            let strategies = unsafe { tree.all_strategy_sums.slice(training_data_offset, num_actions * villain_size) };
            average_strategy(strategies, num_actions, villain_size, sigma.as_mut_slice());
        }
    }

    let mut vr_buf = ScopedVector::new(alloc, thread, num_actions * villain_size);
    for a in 0..num_actions {
        let sigma_row = &sigma.as_slice()[a * villain_size..(a + 1) * villain_size];
        let vr_row = &mut vr_buf.as_mut_slice()[a * villain_size..(a + 1) * villain_size];
        for j in 0..villain_size {
            vr_row[j] = villain_reach[j] * sigma_row[j];
        }
    }

    let mut ev_buf = ScopedVector::new(alloc, thread, num_actions * hero_size);
    let vr_slice = vr_buf.as_slice();
    fan_out(parallel, ev_buf.as_mut_slice(), hero_size, |a, row| {
        let child_idx = tree.child_indices[children_offset + a];
        let vr_row = &vr_slice[a * villain_size..(a + 1) * villain_size];
        traverse(tree, rules, child_idx, hero, mode, vr_row, row, alloc);
    });

    for ev in output_ev.iter_mut() {
        *ev = 0.0;
    }
    for a in 0..num_actions {
        let row = &ev_buf.as_slice()[a * hero_size..(a + 1) * hero_size];
        for h in 0..hero_size {
            output_ev[h] += row[h];
        }
    }
}

fn traverse_fold(tree: &Tree, _rules: &dyn GameRules, state: &GameState, hero: Player, villain_reach: &[f32], output_ev: &mut [f32]) {
    let villain = hero.opponent();
    let hero_hands = &tree.range_hands[hero.index()];
    let villain_hands = &tree.range_hands[villain.index()];
    let same_hand_table = &tree.same_hand_index_table[hero.index()];

    let folder = state.player_to_act.opponent();
    let fwager = state.total_wagers[folder.index()] as f32;
    let payoff = if folder == villain {
        fwager + tree.dead_money as f32
    } else {
        -fwager
    };

    let agg = BlockingAggregate::build(villain_hands, villain_reach, state.current_board);

    for ev in output_ev.iter_mut() {
        *ev = 0.0;
    }
    for (h, &hand) in hero_hands.iter().enumerate() {
        if !disjoint(hand, state.current_board) {
            continue;
        }
        let valid = unblocked_reach(&agg, hand, same_hand_table[h], villain_reach, tree.game_hand_size);
        output_ev[h] += payoff * valid;
    }
}

fn traverse_showdown(tree: &Tree, rules: &dyn GameRules, state: &GameState, hero: Player, villain_reach: &[f32], output_ev: &mut [f32]) {
    let villain = hero.opponent();
    let hero_hands = &tree.range_hands[hero.index()];
    let villain_hands = &tree.range_hands[villain.index()];
    let same_hand_table = &tree.same_hand_index_table[hero.index()];

    let hero_sorted = rules.valid_sorted_hand_ranks(hero, state.current_board);
    let villain_sorted = rules.valid_sorted_hand_ranks(villain, state.current_board);

    let w = state.total_wagers[Player::P0.index()] as f32;
    debug_assert_eq!(w, state.total_wagers[Player::P1.index()] as f32, "showdown with unequal wagers");
    let d = tree.dead_money as f32;
    let win = w + d;
    let lose = -w;
    let tie = d / 2.0;

    for ev in output_ev.iter_mut() {
        *ev = 0.0;
    }

    // Pass 1: hero wins. Villain aggregate covers strictly-lower-rank hands.
    {
        let mut agg_total = 0.0f32;
        let mut agg_card = [0.0f32; 52];
        let mut vptr = 0usize;
        for hr in &hero_sorted {
            while vptr < villain_sorted.len() && villain_sorted[vptr].rank < hr.rank {
                let j = villain_sorted[vptr].index as usize;
                accumulate(&mut agg_total, &mut agg_card, villain_hands[j], villain_reach[j]);
                vptr += 1;
            }
            let h = hr.index as usize;
            let valid = agg_total - subtract(&agg_card, hero_hands[h]);
            output_ev[h] += win * valid;
        }
    }

    // Pass 2: hero loses. Villain aggregate covers strictly-higher-rank hands.
    {
        let mut agg_total = 0.0f32;
        let mut agg_card = [0.0f32; 52];
        let mut vptr = villain_sorted.len();
        for hr in hero_sorted.iter().rev() {
            while vptr > 0 && villain_sorted[vptr - 1].rank > hr.rank {
                vptr -= 1;
                let j = villain_sorted[vptr].index as usize;
                accumulate(&mut agg_total, &mut agg_card, villain_hands[j], villain_reach[j]);
            }
            let h = hr.index as usize;
            let valid = agg_total - subtract(&agg_card, hero_hands[h]);
            output_ev[h] += lose * valid;
        }
    }

    // Pass 3: ties. Only non-trivial when dead money > 0.
    if d > 0.0 {
        let mut agg_total = 0.0f32;
        let mut agg_card = [0.0f32; 52];
        let mut vlo = 0usize;
        let mut last_rank: Option<u32> = None;
        for hr in &hero_sorted {
            if last_rank != Some(hr.rank) {
                agg_total = 0.0;
                agg_card = [0.0; 52];
                while vlo < villain_sorted.len() && villain_sorted[vlo].rank < hr.rank {
                    vlo += 1;
                }
                let mut vhi = vlo;
                while vhi < villain_sorted.len() && villain_sorted[vhi].rank == hr.rank {
                    let j = villain_sorted[vhi].index as usize;
                    accumulate(&mut agg_total, &mut agg_card, villain_hands[j], villain_reach[j]);
                    vhi += 1;
                }
                last_rank = Some(hr.rank);
            }
            let h = hr.index as usize;
            let mut valid = agg_total - subtract(&agg_card, hero_hands[h]);
            let j = same_hand_table[h];
            if tree.game_hand_size == 2 && j >= 0 {
                valid += villain_reach[j as usize];
            }
            output_ev[h] += tie * valid;
        }
    }
}

fn accumulate(total: &mut f32, per_card: &mut [f32; 52], hand: CardSet, weight: f32) {
    *total += weight;
    let mut remaining = hand;
    while remaining != 0 {
        let c = remaining.trailing_zeros() as usize;
        remaining &= remaining - 1;
        per_card[c] += weight;
    }
}

fn subtract(per_card: &[f32; 52], hand: CardSet) -> f32 {
    let mut sum = 0.0f32;
    let mut remaining = hand;
    while remaining != 0 {
        let c = remaining.trailing_zeros() as usize;
        remaining &= remaining - 1;
        sum += per_card[c];
    }
    sum
}
