//! Solver orchestration (spec §6, component C8): owns the active ruleset and
//! its lazily-built tree, the solver tuning knobs, and the handlers the CLI
//! dispatches into. Grounded in the source's `SolverContext`/`solver_commands.cpp`.

use crate::alloc::StackAllocator;
use crate::config::Config;
use crate::error::{SolverError, SolverResult};
use crate::game_rules::GameRules;
use crate::games::kuhn::Kuhn;
use crate::games::leduc::Leduc;
use crate::trainer::{self, TrainingReport};
use crate::tree::Tree;
use std::path::Path;

/// Solver tuning knobs (spec §6's `solver.*` config keys), independent of
/// which game is currently loaded.
#[derive(Debug, Clone)]
pub struct SolverParams {
    pub num_threads: usize,
    pub target_exploitability_percent: f64,
    pub max_iterations: u32,
    pub exploitability_check_frequency: u32,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            num_threads: 1,
            target_exploitability_percent: 0.5,
            max_iterations: 1_000_000,
            exploitability_check_frequency: 100,
        }
    }
}

/// Formats a byte count in `B`/`KB`/`MB`/`GB`, one decimal place above `B`
/// (spec §6 `tree-size` reporting).
pub fn format_bytes(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} {}", UNITS[0])
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

/// Owns the currently loaded game and its tree, if built. Commands that need
/// a tree build it lazily on first use and keep it for subsequent commands.
pub struct SolverContext {
    pub params: SolverParams,
    rules: Option<Box<dyn GameRules>>,
    tree: Option<Tree>,
    starting_pot: f64,
}

impl SolverContext {
    pub fn new() -> Self {
        Self {
            params: SolverParams::default(),
            rules: None,
            tree: None,
            starting_pot: 0.0,
        }
    }

    fn set_rules(&mut self, rules: Box<dyn GameRules>, starting_pot: f64) {
        self.rules = Some(rules);
        self.tree = None;
        self.starting_pot = starting_pot;
    }

    pub fn load_kuhn(&mut self) {
        self.set_rules(Box::new(Kuhn::new()), 3.0);
    }

    pub fn load_leduc(&mut self, use_isomorphism: bool) {
        self.set_rules(Box::new(Leduc::new(use_isomorphism)), 2.0);
    }

    pub fn load_holdem(&mut self, config_path: &Path) -> SolverResult<()> {
        let config = Config::from_file(config_path)?;
        self.params.num_threads = config.num_threads();
        self.params.target_exploitability_percent = config.solver.target_exploitability;
        self.params.max_iterations = config.solver.max_iterations;
        self.params.exploitability_check_frequency = config.solver.exploitability_check_frequency;
        let starting_pot = 2.0 * config.tree.starting_wager_per_player as f64 + config.tree.dead_money_in_pot as f64;
        let holdem = config.build_holdem()?;
        self.set_rules(Box::new(holdem), starting_pot);
        Ok(())
    }

    fn rules(&self) -> SolverResult<&dyn GameRules> {
        self.rules
            .as_deref()
            .ok_or_else(|| SolverError::config("no game loaded; run kuhn/leduc/holdem first"))
    }

    fn ensure_tree(&mut self) -> SolverResult<&Tree> {
        if self.tree.is_none() {
            let tree = Tree::build(self.rules()?)?;
            self.tree = Some(tree);
        }
        Ok(self.tree.as_ref().unwrap())
    }

    pub fn tree_size_report(&mut self) -> SolverResult<String> {
        let tree = self.ensure_tree()?;
        Ok(format!(
            "{} nodes, {} decision nodes, {}",
            tree.all_nodes.len(),
            tree.num_decision_nodes(),
            format_bytes(tree.estimate_full_tree_size_bytes())
        ))
    }

    pub fn solve(&mut self) -> SolverResult<TrainingReport> {
        let starting_pot = self.starting_pot;
        let params = self.params.clone();
        self.ensure_tree()?;
        let tree = self.tree.as_ref().unwrap();
        let rules = self.rules.as_deref().unwrap();
        let alloc = StackAllocator::new(params.num_threads);
        Ok(trainer::train(
            tree,
            rules,
            &alloc,
            params.max_iterations,
            params.exploitability_check_frequency,
            params.target_exploitability_percent,
            starting_pot,
        ))
    }

    pub fn export_json(&mut self) -> SolverResult<serde_json::Value> {
        self.ensure_tree()?;
        let tree = self.tree.as_ref().unwrap();
        let rules = self.rules.as_deref().unwrap();
        Ok(crate::json_export::export_tree(tree, rules))
    }
}

impl Default for SolverContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_formatting_matches_expected_units() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn kuhn_end_to_end_through_context() {
        let mut ctx = SolverContext::new();
        ctx.load_kuhn();
        ctx.params.max_iterations = 5000;
        ctx.params.exploitability_check_frequency = 5000;
        let report = ctx.solve().unwrap();
        assert!(report.exploitability < 0.2);
    }
}
