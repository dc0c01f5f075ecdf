//! YAML configuration for a Hold'em solve (spec §6): board, per-player
//! ranges, per-street bet/raise sizes, stack/dead-money parameters, and
//! solver tuning knobs. Parsed with `serde_yaml`, the same crate the teacher
//! uses for its own config surface.

use crate::card::{card_from_str, PlayerArray};
use crate::error::{SolverError, SolverResult};
use crate::games::holdem::{Holdem, PlayerStreetSizes, Settings, StreetSizes};
use crate::range::parse_range;
use serde::Deserialize;
use std::path::Path;

fn default_true() -> bool {
    true
}
fn default_threads() -> usize {
    1
}
fn default_target_exploitability() -> f64 {
    0.5
}
fn default_max_iterations() -> u32 {
    1_000_000
}
fn default_check_frequency() -> u32 {
    100
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct StreetActionsConfig {
    #[serde(rename = "bet-sizes", default)]
    pub bet_sizes: Vec<i32>,
    #[serde(rename = "raise-sizes", default)]
    pub raise_sizes: Vec<i32>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PlayerActionsConfig {
    #[serde(default)]
    pub flop: StreetActionsConfig,
    #[serde(default)]
    pub turn: StreetActionsConfig,
    #[serde(default)]
    pub river: StreetActionsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActionsConfig {
    pub oop: PlayerActionsConfig,
    pub ip: PlayerActionsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TreeConfig {
    pub actions: ActionsConfig,
    #[serde(rename = "starting-wager-per-player")]
    pub starting_wager_per_player: i32,
    #[serde(rename = "effective-stack-remaining")]
    pub effective_stack_remaining: i32,
    #[serde(rename = "dead-money-in-pot", default)]
    pub dead_money_in_pot: i32,
    #[serde(rename = "use-isomorphism", default = "default_true")]
    pub use_isomorphism: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RangesConfig {
    pub oop: String,
    pub ip: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SolverConfig {
    #[serde(default = "default_threads")]
    pub threads: usize,
    #[serde(rename = "target-exploitability", default = "default_target_exploitability")]
    pub target_exploitability: f64,
    #[serde(rename = "max-iterations", default = "default_max_iterations")]
    pub max_iterations: u32,
    #[serde(rename = "exploitability-check-frequency", default = "default_check_frequency")]
    pub exploitability_check_frequency: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            threads: default_threads(),
            target_exploitability: default_target_exploitability(),
            max_iterations: default_max_iterations(),
            exploitability_check_frequency: default_check_frequency(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub board: String,
    pub ranges: RangesConfig,
    pub tree: TreeConfig,
    #[serde(default)]
    pub solver: SolverConfig,
}

fn parse_board(board: &str) -> SolverResult<crate::card::CardSet> {
    let mut set = 0u64;
    for token in board.split_whitespace().flat_map(|s| s.split(',')) {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let card = card_from_str(token).map_err(SolverError::config)?;
        let bit = 1u64 << card;
        if set & bit != 0 {
            return Err(SolverError::config(format!("duplicate board card '{token}'")));
        }
        set |= bit;
    }
    Ok(set)
}

fn street_sizes(cfg: &StreetActionsConfig) -> StreetSizes {
    StreetSizes {
        bet_sizes: cfg.bet_sizes.clone(),
        raise_sizes: cfg.raise_sizes.clone(),
    }
}

fn player_street_sizes(cfg: &PlayerActionsConfig) -> PlayerStreetSizes {
    PlayerStreetSizes {
        flop: street_sizes(&cfg.flop),
        turn: street_sizes(&cfg.turn),
        river: street_sizes(&cfg.river),
    }
}

impl Config {
    pub fn from_yaml_str(yaml: &str) -> SolverResult<Config> {
        serde_yaml::from_str(yaml).map_err(|e| SolverError::config(format!("failed to parse config: {e}")))
    }

    pub fn from_file(path: &Path) -> SolverResult<Config> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SolverError::config(format!("failed to read config file {}: {e}", path.display())))?;
        Self::from_yaml_str(&contents)
    }

    pub fn num_threads(&self) -> usize {
        self.solver.threads.max(1)
    }

    /// Builds a `Holdem` ruleset and its starting solver parameters from this
    /// config (spec §6). Parses both ranges and validates all bet/raise size
    /// lists and stack parameters via `Settings::validate`.
    pub fn build_holdem(&self) -> SolverResult<Holdem> {
        let board = parse_board(&self.board)?;
        let (oop_hands, oop_weights) = parse_range(&self.ranges.oop)?;
        let (ip_hands, ip_weights) = parse_range(&self.ranges.ip)?;

        let range_hands: PlayerArray<Vec<crate::card::CardSet>> = [oop_hands, ip_hands];
        let range_weights: PlayerArray<Vec<f32>> = [oop_weights, ip_weights];

        let settings = Settings {
            board,
            starting_wager_per_player: self.tree.starting_wager_per_player,
            effective_stack_remaining: self.tree.effective_stack_remaining,
            dead_money_in_pot: self.tree.dead_money_in_pot,
            use_isomorphism: self.tree.use_isomorphism,
            actions: [
                player_street_sizes(&self.tree.actions.oop),
                player_street_sizes(&self.tree.actions.ip),
            ],
            range_hands,
            range_weights,
        };
        Holdem::new(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_minimal_config() {
        let yaml = r#"
board: "Ah 7h 2h"
ranges:
  oop: "AA,AKs"
  ip: "KK,QQ"
tree:
  actions:
    oop:
      flop:
        bet-sizes: [33, 100]
        raise-sizes: [100]
    ip:
      flop:
        bet-sizes: [50]
        raise-sizes: [100]
  starting-wager-per-player: 10
  effective-stack-remaining: 1000
  dead-money-in-pot: 0
"#;
        let config = Config::from_yaml_str(yaml).unwrap();
        assert_eq!(config.tree.starting_wager_per_player, 10);
        assert!(config.tree.use_isomorphism);
        assert_eq!(config.solver.max_iterations, default_max_iterations());

        let holdem = config.build_holdem().unwrap();
        let tree = crate::tree::Tree::build(&holdem).unwrap();
        assert!(!tree.all_nodes.is_empty());
    }

    #[test]
    fn rejects_duplicate_board_card() {
        assert!(parse_board("Ah Ah 2c").is_err());
    }
}
