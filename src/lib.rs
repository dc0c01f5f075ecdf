//! DCFR solver core for two-player zero-sum poker games.
//!
//! Concrete games (Kuhn, Leduc, No-Limit Hold'em) implement [`game_rules::GameRules`];
//! the core never depends on a specific game. [`tree::Tree`] builds the flat,
//! suit-isomorphism-compressed game tree; [`kernel`] is the vectorized CFR
//! traversal; [`trainer`] drives the discounted-regret iteration loop.

pub mod alloc;
pub mod bet_size;
pub mod card;
pub mod cell;
pub mod config;
pub mod context;
pub mod error;
pub mod game_rules;
pub mod games;
pub mod hand_evaluator;
pub mod json_export;
pub mod kernel;
pub mod range;
pub mod tree;
pub mod trainer;
mod utility;
