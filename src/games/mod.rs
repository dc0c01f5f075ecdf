//! Concrete `GameRules` implementations.

pub mod holdem;
pub mod kuhn;
pub mod leduc;
