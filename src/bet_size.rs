//! Bet and raise sizing as integer percentages of the pot (spec §6), with the
//! ceiling-division wager arithmetic a concrete game's `GameRules` impl needs
//! to turn a size list into valid actions (spec §8, scenario S6).
//!
//! Grounded in the original `tryGetWagersAfterBet`/`tryGetWagersAfterRaise`:
//! a bet is `ceil(pot * percent / 100)` added to the bettor's wager; a raise
//! first matches the outstanding bet, then bets `percent` on top of the new
//! (equalized) pot, and must clear the previous bet/raise size.

use crate::card::{Player, PlayerArray};

/// `len <= 3`, each entry `> 0` (spec §6).
pub const MAX_SIZES_PER_STREET: usize = 3;

fn wagers_valid(wagers: PlayerArray<i32>, effective_stack: i32) -> bool {
    wagers[0] < effective_stack && wagers[1] < effective_stack
}

/// `betAmount = ceil(pot * betPercentage / 100)`, added to `bettor`'s wager,
/// where `pot` includes dead money already in the middle. `None` if the
/// resulting wager would reach or exceed the effective stack (that's what
/// `AllIn` is for).
pub fn wagers_after_bet(
    wagers: PlayerArray<i32>,
    bettor: Player,
    bet_percentage: i32,
    dead_money: i32,
    effective_stack: i32,
) -> Option<PlayerArray<i32>> {
    debug_assert_eq!(wagers[0], wagers[1], "bet only legal when wagers are equal");
    let pot = wagers[0] + wagers[1] + dead_money;
    let bet_amount = (pot * bet_percentage + 99) / 100;

    let mut new_wagers = wagers;
    new_wagers[bettor.index()] += bet_amount;
    wagers_valid(new_wagers, effective_stack).then_some(new_wagers)
}

/// Matches the outstanding bet, then bets `raise_percentage` of the
/// newly-equalized pot on top. `None` if invalid, including when the
/// resulting raise fails to clear the previous bet/raise's size (poker rules
/// require a raise of at least the prior increment).
pub fn wagers_after_raise(
    wagers: PlayerArray<i32>,
    raiser: Player,
    raise_percentage: i32,
    dead_money: i32,
    effective_stack: i32,
) -> Option<PlayerArray<i32>> {
    let villain = raiser.opponent();
    let old_required_match = wagers[villain.index()] - wagers[raiser.index()];
    debug_assert!(old_required_match > 0, "raise only legal when facing a larger wager");

    let equalized = wagers[villain.index()];
    let new_wagers = wagers_after_bet([equalized, equalized], raiser, raise_percentage, dead_money, effective_stack)?;

    let new_required_match = new_wagers[raiser.index()] - new_wagers[villain.index()];
    if new_required_match >= old_required_match && wagers_valid(new_wagers, effective_stack) {
        Some(new_wagers)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bet_and_raise_rounding_scenario() {
        // S6: wagers=12/12, dead=3: pot 27, bet 33% rounds ceil(0.33*27)=9.
        let w = wagers_after_bet([12, 12], Player::P0, 33, 3, 10_000).unwrap();
        assert_eq!(w, [21, 12]);

        // pot 21+12+3=36... equalized to 21/21 first: pot 21+21+3=45, 50% -> ceil=23.
        let w2 = wagers_after_raise(w, Player::P1, 50, 3, 10_000).unwrap();
        assert_eq!(w2, [21, 44]);
    }

    #[test]
    fn raise_below_previous_increment_is_rejected() {
        let w = wagers_after_bet([12, 12], Player::P0, 150, 0, 10_000).unwrap();
        // previous increment is huge; a tiny raise percentage can't clear it.
        assert!(wagers_after_raise(w, Player::P1, 1, 0, 10_000).is_none());
    }

    #[test]
    fn all_in_sized_bet_is_invalid() {
        assert!(wagers_after_bet([90, 90], Player::P0, 200, 0, 100).is_none());
    }
}
