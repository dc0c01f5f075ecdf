//! Hold'em hand evaluator (spec §4.2, component C2).
//!
//! Five- and seven-card hand rank as a totally ordered `u32`, backed by a
//! precomputed lookup table over all `52 choose 5 = 2,598,960` five-card hands,
//! indexed by the combinatorial number system.

use crate::card::{card_to_set, set_size, value_of, CardSet};
use once_cell::sync::Lazy;

const NUM_FIVE_CARD_HANDS: usize = 2_598_960;

type ChooseTable = [[u32; 6]; 52];

static CHOOSE: Lazy<ChooseTable> = Lazy::new(build_choose_table);

fn build_choose_table() -> ChooseTable {
    let mut choose = [[0u32; 6]; 52];
    for row in choose.iter_mut() {
        row[0] = 1;
    }
    for n in 1..52 {
        for k in 1..6 {
            // (n choose k) = (n-1 choose k-1) + (n-1 choose k)
            choose[n][k] = choose[n - 1][k - 1] + choose[n - 1][k];
        }
    }
    choose
}

/// Index of a five-card hand in `0..2,598,960` via the combinatorial number
/// system: https://en.wikipedia.org/wiki/Combinatorial_number_system
fn five_card_hand_index(hand: CardSet) -> u32 {
    debug_assert_eq!(set_size(hand), 5);
    let choose = &*CHOOSE;
    let mut index = 0u32;
    let mut remaining = hand;
    for i in 0..5 {
        let lowest = remaining.trailing_zeros() as usize;
        index += choose[lowest][i + 1];
        remaining &= !(1u64 << lowest);
    }
    index
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
#[repr(u8)]
enum HandType {
    HighCard,
    Pair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
    RoyalFlush,
}

/// Packs a hand type and up to five kickers into bits `[23:20]` (type) and
/// `[19:0]` (4 bits per kicker, most-significant kicker first).
fn pack_rank(hand_type: HandType, kickers: &[u8]) -> u32 {
    debug_assert!(kickers.len() <= 5);
    // +1 reserves 0 as the invalid sentinel (spec §4.2).
    let mut rank = (hand_type as u32 + 1) << 20;
    for (i, &k) in kickers.iter().enumerate() {
        let offset = 16 - 4 * i;
        rank |= (k as u32) << offset;
    }
    rank
}

const SINGLE_SUIT_MASK: CardSet = 0x1_1111_1111_1111;

fn generate_five_card_hand_rank(hand: CardSet) -> u32 {
    debug_assert_eq!(set_size(hand), 5);

    let mut value_counts = [0u8; 13];
    let mut remaining = hand;
    while remaining != 0 {
        let lowest = remaining.trailing_zeros() as u8;
        value_counts[value_of(lowest) as usize] += 1;
        remaining &= !(1u64 << lowest);
    }

    // (count, value) pairs sorted by count desc, then value desc.
    let mut freq: Vec<(u8, u8)> = (0..13u8)
        .rev()
        .filter(|&v| value_counts[v as usize] > 0)
        .map(|v| (value_counts[v as usize], v))
        .collect();
    freq.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));

    if freq[0].0 == 4 {
        return pack_rank(HandType::FourOfAKind, &[freq[0].1, freq[1].1]);
    }
    if freq[0].0 == 3 && freq[1].0 == 2 {
        return pack_rank(HandType::FullHouse, &[freq[0].1, freq[1].1]);
    }
    if freq[0].0 == 3 {
        return pack_rank(HandType::ThreeOfAKind, &[freq[0].1, freq[1].1, freq[2].1]);
    }
    if freq[0].0 == 2 && freq[1].0 == 2 {
        return pack_rank(HandType::TwoPair, &[freq[0].1, freq[1].1, freq[2].1]);
    }
    if freq[0].0 == 2 {
        return pack_rank(
            HandType::Pair,
            &[freq[0].1, freq[1].1, freq[2].1, freq[3].1],
        );
    }

    // No pairs: check straights and flushes over sorted-descending values.
    let mut sorted_values: Vec<u8> = (0..13u8).rev().filter(|&v| value_counts[v as usize] > 0).collect();
    sorted_values.sort_by(|a, b| b.cmp(a));

    let is_regular_straight = sorted_values[0] - sorted_values[4] == 4;
    let is_wheel_straight = sorted_values[0] == 12 && sorted_values[1] == 3;

    let is_flush = (0..4).any(|suit| set_size(hand & (SINGLE_SUIT_MASK << suit)) == 5);

    let is_regular_straight_flush = is_regular_straight && is_flush;
    let is_wheel_straight_flush = is_wheel_straight && is_flush;
    let is_royal_flush = is_regular_straight_flush && sorted_values[0] == 12;

    if is_royal_flush {
        return pack_rank(HandType::RoyalFlush, &[]);
    }
    if is_regular_straight_flush {
        return pack_rank(HandType::StraightFlush, &[sorted_values[0]]);
    }
    if is_wheel_straight_flush {
        return pack_rank(HandType::StraightFlush, &[sorted_values[1]]);
    }
    if is_flush {
        return pack_rank(HandType::Flush, &sorted_values);
    }
    if is_regular_straight {
        return pack_rank(HandType::Straight, &[sorted_values[0]]);
    }
    if is_wheel_straight {
        return pack_rank(HandType::Straight, &[sorted_values[1]]);
    }
    pack_rank(HandType::HighCard, &sorted_values)
}

fn build_hand_rank_table() -> Vec<u32> {
    let mut table = vec![0u32; NUM_FIVE_CARD_HANDS];
    for c0 in 0..52u8 {
        for c1 in (c0 + 1)..52 {
            for c2 in (c1 + 1)..52 {
                for c3 in (c2 + 1)..52 {
                    for c4 in (c3 + 1)..52 {
                        let hand = card_to_set(c0)
                            | card_to_set(c1)
                            | card_to_set(c2)
                            | card_to_set(c3)
                            | card_to_set(c4);
                        let index = five_card_hand_index(hand) as usize;
                        table[index] = generate_five_card_hand_rank(hand);
                    }
                }
            }
        }
    }
    table
}

static HAND_RANK_TABLE: Lazy<Vec<u32>> = Lazy::new(build_hand_rank_table);

/// Rank of an exact five-card hand as a totally ordered `u32`; higher is better.
pub fn five_card_hand_rank(hand: CardSet) -> u32 {
    debug_assert_eq!(set_size(hand), 5);
    HAND_RANK_TABLE[five_card_hand_index(hand) as usize]
}

/// Rank of a seven-card hand: the max rank over all 21 five-card sub-hands.
pub fn seven_card_hand_rank(hand: CardSet) -> u32 {
    debug_assert_eq!(set_size(hand), 7);
    let mut cards = [0u8; 7];
    let mut remaining = hand;
    for slot in cards.iter_mut() {
        let lowest = remaining.trailing_zeros() as u8;
        *slot = lowest;
        remaining &= !(1u64 << lowest);
    }

    let mut best = 0u32;
    for i in 0..7 {
        for j in (i + 1)..7 {
            let exclude = card_to_set(cards[i]) | card_to_set(cards[j]);
            let five_card_hand = hand & !exclude;
            best = best.max(five_card_hand_rank(five_card_hand));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::card_from_str;

    fn hand_of(cards: &[&str]) -> CardSet {
        cards.iter().fold(0u64, |set, c| set | card_to_set(card_from_str(c).unwrap()))
    }

    #[test]
    fn royal_flush_beats_straight_flush() {
        let royal = hand_of(&["Ts", "Js", "Qs", "Ks", "As"]);
        let straight_flush = hand_of(&["9s", "Ts", "Js", "Qs", "Ks"]);
        assert!(five_card_hand_rank(royal) > five_card_hand_rank(straight_flush));
    }

    #[test]
    fn wheel_straight_is_lowest_straight() {
        let wheel = hand_of(&["Ac", "2d", "3h", "4s", "5c"]);
        let six_high = hand_of(&["2c", "3d", "4h", "5s", "6c"]);
        assert!(five_card_hand_rank(wheel) < five_card_hand_rank(six_high));
    }

    #[test]
    fn full_house_beats_flush() {
        let full_house = hand_of(&["2c", "2d", "2h", "3s", "3c"]);
        let flush = hand_of(&["2h", "4h", "6h", "8h", "Th"]);
        assert!(five_card_hand_rank(full_house) > five_card_hand_rank(flush));
    }

    #[test]
    fn seven_card_picks_best_five() {
        let seven = hand_of(&["As", "Ks", "Qs", "Js", "9c", "2d", "3h"]);
        // best five-card hand is the four-card-short-of-straight high card hand (no
        // straight/flush here), so this should equal the five highest non-suited cards.
        let rank = seven_card_hand_rank(seven);
        assert!(rank > 0);
    }

    #[test]
    fn distinct_rank_distribution() {
        // Property 8: exactly 2,598,960 hands, 7,462 distinct ranks, with known
        // per-category counts.
        let table = &*HAND_RANK_TABLE;
        assert_eq!(table.len(), NUM_FIVE_CARD_HANDS);

        let mut distinct = std::collections::HashSet::new();
        let mut counts = [0u32; 10];
        for &rank in table.iter() {
            distinct.insert(rank);
            // Stored type is `handType + 1` (0 reserved as the invalid
            // sentinel, spec §4.2); shift back down to index `counts`.
            let hand_type = (rank >> 20) as usize - 1;
            counts[hand_type] += 1;
        }
        assert_eq!(distinct.len(), 7462);
        assert_eq!(
            counts,
            [1302540, 1098240, 123552, 54912, 10200, 5108, 3744, 624, 36, 4]
        );
    }
}
