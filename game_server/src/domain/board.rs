//! Board generation and the face-up/pair-id/paired triple of parallel
//! arrays a running game tracks (spec §3).

use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::card::CardPair;

pub const BOARD_SIZE: usize = 16;
pub const PAIR_COUNT: usize = 8;

#[derive(Debug, Clone)]
pub struct Board {
    pub cards: [String; BOARD_SIZE],
    pub pair_ids: [i64; BOARD_SIZE],
    pub paired: [bool; BOARD_SIZE],
}

#[derive(Debug)]
pub enum BoardError {
    /// The catalog has fewer than `PAIR_COUNT` entries (spec §6: "at least
    /// 8 entries required").
    CatalogTooSmall,
}

impl Board {
    /// Shuffles the catalog, takes the first 8 pairs, and scatters each
    /// pair's question/answer across a random permutation of the 16
    /// positions: for pair `k`, the question lands at `perm[2k]` and the
    /// answer at `perm[2k + 1]` (spec §4.5 `startGame` step 3).
    pub fn generate(catalog: &[CardPair], rng: &mut impl Rng) -> Result<Self, BoardError> {
        if catalog.len() < PAIR_COUNT {
            return Err(BoardError::CatalogTooSmall);
        }

        let mut indices: Vec<usize> = (0..catalog.len()).collect();
        indices.shuffle(rng);
        let chosen = &indices[..PAIR_COUNT];

        let mut positions: Vec<usize> = (0..BOARD_SIZE).collect();
        positions.shuffle(rng);

        let mut cards: [String; BOARD_SIZE] = std::array::from_fn(|_| String::new());
        let mut pair_ids = [0i64; BOARD_SIZE];

        for (k, &catalog_index) in chosen.iter().enumerate() {
            let pair = &catalog[catalog_index];
            let question_pos = positions[2 * k];
            let answer_pos = positions[2 * k + 1];

            cards[question_pos] = pair.question.clone();
            pair_ids[question_pos] = pair.pair_id;
            cards[answer_pos] = pair.answer.clone();
            pair_ids[answer_pos] = pair.pair_id;
        }

        Ok(Self {
            cards,
            pair_ids,
            paired: [false; BOARD_SIZE],
        })
    }
}
