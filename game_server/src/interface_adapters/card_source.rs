//! Reads the card catalog from a flat JSON file (spec §6): an array of
//! `{pair_id, pair: {question, answer}}` entries, at least 8 required.

use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use crate::domain::{CardPair, CardSource, CardSourceError};
use crate::domain::board::PAIR_COUNT;

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    pair_id: i64,
    pair: PairFaces,
}

#[derive(Debug, Deserialize)]
struct PairFaces {
    question: String,
    answer: String,
}

pub struct FileCardSource {
    path: PathBuf,
}

impl FileCardSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl CardSource for FileCardSource {
    fn catalog(&self) -> Result<Vec<CardPair>, CardSourceError> {
        let text = fs::read_to_string(&self.path)
            .map_err(|error| CardSourceError::Unavailable(error.to_string()))?;
        let entries: Vec<CatalogEntry> = serde_json::from_str(&text)
            .map_err(|error| CardSourceError::Unavailable(error.to_string()))?;

        if entries.len() < PAIR_COUNT {
            return Err(CardSourceError::TooFewPairs {
                found: entries.len(),
                required: PAIR_COUNT,
            });
        }

        Ok(entries
            .into_iter()
            .map(|entry| CardPair {
                pair_id: entry.pair_id,
                question: entry.pair.question,
                answer: entry.pair.answer,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_a_well_formed_catalog() {
        let mut file = tempfile_json(
            r#"[
                {"pair_id": 1, "pair": {"question": "q1", "answer": "a1"}},
                {"pair_id": 2, "pair": {"question": "q2", "answer": "a2"}},
                {"pair_id": 3, "pair": {"question": "q3", "answer": "a3"}},
                {"pair_id": 4, "pair": {"question": "q4", "answer": "a4"}},
                {"pair_id": 5, "pair": {"question": "q5", "answer": "a5"}},
                {"pair_id": 6, "pair": {"question": "q6", "answer": "a6"}},
                {"pair_id": 7, "pair": {"question": "q7", "answer": "a7"}},
                {"pair_id": 8, "pair": {"question": "q8", "answer": "a8"}}
            ]"#,
        );
        let source = FileCardSource::new(file.path());
        let catalog = source.catalog().unwrap();
        assert_eq!(catalog.len(), 8);
        file.close();
    }

    #[test]
    fn rejects_a_catalog_with_too_few_pairs() {
        let mut file = tempfile_json(
            r#"[{"pair_id": 1, "pair": {"question": "q1", "answer": "a1"}}]"#,
        );
        let source = FileCardSource::new(file.path());
        assert!(matches!(
            source.catalog(),
            Err(CardSourceError::TooFewPairs { found: 1, .. })
        ));
        file.close();
    }

    struct Scratch {
        path: PathBuf,
    }

    impl Scratch {
        fn path(&self) -> PathBuf {
            self.path.clone()
        }

        fn close(&mut self) {
            let _ = fs::remove_file(&self.path);
        }
    }

    fn tempfile_json(contents: &str) -> Scratch {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!(
            "game_server_card_source_test_{}_{n}.json",
            std::process::id()
        ));
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        Scratch { path }
    }
}
