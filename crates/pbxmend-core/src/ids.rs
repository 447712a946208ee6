use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::document::Document;
use crate::error::CoreError;
use crate::model::{ObjectId, OBJECT_ID_LEN};

/// Attempts per identifier before giving up.
pub const MAX_ATTEMPTS: usize = 8;

/// How new identifiers are derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    /// UUID v4 entropy; never repeats across runs.
    #[default]
    Random,
    /// SHA-256 of a semantic seed; the same edit on the same manifest always
    /// mints the same ids.
    Deterministic,
}

impl std::str::FromStr for IdStrategy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "random" => Ok(Self::Random),
            "deterministic" => Ok(Self::Deterministic),
            other => Err(CoreError::Config(format!(
                "unknown id strategy '{other}' (expected random or deterministic)"
            ))),
        }
    }
}

/// Mints identifiers that are unique against everything already in the
/// manifest and everything minted earlier in the session.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    strategy: IdStrategy,
    taken: HashSet<String>,
}

impl IdGenerator {
    pub fn new(strategy: IdStrategy) -> Self {
        Self {
            strategy,
            taken: HashSet::new(),
        }
    }

    /// A generator that treats every token of `doc` as taken.
    pub fn for_document(doc: &Document, strategy: IdStrategy) -> Self {
        let mut generator = Self::new(strategy);
        generator.reserve_all(doc.all_tokens());
        generator
    }

    pub fn reserve_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        self.taken.extend(ids.into_iter().map(str::to_string));
    }

    pub fn is_taken(&self, id: &str) -> bool {
        self.taken.contains(id)
    }

    /// Mint a new identifier. `seed` names the entry semantically and is
    /// only consulted by the deterministic strategy.
    pub fn new_id(&mut self, seed: &str) -> Result<ObjectId, CoreError> {
        for attempt in 0..MAX_ATTEMPTS {
            let candidate = match self.strategy {
                IdStrategy::Random => random_candidate(),
                IdStrategy::Deterministic => deterministic_candidate(seed, attempt),
            };
            if self.taken.insert(candidate.clone()) {
                tracing::debug!("Minted {candidate} for {seed}");
                return Ok(ObjectId(candidate));
            }
            tracing::warn!("Identifier {candidate} for {seed} is already taken (attempt {attempt})");
        }
        Err(CoreError::IdentifierExhausted {
            seed: seed.to_string(),
            attempts: MAX_ATTEMPTS,
        })
    }
}

pub(crate) fn deterministic_candidate(seed: &str, attempt: usize) -> String {
    let digest = if attempt == 0 {
        Sha256::digest(seed.as_bytes())
    } else {
        Sha256::digest(format!("{seed}#{attempt}").as_bytes())
    };
    let mut hex = format!("{digest:X}");
    hex.truncate(OBJECT_ID_LEN);
    hex
}

fn random_candidate() -> String {
    let mut hex = Uuid::new_v4().as_simple().to_string().to_ascii_uppercase();
    hex.truncate(OBJECT_ID_LEN);
    hex
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::SAMPLE;

    #[test]
    fn test_random_ids_are_canonical_and_unique() {
        let mut ids = IdGenerator::new(IdStrategy::Random);
        let mut seen = HashSet::new();
        for _ in 0..500 {
            let id = ids.new_id("x").unwrap();
            assert!(id.is_canonical(), "{id} is not canonical");
            assert!(seen.insert(id));
        }
    }

    #[test]
    fn test_deterministic_is_stable() {
        let a = IdGenerator::new(IdStrategy::Deterministic)
            .new_id("PBXFileReference:Demo/A.swift")
            .unwrap();
        let b = IdGenerator::new(IdStrategy::Deterministic)
            .new_id("PBXFileReference:Demo/A.swift")
            .unwrap();
        assert_eq!(a, b);
        assert!(a.is_canonical());
    }

    #[test]
    fn test_deterministic_collision_is_salted_not_reused() {
        let mut ids = IdGenerator::new(IdStrategy::Deterministic);
        let first = ids.new_id("same-seed").unwrap();
        let second = ids.new_id("same-seed").unwrap();
        assert_ne!(first, second);
        assert_eq!(second.as_str(), deterministic_candidate("same-seed", 1));
    }

    #[test]
    fn test_exhaustion_is_an_error() {
        let mut ids = IdGenerator::new(IdStrategy::Deterministic);
        let blocked: Vec<String> = (0..MAX_ATTEMPTS)
            .map(|n| deterministic_candidate("seed", n))
            .collect();
        ids.reserve_all(blocked.iter().map(String::as_str));
        let err = ids.new_id("seed").unwrap_err();
        assert!(matches!(err, CoreError::IdentifierExhausted { attempts: MAX_ATTEMPTS, .. }));
    }

    #[test]
    fn test_document_ids_are_reserved() {
        let doc = Document::parse(SAMPLE).unwrap();
        let ids = IdGenerator::for_document(&doc, IdStrategy::Random);
        for object in doc.objects() {
            assert!(ids.is_taken(object.id.as_str()));
        }
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("Deterministic".parse::<IdStrategy>().unwrap(), IdStrategy::Deterministic);
        assert!("sequential".parse::<IdStrategy>().is_err());
    }
}
