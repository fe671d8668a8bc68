//! Candidate set: the read-only batch of solutions to evaluate.

use std::collections::BTreeSet;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::info;

use crate::domain::{BenchError, CandidateKey, CandidateSolution, Result};

/// The batch of candidate solutions for one evaluation run.
///
/// Populated by the external generation pipeline, validated for key
/// uniqueness, and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    candidates: Vec<CandidateSolution>,
}

impl CandidateSet {
    /// Build a set, rejecting duplicate `(task, model, strategy, index)`
    /// keys with [`BenchError::DuplicateCandidate`].
    pub fn from_candidates(candidates: Vec<CandidateSolution>) -> Result<Self> {
        let mut seen: BTreeSet<CandidateKey> = BTreeSet::new();
        for candidate in &candidates {
            if !seen.insert(candidate.key()) {
                return Err(BenchError::DuplicateCandidate(candidate.key().to_string()));
            }
        }
        Ok(Self { candidates })
    }

    /// Load candidates from a JSONL file, one candidate object per line.
    pub fn load_jsonl(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);

        let mut candidates = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let candidate: CandidateSolution = serde_json::from_str(&line)?;
            candidates.push(candidate);
        }

        let set = Self::from_candidates(candidates)?;
        info!(path = %path.display(), candidates = set.len(), "Loaded candidate set");
        Ok(set)
    }

    /// Iterate candidates in load order.
    pub fn iter(&self) -> impl Iterator<Item = &CandidateSolution> {
        self.candidates.iter()
    }

    /// Number of candidates in the set.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

impl IntoIterator for CandidateSet {
    type Item = CandidateSolution;
    type IntoIter = std::vec::IntoIter<CandidateSolution>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_candidates_accepts_distinct_keys() {
        let set = CandidateSet::from_candidates(vec![
            CandidateSolution::new("t", "m", "zero_shot", 0, "def f(): pass"),
            CandidateSolution::new("t", "m", "zero_shot", 1, "def f(): pass"),
            CandidateSolution::new("t", "m", "few_shot", 0, "def f(): pass"),
        ])
        .unwrap();
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let err = CandidateSet::from_candidates(vec![
            CandidateSolution::new("t", "m", "zero_shot", 0, "def f(): return 1"),
            CandidateSolution::new("t", "m", "zero_shot", 0, "def f(): return 2"),
        ])
        .unwrap_err();
        assert!(matches!(err, BenchError::DuplicateCandidate(_)));
    }

    #[test]
    fn test_load_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("candidates.jsonl");
        let mut file = std::fs::File::create(&path).unwrap();
        let candidate = CandidateSolution::new("t", "m", "zero_shot", 0, "def f(): pass");
        writeln!(file, "{}", serde_json::to_string(&candidate).unwrap()).unwrap();

        let set = CandidateSet::load_jsonl(&path).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.iter().next().unwrap().task_id, "t");
    }
}
