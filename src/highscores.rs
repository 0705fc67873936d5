//! High score leaderboard
//!
//! Persisted through `persistence`, tracks the top 5 runs.

use serde::{Deserialize, Serialize};

use crate::persistence::{self, PersistError, Storage};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 5;

/// Length of a leaderboard name
pub const NAME_LEN: usize = 3;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Three uppercase letters/digits
    pub name: String,
    pub score: u64,
    /// Distance travelled
    pub distance: u64,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// What to do with a board saved by a different format version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScorePolicy {
    #[default]
    KeepAcrossVersions,
    ResetOnVersionChange,
}

/// High score leaderboard, sorted descending by score
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    const STORAGE_KEY: &'static str = "horse_run_highscores";
    pub const VERSION: u32 = 1;

    /// Create empty leaderboard
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().is_none_or(|e| score > e.score)
    }

    /// Rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        // Equal scores rank below the existing entry
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert a run; returns the rank achieved or None if it didn't qualify
    pub fn add_score(
        &mut self,
        name: &str,
        score: u64,
        distance: u64,
        timestamp: f64,
    ) -> Option<usize> {
        let rank = self.potential_rank(score)?;
        self.entries.insert(
            rank - 1,
            HighScoreEntry {
                name: sanitize_name(name),
                score,
                distance,
                timestamp,
            },
        );
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load the board; any failure yields an empty one
    pub fn load(storage: &dyn Storage, policy: ScorePolicy) -> Self {
        let loaded = match policy {
            ScorePolicy::ResetOnVersionChange => {
                persistence::load_versioned::<Self>(storage, Self::STORAGE_KEY, Self::VERSION)
            }
            ScorePolicy::KeepAcrossVersions => {
                persistence::load_envelope::<Self>(storage, Self::STORAGE_KEY).map(|env| env.data)
            }
        };

        match loaded {
            Ok(mut scores) => {
                scores.normalize();
                log::info!("Loaded {} high scores", scores.entries.len());
                scores
            }
            Err(PersistError::Missing) => {
                log::info!("No high scores found, starting fresh");
                Self::new()
            }
            Err(e) => {
                log::warn!("Discarding stored high scores: {e}");
                Self::new()
            }
        }
    }

    pub fn save(&self, storage: &mut dyn Storage) -> Result<(), PersistError> {
        persistence::save_versioned(storage, Self::STORAGE_KEY, Self::VERSION, self)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }

    /// Re-establish ordering and limits on data read from outside
    fn normalize(&mut self) {
        // Stable sort keeps older entries ahead on ties
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_HIGH_SCORES);
        for entry in &mut self.entries {
            entry.name = sanitize_name(&entry.name);
        }
    }
}

/// Uppercase ASCII alphanumerics, exactly three characters, padded with '-'
pub fn sanitize_name(raw: &str) -> String {
    let mut name: String = raw
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .take(NAME_LEN)
        .collect();
    while name.len() < NAME_LEN {
        name.push('-');
    }
    name
}

/// Format a timestamp relative to `now_ms`
pub fn format_relative(now_ms: f64, timestamp_ms: f64) -> String {
    let mins = ((now_ms - timestamp_ms).max(0.0) / 60_000.0).floor() as u64;
    let hours = mins / 60;
    let days = hours / 24;

    match (days, hours, mins) {
        (0, 0, 0) => "Just now".to_string(),
        (0, 0, 1) => "1 min ago".to_string(),
        (0, 0, m) => format!("{m} mins ago"),
        (0, 1, _) => "1 hour ago".to_string(),
        (0, h, _) => format!("{h} hours ago"),
        (1, _, _) => "Yesterday".to_string(),
        (d, _, _) if d < 7 => format!("{d} days ago"),
        (d, _, _) if d < 14 => "1 week ago".to_string(),
        (d, _, _) => format!("{} weeks ago", d / 7),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;

    fn board(scores: &[u64]) -> HighScores {
        let mut hs = HighScores::new();
        for (i, &s) in scores.iter().enumerate() {
            hs.add_score("abc", s, s * 2, i as f64);
        }
        hs
    }

    #[test]
    fn test_zero_never_qualifies() {
        assert!(!HighScores::new().qualifies(0));
    }

    #[test]
    fn test_sorted_and_trimmed() {
        let hs = board(&[10, 50, 30, 70, 20, 60]);
        let scores: Vec<u64> = hs.entries.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![70, 60, 50, 30, 20]);
    }

    #[test]
    fn test_full_board_rejects_low_score() {
        let hs = board(&[50, 40, 30, 20, 10]);
        assert!(!hs.qualifies(10));
        assert!(!hs.qualifies(5));
        assert_eq!(hs.potential_rank(11), Some(5));
        assert_eq!(hs.potential_rank(100), Some(1));
    }

    #[test]
    fn test_tie_keeps_older_first() {
        let mut hs = board(&[30]);
        assert_eq!(hs.add_score("new", 30, 0, 99.0), Some(2));
        assert_eq!(hs.entries[0].timestamp, 0.0);
        assert_eq!(hs.entries[1].name, "NEW");
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("abc"), "ABC");
        assert_eq!(sanitize_name("a!b"), "AB-");
        assert_eq!(sanitize_name(""), "---");
        assert_eq!(sanitize_name("x9yz"), "X9Y");
        assert_eq!(sanitize_name("é1"), "1--");
    }

    #[test]
    fn test_save_and_load() {
        let mut storage = MemoryStorage::new();
        let hs = board(&[40, 20]);
        hs.save(&mut storage).unwrap();

        let loaded = HighScores::load(&storage, ScorePolicy::ResetOnVersionChange);
        assert_eq!(loaded.entries, hs.entries);
    }

    #[test]
    fn test_load_corrupt_is_empty() {
        let mut storage = MemoryStorage::new();
        storage.set(HighScores::STORAGE_KEY, "garbage").unwrap();
        assert!(HighScores::load(&storage, ScorePolicy::KeepAcrossVersions).is_empty());
    }

    #[test]
    fn test_version_policy() {
        let mut storage = MemoryStorage::new();
        persistence::save_versioned(
            &mut storage,
            HighScores::STORAGE_KEY,
            HighScores::VERSION + 1,
            &board(&[15]),
        )
        .unwrap();

        let kept = HighScores::load(&storage, ScorePolicy::KeepAcrossVersions);
        assert_eq!(kept.top_score(), Some(15));

        let reset = HighScores::load(&storage, ScorePolicy::ResetOnVersionChange);
        assert!(reset.is_empty());
    }

    #[test]
    fn test_load_normalizes_foreign_data() {
        let mut storage = MemoryStorage::new();
        let mut hs = board(&[1, 2, 3, 4, 5]);
        hs.entries.reverse();
        hs.entries.push(hs.entries[0].clone());
        hs.entries[0].name = "lowercase".into();
        hs.save(&mut storage).unwrap();

        let loaded = HighScores::load(&storage, ScorePolicy::KeepAcrossVersions);
        assert_eq!(loaded.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(loaded.top_score(), Some(5));
        assert!(loaded.entries.iter().all(|e| e.name.len() == NAME_LEN));
    }

    #[test]
    fn test_format_relative() {
        let min = 60_000.0;
        let now = 1_000.0 * min;
        assert_eq!(format_relative(now, now - 10_000.0), "Just now");
        assert_eq!(format_relative(now, now - min), "1 min ago");
        assert_eq!(format_relative(now, now - 5.0 * min), "5 mins ago");
        assert_eq!(format_relative(now, now - 60.0 * min), "1 hour ago");
        assert_eq!(format_relative(now, now - 180.0 * min), "3 hours ago");
        assert_eq!(format_relative(now * 10.0, now * 10.0 - 1440.0 * min), "Yesterday");
        assert_eq!(format_relative(now * 10.0, now * 10.0 - 3.0 * 1440.0 * min), "3 days ago");
        assert_eq!(format_relative(now * 100.0, now * 100.0 - 21.0 * 1440.0 * min), "3 weeks ago");
        // Clock skew
        assert_eq!(format_relative(now, now + min), "Just now");
    }
}
