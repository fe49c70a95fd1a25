use crate::domain::model::{normalize_skill_name, SkillEntry, SkillLevel};
use crate::utils::error::{RecsError, Result};

const SEGMENT_SEPARATOR: &str = ", ";

/// Ordered set of skills, at most one entry per normalized name, plus the
/// weighted query derived from it.
///
/// The query repeats each skill name `level` times so that a plain
/// bag-of-words scorer on the service side weighs skills by experience.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferenceAggregator {
    entries: Vec<SkillEntry>,
    query: String,
}

impl PreferenceAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `name` at `level`. Returns `false` without touching the set
    /// when the name is empty or already present.
    pub fn add(&mut self, name: &str, level: SkillLevel) -> bool {
        let Some(entry) = SkillEntry::new(name, level) else {
            tracing::debug!("Ignoring empty skill name");
            return false;
        };

        if self.position(&entry.name).is_some() {
            tracing::debug!("Skill '{}' already selected, ignoring", entry.name);
            return false;
        }

        tracing::debug!("Adding skill '{}' at level {}", entry.name, entry.level);
        self.entries.push(entry);
        self.recompute();
        true
    }

    /// `add` with the default level of 3.
    pub fn add_default(&mut self, name: &str) -> bool {
        self.add(name, SkillLevel::default())
    }

    pub fn remove(&mut self, name: &str) -> bool {
        let Some(idx) = self.position(&normalize_skill_name(name)) else {
            return false;
        };

        let removed = self.entries.remove(idx);
        tracing::debug!("Removed skill '{}'", removed.name);
        self.recompute();
        true
    }

    /// Updates the level of an existing entry.
    ///
    /// Levels outside 1..=5 are rejected, never clamped, and leave the set
    /// unchanged. An unknown name is a no-op returning `Ok(false)`.
    pub fn set_level(&mut self, name: &str, level: i64) -> Result<bool> {
        let level = SkillLevel::try_from(level)?;
        Ok(self.apply_level(name, level))
    }

    /// Same as [`set_level`](Self::set_level) for raw text input.
    pub fn set_level_str(&mut self, name: &str, raw: &str) -> Result<bool> {
        let level: SkillLevel = raw.parse()?;
        Ok(self.apply_level(name, level))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.query.clear();
    }

    /// Weighted query for the current set; empty when no skills are selected.
    pub fn to_weighted_query(&self) -> &str {
        &self.query
    }

    /// Weighted query, or an error when there is nothing to submit.
    pub fn require_query(&self) -> Result<&str> {
        if self.query.is_empty() {
            return Err(RecsError::EmptyQueryError);
        }
        Ok(&self.query)
    }

    pub fn entries(&self) -> &[SkillEntry] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&SkillEntry> {
        self.position(&normalize_skill_name(name))
            .map(|idx| &self.entries[idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn skill_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn apply_level(&mut self, name: &str, level: SkillLevel) -> bool {
        let Some(idx) = self.position(&normalize_skill_name(name)) else {
            tracing::debug!("No skill named '{}' to update", name);
            return false;
        };

        self.entries[idx].level = level;
        self.recompute();
        true
    }

    fn position(&self, normalized: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == normalized)
    }

    fn recompute(&mut self) {
        self.query = self
            .entries
            .iter()
            .map(SkillEntry::weighted_segment)
            .collect::<Vec<_>>()
            .join(SEGMENT_SEPARATOR);
    }
}

impl<'a> Extend<&'a SkillEntry> for PreferenceAggregator {
    fn extend<I: IntoIterator<Item = &'a SkillEntry>>(&mut self, iter: I) {
        for entry in iter {
            self.add(&entry.name, entry.level);
        }
    }
}
