//! Completion overlay for the trackable plan items.
//!
//! Pure client state over an immutable plan snapshot: seeded from the plan's
//! `completion_status`, toggled locally, never sent back to the service.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Trackable item categories, each with its own index space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Daily,
    Weekly,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            other => Err(format!("Unknown checklist category: {other}")),
        }
    }
}

/// One checklist item, identified by category and position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChecklistKey {
    pub category: Category,
    pub index: usize,
}

impl ChecklistKey {
    pub fn new(category: Category, index: usize) -> Self {
        Self { category, index }
    }
}

/// Textual form used by the service: `"{category}_{index}"`.
impl fmt::Display for ChecklistKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.category, self.index)
    }
}

impl FromStr for ChecklistKey {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (category, index) = s
            .rsplit_once('_')
            .ok_or_else(|| format!("Malformed checklist key: {s}"))?;
        let index = index
            .parse::<usize>()
            .map_err(|_| format!("Malformed checklist index in {s}"))?;
        Ok(Self::new(category.parse()?, index))
    }
}

/// The set of items marked done.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionOverlay {
    done: BTreeSet<ChecklistKey>,
}

impl CompletionOverlay {
    /// Seed from a plan's `completion_status`. Keys that do not name a
    /// trackable item are skipped.
    pub fn seeded(status: Option<&BTreeMap<String, bool>>) -> Self {
        let done = status
            .into_iter()
            .flatten()
            .filter(|(_, done)| **done)
            .filter_map(|(key, _)| match key.parse::<ChecklistKey>() {
                Ok(key) => Some(key),
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping completion entry");
                    None
                }
            })
            .collect();
        Self { done }
    }

    /// Flip one item and return its new value.
    pub fn toggle(&mut self, key: ChecklistKey) -> bool {
        if self.done.remove(&key) {
            false
        } else {
            self.done.insert(key);
            true
        }
    }

    pub fn is_done(&self, key: ChecklistKey) -> bool {
        self.done.contains(&key)
    }

    pub fn completed_count(&self, category: Category) -> usize {
        self.done.iter().filter(|key| key.category == category).count()
    }

    /// The done items in service form, keyed `"{category}_{index}"`.
    pub fn to_status(&self) -> BTreeMap<String, bool> {
        self.done.iter().map(|key| (key.to_string(), true)).collect()
    }
}
