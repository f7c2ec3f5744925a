//! # Marks
//!
//! Marks are named boolean formatting flags carried by text leaves. The set
//! of names is open, but two families are closed and cyclic:
//!
//! - **emphasis**: `emph1` → `emph2` → `emph3` → `emph4` → none
//! - **stress**: `stress1` → `stress2` → none
//!
//! Each family is a small state machine ([`MarkFamily::successor`]). The two
//! families are exclusive with each other as well as internally: stepping one
//! clears the other.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const STRIKETHROUGH: &str = "strikethrough";
pub const CODE: &str = "code";
pub const CROSS_REFERENCE: &str = "crossref";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mark(String);

impl Mark {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn strikethrough() -> Self {
        Self::new(STRIKETHROUGH)
    }

    pub fn code() -> Self {
        Self::new(CODE)
    }

    pub fn cross_reference() -> Self {
        Self::new(CROSS_REFERENCE)
    }
}

impl From<&str> for Mark {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// The set of marks on a text leaf
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Marks(BTreeSet<Mark>);

impl Marks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, mark: &Mark) -> bool {
        self.0.contains(mark)
    }

    pub fn contains_any<'a>(&self, marks: impl IntoIterator<Item = &'a Mark>) -> bool {
        marks.into_iter().any(|mark| self.0.contains(mark))
    }

    pub fn insert(&mut self, mark: Mark) -> bool {
        self.0.insert(mark)
    }

    pub fn remove(&mut self, mark: &Mark) -> bool {
        self.0.remove(mark)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mark> {
        self.0.iter()
    }

    /// Copy of `self` with every mark of `other` added
    pub fn with_all(&self, other: &Marks) -> Marks {
        Marks(self.0.union(&other.0).cloned().collect())
    }

    /// Copy of `self` with every mark of `other` removed
    pub fn without_all(&self, other: &Marks) -> Marks {
        Marks(self.0.difference(&other.0).cloned().collect())
    }
}

impl FromIterator<Mark> for Marks {
    fn from_iter<I: IntoIterator<Item = Mark>>(iter: I) -> Self {
        Marks(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[&str; N]> for Marks {
    fn from(names: [&str; N]) -> Self {
        names.into_iter().map(Mark::new).collect()
    }
}

/// A closed, ordered, mutually exclusive family of marks
pub trait MarkFamily: Copy + Eq + Sized + 'static {
    /// Levels in cycle order
    const LEVELS: &'static [Self];

    fn mark(self) -> Mark;

    /// The level of this family present in `marks`, if any
    fn level_of(marks: &Marks) -> Option<Self> {
        Self::LEVELS
            .iter()
            .copied()
            .find(|level| marks.contains(&level.mark()))
    }

    /// Next level in the cycle; past the last level the cycle returns to none
    fn successor(current: Option<Self>) -> Option<Self> {
        match current {
            None => Self::LEVELS.first().copied(),
            Some(level) => {
                let index = Self::LEVELS.iter().position(|l| *l == level)?;
                Self::LEVELS.get(index + 1).copied()
            }
        }
    }

    fn marks() -> Marks {
        Self::LEVELS.iter().map(|level| level.mark()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Emphasis {
    Emph1,
    Emph2,
    Emph3,
    Emph4,
}

impl MarkFamily for Emphasis {
    const LEVELS: &'static [Self] = &[Self::Emph1, Self::Emph2, Self::Emph3, Self::Emph4];

    fn mark(self) -> Mark {
        let name = match self {
            Self::Emph1 => "emph1",
            Self::Emph2 => "emph2",
            Self::Emph3 => "emph3",
            Self::Emph4 => "emph4",
        };
        Mark::new(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stress {
    Stress1,
    Stress2,
}

impl MarkFamily for Stress {
    const LEVELS: &'static [Self] = &[Self::Stress1, Self::Stress2];

    fn mark(self) -> Mark {
        let name = match self {
            Self::Stress1 => "stress1",
            Self::Stress2 => "stress2",
        };
        Mark::new(name)
    }
}

/// Every mark of both intensity families
pub fn intensity_marks() -> Marks {
    Emphasis::marks().with_all(&Stress::marks())
}
