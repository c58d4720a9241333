// src/filter.rs
use std::collections::BTreeSet;

/// User-selected categories. Empty means "show everything".
///
/// Insertion order is kept for display/toggling; equality is by membership
/// only, so `[a, b] == [b, a]`.
#[derive(Debug, Clone, Default)]
pub struct CategoryFilter {
    ids: Vec<String>,
}

impl CategoryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from arbitrary ids: trimmed, blanks dropped, first occurrence wins.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut f = Self::new();
        f.set(ids);
        f
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn contains(&self, category_id: &str) -> bool {
        self.ids.iter().any(|id| id == category_id)
    }

    /// True when a race of `category_id` passes the filter.
    pub fn admits(&self, category_id: &str) -> bool {
        self.is_empty() || self.contains(category_id)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn members(&self) -> BTreeSet<&str> {
        self.ids.iter().map(String::as_str).collect()
    }

    /// Flip membership of `category_id`. Returns whether it is now selected.
    pub fn toggle(&mut self, category_id: &str) -> bool {
        let id = category_id.trim();
        if id.is_empty() {
            return false;
        }
        if let Some(pos) = self.ids.iter().position(|x| x == id) {
            self.ids.remove(pos);
            false
        } else {
            self.ids.push(id.to_string());
            true
        }
    }

    pub fn set<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ids.clear();
        for it in ids {
            let t = it.as_ref().trim();
            if !t.is_empty() && !self.contains(t) {
                self.ids.push(t.to_string());
            }
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

impl PartialEq for CategoryFilter {
    fn eq(&self, other: &Self) -> bool {
        self.members() == other.members()
    }
}

impl Eq for CategoryFilter {}
