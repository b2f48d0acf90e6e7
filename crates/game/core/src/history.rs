//! Bounded most-recent-first list of diagnoses the player has already seen.

/// Recently served diagnoses, newest first, without duplicates.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RecentDiagnoses {
    entries: Vec<String>,
    limit: usize,
}

impl RecentDiagnoses {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            limit,
        }
    }

    /// Rebuilds a history from stored entries.
    ///
    /// Stored data is untrusted: duplicates and blanks are dropped and the
    /// list is trimmed to `limit`, keeping the first (most recent) entries.
    pub fn from_entries(entries: impl IntoIterator<Item = String>, limit: usize) -> Self {
        let mut history = Self::new(limit);
        for entry in entries {
            let entry = entry.trim();
            if entry.is_empty() || history.contains(entry) {
                continue;
            }
            if history.entries.len() == limit {
                break;
            }
            history.entries.push(entry.to_owned());
        }
        history
    }

    /// Moves `diagnosis` to the front, evicting the oldest entry past the limit.
    pub fn record(&mut self, diagnosis: &str) {
        let diagnosis = diagnosis.trim();
        if diagnosis.is_empty() {
            return;
        }
        self.entries.retain(|entry| entry != diagnosis);
        self.entries.insert(0, diagnosis.to_owned());
        self.entries.truncate(self.limit);
    }

    pub fn contains(&self, diagnosis: &str) -> bool {
        self.entries.iter().any(|entry| entry == diagnosis)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn as_slice(&self) -> &[String] {
        &self.entries
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}
