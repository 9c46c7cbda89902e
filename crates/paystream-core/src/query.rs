//! Filtering, searching and sorting over a user's streams.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::stream::{Role, StreamStatus, UserStreamEntry};

/// Which side of the user's streams to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleFilter {
    #[default]
    All,
    Sent,
    Received,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// Latest start time first.
    #[default]
    Newest,
    Oldest,
    /// Largest deposit first.
    AmountHigh,
    AmountLow,
    /// Most elapsed first.
    Progress,
}

/// A dashboard query over [`UserStreamEntry`] lists.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreamQuery {
    #[serde(default)]
    pub role: RoleFilter,
    #[serde(default)]
    pub status: StatusFilter,
    /// Case-insensitive substring over id, sender, recipient and symbol.
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub sort: SortOrder,
}

impl StreamQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn role(mut self, role: RoleFilter) -> Self {
        self.role = role;
        self
    }

    pub fn status(mut self, status: StatusFilter) -> Self {
        self.status = status;
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        self.search = (!term.trim().is_empty()).then_some(term);
        self
    }

    pub fn sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    /// Returns `true` if `entry` passes the role, status and search filters.
    pub fn matches(&self, entry: &UserStreamEntry, now: u64) -> bool {
        let role_ok = match self.role {
            RoleFilter::All => true,
            RoleFilter::Sent => entry.role == Role::Sent,
            RoleFilter::Received => entry.role == Role::Received,
        };
        let status = entry.stream.status(now);
        let status_ok = match self.status {
            StatusFilter::All => true,
            StatusFilter::Active => status == StreamStatus::Active,
            StatusFilter::Completed => status == StreamStatus::Completed,
            StatusFilter::Pending => status == StreamStatus::Pending,
        };
        role_ok && status_ok && self.search_matches(entry)
    }

    fn search_matches(&self, entry: &UserStreamEntry) -> bool {
        let Some(term) = self.search.as_deref() else {
            return true;
        };
        let term = term.trim().to_lowercase();
        let s = &entry.stream;
        s.id.to_string().contains(&term)
            || s.sender.to_string().to_lowercase().contains(&term)
            || s.recipient.to_string().to_lowercase().contains(&term)
            || s.token_symbol.to_lowercase().contains(&term)
    }

    /// Filter and sort `entries` as of `now`.
    pub fn apply(&self, entries: &[UserStreamEntry], now: u64) -> Vec<UserStreamEntry> {
        let mut out: Vec<UserStreamEntry> = entries
            .iter()
            .filter(|e| self.matches(e, now))
            .cloned()
            .collect();
        out.sort_by(|a, b| self.compare(a, b, now));
        out
    }

    fn compare(&self, a: &UserStreamEntry, b: &UserStreamEntry, now: u64) -> Ordering {
        let (a, b) = (&a.stream, &b.stream);
        match self.sort {
            SortOrder::Newest => b.start_time.cmp(&a.start_time),
            SortOrder::Oldest => a.start_time.cmp(&b.start_time),
            SortOrder::AmountHigh => b.total_amount.cmp(&a.total_amount),
            SortOrder::AmountLow => a.total_amount.cmp(&b.total_amount),
            SortOrder::Progress => b
                .progress(now)
                .partial_cmp(&a.progress(now))
                .unwrap_or(Ordering::Equal),
        }
    }
}

/// Tab badge counts for a user's streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreamCounts {
    pub total: usize,
    pub sent: usize,
    pub received: usize,
    pub active: usize,
    pub completed: usize,
}

impl StreamCounts {
    pub fn from_entries(entries: &[UserStreamEntry], now: u64) -> Self {
        let mut c = Self {
            total: entries.len(),
            ..Self::default()
        };
        for e in entries {
            match e.role {
                Role::Sent => c.sent += 1,
                Role::Received => c.received += 1,
            }
            match e.stream.status(now) {
                StreamStatus::Active => c.active += 1,
                StreamStatus::Completed => c.completed += 1,
                StreamStatus::Pending => {}
            }
        }
        c
    }
}
