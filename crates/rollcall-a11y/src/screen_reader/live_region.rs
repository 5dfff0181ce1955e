//! Live-region channels
//!
//! Assistive technology only speaks when a live region's content actually
//! changes. Writing the same text twice must therefore go through an empty
//! state first, otherwise the second announcement is silently lost.

use std::fmt;
use std::str::FromStr;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Politeness of an announcement (`aria-live`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnouncementPriority {
    /// Spoken when the user is idle
    #[default]
    Polite,
    /// Interrupts current speech; errors and time-critical events
    Assertive,
}

impl fmt::Display for AnnouncementPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnouncementPriority::Polite => write!(f, "polite"),
            AnnouncementPriority::Assertive => write!(f, "assertive"),
        }
    }
}

impl FromStr for AnnouncementPriority {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "polite" => Ok(AnnouncementPriority::Polite),
            "assertive" => Ok(AnnouncementPriority::Assertive),
            _ => Err(ParseError::InvalidPriority(s.to_string())),
        }
    }
}

/// One change applied to a channel, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveRegionMutation {
    SetPoliteness(AnnouncementPriority),
    Clear,
    SetText(String),
}

/// Receiver of channel mutations, typically the bridge to the real live region
pub trait LiveRegionSink: Send + Sync {
    fn apply(&self, channel: AnnouncementPriority, mutation: &LiveRegionMutation);
}

/// Sink that keeps every mutation, for tests and diagnostics
#[derive(Debug, Default)]
pub struct RecordingSink {
    mutations: Mutex<Vec<(AnnouncementPriority, LiveRegionMutation)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every mutation received, in delivery order
    pub fn mutations(&self) -> Vec<(AnnouncementPriority, LiveRegionMutation)> {
        self.mutations.lock().clone()
    }

    /// Texts written to `channel`, in order
    pub fn texts(&self, channel: AnnouncementPriority) -> Vec<String> {
        self.mutations
            .lock()
            .iter()
            .filter_map(|(c, mutation)| match mutation {
                LiveRegionMutation::SetText(text) if *c == channel => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.mutations.lock().clear();
    }
}

impl LiveRegionSink for RecordingSink {
    fn apply(&self, channel: AnnouncementPriority, mutation: &LiveRegionMutation) {
        self.mutations.lock().push((channel, mutation.clone()));
    }
}

/// State of one announcement channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveRegion {
    pub politeness: AnnouncementPriority,
    content: String,
    revision: u64,
}

impl LiveRegion {
    /// Empty channel at revision 0
    pub fn new(politeness: AnnouncementPriority) -> Self {
        Self {
            politeness,
            content: String::new(),
            revision: 0,
        }
    }

    /// Text currently held by the channel
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Incremented on every content change, including the forced clear
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replace the content, returning the mutations a host must apply
    ///
    /// The politeness is set before the text so a changed priority already
    /// applies to this message. Identical text is cleared first.
    pub fn write(
        &mut self,
        text: &str,
        politeness: AnnouncementPriority,
    ) -> Vec<LiveRegionMutation> {
        self.politeness = politeness;
        let mut mutations = vec![LiveRegionMutation::SetPoliteness(politeness)];

        if self.content == text {
            self.content.clear();
            self.revision += 1;
            mutations.push(LiveRegionMutation::Clear);
        }

        self.content = text.to_string();
        self.revision += 1;
        mutations.push(LiveRegionMutation::SetText(self.content.clone()));
        mutations
    }
}
