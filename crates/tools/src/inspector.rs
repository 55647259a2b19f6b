use std::fmt;

use serenpaths_common::{ExperienceId, theme_color};
use serenpaths_kernel::Journal;

/// Read-only queries against the journal for debugging and the CLI.
pub struct JournalInspector;

impl JournalInspector {
    pub fn summary(journal: &Journal) -> JournalSummary {
        JournalSummary {
            total: journal.len(),
            completed: journal.completed().count(),
            ongoing: journal.ongoing().count(),
            next_id: journal.next_id().ok(),
            pending_events: journal.events().len(),
            state_hash: journal.state_hash(),
        }
    }

    pub fn inspect(journal: &Journal, id: ExperienceId) -> Option<ExperienceInfo> {
        journal.get(id).map(|exp| ExperienceInfo {
            id,
            title: exp.title.clone(),
            category: exp.category.clone(),
            kind: exp.kind.clone(),
            level: exp.level.as_u8(),
            completed: exp.completed,
            date: exp.date.format("%Y-%m-%d").to_string(),
            feedback: exp.feedback.map(|f| f.as_str()),
            color: theme_color(id, Some(&exp.category)).to_hex(),
        })
    }

    pub fn list(journal: &Journal) -> Vec<ExperienceId> {
        journal.experiences().map(|e| e.id).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalSummary {
    pub total: usize,
    pub completed: usize,
    pub ongoing: usize,
    /// `None` once the id space is used up.
    pub next_id: Option<ExperienceId>,
    pub pending_events: usize,
    pub state_hash: u64,
}

impl fmt::Display for JournalSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let next_id = self
            .next_id
            .map_or_else(|| "-".to_string(), |id| id.to_string());
        write!(
            f,
            "Journal: total={} completed={} ongoing={} next_id={} pending_events={} hash={:#018x}",
            self.total,
            self.completed,
            self.ongoing,
            next_id,
            self.pending_events,
            self.state_hash
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperienceInfo {
    pub id: ExperienceId,
    pub title: String,
    pub category: String,
    pub kind: String,
    pub level: u8,
    pub completed: bool,
    pub date: String,
    pub feedback: Option<&'static str>,
    /// Theme colour as `0xRRGGBB`.
    pub color: u32,
}

impl fmt::Display for ExperienceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.completed { "done" } else { "ongoing" };
        write!(
            f,
            "#{} [{}] {} | {} | level {} | {} | {} | #{:06x}",
            self.id,
            status,
            self.title,
            self.category,
            self.level,
            self.date,
            self.feedback.unwrap_or("-"),
            self.color
        )
    }
}
