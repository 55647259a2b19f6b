use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use serenpaths_common::{Challenge, ChallengeLevel, Experience, ExperienceId, Feedback};

/// An event record produced by every mutation to the journal.
///
/// Each event carries enough data to rebuild the journal by replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JournalEvent {
    /// A new experience was added (accepted challenge or journal entry).
    Recorded { experience: Experience },
    /// An ongoing experience was marked completed.
    Completed { id: ExperienceId, date: DateTime<Utc> },
    /// Feedback was attached (or replaced).
    FeedbackAttached { id: ExperienceId, feedback: Feedback },
    /// Title/description of an ongoing experience changed.
    Edited {
        id: ExperienceId,
        title: String,
        description: Option<String>,
    },
    /// An ongoing experience was dropped. Carries the data it had.
    Abandoned { experience: Experience },
}

/// Errors from journal operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum JournalError {
    #[error("experience {0} not found")]
    NotFound(ExperienceId),
    #[error("duplicate experience id {0}")]
    DuplicateId(ExperienceId),
    #[error("experience {0} is completed and can no longer change")]
    Immutable(ExperienceId),
    #[error("experience {0} is already completed")]
    AlreadyCompleted(ExperienceId),
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("no experience ids left after {0}")]
    IdSpaceExhausted(ExperienceId),
}

/// A free-form journal entry for something the user already did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JournalEntry {
    pub title: String,
    pub category: String,
    pub emotion: Option<String>,
}

/// The authoritative list of experiences.
///
/// Uses BTreeMap keyed by id; ids are handed out in increasing order so
/// iteration order is also creation order. Ids of abandoned experiences are
/// never handed out again.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Journal {
    experiences: BTreeMap<ExperienceId, Experience>,
    /// Highest id ever issued or loaded.
    #[serde(default)]
    last_id: ExperienceId,
    /// Append-only event log of all mutations.
    #[serde(skip)]
    event_log: Vec<JournalEvent>,
}

impl Journal {
    /// Create an empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a journal from a stored list. Loading is not a mutation, so no
    /// events are logged.
    pub fn from_experiences(
        experiences: impl IntoIterator<Item = Experience>,
    ) -> Result<Self, JournalError> {
        let mut map = BTreeMap::new();
        for exp in experiences {
            let id = exp.id;
            if map.insert(id, exp).is_some() {
                return Err(JournalError::DuplicateId(id));
            }
        }
        let last_id = map.keys().next_back().copied().unwrap_or_default();
        Ok(Self {
            experiences: map,
            last_id,
            event_log: Vec::new(),
        })
    }

    /// Like `from_experiences`, but experiences whose id is already taken
    /// get fresh ids past the highest one instead of failing the load.
    /// Returns the journal and the `(old, new)` id of every renumbered entry.
    pub fn from_experiences_renumbered(
        experiences: impl IntoIterator<Item = Experience>,
    ) -> Result<(Self, Vec<(ExperienceId, ExperienceId)>), JournalError> {
        let list: Vec<Experience> = experiences.into_iter().collect();
        let mut next = list.iter().map(|e| e.id).max().unwrap_or_default();
        let mut map = BTreeMap::new();
        let mut renumbered = Vec::new();
        for mut exp in list {
            if map.contains_key(&exp.id) {
                let old = exp.id;
                next = next.next().ok_or(JournalError::IdSpaceExhausted(next))?;
                exp.id = next;
                renumbered.push((old, next));
            }
            map.insert(exp.id, exp);
        }
        let last_id = map.keys().next_back().copied().unwrap_or_default();
        Ok((
            Self {
                experiences: map,
                last_id,
                event_log: Vec::new(),
            },
            renumbered,
        ))
    }

    pub fn len(&self) -> usize {
        self.experiences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.experiences.is_empty()
    }

    pub fn get(&self, id: ExperienceId) -> Option<&Experience> {
        self.experiences.get(&id)
    }

    /// All experiences in id order.
    pub fn experiences(&self) -> impl Iterator<Item = &Experience> {
        self.experiences.values()
    }

    /// Owned copy of the list, in id order (the persisted shape).
    pub fn to_vec(&self) -> Vec<Experience> {
        self.experiences.values().cloned().collect()
    }

    pub fn completed(&self) -> impl Iterator<Item = &Experience> {
        self.experiences.values().filter(|e| e.completed)
    }

    pub fn ongoing(&self) -> impl Iterator<Item = &Experience> {
        self.experiences.values().filter(|e| !e.completed)
    }

    /// Read-only access to the event log.
    pub fn events(&self) -> &[JournalEvent] {
        &self.event_log
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<JournalEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Id the next recorded experience will get: one past the highest id
    /// ever issued or loaded.
    pub fn next_id(&self) -> Result<ExperienceId, JournalError> {
        let max_key = self.experiences.keys().next_back().copied();
        let highest = max_key.map_or(self.last_id, |k| k.max(self.last_id));
        highest
            .next()
            .ok_or(JournalError::IdSpaceExhausted(highest))
    }

    /// Turn a challenge into an ongoing experience. Returns its id.
    pub fn accept_challenge(
        &mut self,
        challenge: &Challenge,
        date: DateTime<Utc>,
    ) -> Result<ExperienceId, JournalError> {
        let experience = Experience {
            id: self.next_id()?,
            title: challenge.title.clone(),
            category: challenge.category.clone(),
            level: challenge.level,
            completed: false,
            date,
            kind: challenge.kind.clone(),
            description: challenge.description.clone(),
            feedback: None,
            emotion: None,
        };
        tracing::debug!(id = %experience.id, title = %experience.title, "challenge accepted");
        Ok(self.insert(experience))
    }

    /// Record something the user already did.
    pub fn record_entry(
        &mut self,
        entry: JournalEntry,
        date: DateTime<Utc>,
    ) -> Result<ExperienceId, JournalError> {
        if entry.title.trim().is_empty() {
            return Err(JournalError::MissingField("title"));
        }
        if entry.category.trim().is_empty() {
            return Err(JournalError::MissingField("category"));
        }
        let experience = Experience {
            id: self.next_id()?,
            title: entry.title,
            category: entry.category,
            level: ChallengeLevel::Weekend,
            completed: true,
            date,
            kind: "journal".to_string(),
            description: None,
            feedback: None,
            emotion: entry.emotion.filter(|e| !e.trim().is_empty()),
        };
        Ok(self.insert(experience))
    }

    /// Mark an ongoing experience as completed.
    pub fn complete(&mut self, id: ExperienceId, date: DateTime<Utc>) -> Result<(), JournalError> {
        let exp = self
            .experiences
            .get_mut(&id)
            .ok_or(JournalError::NotFound(id))?;
        if exp.completed {
            return Err(JournalError::AlreadyCompleted(id));
        }
        exp.completed = true;
        exp.date = date;
        self.event_log.push(JournalEvent::Completed { id, date });
        Ok(())
    }

    /// Attach feedback. Allowed on completed experiences too.
    pub fn attach_feedback(
        &mut self,
        id: ExperienceId,
        feedback: Feedback,
    ) -> Result<(), JournalError> {
        let exp = self
            .experiences
            .get_mut(&id)
            .ok_or(JournalError::NotFound(id))?;
        exp.feedback = Some(feedback);
        self.event_log
            .push(JournalEvent::FeedbackAttached { id, feedback });
        Ok(())
    }

    /// Change the title/description of an ongoing experience.
    pub fn edit(
        &mut self,
        id: ExperienceId,
        title: String,
        description: Option<String>,
    ) -> Result<(), JournalError> {
        if title.trim().is_empty() {
            return Err(JournalError::MissingField("title"));
        }
        let exp = self
            .experiences
            .get_mut(&id)
            .ok_or(JournalError::NotFound(id))?;
        if exp.completed {
            return Err(JournalError::Immutable(id));
        }
        exp.title = title.clone();
        exp.description = description.clone();
        self.event_log.push(JournalEvent::Edited {
            id,
            title,
            description,
        });
        Ok(())
    }

    /// Drop an ongoing experience. Completed experiences cannot be removed.
    pub fn abandon(&mut self, id: ExperienceId) -> Result<Experience, JournalError> {
        match self.experiences.get(&id) {
            None => return Err(JournalError::NotFound(id)),
            Some(exp) if exp.completed => return Err(JournalError::Immutable(id)),
            Some(_) => {}
        }
        let experience = self
            .experiences
            .remove(&id)
            .ok_or(JournalError::NotFound(id))?;
        self.event_log.push(JournalEvent::Abandoned {
            experience: experience.clone(),
        });
        Ok(experience)
    }

    pub(crate) fn insert(&mut self, experience: Experience) -> ExperienceId {
        let id = experience.id;
        self.last_id = self.last_id.max(id);
        self.experiences.insert(id, experience.clone());
        self.event_log.push(JournalEvent::Recorded { experience });
        id
    }

    /// Reconstruct a journal from a sequence of events.
    pub fn replay(events: &[JournalEvent]) -> Self {
        let mut journal = Self::new();
        for event in events {
            match event {
                JournalEvent::Recorded { experience } => {
                    journal.last_id = journal.last_id.max(experience.id);
                    journal
                        .experiences
                        .insert(experience.id, experience.clone());
                }
                JournalEvent::Completed { id, date } => {
                    if let Some(exp) = journal.experiences.get_mut(id) {
                        exp.completed = true;
                        exp.date = *date;
                    }
                }
                JournalEvent::FeedbackAttached { id, feedback } => {
                    if let Some(exp) = journal.experiences.get_mut(id) {
                        exp.feedback = Some(*feedback);
                    }
                }
                JournalEvent::Edited {
                    id,
                    title,
                    description,
                } => {
                    if let Some(exp) = journal.experiences.get_mut(id) {
                        exp.title = title.clone();
                        exp.description = description.clone();
                    }
                }
                JournalEvent::Abandoned { experience } => {
                    journal.experiences.remove(&experience.id);
                }
            }
        }
        journal
    }

    /// Deterministic hash of the journal contents (id order).
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325; // FNV offset basis
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        // Length-prefixed so adjacent fields cannot run into each other.
        let mix_str = |h: &mut u64, s: &str| {
            mix(h, &(s.len() as u64).to_le_bytes());
            mix(h, s.as_bytes());
        };
        let mix_opt = |h: &mut u64, s: Option<&str>| match s {
            Some(s) => {
                mix(h, &[1]);
                mix_str(h, s);
            }
            None => mix(h, &[0]),
        };
        for (id, exp) in &self.experiences {
            mix(&mut h, &id.0.to_le_bytes());
            mix_str(&mut h, &exp.title);
            mix_str(&mut h, &exp.category);
            mix(&mut h, &[exp.level.as_u8(), exp.completed as u8]);
            mix(&mut h, &exp.date.timestamp_millis().to_le_bytes());
            mix_str(&mut h, &exp.kind);
            mix_opt(&mut h, exp.description.as_deref());
            mix_opt(&mut h, exp.feedback.map(|f| f.as_str()));
            mix_opt(&mut h, exp.emotion.as_deref());
        }
        h
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, day, 9, 0, 0).unwrap()
    }

    fn challenge(title: &str) -> Challenge {
        Challenge {
            id: Some(format!("c-{title}")),
            title: title.to_string(),
            category: "Lifestyle".into(),
            kind: "place".into(),
            level: ChallengeLevel::Petit,
            icon: None,
            description: Some("Take the long way".into()),
            estimated_time: None,
        }
    }

    fn entry(title: &str) -> JournalEntry {
        JournalEntry {
            title: title.into(),
            category: "Art & Creative".into(),
            emotion: Some("calm".into()),
        }
    }

    #[test]
    fn journal_starts_empty() {
        let j = Journal::new();
        assert!(j.is_empty());
        assert_eq!(j.next_id(), Ok(ExperienceId(1)));
    }

    #[test]
    fn accept_challenge_appends_one_ongoing_experience() {
        let mut j = Journal::new();
        j.record_entry(entry("Watercolour"), date(1)).unwrap();
        let before = j.len();

        let id = j.accept_challenge(&challenge("Walk home differently"), date(2)).unwrap();

        assert_eq!(j.len(), before + 1);
        let exp = j.get(id).unwrap();
        assert!(!exp.completed);
        assert_eq!(exp.title, "Walk home differently");
        assert_eq!(exp.level, ChallengeLevel::Petit);
        assert_eq!(j.ongoing().count(), 1);
    }

    #[test]
    fn ids_are_unique_and_increasing() {
        let mut j = Journal::new();
        let a = j.accept_challenge(&challenge("a"), date(1)).unwrap();
        let b = j.accept_challenge(&challenge("b"), date(1)).unwrap();
        j.abandon(b).unwrap();
        let c = j.accept_challenge(&challenge("c"), date(1)).unwrap();
        assert!(a < b);
        assert!(b < c);
        assert_eq!(c, ExperienceId(3));
    }

    #[test]
    fn record_entry_requires_title_and_category() {
        let mut j = Journal::new();
        let err = j
            .record_entry(
                JournalEntry {
                    title: " ".into(),
                    ..entry("x")
                },
                date(1),
            )
            .unwrap_err();
        assert_eq!(err, JournalError::MissingField("title"));

        let err = j
            .record_entry(
                JournalEntry {
                    category: String::new(),
                    ..entry("x")
                },
                date(1),
            )
            .unwrap_err();
        assert_eq!(err, JournalError::MissingField("category"));
        assert!(j.events().is_empty());
    }

    #[test]
    fn journal_entry_is_completed() {
        let mut j = Journal::new();
        let id = j.record_entry(entry("Morning run"), date(3)).unwrap();
        let exp = j.get(id).unwrap();
        assert!(exp.completed);
        assert_eq!(exp.kind, "journal");
        assert_eq!(exp.emotion.as_deref(), Some("calm"));
    }

    #[test]
    fn completed_is_immutable_except_feedback() {
        let mut j = Journal::new();
        let id = j.record_entry(entry("Jazz"), date(1)).unwrap();

        assert_eq!(
            j.edit(id, "Other".into(), None),
            Err(JournalError::Immutable(id))
        );
        assert_eq!(j.abandon(id), Err(JournalError::Immutable(id)));
        assert_eq!(j.complete(id, date(2)), Err(JournalError::AlreadyCompleted(id)));

        j.attach_feedback(id, Feedback::Positive).unwrap();
        assert_eq!(j.get(id).unwrap().feedback, Some(Feedback::Positive));
        assert_eq!(j.get(id).unwrap().title, "Jazz");
    }

    #[test]
    fn ongoing_can_be_edited_then_completed() {
        let mut j = Journal::new();
        let id = j.accept_challenge(&challenge("Cafe"), date(1)).unwrap();
        j.edit(id, "Cafe two towns over".into(), None).unwrap();
        j.complete(id, date(4)).unwrap();

        let exp = j.get(id).unwrap();
        assert!(exp.completed);
        assert_eq!(exp.title, "Cafe two towns over");
        assert_eq!(exp.date, date(4));
        assert!(exp.description.is_none());
    }

    #[test]
    fn unknown_id_is_not_found() {
        let mut j = Journal::new();
        let ghost = ExperienceId(99);
        assert_eq!(
            j.attach_feedback(ghost, Feedback::Neutral),
            Err(JournalError::NotFound(ghost))
        );
        assert_eq!(j.complete(ghost, date(1)), Err(JournalError::NotFound(ghost)));
        assert_eq!(j.abandon(ghost), Err(JournalError::NotFound(ghost)));
    }

    #[test]
    fn from_experiences_rejects_duplicates() {
        let mut j = Journal::new();
        let id = j.record_entry(entry("a"), date(1)).unwrap();
        let exp = j.get(id).unwrap().clone();
        let result = Journal::from_experiences(vec![exp.clone(), exp]);
        assert_eq!(result.unwrap_err(), JournalError::DuplicateId(id));
    }

    #[test]
    fn from_experiences_logs_nothing() {
        let mut j = Journal::new();
        j.record_entry(entry("a"), date(1)).unwrap();
        let loaded = Journal::from_experiences(j.to_vec()).unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded.events().is_empty());
    }

    #[test]
    fn events_are_recorded() {
        let mut j = Journal::new();
        let id = j.accept_challenge(&challenge("a"), date(1)).unwrap();
        j.complete(id, date(2)).unwrap();
        j.attach_feedback(id, Feedback::Positive).unwrap();
        assert_eq!(j.events().len(), 3);
        let drained = j.drain_events();
        assert_eq!(drained.len(), 3);
        assert!(j.events().is_empty());
    }

    #[test]
    fn replay_equivalence() {
        let mut j = Journal::new();
        let a = j.accept_challenge(&challenge("a"), date(1)).unwrap();
        let b = j.accept_challenge(&challenge("b"), date(1)).unwrap();
        j.record_entry(entry("c"), date(2)).unwrap();
        j.edit(a, "a2".into(), Some("edited".into())).unwrap();
        j.complete(a, date(3)).unwrap();
        j.attach_feedback(a, Feedback::Negative).unwrap();
        j.abandon(b).unwrap();

        let replayed = Journal::replay(j.events());
        assert_eq!(replayed.state_hash(), j.state_hash());
        assert_eq!(replayed.len(), 2);
        assert_eq!(replayed.get(a), j.get(a));
    }

    #[test]
    fn state_hash_changes_with_feedback() {
        let mut j = Journal::new();
        let id = j.record_entry(entry("a"), date(1)).unwrap();
        let before = j.state_hash();
        j.attach_feedback(id, Feedback::Neutral).unwrap();
        assert_ne!(before, j.state_hash());
    }

    #[test]
    fn state_hash_separates_adjacent_fields() {
        let hash = |title: &str, category: &str| {
            let mut j = Journal::new();
            j.record_entry(
                JournalEntry {
                    title: title.into(),
                    category: category.into(),
                    emotion: None,
                },
                date(1),
            )
            .unwrap();
            j.state_hash()
        };
        assert_ne!(hash("ab", "c"), hash("a", "bc"));
    }

    fn stored(id: u64) -> Experience {
        let mut j = Journal::new();
        j.record_entry(entry("stored"), date(1)).unwrap();
        let mut exp = j.to_vec().remove(0);
        exp.id = ExperienceId(id);
        exp
    }

    #[test]
    fn exhausted_id_space_is_an_error() {
        let mut j = Journal::from_experiences([stored(u64::MAX)]).unwrap();
        let max = ExperienceId(u64::MAX);
        assert_eq!(j.next_id(), Err(JournalError::IdSpaceExhausted(max)));
        assert_eq!(
            j.record_entry(entry("late"), date(2)),
            Err(JournalError::IdSpaceExhausted(max))
        );
        assert!(j.accept_challenge(&challenge("late"), date(2)).is_err());
        assert_eq!(j.len(), 1);
        assert!(j.events().is_empty());
    }

    #[test]
    fn duplicate_ids_are_renumbered_on_request() {
        let list = vec![stored(1), stored(2), stored(2), stored(1)];
        assert_eq!(
            Journal::from_experiences(list.clone()).unwrap_err(),
            JournalError::DuplicateId(ExperienceId(2))
        );

        let (j, renumbered) = Journal::from_experiences_renumbered(list).unwrap();
        assert_eq!(j.len(), 4);
        assert_eq!(
            renumbered,
            vec![
                (ExperienceId(2), ExperienceId(3)),
                (ExperienceId(1), ExperienceId(4)),
            ]
        );
        assert_eq!(j.next_id(), Ok(ExperienceId(5)));
        assert!(j.events().is_empty());
    }
}
