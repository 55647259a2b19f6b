//! Application state: the journal, its blob store and the sync client.
//!
//! Every mutating command goes through `App`, which persists the experience
//! list and pushes it to the backend afterwards, the way the app did after
//! each accept, journal entry and feedback.

use anyhow::{Context, Result, bail};
use chrono::Utc;
use serenpaths_common::{Challenge, ChallengeLevel, ExperienceId, Feedback, UserPreferences};
use serenpaths_kernel::{Journal, JournalEntry};
use serenpaths_persist::{BlobStore, keys, records};
use serenpaths_scene::{Scene, SceneDiff};
use serenpaths_sync::{
    Backend, Clock, FeedbackOutcome, InitReport, PreferencesOutcome, Recommendation, SyncClient,
    SystemClock,
};

pub struct App<S, B, C = SystemClock> {
    store: S,
    journal: Journal,
    preferences: Option<UserPreferences>,
    client: SyncClient<B, C>,
}

impl<S: BlobStore, B: Backend, C: Clock> App<S, B, C> {
    /// Load saved state. A store that never held experiences starts from
    /// the sample journal.
    pub fn open(mut store: S, client: SyncClient<B, C>) -> Result<Self> {
        let journal = if store.contains(keys::EXPERIENCES)? {
            let (journal, renumbered) =
                Journal::from_experiences_renumbered(records::load_experiences(&store)?)
                    .context("saved experiences cannot be given unique ids")?;
            if !renumbered.is_empty() {
                for (old, new) in &renumbered {
                    tracing::warn!(%old, %new, "duplicate experience id renumbered");
                }
                records::save_experiences(&mut store, &journal.to_vec())?;
            }
            journal
        } else {
            tracing::info!("no saved experiences, starting from samples");
            Journal::with_samples()
        };
        let preferences = records::load_preferences(&store)?;
        tracing::debug!(
            experiences = journal.len(),
            onboarded = preferences.is_some(),
            "application state loaded"
        );
        Ok(Self {
            store,
            journal,
            preferences,
            client,
        })
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn preferences(&self) -> Option<&UserPreferences> {
        self.preferences.as_ref()
    }

    pub fn client_mut(&mut self) -> &mut SyncClient<B, C> {
        &mut self.client
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn needs_onboarding(&self) -> bool {
        self.preferences.is_none()
    }

    pub fn onboard(&mut self, preferences: UserPreferences) -> Result<()> {
        records::save_preferences(&mut self.store, &preferences)?;
        tracing::info!(level = preferences.challenge_level.as_u8(), "onboarding complete");
        self.preferences = Some(preferences);
        Ok(())
    }

    fn onboarded(&self) -> Result<&UserPreferences> {
        match &self.preferences {
            Some(p) => Ok(p),
            None => bail!("no preferences saved yet; run `onboard` first"),
        }
    }

    /// Ask for a challenge at `level`, or at the onboarding level.
    pub fn recommend(&mut self, level: Option<ChallengeLevel>) -> Result<Recommendation> {
        let preferences = self.onboarded()?.clone();
        let level = level.unwrap_or(preferences.challenge_level);
        let experiences = self.journal.to_vec();
        Ok(self
            .client
            .recommend(&self.store, level, Some(&preferences), &experiences))
    }

    pub fn accept(&mut self, challenge: &Challenge) -> Result<ExperienceId> {
        let id = self.journal.accept_challenge(challenge, Utc::now())?;
        self.commit()?;
        Ok(id)
    }

    /// Report a skipped challenge; the reason is sent as its feedback.
    pub fn skip(&mut self, challenge: &Challenge, reason: &str) -> Result<FeedbackOutcome> {
        let experiences = self.journal.to_vec();
        let outcome = self.client.send_feedback(
            &mut self.store,
            &challenge.feedback_id(),
            reason,
            &experiences,
        )?;
        Ok(outcome)
    }

    pub fn record(&mut self, entry: JournalEntry) -> Result<ExperienceId> {
        let id = self.journal.record_entry(entry, Utc::now())?;
        self.commit()?;
        Ok(id)
    }

    pub fn complete(&mut self, id: ExperienceId) -> Result<()> {
        self.journal.complete(id, Utc::now())?;
        self.commit()?;
        Ok(())
    }

    /// Attach and save feedback, then report it to the backend.
    pub fn feedback(&mut self, id: ExperienceId, feedback: Feedback) -> Result<FeedbackOutcome> {
        self.journal.attach_feedback(id, feedback)?;
        self.commit()?;
        let experiences = self.journal.to_vec();
        let outcome = self.client.send_feedback(
            &mut self.store,
            &id.to_string(),
            feedback.as_str(),
            &experiences,
        )?;
        Ok(outcome)
    }

    pub fn edit(&mut self, id: ExperienceId, title: String, description: Option<String>) -> Result<()> {
        self.journal.edit(id, title, description)?;
        self.commit()?;
        Ok(())
    }

    pub fn abandon(&mut self, id: ExperienceId) -> Result<()> {
        let dropped = self.journal.abandon(id)?;
        tracing::info!(id = %dropped.id, title = %dropped.title, "mission abandoned");
        self.commit()?;
        Ok(())
    }

    /// Save the experience list, then push it to the backend.
    fn commit(&mut self) -> Result<PreferencesOutcome> {
        let experiences = self.journal.to_vec();
        records::save_experiences(&mut self.store, &experiences)?;
        let events = self.journal.drain_events();
        tracing::debug!(events = events.len(), "journal saved");
        Ok(self
            .client
            .update_preferences(&mut self.store, &experiences)?)
    }

    /// The scene for the current journal, built from scratch.
    pub fn scene(&self) -> (Scene, SceneDiff) {
        let mut scene = Scene::new();
        let diff = scene.sync(&self.journal.to_vec());
        (scene, diff)
    }

    /// Health check and pending-data retry.
    pub fn sync(&mut self) -> Result<InitReport> {
        Ok(self.client.initialize(&mut self.store)?)
    }

    pub fn flag(&self, key: &str) -> Result<bool> {
        Ok(records::flag(&self.store, key)?)
    }

    pub fn set_flag(&mut self, key: &str, value: bool) -> Result<()> {
        records::set_flag(&mut self.store, key, value)?;
        Ok(())
    }
}
