//! The sync client: fallback chain, rate limit, cache and pending queue.

use std::collections::BTreeMap;
use std::time::Duration;

use serde_json::{Value, json};
use serenpaths_common::{Challenge, ChallengeLevel, Experience, UserPreferences};
use serenpaths_kernel::LocalChallengeGenerator;
use serenpaths_persist::records::{self, PendingFeedback, PendingPreferences};
use serenpaths_persist::{BlobStore, StoreError, keys};

use crate::auth::AuthState;
use crate::backend::{ApiError, Backend, endpoints};
use crate::clock::{Clock, SystemClock};
use crate::config::ApiConfig;

/// Number of most recent experiences sent along with a request.
pub const CONTEXT_EXPERIENCES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendationSource {
    Remote,
    Cache,
    Local,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub challenge: Challenge,
    pub source: RecommendationSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackOutcome {
    Sent,
    /// Stored for a later `sync_pending`; `pending` is the queue length.
    Queued { pending: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferencesOutcome {
    /// Auto-save is turned off.
    Skipped,
    Sent,
    Queued,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub feedback_sent: usize,
    pub feedback_remaining: usize,
    pub preferences_sent: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitReport {
    pub healthy: bool,
    pub authenticated: bool,
    /// Present when the backend was healthy and pending data was retried.
    pub sync: Option<SyncReport>,
}

#[derive(Debug, Clone)]
struct CachedRecommendation {
    stored_at: Duration,
    challenge: Challenge,
}

/// Best-effort client for the recommendation service.
pub struct SyncClient<B, C = SystemClock> {
    config: ApiConfig,
    backend: B,
    clock: C,
    auth: AuthState,
    generator: LocalChallengeGenerator,
    cache: BTreeMap<String, CachedRecommendation>,
    last_call: Option<Duration>,
}

impl<B: Backend> SyncClient<B, SystemClock> {
    pub fn new(config: ApiConfig, backend: B) -> Self {
        Self::with_clock(
            config,
            backend,
            SystemClock::new(),
            LocalChallengeGenerator::from_clock(),
        )
    }
}

impl<B: Backend, C: Clock> SyncClient<B, C> {
    pub fn with_clock(
        config: ApiConfig,
        backend: B,
        clock: C,
        generator: LocalChallengeGenerator,
    ) -> Self {
        Self {
            config,
            backend,
            clock,
            auth: AuthState::new(),
            generator,
            cache: BTreeMap::new(),
            last_call: None,
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn auth(&self) -> &AuthState {
        &self.auth
    }

    pub fn auth_mut(&mut self) -> &mut AuthState {
        &mut self.auth
    }

    pub fn cached_recommendations(&self) -> usize {
        self.cache.len()
    }

    /// Drop the session and every cached response.
    pub fn sign_out(&mut self) {
        self.auth.clear();
        self.cache.clear();
        tracing::info!("signed out, request cache cleared");
    }

    fn throttle(&mut self) {
        let now = self.clock.elapsed();
        if let Some(last) = self.last_call {
            let since = now.saturating_sub(last);
            if since < self.config.min_interval {
                let wait = self.config.min_interval - since;
                tracing::debug!(wait_ms = wait.as_millis() as u64, "rate limited, waiting");
                self.clock.sleep(wait);
            }
        }
        self.last_call = Some(self.clock.elapsed());
    }

    /// Authenticated call, then public call. The caller owns the local fallback.
    fn call(&mut self, path: &str, body: &Value) -> Result<Value, ApiError> {
        if self.config.offline {
            return Err(ApiError::Offline);
        }
        self.throttle();

        if let Some(session) = self.auth.session() {
            match self.backend.post(path, body, Some(&session.access_token)) {
                Ok(value) => {
                    tracing::debug!(path, "authenticated call succeeded");
                    return Ok(value);
                }
                Err(error) => {
                    tracing::info!(path, %error, "authenticated call failed, trying public");
                }
            }
        }

        let result = self.backend.post(path, body, None);
        match &result {
            Ok(_) => tracing::debug!(path, "public call succeeded"),
            Err(error) => tracing::warn!(path, %error, "remote call failed"),
        }
        result
    }

    fn flag<S: BlobStore + ?Sized>(store: &S, key: &str) -> bool {
        records::flag(store, key).unwrap_or_else(|error| {
            tracing::warn!(key, %error, "could not read flag, assuming enabled");
            true
        })
    }

    /// Fetch a challenge. Never fails: remote errors fall back to the local
    /// generator.
    pub fn recommend<S: BlobStore + ?Sized>(
        &mut self,
        store: &S,
        level: ChallengeLevel,
        preferences: Option<&UserPreferences>,
        experiences: &[Experience],
    ) -> Recommendation {
        let _span = tracing::info_span!("recommend", level = level.as_u8()).entered();

        if !Self::flag(store, keys::AI_ENABLED) {
            tracing::info!("AI disabled, using local recommendation");
            return self.local(level, preferences);
        }

        let preferences_json = preferences
            .and_then(|p| serde_json::to_value(p).ok())
            .unwrap_or_else(|| json!({}));
        let cache_key = format!("rec_{}_{}_{}", level.as_u8(), preferences_json, experiences.len());
        let now = self.clock.elapsed();
        if let Some(cached) = self.cache.get(&cache_key)
            && now.saturating_sub(cached.stored_at) < self.config.cache_ttl
        {
            tracing::debug!("using cached recommendation");
            return Recommendation {
                challenge: cached.challenge.clone(),
                source: RecommendationSource::Cache,
            };
        }

        let body = json!({
            "level": level.as_u8(),
            "preferences": preferences_json,
            "experiences": recent(experiences),
        });
        let remote = self.call(endpoints::RECOMMENDATIONS, &body).and_then(|value| {
            serde_json::from_value::<Challenge>(value)
                .map_err(|error| ApiError::Decode(error.to_string()))
        });

        match remote {
            Ok(challenge) => {
                self.cache.insert(
                    cache_key,
                    CachedRecommendation {
                        stored_at: self.clock.elapsed(),
                        challenge: challenge.clone(),
                    },
                );
                Recommendation {
                    challenge,
                    source: RecommendationSource::Remote,
                }
            }
            Err(error) => {
                tracing::warn!(%error, "recommendation unavailable, using local fallback");
                self.local(level, preferences)
            }
        }
    }

    fn local(
        &mut self,
        level: ChallengeLevel,
        preferences: Option<&UserPreferences>,
    ) -> Recommendation {
        Recommendation {
            challenge: self.generator.generate(level, preferences),
            source: RecommendationSource::Local,
        }
    }

    /// Send feedback for an experience or a skipped challenge. Queued when
    /// the backend is unreachable.
    pub fn send_feedback<S: BlobStore + ?Sized>(
        &mut self,
        store: &mut S,
        experience_id: &str,
        feedback: &str,
        experiences: &[Experience],
    ) -> Result<FeedbackOutcome, StoreError> {
        let body = json!({
            "experience_id": id_value(experience_id),
            "feedback": feedback,
            "experiences": recent(experiences),
        });
        match self.call(endpoints::FEEDBACK, &body) {
            Ok(_) => {
                tracing::info!(experience_id, feedback, "feedback sent");
                Ok(FeedbackOutcome::Sent)
            }
            Err(error) => {
                let pending = records::push_pending_feedback(
                    store,
                    PendingFeedback {
                        experience_id: experience_id.to_string(),
                        feedback: feedback.to_string(),
                        timestamp: self.clock.now(),
                    },
                )?;
                tracing::warn!(%error, pending, "feedback queued for later");
                Ok(FeedbackOutcome::Queued { pending })
            }
        }
    }

    /// Push the full experience list. Skipped when auto-save is off.
    pub fn update_preferences<S: BlobStore + ?Sized>(
        &mut self,
        store: &mut S,
        experiences: &[Experience],
    ) -> Result<PreferencesOutcome, StoreError> {
        if !Self::flag(store, keys::AUTO_SAVE) {
            tracing::debug!("auto-save disabled, skipping preference update");
            return Ok(PreferencesOutcome::Skipped);
        }
        let body = json!({ "experiences": experiences });
        match self.call(endpoints::PREFERENCES_UPDATE, &body) {
            Ok(_) => {
                // A newer snapshot supersedes anything still queued.
                records::clear_pending_preferences(store)?;
                Ok(PreferencesOutcome::Sent)
            }
            Err(error) => {
                records::save_pending_preferences(
                    store,
                    &PendingPreferences {
                        experiences: experiences.to_vec(),
                        timestamp: self.clock.now(),
                    },
                )?;
                tracing::warn!(%error, "preference update queued for later");
                Ok(PreferencesOutcome::Queued)
            }
        }
    }

    /// Retry queued feedback, then the queued preference snapshot. Items
    /// that fail again stay queued.
    pub fn sync_pending<S: BlobStore + ?Sized>(
        &mut self,
        store: &mut S,
    ) -> Result<SyncReport, StoreError> {
        let _span = tracing::info_span!("sync_pending").entered();
        let mut report = SyncReport::default();

        let queue = records::load_pending_feedback(store)?;
        let mut remaining = Vec::new();
        for item in queue {
            let body = json!({
                "experience_id": id_value(&item.experience_id),
                "feedback": item.feedback,
            });
            match self.call(endpoints::FEEDBACK, &body) {
                Ok(_) => report.feedback_sent += 1,
                Err(_) => remaining.push(item),
            }
        }
        records::save_pending_feedback(store, &remaining)?;
        report.feedback_remaining = remaining.len();

        if let Some(pending) = records::load_pending_preferences(store)? {
            let body = json!({ "experiences": pending.experiences });
            if self.call(endpoints::PREFERENCES_UPDATE, &body).is_ok() {
                records::clear_pending_preferences(store)?;
                report.preferences_sent = true;
            }
        }

        if report.feedback_sent > 0 || report.preferences_sent {
            tracing::info!(
                feedback = report.feedback_sent,
                remaining = report.feedback_remaining,
                preferences = report.preferences_sent,
                "pending data synced"
            );
        }
        Ok(report)
    }

    /// Health check, then retry pending data if the backend is up.
    pub fn initialize<S: BlobStore + ?Sized>(
        &mut self,
        store: &mut S,
    ) -> Result<InitReport, StoreError> {
        let healthy = !self.config.offline && self.backend.health();
        let sync = if healthy {
            tracing::info!(backend = self.backend.name(), "API reachable");
            Some(self.sync_pending(store)?)
        } else {
            tracing::info!("API unreachable, running offline");
            None
        };
        let authenticated = self.auth.is_authenticated();
        if !authenticated {
            tracing::info!("not signed in, guest mode");
        }
        Ok(InitReport {
            healthy,
            authenticated,
            sync,
        })
    }
}

fn recent(experiences: &[Experience]) -> &[Experience] {
    &experiences[experiences.len().saturating_sub(CONTEXT_EXPERIENCES)..]
}

/// Numeric ids go out as numbers, anything else as a string.
fn id_value(id: &str) -> Value {
    id.parse::<u64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::from(id))
}
