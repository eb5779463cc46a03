use crate::schema::{decode_decks, decode_scores};
use crate::source::{fetch_collection, DataSource};
use crate::{
    all_decks_view, due_decks_view, resolve_decks_with, Collection, CoreError, FibonacciSchedule,
    RawDeck, ResolvedDeck, SchedulePolicy, Score, UserId,
};
use chrono::{Local, NaiveDate};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Clone)]
struct Fetched {
    at: Instant,
    decks: Arc<Vec<RawDeck>>,
    scores: Arc<Vec<Score>>,
}

/// Answers "which decks does this user have, and when are they due".
///
/// Without a cache TTL every call re-fetches both collections. With one, the
/// raw records are kept per user and re-resolved against the current date on
/// each call, so due dates never go stale.
pub struct DeckService {
    source: Arc<dyn DataSource>,
    policy: Box<dyn SchedulePolicy + Send + Sync>,
    timeout: Option<Duration>,
    cache_ttl: Option<Duration>,
    cache: RwLock<HashMap<UserId, Fetched>>,
}

impl DeckService {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self {
            source,
            policy: Box::new(FibonacciSchedule),
            timeout: None,
            cache_ttl: None,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// A zero timeout means none, like a zero cache TTL.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout.filter(|d| !d.is_zero());
        self
    }

    /// `None` or a zero TTL keeps the always-fresh behavior.
    pub fn with_cache_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.cache_ttl = ttl.filter(|d| !d.is_zero());
        self
    }

    pub fn with_policy(mut self, policy: impl SchedulePolicy + Send + Sync + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    pub fn invalidate(&self, user: &UserId) {
        self.cache.write().remove(user);
    }

    /// Number of users with cached records, expired or not.
    pub fn cached_users(&self) -> usize {
        self.cache.read().len()
    }

    pub async fn get_decks(&self, user: &UserId) -> Result<Vec<ResolvedDeck>, CoreError> {
        self.get_decks_on(user, today()).await
    }

    pub async fn get_decks_on(&self, user: &UserId, today: NaiveDate) -> Result<Vec<ResolvedDeck>, CoreError> {
        let fetched = self.raw(user).await?;
        Ok(resolve_decks_with(&*self.policy, &fetched.decks, &fetched.scores, today))
    }

    pub async fn all_decks(&self, user: &UserId, today: NaiveDate) -> Result<Vec<ResolvedDeck>, CoreError> {
        Ok(all_decks_view(&self.get_decks_on(user, today).await?))
    }

    pub async fn due_decks(&self, user: &UserId, today: NaiveDate) -> Result<Vec<ResolvedDeck>, CoreError> {
        Ok(due_decks_view(&self.get_decks_on(user, today).await?, today))
    }

    async fn raw(&self, user: &UserId) -> Result<Fetched, CoreError> {
        if let Some(ttl) = self.cache_ttl {
            let hit = self.cache.read().get(user).cloned();
            if let Some(f) = hit {
                if f.at.elapsed() < ttl {
                    tracing::debug!(%user, "deck cache hit");
                    return Ok(f);
                }
            }
        }

        let fetched = match self.timeout {
            Some(d) => tokio::time::timeout(d, self.fetch(user))
                .await
                .map_err(|_| CoreError::Timeout(d))??,
            None => self.fetch(user).await?,
        };

        if let Some(ttl) = self.cache_ttl {
            let mut cache = self.cache.write();
            cache.retain(|_, f| f.at.elapsed() < ttl);
            cache.insert(user.clone(), fetched.clone());
        }
        Ok(fetched)
    }

    async fn fetch(&self, user: &UserId) -> Result<Fetched, CoreError> {
        let source = &*self.source;
        let (deck_records, score_records) = tokio::try_join!(
            fetch_collection(source, user, Collection::Decks),
            fetch_collection(source, user, Collection::Scores),
        )?;
        let decks = decode_decks(&deck_records)?;
        let scores = decode_scores(&score_records)?;
        tracing::info!(%user, decks = decks.len(), scores = scores.len(), "fetched deck data");
        Ok(Fetched {
            at: Instant::now(),
            decks: Arc::new(decks),
            scores: Arc::new(scores),
        })
    }
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
