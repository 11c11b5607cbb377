//! Chooses and caches the icon shown for each link
//!
//! Three paths mutate the preference map: explicit bulk refresh, implicit
//! background resolution for links without a preference, and render-time
//! promotion after a fallback load succeeds. All of them go through
//! [`FaviconResolver::commit_preferences`], which serializes whole-map
//! read-modify-write cycles.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use url::Url;
use uuid::Uuid;

use super::candidates::{favicon_candidates, is_low_res_domain_query, with_cache_bust, IconProvider};
use super::probe::{ImageProbe, ProbeResult};
use super::scorer::{score_with, ScoreWeights, DISQUALIFIED};
use crate::config::FaviconConfig;
use crate::links::{IconSource, QuickLink};
use crate::storage::{FaviconPreferences, Storage};
use crate::{Error, Result};

/// What the render surface should display for a link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaviconSource {
    /// `None` means render the vector fallback glyph
    pub display_src: Option<String>,
    pub candidate_count: usize,
}

/// Result of the render surface loading `display_src`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOutcome {
    pub success: bool,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl LoadOutcome {
    pub fn loaded(width: u32, height: u32) -> Self {
        Self {
            success: true,
            width: Some(width),
            height: Some(height),
        }
    }

    pub fn failed() -> Self {
        Self {
            success: false,
            width: None,
            height: None,
        }
    }
}

impl From<ProbeResult> for LoadOutcome {
    fn from(result: ProbeResult) -> Self {
        match result {
            ProbeResult { ok: false, .. } => LoadOutcome::failed(),
            // Vector icons have no intrinsic size to hold against the floor
            ProbeResult { vector: true, .. } => LoadOutcome {
                success: true,
                width: None,
                height: None,
            },
            _ => LoadOutcome::loaded(result.width, result.height),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshProgress {
    pub done: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    pub total: usize,
    pub resolved: usize,
}

/// Per-link render-time fallback position
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FallbackState {
    link_url: String,
    candidates: Vec<String>,
    fallback_offset: usize,
    exhausted: bool,
}

impl FallbackState {
    fn new(link_url: &str, candidates: Vec<String>) -> Self {
        Self {
            link_url: link_url.to_string(),
            candidates,
            fallback_offset: 0,
            exhausted: false,
        }
    }

    fn current(&self) -> Option<&String> {
        if self.exhausted {
            return None;
        }
        self.candidates.get(self.fallback_offset)
    }

    /// Move past a failed candidate; the offset never passes the last index
    fn advance(&mut self) {
        if self.candidates.is_empty() {
            self.exhausted = true;
        } else if self.fallback_offset + 1 < self.candidates.len() {
            self.fallback_offset += 1;
        } else {
            self.exhausted = true;
        }
    }
}

#[derive(Default)]
struct ResolverState {
    preferences: FaviconPreferences,
    render: HashMap<String, FallbackState>,
    background: Option<CancellationToken>,
    links_fingerprint: Option<u64>,
}

struct RefreshGuard<'a>(&'a AtomicBool);

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct FaviconResolver {
    probe: Arc<dyn ImageProbe>,
    store: Arc<dyn Storage>,
    weights: ScoreWeights,
    enabled: bool,
    quality_floor_px: u32,
    state: Mutex<ResolverState>,
    commit_lock: tokio::sync::Mutex<()>,
    refreshing: AtomicBool,
}

impl FaviconResolver {
    pub fn new(probe: Arc<dyn ImageProbe>, store: Arc<dyn Storage>, config: &FaviconConfig) -> Self {
        Self {
            probe,
            store,
            weights: ScoreWeights::default(),
            enabled: config.enabled,
            quality_floor_px: config.render_quality_floor_px,
            state: Mutex::new(ResolverState::default()),
            commit_lock: tokio::sync::Mutex::new(()),
            refreshing: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ResolverState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Load persisted preferences, dropping ones that are not trusted
    ///
    /// Links whose preference was dropped are picked up again by background
    /// resolution.
    pub async fn load(&self) -> Result<usize> {
        let mut preferences = self.store.load_favicon_preferences().await?;
        let before = preferences.len();
        preferences.retain(|_, url| !is_low_res_domain_query(url));
        let dropped = before - preferences.len();
        if dropped > 0 {
            tracing::info!(dropped, "Ignoring low-resolution favicon preferences");
        }

        let count = preferences.len();
        let mut state = self.lock();
        state.preferences = preferences;
        state.render.clear();
        Ok(count)
    }

    pub fn preferences(&self) -> FaviconPreferences {
        self.lock().preferences.clone()
    }

    pub fn preference(&self, link_id: &str) -> Option<String> {
        self.lock().preferences.get(link_id).cloned()
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing.load(Ordering::SeqCst)
    }

    /// Candidate list for a link, led by its current preference
    pub fn candidates_for(&self, link_id: &str, url: &str) -> Vec<String> {
        let preferred = self.preference(link_id);
        favicon_candidates(url, preferred.as_deref())
    }

    /// Icon the render surface should try next for `link_id`
    pub fn favicon_source(&self, link_id: &str, url: &str) -> FaviconSource {
        let mut guard = self.lock();
        let state = &mut *guard;
        let preferred = state.preferences.get(link_id).map(String::as_str);
        let candidates = favicon_candidates(url, preferred);

        let entry = state
            .render
            .entry(link_id.to_string())
            .or_insert_with(|| FallbackState::new(url, candidates.clone()));
        if entry.link_url != url || entry.candidates != candidates {
            *entry = FallbackState::new(url, candidates);
        }

        FaviconSource {
            display_src: entry.current().cloned(),
            candidate_count: entry.candidates.len(),
        }
    }

    /// Like [`Self::favicon_source`], honoring the link's icon setting
    pub fn favicon_source_for(&self, link: &QuickLink) -> FaviconSource {
        match &link.icon {
            IconSource::Auto if self.enabled => self.favicon_source(&link.id, &link.url),
            IconSource::Custom { url } => FaviconSource {
                display_src: Some(url.clone()),
                candidate_count: 1,
            },
            _ => FaviconSource {
                display_src: None,
                candidate_count: 0,
            },
        }
    }

    /// Record whether `src`, handed out earlier for `link_id`, loaded
    ///
    /// A failure moves to the next candidate. A success is persisted as the
    /// link's preference when it took a fallback or differs from the stored one.
    /// Reports for a source that is no longer current are ignored.
    pub async fn report_favicon_load_result(
        &self,
        link_id: &str,
        src: &str,
        outcome: LoadOutcome,
    ) -> Result<()> {
        let promoted = {
            let mut guard = self.lock();
            let state = &mut *guard;
            let Some(entry) = state.render.get_mut(link_id) else {
                return Ok(());
            };
            if entry.current().map(String::as_str) != Some(src) {
                tracing::debug!(link_id, src, "Ignoring stale favicon load result");
                return Ok(());
            }
            let src = src.to_string();

            if !outcome.success || self.below_quality_floor(&src, outcome) {
                entry.advance();
                tracing::debug!(
                    link_id,
                    %src,
                    offset = entry.fallback_offset,
                    exhausted = entry.exhausted,
                    "Favicon failed to render, falling back"
                );
                return Ok(());
            }

            let stored = state.preferences.get(link_id);
            if entry.fallback_offset == 0 && stored == Some(&src) {
                return Ok(());
            }
            src
        };

        let id = link_id.to_string();
        let url = promoted.clone();
        let result = self
            .commit_preferences(None, move |prefs| {
                prefs.insert(id, url);
            })
            .await;

        // The promoted URL now leads the candidate list
        self.lock().render.remove(link_id);
        result.map(|_| ())
    }

    fn below_quality_floor(&self, src: &str, outcome: LoadOutcome) -> bool {
        if !IconProvider::classify_str(src).is_low_res_provider() {
            return false;
        }
        match (outcome.width, outcome.height) {
            (Some(w), Some(h)) => w.min(h) < self.quality_floor_px,
            _ => false,
        }
    }

    /// Probe every candidate of every resolvable link and keep the best of each
    ///
    /// Results are accumulated and persisted once at the end. Links with no
    /// usable candidate keep whatever preference they had.
    pub async fn refresh_all_favicons(
        &self,
        links: &[QuickLink],
        progress: Option<&mpsc::UnboundedSender<RefreshProgress>>,
    ) -> Result<RefreshSummary> {
        if self.refreshing.swap(true, Ordering::SeqCst) {
            return Err(Error::RefreshInProgress);
        }
        let _guard = RefreshGuard(&self.refreshing);
        self.cancel_background();

        let targets: Vec<&QuickLink> = links.iter().filter(|l| l.icon.wants_resolution()).collect();
        let total = targets.len();
        let bust = Uuid::new_v4().simple().to_string();
        tracing::info!(total, "Refreshing favicons");

        let mut resolved = FaviconPreferences::new();
        for (index, link) in targets.iter().enumerate() {
            let candidates = self.candidates_for(&link.id, &link.url);
            if let Some(best) = self.resolve_best(&link.url, &candidates, Some(&bust)).await {
                resolved.insert(link.id.clone(), best);
            }

            if let Some(tx) = progress {
                let _ = tx.send(RefreshProgress {
                    done: index + 1,
                    total,
                });
            }
            tokio::task::yield_now().await;
        }

        let summary = RefreshSummary {
            total,
            resolved: resolved.len(),
        };
        let resolved_ids: Vec<String> = resolved.keys().cloned().collect();
        self.commit_preferences(None, move |prefs| prefs.extend(resolved))
            .await?;

        {
            let mut state = self.lock();
            for id in &resolved_ids {
                state.render.remove(id);
            }
        }

        tracing::info!(total, resolved = summary.resolved, "Favicon refresh complete");
        Ok(summary)
    }

    /// Restart background resolution when the set of links changed
    ///
    /// Returns whether a new run was started.
    pub fn on_links_changed(self: &Arc<Self>, links: &[QuickLink]) -> bool {
        let fingerprint = links_fingerprint(links);
        {
            let mut state = self.lock();
            if state.links_fingerprint == Some(fingerprint) {
                return false;
            }
            state.links_fingerprint = Some(fingerprint);
            state
                .render
                .retain(|id, _| links.iter().any(|l| &l.id == id));
        }
        self.spawn_background_resolution(links.to_vec()).is_some()
    }

    /// Resolve links lacking a preference without blocking the caller
    ///
    /// Any previous background run is cancelled. Nothing starts while a bulk
    /// refresh is running.
    pub fn spawn_background_resolution(self: &Arc<Self>, links: Vec<QuickLink>) -> Option<JoinHandle<()>> {
        if !self.enabled || self.is_refreshing() {
            return None;
        }

        let token = CancellationToken::new();
        if let Some(previous) = self.lock().background.replace(token.clone()) {
            previous.cancel();
        }

        let this = Arc::clone(self);
        Some(tokio::spawn(async move {
            if let Err(e) = this.resolve_missing(links, token).await {
                tracing::warn!("Background favicon resolution failed: {}", e);
            }
        }))
    }

    pub fn cancel_background(&self) {
        if let Some(token) = self.lock().background.take() {
            token.cancel();
        }
    }

    async fn resolve_missing(&self, links: Vec<QuickLink>, token: CancellationToken) -> Result<usize> {
        let pending: Vec<QuickLink> = {
            let state = self.lock();
            links
                .into_iter()
                .filter(|l| l.icon.wants_resolution() && !state.preferences.contains_key(&l.id))
                .collect()
        };
        if pending.is_empty() {
            return Ok(0);
        }
        tracing::debug!(count = pending.len(), "Resolving missing favicons");

        let mut found = FaviconPreferences::new();
        for link in &pending {
            if token.is_cancelled() {
                tracing::debug!("Background favicon resolution cancelled");
                return Ok(0);
            }
            let candidates = favicon_candidates(&link.url, None);
            if let Some(best) = self.resolve_best(&link.url, &candidates, None).await {
                found.insert(link.id.clone(), best);
            }
        }

        let count = found.len();
        let changed = self
            .commit_preferences(Some(&token), move |prefs| {
                for (id, url) in found {
                    prefs.entry(id).or_insert(url);
                }
            })
            .await?;
        Ok(if changed { count } else { 0 })
    }

    /// Best-scoring candidate that loaded, ties going to the earlier one
    async fn resolve_best(&self, link_url: &str, candidates: &[String], bust: Option<&str>) -> Option<String> {
        if candidates.is_empty() {
            return None;
        }
        let target_host = Url::parse(link_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_default();

        let results = match bust {
            Some(token) => {
                let urls: Vec<String> = candidates.iter().map(|c| with_cache_bust(c, token)).collect();
                self.probe_all(urls).await
            }
            None => {
                let mut results = Vec::with_capacity(candidates.len());
                for candidate in candidates {
                    results.push(self.probe.probe(candidate).await);
                }
                results
            }
        };

        let mut best: Option<(f64, &String)> = None;
        for (candidate, result) in candidates.iter().zip(results) {
            if !result.ok {
                continue;
            }
            let score = score_with(
                &self.weights,
                candidate,
                result.width,
                result.height,
                result.vector,
                &target_host,
            );
            if score <= DISQUALIFIED {
                continue;
            }
            if best.map_or(true, |(top, _)| score > top) {
                best = Some((score, candidate));
            }
        }
        best.map(|(_, url)| url.clone())
    }

    /// Probe all URLs at once, returning results in input order
    async fn probe_all(&self, urls: Vec<String>) -> Vec<ProbeResult> {
        let mut results = vec![ProbeResult::failed(); urls.len()];
        let mut set = JoinSet::new();
        for (index, url) in urls.into_iter().enumerate() {
            let probe = Arc::clone(&self.probe);
            set.spawn(async move { (index, probe.probe(&url).await) });
        }
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, result)) => results[index] = result,
                Err(e) => tracing::debug!("Probe task failed: {}", e),
            }
        }
        results
    }

    /// Apply `mutate` to a copy of the preference map and persist the whole map
    ///
    /// Commits are serialized. A cancelled `token` abandons the commit. When the
    /// write fails, the in-memory map still takes the new value.
    async fn commit_preferences<F>(&self, token: Option<&CancellationToken>, mutate: F) -> Result<bool>
    where
        F: FnOnce(&mut FaviconPreferences),
    {
        let _commit = self.commit_lock.lock().await;
        if token.is_some_and(|t| t.is_cancelled()) {
            return Ok(false);
        }

        let current = self.lock().preferences.clone();
        let mut next = current.clone();
        mutate(&mut next);
        if next == current {
            return Ok(false);
        }

        match self.store.save_favicon_preferences(next.clone()).await {
            Ok(saved) => {
                self.lock().preferences = saved;
                Ok(true)
            }
            Err(e) => {
                tracing::warn!("Failed to persist favicon preferences: {}", e);
                self.lock().preferences = next;
                Err(e)
            }
        }
    }
}

fn links_fingerprint(links: &[QuickLink]) -> u64 {
    let mut hasher = DefaultHasher::new();
    for link in links {
        link.id.hash(&mut hasher);
        link.url.hash(&mut hasher);
    }
    hasher.finish()
}
