use std::sync::Arc;

use tracing::{debug, info, warn};

use super::share::{SHARE_PARAM, decode_share_value, encode_share_value, query_param, with_query_param};
use super::snapshot::{LEGACY_SNAPSHOT_KEYS, SNAPSHOT_KEY, apply_layer, decode_layer, encode_state};
use crate::calculations::NormalizationRegistry;
use crate::models::PortfolioState;
use crate::store::{ShareableLocation, SnapshotStore};

/// Merges defaults, the persisted snapshot and the URL snapshot into one
/// state at startup, and writes every later state back to both.
///
/// Precedence, lowest to highest: all-zero defaults, persisted snapshot,
/// URL snapshot. Only categories present in a layer override the layer
/// below. A layer that is missing or malformed is skipped; neither source
/// is ever fatal.
pub struct StateReconciler {
    store: Arc<dyn SnapshotStore>,
    location: Arc<dyn ShareableLocation>,
    registry: NormalizationRegistry,
    share_param: String,
}

impl StateReconciler {
    pub fn new(
        store: Arc<dyn SnapshotStore>,
        location: Arc<dyn ShareableLocation>,
    ) -> Self {
        Self {
            store,
            location,
            registry: NormalizationRegistry::default(),
            share_param: SHARE_PARAM.to_string(),
        }
    }

    /// Uses `registry` instead of the default normalization rules.
    pub fn with_registry(
        mut self,
        registry: NormalizationRegistry,
    ) -> Self {
        self.registry = registry;
        self
    }

    /// Carries the state in query parameter `name` instead of `s`.
    pub fn with_share_param(
        mut self,
        name: impl Into<String>,
    ) -> Self {
        self.share_param = name.into();
        self
    }

    pub fn registry(&self) -> &NormalizationRegistry {
        &self.registry
    }

    /// Builds the startup state. Every category comes out normalized.
    pub async fn load(&self) -> PortfolioState {
        let mut state = PortfolioState::zeroed();

        self.purge_legacy().await;

        if let Some(payload) = self.persisted_payload().await {
            self.merge(&mut state, "persisted", &payload);
        }
        if let Some(payload) = self.location_payload().await {
            self.merge(&mut state, "url", &payload);
        }

        self.registry.normalize_state(&state)
    }

    /// Persists `state` and rewrites the shareable URL.
    ///
    /// Both writes are best-effort: failures are logged and dropped.
    pub async fn on_change(
        &self,
        state: &PortfolioState,
    ) {
        let json = match encode_state(state) {
            Ok(json) => json,
            Err(error) => {
                warn!(%error, "could not serialize state; skipping sync");
                return;
            }
        };

        if let Err(error) = self.store.save(SNAPSHOT_KEY, &json).await {
            warn!(%error, "could not persist snapshot");
        }

        match self.location.current().await {
            Ok(url) => {
                let next = with_query_param(&url, &self.share_param, &encode_share_value(&json));
                if let Err(error) = self.location.replace(&next).await {
                    warn!(%error, "could not update shareable location");
                }
            }
            Err(error) => warn!(%error, "could not read shareable location"),
        }
    }

    /// The URL the location would carry for `state`.
    pub async fn share_url(
        &self,
        state: &PortfolioState,
    ) -> Option<String> {
        let json = encode_state(state).ok()?;
        let url = self.location.current().await.ok()?;
        Some(with_query_param(
            &url,
            &self.share_param,
            &encode_share_value(&json),
        ))
    }

    fn merge(
        &self,
        state: &mut PortfolioState,
        source: &'static str,
        payload: &str,
    ) {
        match decode_layer(payload) {
            Ok(layer) => {
                debug!(source, categories = layer.len(), "merging snapshot layer");
                apply_layer(state, layer);
            }
            Err(error) => warn!(source, %error, "skipping malformed snapshot layer"),
        }
    }

    async fn persisted_payload(&self) -> Option<String> {
        match self.store.load(SNAPSHOT_KEY).await {
            Ok(payload) => payload,
            Err(error) => {
                warn!(%error, "persisted snapshot unavailable");
                None
            }
        }
    }

    async fn location_payload(&self) -> Option<String> {
        let url = match self.location.current().await {
            Ok(url) => url,
            Err(error) => {
                warn!(%error, "shareable location unavailable");
                return None;
            }
        };
        let value = query_param(&url, &self.share_param)?;
        let decoded = decode_share_value(value);
        if decoded.is_none() {
            warn!(param = %self.share_param, "shareable state is not valid base64url text");
        }
        decoded
    }

    async fn purge_legacy(&self) {
        for key in LEGACY_SNAPSHOT_KEYS {
            match self.store.load(key).await {
                Ok(Some(_)) => {
                    info!(key, "purging snapshot from an older schema");
                    if let Err(error) = self.store.remove(key).await {
                        warn!(key, %error, "could not purge legacy snapshot");
                    }
                }
                Ok(None) => {}
                Err(error) => debug!(key, %error, "legacy snapshot lookup failed"),
            }
        }
    }
}
