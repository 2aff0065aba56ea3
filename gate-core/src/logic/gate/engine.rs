//! Admission Gate - Decision engine
//!
//! Rules run in a fixed order and the first match wins:
//!
//! 1. payload is an object with a `features` field
//! 2. no top-level key is a trap field (+1 suspicion on a hit)
//! 3. `features` parses to a vector of the configured width
//! 4. the vector is not a trap vector (+1 suspicion on a hit)
//! 5. suspicion count is not above the threshold
//! 6. classify; a benign label adds +1 suspicion
//!
//! Trap-field scanning only needs the raw keys, so it runs before the
//! vector is parsed: a probe carrying a trap key is counted even when its
//! vector is garbage. Without trap keys, malformed input never touches the
//! store or the classifier.

use std::sync::Arc;

use serde_json::{Map, Value};

use super::types::{GateConfig, GateDecision, GateError};
use crate::constants::{DECEPTION_LOG_TARGET, FEATURES_FIELD};
use crate::logic::features::{ClientIdentity, FeatureError, FeatureVector};
use crate::logic::honeypot::HoneypotRegistry;
use crate::logic::model::{Classifier, ClassifierError};
use crate::logic::suspicion::SuspicionStore;

pub struct AdmissionGate {
    config: GateConfig,
    registry: HoneypotRegistry,
    store: SuspicionStore,
    classifier: Arc<dyn Classifier>,
}

impl AdmissionGate {
    pub fn new(
        config: GateConfig,
        registry: HoneypotRegistry,
        store: SuspicionStore,
        classifier: Arc<dyn Classifier>,
    ) -> Self {
        Self {
            config,
            registry,
            store,
            classifier,
        }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn registry(&self) -> &HoneypotRegistry {
        &self.registry
    }

    pub fn store(&self) -> &SuspicionStore {
        &self.store
    }

    /// Run the full pipeline for one request.
    ///
    /// Suspicion updates are committed as they happen and are never rolled
    /// back, even if the caller stops waiting for the result.
    pub fn decide(&self, identity: &ClientIdentity, payload: &Value) -> Result<GateDecision, GateError> {
        let features = match self.screen(identity, payload) {
            Ok(features) => features,
            Err(denial) => return Ok(denial),
        };

        let label = match self.classifier.classify(&features) {
            Ok(label) => label,
            Err(ClassifierError::InvalidInput(reason)) => {
                return Ok(GateDecision::DenyMalformed(reason));
            }
            Err(e) => return Err(e.into()),
        };

        let decision = GateDecision::Allow { features, label };
        self.record(identity, &decision);
        Ok(decision)
    }

    /// Everything before the classifier: structure, traps, threshold.
    ///
    /// Returns the validated vector when the request may be classified.
    pub fn screen(&self, identity: &ClientIdentity, payload: &Value) -> Result<FeatureVector, GateDecision> {
        let object = payload.as_object().ok_or_else(|| {
            GateDecision::DenyMalformed("Invalid request body: expected a JSON object".to_string())
        })?;

        if !object.contains_key(FEATURES_FIELD) {
            return Err(GateDecision::DenyMalformed(FeatureError::Missing.to_string()));
        }

        if self.registry.contains_trap_field(object.keys()) {
            return Err(self.trip_honeypot(identity, "trap field", object));
        }

        let features = FeatureVector::from_payload(object, self.config.feature_count)
            .map_err(|e| GateDecision::DenyMalformed(e.to_string()))?;

        if self.registry.is_trap_vector(&features) {
            return Err(self.trip_honeypot(identity, "trap vector", object));
        }

        let count = self.store.peek(identity);
        if count > self.config.suspicion_threshold {
            log::info!(
                target: DECEPTION_LOG_TARGET,
                "Blocking {} due to repeated suspicious activity (count {})",
                identity,
                count
            );
            return Err(GateDecision::DenyRepeatedSuspicion);
        }

        Ok(features)
    }

    /// Post-classification bookkeeping.
    ///
    /// Benign allows add one to the identity's count; fraud labels and
    /// denials leave it untouched. Returns the new count when it changed.
    pub fn record(&self, identity: &ClientIdentity, decision: &GateDecision) -> Option<u64> {
        let label = decision.label()?;
        if !label.is_benign() {
            return None;
        }

        let count = self.store.increment(identity);
        if count > self.config.suspicion_threshold {
            log::info!(
                target: DECEPTION_LOG_TARGET,
                "Suspicious repeated normal queries from {} (count {})",
                identity,
                count
            );
        }
        Some(count)
    }

    fn trip_honeypot(&self, identity: &ClientIdentity, trigger: &str, payload: &Map<String, Value>) -> GateDecision {
        let count = self.store.increment(identity);
        let keys: Vec<&str> = payload.keys().map(String::as_str).collect();

        log::info!(
            target: DECEPTION_LOG_TARGET,
            "Honeypot triggered ({}) from {}: keys={:?} count={}",
            trigger,
            identity,
            keys,
            count
        );

        GateDecision::DenyHoneypot
    }
}

impl std::fmt::Debug for AdmissionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdmissionGate")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("store", &self.store)
            .field("classifier", &self.classifier.kind())
            .finish()
    }
}
