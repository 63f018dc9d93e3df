//! Effect type registry.
//!
//! Built-in variants are registered by an internal provider; extensions
//! plug in through [`EffectProvider`] at runtime. The registry is
//! process-wide, read-mostly state behind an `RwLock`, refreshed only on
//! explicit request (or the single retry inside [`create_effect`]),
//! never implicitly mid-batch.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use serde_json::Value;
use tracing::warn;

use crate::effects::effect::Effect;
use crate::foundation::error::AugResult;

/// Constructor for a default-configured effect instance.
pub type EffectCtor = fn() -> Box<dyn Effect>;

/// A named effect constructor exported by a provider.
#[derive(Clone, Copy)]
pub struct EffectFactory {
    /// Stable serialization tag.
    pub tag: &'static str,
    /// Default-instance constructor.
    pub ctor: EffectCtor,
}

/// Source of effect types: the extension boundary.
///
/// A provider is asked for its factories on every [`EffectRegistry::refresh`];
/// a failing provider is logged and skipped without affecting others.
pub trait EffectProvider: Send + Sync {
    /// Provider name, for diagnostics.
    fn name(&self) -> &str;

    /// The effect factories this provider exports.
    fn factories(&self) -> AugResult<Vec<EffectFactory>>;
}

struct BuiltinProvider;

impl EffectProvider for BuiltinProvider {
    fn name(&self) -> &str {
        "builtin"
    }

    fn factories(&self) -> AugResult<Vec<EffectFactory>> {
        Ok(crate::effects::builtin_factories())
    }
}

/// Maps stable string tags to effect constructors.
#[derive(Default)]
pub struct EffectRegistry {
    factories: HashMap<String, EffectCtor>,
    providers: Vec<Arc<dyn EffectProvider>>,
}

impl EffectRegistry {
    /// Registry pre-populated with the built-in variants.
    pub fn with_builtins() -> Self {
        let mut reg = Self::default();
        reg.add_provider(Arc::new(BuiltinProvider));
        reg
    }

    /// Register a provider and immediately pull its factories.
    pub fn add_provider(&mut self, provider: Arc<dyn EffectProvider>) {
        self.register_from(provider.as_ref());
        self.providers.push(provider);
    }

    /// Re-poll every provider. Idempotent; for a tag exported by more
    /// than one provider, the last registration wins.
    pub fn refresh(&mut self) {
        self.factories.clear();
        let providers: Vec<_> = self.providers.clone();
        for provider in &providers {
            self.register_from(provider.as_ref());
        }
    }

    fn register_from(&mut self, provider: &dyn EffectProvider) {
        match provider.factories() {
            Ok(factories) => {
                for f in factories {
                    self.factories.insert(f.tag.to_owned(), f.ctor);
                }
            }
            Err(err) => {
                warn!(provider = provider.name(), %err, "effect provider failed; skipping");
            }
        }
    }

    /// All registered tags, sorted.
    pub fn tags(&self) -> Vec<String> {
        let mut tags: Vec<_> = self.factories.keys().cloned().collect();
        tags.sort();
        tags
    }

    /// Construct a default instance of `tag`, if registered.
    pub fn create(&self, tag: &str) -> Option<Box<dyn Effect>> {
        self.factories.get(tag).map(|ctor| ctor())
    }

    /// Construct an effect from its serialized wire form.
    ///
    /// Probability and enabled default to `0.5`/`true` when absent; the
    /// full map is then handed to `set_params` (which ignores the
    /// envelope keys along with any other unknown key).
    pub fn create_from_value(&self, data: &Value) -> Option<Box<dyn Effect>> {
        let obj = data.as_object()?;
        let tag = obj.get("type")?.as_str()?;
        let mut effect = self.create(tag)?;
        effect.set_probability(obj.get("probability").and_then(Value::as_f64).unwrap_or(0.5));
        effect.set_enabled(obj.get("enabled").and_then(Value::as_bool).unwrap_or(true));
        effect.set_params(obj);
        Some(effect)
    }
}

fn global() -> &'static RwLock<EffectRegistry> {
    static REGISTRY: OnceLock<RwLock<EffectRegistry>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(EffectRegistry::with_builtins()))
}

/// Run `f` against the process-wide registry (read lock).
fn with_registry<T>(f: impl FnOnce(&EffectRegistry) -> T) -> T {
    match global().read() {
        Ok(guard) => f(&guard),
        Err(poisoned) => f(&poisoned.into_inner()),
    }
}

/// Register an extension provider with the process-wide registry.
pub fn register_provider(provider: Arc<dyn EffectProvider>) {
    match global().write() {
        Ok(mut guard) => guard.add_provider(provider),
        Err(poisoned) => poisoned.into_inner().add_provider(provider),
    }
}

/// Explicitly re-poll all providers of the process-wide registry.
pub fn refresh() {
    match global().write() {
        Ok(mut guard) => guard.refresh(),
        Err(poisoned) => poisoned.into_inner().refresh(),
    }
}

/// Tags registered in the process-wide registry, sorted.
pub fn effect_tags() -> Vec<String> {
    with_registry(EffectRegistry::tags)
}

/// Construct a default instance of `tag` from the process-wide registry.
pub fn create_default_effect(tag: &str) -> Option<Box<dyn Effect>> {
    with_registry(|reg| reg.create(tag))
}

/// Construct an effect from serialized data via the process-wide registry.
///
/// On an unknown tag the registry is refreshed once (so newly registered
/// providers are picked up) before giving up and returning `None`.
pub fn create_effect(data: &Value) -> Option<Box<dyn Effect>> {
    if let Some(effect) = with_registry(|reg| reg.create_from_value(data)) {
        return Some(effect);
    }
    refresh();
    let effect = with_registry(|reg| reg.create_from_value(data));
    if effect.is_none() {
        let tag = data.get("type").and_then(Value::as_str).unwrap_or("<missing>");
        warn!(tag, "unknown effect type; dropping");
    }
    effect
}

#[cfg(test)]
#[path = "../../tests/unit/effects/registry.rs"]
mod tests;
