//! Deferred resolution of property values.
//!
//! A value whose expression cannot be resolved in RUNTIME is parked in a
//! transaction attachment together with the failure it produced. Properties
//! applied later in the same transaction retry the parked entries. A VERIFY
//! step added at deferral time fails the transaction with the captured
//! failure if its entry is still parked.

use std::collections::BTreeMap;

use keel_controller::{AttachmentKey, OperationContext, Stage};
use keel_core::{Attributes, OperationError, OperationResult};
use tracing::{debug, warn};

use crate::apply::PropertyApplier;

/// A property whose value could not be resolved yet.
#[derive(Debug, Clone, PartialEq)]
pub struct DeferredEntry {
    /// Model of the property resource when resolution failed.
    pub model: Attributes,
    /// The resolution failure, re-raised unchanged if it never resolves.
    pub failure: OperationError,
}

/// Unresolved properties of one transaction.
#[derive(Debug, Default)]
pub struct DeferredProperties {
    unresolved: BTreeMap<String, DeferredEntry>,
    pass_scheduled: bool,
}

/// Attachment slot holding the transaction's [`DeferredProperties`].
pub const DEFERRED_PROPERTIES: AttachmentKey<DeferredProperties> =
    AttachmentKey::new("system-property.deferred");

impl DeferredProperties {
    pub fn contains(&self, name: &str) -> bool {
        self.unresolved.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&DeferredEntry> {
        self.unresolved.get(name)
    }

    pub fn len(&self) -> usize {
        self.unresolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unresolved.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.unresolved.keys().map(String::as_str)
    }

    /// Apply every entry that resolves now, repeating until a round applies
    /// nothing. Returns how many were applied.
    fn retry(&mut self, applier: &PropertyApplier) -> usize {
        let mut applied = 0;
        loop {
            let resolved: Vec<(String, Option<String>)> = self
                .unresolved
                .iter()
                .filter_map(|(name, entry)| {
                    applier
                        .resolve_model(&entry.model)
                        .ok()
                        .map(|value| (name.clone(), value))
                })
                .collect();
            if resolved.is_empty() {
                return applied;
            }
            for (name, value) in resolved {
                applier.set_property(&name, value.as_deref());
                self.unresolved.remove(&name);
                debug!(property = %name, "deferred property resolved");
                applied += 1;
            }
        }
    }

    /// Apply every entry in name order, stopping at the first that fails.
    fn process(&mut self, applier: &PropertyApplier) -> OperationResult<()> {
        let names: Vec<String> = self.unresolved.keys().cloned().collect();
        for name in names {
            let Some(entry) = self.unresolved.get(&name) else {
                continue;
            };
            let value = applier.resolve_model(&entry.model)?;
            applier.set_property(&name, value.as_deref());
            self.unresolved.remove(&name);
        }
        Ok(())
    }
}

/// Park `name` after a failed resolution and queue the VERIFY check for it.
///
/// While booting, a strict pass over all parked entries is also queued at the
/// end of RUNTIME, once per transaction.
pub fn defer(
    context: &mut OperationContext<'_>,
    applier: &PropertyApplier,
    name: &str,
    model: Attributes,
    failure: OperationError,
) -> OperationResult<()> {
    debug!(txn = context.id(), property = name, error = %failure, "deferring property resolution");
    let booting = context.is_booting();
    let deferred = context.attachment_or_insert_with(&DEFERRED_PROPERTIES, DeferredProperties::default);
    deferred
        .unresolved
        .insert(name.to_string(), DeferredEntry { model, failure });
    let schedule_pass = booting && !deferred.pass_scheduled;
    deferred.pass_scheduled |= schedule_pass;

    let check = name.to_string();
    context.add_step(Stage::Verify, move |context, _| verify_resolved(context, &check))?;

    if schedule_pass {
        let applier = applier.clone();
        context.add_step(Stage::Runtime, move |context, _| {
            process_deferred_properties(context, &applier)
        })?;
    }
    Ok(())
}

/// Fails with the captured failure if `name` is still parked.
fn verify_resolved(context: &mut OperationContext<'_>, name: &str) -> OperationResult<()> {
    let failure = context
        .attachment(&DEFERRED_PROPERTIES)
        .and_then(|deferred| deferred.get(name))
        .map(|entry| entry.failure.clone());

    match failure {
        Some(failure) => {
            warn!(txn = context.id(), property = name, error = %failure, "property value never resolved");
            context.set_rollback_only();
            Err(failure)
        }
        None => Ok(()),
    }
}

/// Opportunistically apply parked entries that resolve now. Never fails.
pub fn retry_deferred(context: &mut OperationContext<'_>, applier: &PropertyApplier) -> usize {
    context
        .attachment_mut(&DEFERRED_PROPERTIES)
        .map_or(0, |deferred| deferred.retry(applier))
}

/// Drop a parked entry whose property no longer needs resolving.
pub fn forget_deferred(context: &mut OperationContext<'_>, name: &str) -> Option<DeferredEntry> {
    context
        .attachment_mut(&DEFERRED_PROPERTIES)
        .and_then(|deferred| deferred.unresolved.remove(name))
}

/// Resolve and apply every parked entry. The first failure marks the
/// transaction rollback-only and is returned; later entries are not tried.
pub fn process_deferred_properties(
    context: &mut OperationContext<'_>,
    applier: &PropertyApplier,
) -> OperationResult<()> {
    let outcome = match context.attachment_mut(&DEFERRED_PROPERTIES) {
        Some(deferred) => deferred.process(applier),
        None => Ok(()),
    };
    if outcome.is_err() {
        context.set_rollback_only();
    }
    outcome
}
