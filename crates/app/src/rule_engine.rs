//! Rule engine: routes state changes to the rules that watch them.
//!
//! The engine keeps every descriptor for the lifetime of the process. For
//! each incoming change it runs, in declaration order, every rule whose
//! subscriptions include the changed device.

use std::collections::BTreeSet;

use peerlink_domain::device::DeviceName;
use peerlink_domain::error::PeerLinkError;
use peerlink_domain::event::StateChange;
use peerlink_domain::rule::RuleDefinition;

use crate::ports::Host;
use crate::rules::RuleDescriptor;

/// Immutable set of rules with subscription-based dispatch.
#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    rules: Vec<RuleDescriptor>,
}

impl RuleEngine {
    /// Create an engine from already built descriptors.
    #[must_use]
    pub fn new(rules: Vec<RuleDescriptor>) -> Self {
        Self { rules }
    }

    /// Validate and build every definition.
    ///
    /// # Errors
    ///
    /// Returns [`PeerLinkError::Validation`] for the first definition that
    /// violates a domain invariant.
    pub fn from_definitions<'a>(
        definitions: impl IntoIterator<Item = &'a RuleDefinition>,
    ) -> Result<Self, PeerLinkError> {
        let rules = definitions
            .into_iter()
            .map(RuleDescriptor::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(rules))
    }

    #[must_use]
    pub fn rules(&self) -> &[RuleDescriptor] {
        &self.rules
    }

    /// Every name at least one rule listens to.
    #[must_use]
    pub fn subscriptions(&self) -> BTreeSet<&DeviceName> {
        self.rules
            .iter()
            .flat_map(|rule| rule.subscriptions().iter())
            .collect()
    }

    /// Run every rule subscribed to the changed device.
    ///
    /// Returns the log tags of the rules that ran.
    #[tracing::instrument(skip(self, host), fields(device = %change.device, state = %change.state))]
    pub fn process_change<H: Host>(&self, host: &H, change: &StateChange) -> Vec<&str> {
        let mut triggered = Vec::new();

        for rule in &self.rules {
            if !rule.is_subscribed(&change.device) {
                continue;
            }
            tracing::debug!(rule = rule.log_tag(), "running rule");
            rule.handle(host, &change.device, &change.state);
            triggered.push(rule.log_tag());
        }

        triggered
    }
}
