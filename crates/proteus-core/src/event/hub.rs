// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::instance::{InstanceRef, UniverseId};
use std::collections::HashMap;

/// The observer subsystem as the migration engine sees it.
///
/// Every instance migration is bracketed: the old instance is unregistered
/// before any of its state moves, and the new instance is registered once
/// its state is in place. In between, no engine event can reach either
/// object, so handlers never observe a half-migrated instance.
pub trait ObserverRegistry {
    /// Deactivates every event subscription of `instance`.
    fn unregister(&mut self, instance: InstanceRef);

    /// Activates the subscriptions declared by `instance`'s type.
    fn register(&mut self, instance: InstanceRef);
}

/// Tracks which live script instances listen to which engine events.
///
/// Subscription data arrives on two paths. Each compilation installs a
/// handler table (type name to event names) via [`install_handlers`], and
/// the universe owner binds concrete instances to their types via
/// [`bind_instance`]. The [`ObserverRegistry`] calls only flip an
/// instance's active flag, so they are valid in any order relative to the
/// bindings; [`subscribers`] resolves the three tables at dispatch time.
///
/// [`install_handlers`]: ScriptEventHub::install_handlers
/// [`bind_instance`]: ScriptEventHub::bind_instance
/// [`subscribers`]: ScriptEventHub::subscribers
#[derive(Debug, Default)]
pub struct ScriptEventHub {
    /// Per universe: type name to the engine events its instances handle.
    handlers: HashMap<UniverseId, HashMap<String, Vec<String>>>,
    /// Concrete type of each known instance.
    bindings: HashMap<InstanceRef, String>,
    /// Instances whose subscriptions are live, in activation order.
    active: Vec<InstanceRef>,
}

impl ScriptEventHub {
    /// Creates an empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the handler table of a freshly compiled universe.
    pub fn install_handlers(&mut self, universe: UniverseId, table: HashMap<String, Vec<String>>) {
        log::debug!(
            "Installed handler table for universe {universe} ({} types).",
            table.len()
        );
        self.handlers.insert(universe, table);
    }

    /// Records the concrete type of one instance.
    pub fn bind_instance(&mut self, instance: InstanceRef, type_name: &str) {
        self.bindings.insert(instance, type_name.to_string());
    }

    /// Forgets a retired universe: its handler table, bindings, and any
    /// still-active instances.
    pub fn drop_universe(&mut self, universe: UniverseId) {
        self.handlers.remove(&universe);
        self.bindings.retain(|instance, _| instance.universe != universe);
        self.active.retain(|instance| instance.universe != universe);
        log::debug!("Dropped observer state for universe {universe}.");
    }

    /// Returns the active instances subscribed to `event`, in activation
    /// order.
    pub fn subscribers(&self, event: &str) -> Vec<InstanceRef> {
        self.active
            .iter()
            .filter(|instance| {
                let Some(type_name) = self.bindings.get(instance) else {
                    return false;
                };
                self.handlers
                    .get(&instance.universe)
                    .and_then(|table| table.get(type_name))
                    .is_some_and(|events| events.iter().any(|e| e == event))
            })
            .copied()
            .collect()
    }

    /// Number of instances with live subscriptions.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}

impl ObserverRegistry for ScriptEventHub {
    fn unregister(&mut self, instance: InstanceRef) {
        self.active.retain(|active| *active != instance);
        log::trace!("Observer subscriptions deactivated for {instance}.");
    }

    fn register(&mut self, instance: InstanceRef) {
        if !self.active.contains(&instance) {
            self.active.push(instance);
        }
        log::trace!("Observer subscriptions activated for {instance}.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::ObjectId;

    fn handler_table(pairs: &[(&str, &[&str])]) -> HashMap<String, Vec<String>> {
        pairs
            .iter()
            .map(|(type_name, events)| {
                (
                    type_name.to_string(),
                    events.iter().map(|e| e.to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn registered_and_bound_instances_receive_events() {
        let universe = UniverseId::new();
        let mut hub = ScriptEventHub::new();
        hub.install_handlers(universe, handler_table(&[("Player", &["tick", "damage"])]));

        let player = InstanceRef::new(universe, ObjectId(0));
        hub.bind_instance(player, "Player");
        hub.register(player);

        assert_eq!(hub.subscribers("tick"), vec![player]);
        assert_eq!(hub.subscribers("damage"), vec![player]);
        assert!(hub.subscribers("render").is_empty());
    }

    #[test]
    fn unregister_silences_the_instance() {
        let universe = UniverseId::new();
        let mut hub = ScriptEventHub::new();
        hub.install_handlers(universe, handler_table(&[("Player", &["tick"])]));

        let player = InstanceRef::new(universe, ObjectId(0));
        hub.bind_instance(player, "Player");
        hub.register(player);
        hub.unregister(player);

        assert!(hub.subscribers("tick").is_empty());
        assert_eq!(hub.active_count(), 0);
    }

    #[test]
    fn registration_before_binding_resolves_at_dispatch_time() {
        let universe = UniverseId::new();
        let mut hub = ScriptEventHub::new();
        hub.install_handlers(universe, handler_table(&[("Enemy", &["tick"])]));

        // Migration registers the instance before the universe owner has
        // bound its type.
        let enemy = InstanceRef::new(universe, ObjectId(3));
        hub.register(enemy);
        assert!(hub.subscribers("tick").is_empty());

        hub.bind_instance(enemy, "Enemy");
        assert_eq!(hub.subscribers("tick"), vec![enemy]);
    }

    #[test]
    fn dropping_a_universe_forgets_its_state() {
        let old = UniverseId::new();
        let new = UniverseId::new();
        let mut hub = ScriptEventHub::new();
        hub.install_handlers(old, handler_table(&[("Player", &["tick"])]));
        hub.install_handlers(new, handler_table(&[("Player", &["tick"])]));

        let stale = InstanceRef::new(old, ObjectId(0));
        let fresh = InstanceRef::new(new, ObjectId(0));
        hub.bind_instance(stale, "Player");
        hub.bind_instance(fresh, "Player");
        hub.register(stale);
        hub.register(fresh);

        hub.drop_universe(old);

        assert_eq!(hub.subscribers("tick"), vec![fresh]);
        assert_eq!(hub.active_count(), 1);
    }
}
