use std::collections::HashMap;

use log::warn;

/// A registered entity kind: a name plus the spawner that builds a
/// fresh behavior instance for it. Immutable once registered.
pub struct EntityTemplate<B> {
    name: String,
    spawner: Box<dyn Fn() -> B>,
}

impl<B> EntityTemplate<B> {
    pub fn new(name: &str, spawner: impl Fn() -> B + 'static) -> Self {
        Self {
            name: name.to_string(),
            spawner: Box::new(spawner),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instantiate(&self) -> B {
        (self.spawner)()
    }
}

/// Name-keyed template catalog, populated by explicit registration
/// calls at startup. Registration order is deterministic and
/// duplicates are ignored: the first registration wins.
pub struct TemplateRegistry<B> {
    templates: HashMap<String, EntityTemplate<B>>,
}

impl<B> TemplateRegistry<B> {
    pub fn new() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    pub fn register(&mut self, name: &str, spawner: impl Fn() -> B + 'static) {
        if self.templates.contains_key(name) {
            warn!("entity template `{name}` already registered, keeping the first registration");
            return;
        }
        self.templates
            .insert(name.to_string(), EntityTemplate::new(name, spawner));
    }

    pub fn get(&self, name: &str) -> Option<&EntityTemplate<B>> {
        self.templates.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl<B> Default for TemplateRegistry<B> {
    fn default() -> Self {
        Self::new()
    }
}
