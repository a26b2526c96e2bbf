use std::collections::HashMap;

use log::warn;

use entsync_serde::Serde;

/// Named values carried by a published event, encoded with the closed
/// wire codec set. Handlers decode only the types they expect.
#[derive(Debug, Clone, Default)]
pub struct EventArguments {
    data: HashMap<String, Vec<u8>>,
}

impl EventArguments {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
        }
    }

    pub fn from_raw(data: HashMap<String, Vec<u8>>) -> Self {
        Self { data }
    }

    /// Encodes and stores a variable. An unencodable value is logged
    /// and skipped; the arguments are otherwise unchanged.
    pub fn set_var<T: Serde>(&mut self, name: &str, value: &T) {
        match value.to_bytes() {
            Ok(bytes) => {
                self.data.insert(name.to_string(), bytes);
            }
            Err(e) => warn!("event variable `{name}` not set: {e}"),
        }
    }

    /// Decodes a stored variable. `None` if absent or not decodable as
    /// the requested type.
    pub fn get_var<T: Serde>(&self, name: &str) -> Option<T> {
        let bytes = self.data.get(name)?;
        T::from_bytes(bytes).ok()
    }

    pub fn raw(&self) -> &HashMap<String, Vec<u8>> {
        &self.data
    }

    pub fn into_raw(self) -> HashMap<String, Vec<u8>> {
        self.data
    }
}

type Handler = Box<dyn FnMut(&EventArguments)>;

struct Subscription {
    handler: Handler,
    network_invoked: bool,
}

/// Publish/subscribe dispatcher for lifecycle notifications.
///
/// Handlers run synchronously on the publishing thread, in
/// subscription order. Subscriptions marked network-invokable may also
/// be triggered by a remote InvokeEvent message; all others ignore
/// remote invocation.
#[derive(Default)]
pub struct EventBus {
    events: HashMap<String, Vec<Subscription>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            events: HashMap::new(),
        }
    }

    pub fn subscribe<F>(&mut self, name: &str, handler: F)
    where
        F: FnMut(&EventArguments) + 'static,
    {
        self.subscribe_inner(name, Box::new(handler), false);
    }

    /// Like [`subscribe`](Self::subscribe), but the handler also fires
    /// for remote InvokeEvent traffic.
    pub fn subscribe_network<F>(&mut self, name: &str, handler: F)
    where
        F: FnMut(&EventArguments) + 'static,
    {
        self.subscribe_inner(name, Box::new(handler), true);
    }

    fn subscribe_inner(&mut self, name: &str, handler: Handler, network_invoked: bool) {
        self.events.entry(name.to_string()).or_default().push(Subscription {
            handler,
            network_invoked,
        });
    }

    /// Invokes every local subscription of the named event.
    pub fn publish(&mut self, name: &str, args: &EventArguments) {
        if let Some(subscriptions) = self.events.get_mut(name) {
            for subscription in subscriptions.iter_mut() {
                (subscription.handler)(args);
            }
        }
    }

    /// Invokes only subscriptions that opted into remote invocation.
    /// Unknown event names are ignored: a peer cannot force-register
    /// events on this process.
    pub fn publish_remote(&mut self, name: &str, args: &EventArguments) {
        if let Some(subscriptions) = self.events.get_mut(name) {
            for subscription in subscriptions.iter_mut() {
                if subscription.network_invoked {
                    (subscription.handler)(args);
                }
            }
        }
    }

    pub fn has_event(&self, name: &str) -> bool {
        self.events.contains_key(name)
    }

    pub fn unsubscribe_all(&mut self) {
        self.events.clear();
    }
}
