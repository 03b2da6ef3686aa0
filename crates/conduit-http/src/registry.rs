//! Keyed cache of shared transport instances.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::client::{HttpConfig, ReqwestTransport};
use crate::transport::TransportError;

type Factory<T> = Box<dyn Fn() -> Result<T, TransportError> + Send + Sync>;

/// Hands out one transport per key for the lifetime of the registry.
///
/// Construct it once at startup and pass it to whatever builds connectors.
/// Entries are never evicted or replaced.
pub struct ClientRegistry<T = ReqwestTransport> {
    clients: Mutex<HashMap<String, Arc<T>>>,
    factory: Factory<T>,
}

impl ClientRegistry<ReqwestTransport> {
    /// Registry creating reqwest transports with default config.
    pub fn new() -> Self {
        Self::with_config(HttpConfig::default())
    }

    /// Registry creating reqwest transports with `config`.
    pub fn with_config(config: HttpConfig) -> Self {
        Self::with_factory(move || ReqwestTransport::with_config(&config))
    }
}

impl Default for ClientRegistry<ReqwestTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ClientRegistry<T> {
    /// Registry creating transports with a custom factory.
    pub fn with_factory<F>(factory: F) -> Self
    where
        F: Fn() -> Result<T, TransportError> + Send + Sync + 'static,
    {
        Self {
            clients: Mutex::new(HashMap::new()),
            factory: Box::new(factory),
        }
    }

    /// Return the transport for `key`, creating it on first use.
    ///
    /// The lookup and insert happen under one lock, so concurrent first use of
    /// the same key still yields a single shared instance.
    pub fn get_or_create(&self, key: &str) -> Result<Arc<T>, TransportError> {
        let mut clients = self.clients.lock();
        if let Some(client) = clients.get(key) {
            return Ok(Arc::clone(client));
        }

        let client = Arc::new((self.factory)()?);
        clients.insert(key.to_string(), Arc::clone(&client));
        tracing::debug!(key, "created transport client");
        Ok(client)
    }

    /// Whether a transport already exists for `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.clients.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.clients.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.lock().is_empty()
    }
}

impl<T> fmt::Debug for ClientRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let clients = self.clients.lock();
        let mut keys: Vec<&String> = clients.keys().collect();
        keys.sort();
        f.debug_struct("ClientRegistry").field("keys", &keys).finish()
    }
}
