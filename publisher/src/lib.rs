//! # Crate publisher
//!
//! ## publisher
//!
//! The `publisher` crate provides a mechanism for registering and notifying listeners
//! of new values of type `T`.
//!
//! This crate is designed to handle dynamic registration of callback functions as
//! listeners, ensuring that all registered listeners receive updates when a value
//! is published.
//!
//! ### Example
//!
//! ```
//! use std::sync::Arc;
//! use publisher::Publisher;
//!
//! let publisher = Publisher::new();
//!
//! // Register a listener
//! let listener_id = publisher.register(|data: Arc<String>| {
//!     println!("Listener received: {}", data);
//! });
//!
//! // Notify all listeners
//! publisher.notify(Arc::new("Hello, World!".to_string()));
//!
//! // Unregister the listener
//! publisher.unregister(listener_id).expect("Failed to unregister listener");
//!
//! // Verify that no listeners are left
//! assert!(publisher.is_empty());
//! ```

use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

/// Callback invoked with each published value.
pub type Callback<T> = Arc<dyn Fn(Arc<T>) + Send + Sync>;

#[derive(PartialEq, Clone, Debug)]
pub enum PublisherError {
    ListenerNotFound(String),
}

/// Record of registered listeners that will be notified of updates
pub struct Publisher<T> {
    listeners: Arc<DashMap<Uuid, Callback<T>>>,
}

impl<T> Clone for Publisher<T> {
    fn clone(&self) -> Self {
        Self {
            listeners: Arc::clone(&self.listeners),
        }
    }
}

impl<T> Default for Publisher<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Publisher<T> {
    /// Creates a new `Publisher` instance.
    ///
    /// The instance starts with no registered listeners.
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(DashMap::new()),
        }
    }

    /// Registers a listener callback to be notified of updates.
    ///
    /// The listener is a function or closure that accepts an `Arc<T>`
    pub fn register<F>(&self, listener: F) -> Uuid
    where
        F: Fn(Arc<T>) + Send + Sync + 'static,
    {
        let id = Uuid::new_v4();
        self.listeners.insert(id, Arc::new(listener));
        id
    }

    /// Unregisters a listener callback with a given id
    /// Returns PublisherError::ListenerNotFound() if no id matches with any of the registered listeners
    pub fn unregister(&self, id: Uuid) -> Result<(), PublisherError> {
        self.listeners
            .remove(&id)
            .map(|_| ())
            .ok_or(PublisherError::ListenerNotFound(format!(
                "Listener with id {} not found",
                id
            )))
    }

    /// Removes every registered listener.
    pub fn unregister_all(&self) {
        self.listeners.clear();
    }

    /// Calls each registered listener with the published value.
    pub fn notify(&self, value: Arc<T>) {
        // snapshot first so listeners may register/unregister from inside a callback
        let listeners: Vec<Callback<T>> = self
            .listeners
            .iter()
            .map(|entry| entry.value().clone())
            .collect();

        for listener in listeners {
            listener(Arc::clone(&value));
        }
    }

    // Returns true if no listeners registered
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    // Returns number of registered listeners
    pub fn len(&self) -> usize {
        self.listeners.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Clone, Debug)]
    struct Measurement {
        timestamp: f64,
        data: Vec<f64>,
    }

    #[test]
    fn test_publisher_initialization() {
        let publisher = Publisher::<Measurement>::new();
        assert!(publisher.is_empty());
    }

    #[test]
    fn test_register_listener() {
        let publisher = Publisher::<Measurement>::new();

        let listener = |measurement: Arc<Measurement>| {
            println!("Received measurement: {:?}", measurement);
        };

        publisher.register(listener);
        assert_eq!(publisher.len(), 1);
    }

    #[test]
    fn test_unregister_listener() {
        let publisher = Publisher::<Measurement>::new();

        let listener1 = |measurement: Arc<Measurement>| {
            println!("Received measurement1: {:?}", measurement);
        };
        let listener2 = |measurement: Arc<Measurement>| {
            println!("Received measurement2: {:?}", measurement);
        };

        let id1 = publisher.register(listener1);
        let id2 = publisher.register(listener2);
        assert_eq!(publisher.len(), 2);

        assert_eq!(publisher.unregister(id2), Ok(()));
        assert_eq!(publisher.len(), 1);
        assert_eq!(publisher.unregister(id1), Ok(()));
        assert_eq!(publisher.len(), 0);
        assert!(publisher.unregister(id1).is_err());
    }

    #[test]
    fn test_notify_listeners() {
        let sensor_measurement = Measurement {
            data: vec![1.0, 2.0, 3.0, 4.0],
            timestamp: 0.0,
        };

        let publisher = Publisher::<Measurement>::new();

        let shared_state = Arc::new(Mutex::new(Vec::new()));

        {
            let shared_state = Arc::clone(&shared_state);
            publisher.register(move |measurement: Arc<Measurement>| {
                shared_state.lock().unwrap().push((*measurement).clone());
            });
        }

        publisher.notify(Arc::new(sensor_measurement));

        let shared_data = shared_state.lock().unwrap();
        assert_eq!(shared_data.len(), 1);
        assert_eq!(shared_data[0].data, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(shared_data[0].timestamp, 0.0);
    }

    #[test]
    fn test_unregistered_listener_is_not_notified() {
        let publisher = Publisher::<u64>::new();
        let received = Arc::new(Mutex::new(0_u64));

        let id = {
            let received = Arc::clone(&received);
            publisher.register(move |value: Arc<u64>| {
                *received.lock().unwrap() = *value;
            })
        };

        publisher.unregister(id).unwrap();
        publisher.notify(Arc::new(100));

        assert_eq!(*received.lock().unwrap(), 0);
    }
}
