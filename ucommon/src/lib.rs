//! Shared aliases and small generic containers used across the unillm crates.
//!
//! ```rust
//! use ucommon::{GenerationOptions, MetadataMap, Registry};
//!
//! let mut metadata = MetadataMap::new();
//! metadata.insert("tenant".to_string(), "acme".to_string());
//!
//! let options = GenerationOptions::default().with_temperature(0.3).with_max_tokens(64);
//! assert_eq!(options.max_tokens, Some(64));
//!
//! let mut registry = Registry::new();
//! assert!(registry.try_insert("openai", 1_u8).is_ok());
//! assert!(registry.try_insert("openai", 2_u8).is_err());
//! ```

pub mod future {
    //! Shared async future aliases.
    //!
    //! ```rust
    //! use ucommon::BoxFuture;
    //!
    //! fn str_len<'a>(value: &'a str) -> BoxFuture<'a, usize> {
    //!     Box::pin(async move { value.len() })
    //! }
    //!
    //! let _future = str_len("hello");
    //! ```

    use std::future::Future;
    use std::pin::Pin;

    pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
}

pub mod context {
    //! Free-form request metadata.

    use std::collections::HashMap;

    pub type MetadataMap = HashMap<String, String>;
}

pub mod model {
    //! Vendor-neutral sampling settings carried by chat requests.
    //!
    //! ```rust
    //! use ucommon::GenerationOptions;
    //!
    //! let options = GenerationOptions::default()
    //!     .with_temperature(0.2)
    //!     .with_max_tokens(128);
    //!
    //! assert_eq!(options.temperature, Some(0.2));
    //! assert_eq!(options.max_tokens, Some(128));
    //! assert_eq!(GenerationOptions::default().temperature, None);
    //! ```

    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct GenerationOptions {
        pub temperature: Option<f32>,
        pub max_tokens: Option<u32>,
    }

    impl GenerationOptions {
        pub fn with_temperature(mut self, temperature: f32) -> Self {
            self.temperature = Some(temperature);
            self
        }

        pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
            self.max_tokens = Some(max_tokens);
            self
        }
    }
}

pub mod registry {
    //! Generic keyed registry used by the provider and capability lookups.
    //!
    //! ```rust
    //! use ucommon::Registry;
    //!
    //! let mut registry = Registry::new();
    //! registry.try_insert("alpha".to_string(), 1_u32).expect("alpha is vacant");
    //!
    //! assert_eq!(registry.get("alpha"), Some(&1));
    //! assert!(registry.contains_key("alpha"));
    //! ```

    use std::borrow::Borrow;
    use std::collections::HashMap;
    use std::hash::Hash;

    #[derive(Debug, Clone)]
    pub struct Registry<K, V> {
        items: HashMap<K, V>,
    }

    impl<K, V> Default for Registry<K, V>
    where
        K: Eq + Hash,
    {
        fn default() -> Self {
            Self {
                items: HashMap::new(),
            }
        }
    }

    impl<K, V> Registry<K, V>
    where
        K: Eq + Hash,
    {
        pub fn new() -> Self {
            Self::default()
        }

        /// Inserts only when `key` is vacant; an occupied key hands both values back.
        pub fn try_insert(&mut self, key: K, value: V) -> Result<(), (K, V)> {
            if self.items.contains_key(&key) {
                return Err((key, value));
            }

            self.items.insert(key, value);
            Ok(())
        }

        pub fn get<Q>(&self, key: &Q) -> Option<&V>
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.get(key)
        }

        pub fn contains_key<Q>(&self, key: &Q) -> bool
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.contains_key(key)
        }

        pub fn keys(&self) -> impl Iterator<Item = &K> {
            self.items.keys()
        }

        pub fn len(&self) -> usize {
            self.items.len()
        }

        pub fn is_empty(&self) -> bool {
            self.items.is_empty()
        }
    }
}

pub use context::MetadataMap;
pub use future::BoxFuture;
pub use model::GenerationOptions;
pub use registry::Registry;
