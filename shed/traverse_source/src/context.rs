/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is dual-licensed under either the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree or the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree. You may select, at your option, one of the
 * above-listed licenses.
 */

use std::any::Any;
use std::any::type_name;
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::hash::BuildHasher;
use std::sync::Arc;

use crate::error::ContextLookupError;
use crate::error::UsageError;

type Value = Arc<dyn Any + Send + Sync>;

/// Immutable key-value mapping handed to every segment handler of a call.
///
/// A context is validated once, when it is built, and is never mutated
/// afterwards. Cloning is cheap and shares the same entries.
#[derive(Clone, Default)]
pub struct Context {
    entries: Arc<HashMap<String, Value>>,
}

/// One pair of the list form of a context.
///
/// Pairs assembled from optional inputs can be built with
/// [`KeyValue::optional`]; a missing half is reported as a [`UsageError`]
/// when the context is built.
pub struct KeyValue {
    key: Option<String>,
    value: Option<Value>,
}

impl KeyValue {
    /// A complete pair.
    pub fn new<K, T>(key: K, value: T) -> Self
    where
        K: Into<String>,
        T: Any + Send + Sync,
    {
        Self {
            key: Some(key.into()),
            value: Some(Arc::new(value)),
        }
    }

    /// A pair whose halves may be absent.
    pub fn optional<K, T>(key: Option<K>, value: Option<T>) -> Self
    where
        K: Into<String>,
        T: Any + Send + Sync,
    {
        Self {
            key: key.map(Into::into),
            value: value.map(|v| Arc::new(v) as Value),
        }
    }
}

impl fmt::Debug for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyValue")
            .field("key", &self.key)
            .field("has_value", &self.value.is_some())
            .finish()
    }
}

impl Context {
    /// A context with no entries.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a context from a list of pairs.
    ///
    /// Fails if any pair lacks its key or value, or if a key repeats.
    pub fn of<I>(pairs: I) -> Result<Self, UsageError>
    where
        I: IntoIterator<Item = KeyValue>,
    {
        let mut entries = HashMap::new();
        for (index, pair) in pairs.into_iter().enumerate() {
            let key = pair.key.ok_or(UsageError::MissingKey { index })?;
            let value = match pair.value {
                Some(value) => value,
                None => return Err(UsageError::MissingValue { key }),
            };
            match entries.entry(key) {
                Entry::Occupied(occupied) => {
                    return Err(UsageError::DuplicateKey {
                        key: occupied.key().clone(),
                    });
                }
                Entry::Vacant(vacant) => {
                    vacant.insert(value);
                }
            }
        }
        Ok(Self {
            entries: Arc::new(entries),
        })
    }

    /// Build a context from an association of keys to values.
    ///
    /// Maps cannot repeat a key; any other sequence of pairs that does is
    /// rejected like the pairs form.
    pub fn from_map<I, K, T>(map: I) -> Result<Self, UsageError>
    where
        I: IntoIterator<Item = (K, T)>,
        K: Into<String>,
        T: Any + Send + Sync,
    {
        Self::of(map.into_iter().map(|(k, v)| KeyValue::new(k, v)))
    }

    /// Whether a value is associated with `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// The value associated with `key`.
    ///
    /// An absent key, or a value of a type other than `T`, is an error;
    /// use [`Context::find`] or [`Context::get_or`] for optional entries.
    pub fn get<T: Any>(&self, key: &str) -> Result<&T, ContextLookupError> {
        let value = self
            .entries
            .get(key)
            .ok_or_else(|| ContextLookupError::Missing { key: key.to_owned() })?;
        value
            .downcast_ref::<T>()
            .ok_or_else(|| ContextLookupError::Mismatch {
                key: key.to_owned(),
                expected: type_name::<T>(),
            })
    }

    /// The value associated with `key`, if there is one of type `T`.
    pub fn find<T: Any>(&self, key: &str) -> Option<&T> {
        self.entries.get(key)?.downcast_ref::<T>()
    }

    /// The value associated with `key`, or `default` when absent.
    pub fn get_or<'a, T: Any>(&'a self, key: &str, default: &'a T) -> &'a T {
        self.find(key).unwrap_or(default)
    }

    /// All keys, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.keys().collect();
        keys.sort_unstable();
        f.debug_struct("Context").field("keys", &keys).finish()
    }
}

/// Inputs a traversal call accepts as its context.
///
/// Each form is normalized into one [`Context`] before any segment runs.
pub trait IntoContext {
    /// Validate and normalize.
    fn into_context(self) -> Result<Context, UsageError>;
}

impl IntoContext for Context {
    fn into_context(self) -> Result<Context, UsageError> {
        Ok(self)
    }
}

impl IntoContext for &Context {
    fn into_context(self) -> Result<Context, UsageError> {
        Ok(self.clone())
    }
}

impl IntoContext for () {
    fn into_context(self) -> Result<Context, UsageError> {
        Ok(Context::empty())
    }
}

impl IntoContext for Result<Context, UsageError> {
    fn into_context(self) -> Result<Context, UsageError> {
        self
    }
}

impl IntoContext for Vec<KeyValue> {
    fn into_context(self) -> Result<Context, UsageError> {
        Context::of(self)
    }
}

impl<const N: usize> IntoContext for [KeyValue; N] {
    fn into_context(self) -> Result<Context, UsageError> {
        Context::of(self)
    }
}

impl<K, T, S> IntoContext for HashMap<K, T, S>
where
    K: Into<String>,
    T: Any + Send + Sync,
    S: BuildHasher,
{
    fn into_context(self) -> Result<Context, UsageError> {
        Context::from_map(self)
    }
}

impl<K, T> IntoContext for BTreeMap<K, T>
where
    K: Into<String>,
    T: Any + Send + Sync,
{
    fn into_context(self) -> Result<Context, UsageError> {
        Context::from_map(self)
    }
}

/// Build a [`Context`] from `key => value` pairs.
///
/// Expands to a `Result<Context, UsageError>`, which every traversal
/// operation accepts directly as its context argument.
///
/// # Example
/// ```
/// # use traverse_source::context;
/// let ctx = context! { "tenant" => "acme", "limit" => 10usize }.unwrap();
/// assert_eq!(ctx.get::<usize>("limit"), Ok(&10));
/// assert!(ctx.contains("tenant"));
/// ```
#[macro_export]
macro_rules! context {
    () => {
        ::std::result::Result::Ok::<_, $crate::UsageError>($crate::Context::empty())
    };
    ( $( $key:expr => $value:expr ),+ $(,)? ) => {
        $crate::Context::of([ $( $crate::KeyValue::new($key, $value) ),+ ])
    };
}
