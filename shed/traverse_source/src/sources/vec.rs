/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is dual-licensed under either the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree or the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree. You may select, at your option, one of the
 * above-listed licenses.
 */

use std::convert::Infallible;
use std::iter;
use std::slice;
use std::sync::Arc;

use rayon::ThreadPool;

use crate::config::SourceConfig;
use crate::error::ConfigError;
use crate::source::Mode;
use crate::source::Source;
use crate::traverser::Cursor;
use crate::traverser::Remaining;

/// Source over a shared, immutable list of elements.
///
/// Elements are split into consecutive segments of at most
/// [`SourceConfig::segment_len`] and handed out by clone. Traversing never
/// mutates the source, so it can be traversed any number of times, from any
/// number of threads.
#[derive(Clone, Debug)]
pub struct VecSource<V> {
    items: Arc<[V]>,
    config: SourceConfig,
    pool: Option<Arc<ThreadPool>>,
}

impl<V> VecSource<V> {
    /// Source over `items` with the default [`SourceConfig`].
    pub fn new(items: impl Into<Arc<[V]>>) -> Self {
        Self {
            items: items.into(),
            config: SourceConfig::default(),
            pool: None,
        }
    }

    /// Apply `config`, building its worker pool if it asks for one.
    pub fn with_config(mut self, config: SourceConfig) -> Result<Self, ConfigError> {
        self.pool = config.thread_pool()?;
        self.config = config;
        Ok(self)
    }

    /// The settings in effect.
    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// All elements, in encounter order.
    pub fn items(&self) -> &[V] {
        &self.items
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there are no elements.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<V> From<Vec<V>> for VecSource<V> {
    fn from(items: Vec<V>) -> Self {
        Self::new(items)
    }
}

impl<V> Source<V, Infallible> for VecSource<V>
where
    V: Clone + Send + Sync,
{
    type Segment<'a>
        = SliceCursor<'a, V>
    where
        Self: 'a;
    type Segments<'a>
        = SliceSegments<'a, V>
    where
        Self: 'a;

    fn nature(&self) -> Mode {
        self.config.nature
    }

    fn segments<'a>(&'a self) -> Result<SliceSegments<'a, V>, Infallible> {
        let open: fn(&'a [V]) -> SliceCursor<'a, V> = SliceCursor::new;
        Ok(self.items.chunks(self.config.segment_len.get()).map(open))
    }

    fn is_parallel_capable(&self) -> bool {
        self.config.parallel
    }

    fn thread_pool(&self) -> Option<&ThreadPool> {
        self.pool.as_deref()
    }
}

/// Segments of a [`VecSource`], cut on demand.
pub type SliceSegments<'a, V> = iter::Map<slice::Chunks<'a, V>, fn(&'a [V]) -> SliceCursor<'a, V>>;

/// Cursor over one borrowed slice.
#[derive(Clone, Debug)]
pub struct SliceCursor<'a, V> {
    iter: slice::Iter<'a, V>,
}

impl<'a, V> SliceCursor<'a, V> {
    /// Cursor starting at the first element of `items`.
    pub fn new(items: &'a [V]) -> Self {
        Self { iter: items.iter() }
    }
}

impl<V: Clone> Cursor<V, Infallible> for SliceCursor<'_, V> {
    fn pull(&mut self) -> Result<Option<V>, Infallible> {
        Ok(self.iter.next().cloned())
    }

    fn remaining(&self) -> Remaining {
        Remaining::Exactly(self.iter.len() as u64)
    }
}
