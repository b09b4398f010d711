/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is dual-licensed under either the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree or the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree. You may select, at your option, one of the
 * above-listed licenses.
 */

use std::num::NonZeroUsize;
use std::sync::Arc;

use rayon::ThreadPool;
use rayon::ThreadPoolBuilder;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::source::Mode;

const DEFAULT_SEGMENT_LEN: NonZeroUsize = match NonZeroUsize::new(1024) {
    Some(len) => len,
    None => unreachable!(),
};

/// Segmentation and scheduling settings for the in-memory sources.
///
/// Deserializable, so it can live alongside the rest of a service's config:
///
/// ```
/// # use traverse_source::{Mode, SourceConfig};
/// let config: SourceConfig = serde_json::from_str(
///     r#"{ "segment_len": 64, "nature": "parallel", "threads": 4 }"#,
/// ).unwrap();
/// assert_eq!(config.nature, Mode::Parallel);
/// assert_eq!(config.segment_len.get(), 64);
/// assert!(config.parallel);
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SourceConfig {
    /// Most elements a single segment holds.
    pub segment_len: NonZeroUsize,
    /// Mode used by [`Source::traverse`](crate::Source::traverse).
    pub nature: Mode,
    /// Whether parallel requests are honoured. When false, parallel
    /// traversal runs sequentially.
    pub parallel: bool,
    /// Size of a dedicated worker pool. `None` shares rayon's global pool.
    pub threads: Option<usize>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            segment_len: DEFAULT_SEGMENT_LEN,
            nature: Mode::Sequential,
            parallel: true,
            threads: None,
        }
    }
}

impl SourceConfig {
    /// Set [`segment_len`](SourceConfig::segment_len).
    pub fn with_segment_len(mut self, len: NonZeroUsize) -> Self {
        self.segment_len = len;
        self
    }

    /// Set [`nature`](SourceConfig::nature).
    pub fn with_nature(mut self, nature: Mode) -> Self {
        self.nature = nature;
        self
    }

    /// Set [`parallel`](SourceConfig::parallel).
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set [`threads`](SourceConfig::threads).
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Build the dedicated worker pool, if one is configured.
    pub fn thread_pool(&self) -> Result<Option<Arc<ThreadPool>>, ConfigError> {
        let threads = match self.threads {
            None => return Ok(None),
            Some(0) => return Err(ConfigError::ZeroThreads),
            Some(threads) => threads,
        };
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("traverse-{}", index))
            .build()?;
        Ok(Some(Arc::new(pool)))
    }
}
