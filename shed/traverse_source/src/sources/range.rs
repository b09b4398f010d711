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
use std::ops::Range;
use std::ops::RangeFrom;
use std::sync::Arc;

use rayon::ThreadPool;

use crate::config::SourceConfig;
use crate::error::ConfigError;
use crate::source::Mode;
use crate::source::Source;
use crate::traverser::Cursor;
use crate::traverser::Remaining;

/// Source over consecutive integers.
///
/// A bounded range is split into segments like [`VecSource`](crate::VecSource).
/// An unbounded one is a single sequential segment that never runs out in
/// practice; handlers are expected to short-circuit it.
#[derive(Clone, Debug)]
pub struct RangeSource {
    start: u64,
    end: Option<u64>,
    config: SourceConfig,
    pool: Option<Arc<ThreadPool>>,
}

impl RangeSource {
    fn with_bounds(start: u64, end: Option<u64>) -> Self {
        Self {
            start,
            end,
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

    /// Whether the range has an end.
    pub fn is_bounded(&self) -> bool {
        self.end.is_some()
    }
}

impl From<Range<u64>> for RangeSource {
    fn from(range: Range<u64>) -> Self {
        Self::with_bounds(range.start, Some(range.end.max(range.start)))
    }
}

impl From<RangeFrom<u64>> for RangeSource {
    fn from(range: RangeFrom<u64>) -> Self {
        Self::with_bounds(range.start, None)
    }
}

impl Source<u64, Infallible> for RangeSource {
    type Segment<'a>
        = RangeCursor
    where
        Self: 'a;
    type Segments<'a>
        = RangeSegments
    where
        Self: 'a;

    fn nature(&self) -> Mode {
        self.config.nature
    }

    fn segments(&self) -> Result<RangeSegments, Infallible> {
        Ok(RangeSegments {
            next: self.start,
            end: self.end,
            len: self.config.segment_len.get() as u64,
            done: false,
        })
    }

    fn is_parallel_capable(&self) -> bool {
        self.config.parallel && self.is_bounded()
    }

    fn thread_pool(&self) -> Option<&ThreadPool> {
        self.pool.as_deref()
    }
}

/// Cuts a [`RangeSource`] into cursors as they are asked for.
#[derive(Clone, Debug)]
pub struct RangeSegments {
    next: u64,
    end: Option<u64>,
    len: u64,
    done: bool,
}

impl Iterator for RangeSegments {
    type Item = RangeCursor;

    fn next(&mut self) -> Option<RangeCursor> {
        if self.done {
            return None;
        }
        let end = match self.end {
            Some(end) => end,
            None => {
                self.done = true;
                return Some(RangeCursor::new(self.next, None));
            }
        };
        if self.next >= end {
            self.done = true;
            return None;
        }
        let lo = self.next;
        let hi = lo.saturating_add(self.len).min(end);
        self.next = hi;
        Some(RangeCursor::new(lo, Some(hi)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.end {
            _ if self.done => (0, Some(0)),
            None => (1, Some(1)),
            Some(end) => {
                let left = usize::try_from(end.saturating_sub(self.next).div_ceil(self.len)).ok();
                (left.unwrap_or(usize::MAX), left)
            }
        }
    }
}

/// Cursor over part of a [`RangeSource`].
#[derive(Clone, Debug)]
pub struct RangeCursor {
    next: u64,
    end: Option<u64>,
    overflowed: bool,
}

impl RangeCursor {
    fn new(next: u64, end: Option<u64>) -> Self {
        Self {
            next,
            end,
            overflowed: false,
        }
    }
}

impl Cursor<u64, Infallible> for RangeCursor {
    fn pull(&mut self) -> Result<Option<u64>, Infallible> {
        if self.overflowed || self.end.is_some_and(|end| self.next >= end) {
            return Ok(None);
        }
        let value = self.next;
        match self.next.checked_add(1) {
            Some(next) => self.next = next,
            None => self.overflowed = true,
        }
        Ok(Some(value))
    }

    fn remaining(&self) -> Remaining {
        match self.end {
            _ if self.overflowed => Remaining::Exactly(0),
            Some(end) => Remaining::Exactly(end.saturating_sub(self.next)),
            None => Remaining::Unbounded,
        }
    }
}
