/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is dual-licensed under either the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree or the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree. You may select, at your option, one of the
 * above-listed licenses.
 */

use std::fmt;

use rayon::ThreadPool;
use serde::Deserialize;

use crate::context::Context;
use crate::context::IntoContext;
use crate::engine;
use crate::error::TraverseError;
use crate::error::UnsupportedModeError;
use crate::traverser::Cursor;
use crate::traverser::Traverser;

/// How the segments of a source are driven.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// One segment after another, on the calling thread.
    #[default]
    Sequential,
    /// Segments fanned out across worker threads.
    Parallel,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Sequential => write!(f, "sequential"),
            Mode::Parallel => write!(f, "parallel"),
        }
    }
}

/// A re-traversable, segmentable collection of `V` whose production may
/// fail with `E`.
///
/// Implementers decide segmentation by returning a fresh iterator of
/// cursors from [`segments`](Source::segments); every traversal call asks
/// again, so no state carries over from one call to the next.
///
/// The entry operations [`sequence`](Source::sequence),
/// [`traverse`](Source::traverse) and [`parallel`](Source::parallel) invoke
/// the handler once per segment with a [`Traverser`] over it and the call's
/// [`Context`], and return whether every segment was driven to exhaustion.
///
/// A handler that stops consuming before its segment is exhausted
/// short-circuits the call: no further segments are started, segments
/// already running stop receiving elements, and the call returns `false`.
/// The first failure, of any kind, aborts the call in the same way and is
/// returned as is.
///
/// When a call returns, every effect of its handlers, on whichever thread
/// they ran, is visible to the caller.
pub trait Source<V, E> {
    /// Cursor over one segment.
    type Segment<'a>: Cursor<V, E> + Send
    where
        Self: 'a;

    /// Yields the segment cursors, one at a time, as they are started.
    type Segments<'a>: Iterator<Item = Self::Segment<'a>> + Send
    where
        Self: 'a;

    /// The mode [`traverse`](Source::traverse) uses. Fixed per instance.
    fn nature(&self) -> Mode;

    /// Fresh cursors over every segment, in encounter order.
    ///
    /// Cursors are created on demand: a call that short-circuits stops
    /// drawing from the iterator, so segments never started are never built.
    fn segments(&self) -> Result<Self::Segments<'_>, E>;

    /// Whether segments may run concurrently at all. A source that cannot
    /// parallelize serves [`parallel`](Source::parallel) sequentially.
    fn is_parallel_capable(&self) -> bool {
        true
    }

    /// Refuse traversal in `mode` by returning the unsupported-mode signal.
    ///
    /// Consulted before any segment is opened.
    fn check_support(&self, mode: Mode) -> Result<(), UnsupportedModeError> {
        let _ = mode;
        Ok(())
    }

    /// Pool to run parallel segments on, instead of rayon's global pool.
    fn thread_pool(&self) -> Option<&ThreadPool> {
        None
    }

    /// Traverse one segment at a time on the calling thread, in encounter
    /// order.
    fn sequence<H, F, C>(&self, handler: F, ctx: C) -> Result<bool, TraverseError<E, H>>
    where
        F: FnMut(&mut Traverser<'_, V, E>, &Context) -> Result<(), TraverseError<E, H>>,
        C: IntoContext,
    {
        let ctx = ctx.into_context()?;
        self.check_support(Mode::Sequential)?;
        engine::sequence(self, handler, &ctx)
    }

    /// Traverse in whichever mode is intrinsic to this source.
    fn traverse<H, F, C>(&self, handler: F, ctx: C) -> Result<bool, TraverseError<E, H>>
    where
        F: Fn(&mut Traverser<'_, V, E>, &Context) -> Result<(), TraverseError<E, H>> + Sync,
        C: IntoContext,
        E: Send,
        H: Send,
    {
        match self.nature() {
            Mode::Sequential => self.sequence(handler, ctx),
            Mode::Parallel => self.parallel(handler, ctx),
        }
    }

    /// Traverse segments concurrently where possible.
    ///
    /// Parallelism is a request: sources that cannot honour it run their
    /// segments sequentially instead.
    fn parallel<H, F, C>(&self, handler: F, ctx: C) -> Result<bool, TraverseError<E, H>>
    where
        F: Fn(&mut Traverser<'_, V, E>, &Context) -> Result<(), TraverseError<E, H>> + Sync,
        C: IntoContext,
        E: Send,
        H: Send,
    {
        let ctx = ctx.into_context()?;
        self.check_support(Mode::Parallel)?;
        if !self.is_parallel_capable() {
            tracing::debug!("source cannot parallelize, traversing sequentially");
            return engine::sequence(self, handler, &ctx);
        }
        engine::parallel(self, handler, &ctx)
    }
}
