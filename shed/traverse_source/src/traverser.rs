/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is dual-licensed under either the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree or the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree. You may select, at your option, one of the
 * above-listed licenses.
 */

use crate::error::TraverseError;
use crate::signal::Signal;

/// How many elements a segment still holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Remaining {
    /// Exactly this many.
    Exactly(u64),
    /// The segment never ends.
    Unbounded,
    /// The cursor cannot tell.
    Unknown,
}

/// Pull primitive a source provides for each of its segments.
///
/// Implementations only need to hand out elements in order; demand,
/// short-circuiting and error routing are handled by [`Traverser`].
pub trait Cursor<V, E> {
    /// Produce the next element, or `None` once the segment is exhausted.
    fn pull(&mut self) -> Result<Option<V>, E>;

    /// Elements left before `pull` returns `None`.
    fn remaining(&self) -> Remaining {
        Remaining::Unknown
    }
}

impl<V, E, C> Cursor<V, E> for Box<C>
where
    C: Cursor<V, E> + ?Sized,
{
    fn pull(&mut self) -> Result<Option<V>, E> {
        (**self).pull()
    }

    fn remaining(&self) -> Remaining {
        (**self).remaining()
    }
}

/// How a segment ended once its handler returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SegmentOutcome {
    /// Driven to exhaustion.
    Completed,
    /// The handler declined further elements.
    Stopped,
    /// A sibling segment halted the call while this one was running.
    Suppressed,
}

/// Forward-only cursor over the remaining elements of one segment.
///
/// A traverser is created for a single handler invocation and lives on the
/// thread running it; it is neither `Send` nor `Sync`. Every element is
/// delivered at most once. Consumer failures abort delivery immediately: the
/// failing element counts as consumed and the error is returned untouched as
/// [`TraverseError::Handler`].
pub struct Traverser<'t, V, E> {
    cursor: &'t mut dyn Cursor<V, E>,
    signal: &'t Signal,
    delivered: u64,
    exhausted: bool,
    stopped: bool,
    cancelled: bool,
}

impl<'t, V, E> Traverser<'t, V, E> {
    pub(crate) fn new(cursor: &'t mut dyn Cursor<V, E>, signal: &'t Signal) -> Self {
        Self {
            cursor,
            signal,
            delivered: 0,
            exhausted: false,
            stopped: false,
            cancelled: false,
        }
    }

    /// Deliver one element to `consumer`.
    ///
    /// Returns `false` without calling `consumer` if nothing remains.
    pub fn next<H>(
        &mut self,
        consumer: impl FnOnce(V) -> Result<(), H>,
    ) -> Result<bool, TraverseError<E, H>> {
        match self.fetch()? {
            Some(value) => {
                consumer(value).map_err(TraverseError::Handler)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Deliver up to `count` elements to `consumer`, one at a time.
    ///
    /// Returns `true` iff exactly `count` elements were delivered.
    pub fn next_n<H>(
        &mut self,
        count: u64,
        mut consumer: impl FnMut(V) -> Result<(), H>,
    ) -> Result<bool, TraverseError<E, H>> {
        for _ in 0..count {
            if !self.next(&mut consumer)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Deliver elements for as long as `consumer` asks for more.
    ///
    /// After each element the consumer returns whether it wants another.
    /// Returns `true` if the segment ran out while more were wanted, `false`
    /// if the consumer declined first. Declining is how a handler
    /// short-circuits the whole traversal.
    pub fn some<H>(
        &mut self,
        mut consumer: impl FnMut(V) -> Result<bool, H>,
    ) -> Result<bool, TraverseError<E, H>> {
        while let Some(value) = self.fetch()? {
            if !consumer(value).map_err(TraverseError::Handler)? {
                self.stopped = true;
                return Ok(false);
            }
        }
        Ok(!self.cancelled)
    }

    /// Deliver every remaining element to `consumer`.
    pub fn each<H>(
        &mut self,
        mut consumer: impl FnMut(V) -> Result<(), H>,
    ) -> Result<(), TraverseError<E, H>> {
        while let Some(value) = self.fetch()? {
            consumer(value).map_err(TraverseError::Handler)?;
        }
        Ok(())
    }

    /// Elements left in this segment.
    pub fn remaining(&self) -> Remaining {
        if self.exhausted || self.cancelled {
            Remaining::Exactly(0)
        } else {
            self.cursor.remaining()
        }
    }

    /// Elements delivered so far.
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    /// Whether the segment is known to hold nothing more.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
            || (!self.cancelled && self.cursor.remaining() == Remaining::Exactly(0))
    }

    fn fetch<H>(&mut self) -> Result<Option<V>, TraverseError<E, H>> {
        if self.exhausted || self.cancelled {
            return Ok(None);
        }
        if self.signal.is_halted() {
            tracing::trace!(delivered = self.delivered, "traversal halted, segment cancelled");
            self.cancelled = true;
            return Ok(None);
        }
        self.stopped = false;
        match self.cursor.pull().map_err(TraverseError::Source)? {
            Some(value) => {
                self.delivered += 1;
                Ok(Some(value))
            }
            None => {
                self.exhausted = true;
                Ok(None)
            }
        }
    }

    /// Settle the segment once its handler has returned.
    ///
    /// A handler that returned without observing the end of its segment
    /// counts as stopped, unless the cursor can confirm nothing was left.
    /// The cursor is never pulled here. A segment still open when the call
    /// was halted by a sibling is suppressed.
    pub(crate) fn finish(self) -> SegmentOutcome {
        if self.cancelled {
            return SegmentOutcome::Suppressed;
        }
        if self.stopped {
            return SegmentOutcome::Stopped;
        }
        if self.exhausted {
            return SegmentOutcome::Completed;
        }
        if self.signal.is_halted() {
            return SegmentOutcome::Suppressed;
        }
        match self.cursor.remaining() {
            Remaining::Exactly(0) => SegmentOutcome::Completed,
            _ => SegmentOutcome::Stopped,
        }
    }
}
