/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is dual-licensed under either the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree or the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree. You may select, at your option, one of the
 * above-listed licenses.
 */

//! Drivers shared by every [`Source`]: run the handler once per segment and
//! fold the per-segment outcomes into one completion flag.

use parking_lot::Mutex;
use rayon::prelude::*;

use crate::context::Context;
use crate::error::TraverseError;
use crate::signal::Signal;
use crate::source::Source;
use crate::traverser::Cursor;
use crate::traverser::SegmentOutcome;
use crate::traverser::Traverser;

fn run_segment<V, E, H, C, F>(
    cursor: &mut C,
    signal: &Signal,
    mut handler: F,
    ctx: &Context,
) -> Result<SegmentOutcome, TraverseError<E, H>>
where
    C: Cursor<V, E>,
    F: FnMut(&mut Traverser<'_, V, E>, &Context) -> Result<(), TraverseError<E, H>>,
{
    let mut traverser = Traverser::new(cursor, signal);
    handler(&mut traverser, ctx)?;
    Ok(traverser.finish())
}

pub(crate) fn sequence<S, V, E, H, F>(
    source: &S,
    mut handler: F,
    ctx: &Context,
) -> Result<bool, TraverseError<E, H>>
where
    S: Source<V, E> + ?Sized,
    F: FnMut(&mut Traverser<'_, V, E>, &Context) -> Result<(), TraverseError<E, H>>,
{
    let segments = source.segments().map_err(TraverseError::Source)?;
    let span = tracing::debug_span!("sequence", segments = ?segments.size_hint().1);
    let _guard = span.enter();
    let signal = Signal::new();

    for (index, mut cursor) in segments.enumerate() {
        match run_segment(&mut cursor, &signal, &mut handler, ctx) {
            Ok(SegmentOutcome::Completed) => {
                tracing::trace!(index, "segment completed");
            }
            Ok(outcome) => {
                signal.stop();
                tracing::debug!(index, ?outcome, "segment stopped early, short-circuiting");
                return Ok(false);
            }
            Err(err) => {
                signal.fail();
                tracing::debug!(index, "segment failed, aborting traversal");
                return Err(err);
            }
        }
    }
    Ok(signal.complete())
}

pub(crate) fn parallel<S, V, E, H, F>(
    source: &S,
    handler: F,
    ctx: &Context,
) -> Result<bool, TraverseError<E, H>>
where
    S: Source<V, E> + ?Sized,
    F: Fn(&mut Traverser<'_, V, E>, &Context) -> Result<(), TraverseError<E, H>> + Sync,
    E: Send,
    H: Send,
{
    let segments = source.segments().map_err(TraverseError::Source)?;
    let span = tracing::debug_span!("parallel", segments = ?segments.size_hint().1);
    let _guard = span.enter();
    let signal = Signal::new();
    let failure = Mutex::new(None);

    // Segments are drawn from the source one at a time; returning `None`
    // stops every worker from drawing more.
    let fan_out = || {
        segments
            .enumerate()
            .par_bridge()
            .try_for_each(|(index, mut cursor)| {
                let _entered = span.enter();
                if signal.is_halted() {
                    tracing::trace!(index, "segment not started, traversal halted");
                    return None;
                }
                match run_segment(&mut cursor, &signal, &handler, ctx) {
                    Ok(SegmentOutcome::Completed) => {
                        tracing::trace!(index, "segment completed");
                        Some(())
                    }
                    Ok(outcome) => {
                        if signal.stop() {
                            tracing::debug!(index, ?outcome, "segment stopped early, halting siblings");
                        }
                        None
                    }
                    Err(err) => {
                        let mut slot = failure.lock();
                        if slot.is_none() {
                            *slot = Some(err);
                        }
                        drop(slot);
                        if signal.fail() {
                            tracing::debug!(index, "segment failed, halting siblings");
                        }
                        None
                    }
                }
            })
    };
    let drained = match source.thread_pool() {
        Some(pool) => pool.install(fan_out),
        None => fan_out(),
    };

    if let Some(err) = failure.into_inner() {
        return Err(err);
    }
    let completed = signal.complete();
    tracing::trace!(
        drained = drained.is_some(),
        state = ?signal.state(),
        "parallel traversal finished"
    );
    Ok(completed)
}
