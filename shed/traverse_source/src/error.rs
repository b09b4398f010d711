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

use thiserror::Error;

use crate::source::Mode;

/// Misuse of the API, detected before any element is touched.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    /// A context pair was supplied without a key.
    #[error("context entry #{index} has no key")]
    MissingKey {
        /// Position of the offending pair.
        index: usize,
    },
    /// A context pair was supplied without a value.
    #[error("context entry {key:?} has no value")]
    MissingValue {
        /// Key of the offending pair.
        key: String,
    },
    /// The same key appeared more than once in a list of pairs.
    #[error("context key {key:?} is given more than once")]
    DuplicateKey {
        /// The repeated key.
        key: String,
    },
}

/// Signal raised by a source that cannot be traversed synchronously.
///
/// Sources raise it from [`Source::check_support`](crate::Source::check_support),
/// which every entry operation consults before a single segment is opened.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{mode} traversal is not supported: {message}")]
pub struct UnsupportedModeError {
    mode: Mode,
    message: String,
}

impl UnsupportedModeError {
    /// Create the signal for the requested `mode`.
    pub fn new(mode: Mode, message: impl Into<String>) -> Self {
        Self {
            mode,
            message: message.into(),
        }
    }

    /// The mode that was requested.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Why the source refused.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Failed read from a [`Context`](crate::Context).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ContextLookupError {
    /// Nothing is associated with the key.
    #[error("no context value for key {key:?}")]
    Missing {
        /// The requested key.
        key: String,
    },
    /// A value exists but has a different type.
    #[error("context value for key {key:?} is not a {expected}")]
    Mismatch {
        /// The requested key.
        key: String,
        /// Name of the type the caller asked for.
        expected: &'static str,
    },
}

/// Invalid [`SourceConfig`](crate::SourceConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A dedicated pool was requested with no threads.
    #[error("a dedicated worker pool needs at least one thread")]
    ZeroThreads,
    /// rayon refused to build the pool.
    #[error("failed to build worker pool")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// The error channel of every traversal operation.
///
/// `E` is the failure kind declared by the source, `H` the one declared by
/// the caller's handler. Neither is wrapped or converted on the way out, so a
/// caller can match on exactly what went wrong. Handlers that can fail in
/// several independent ways use [`Raised`] as `H`.
#[derive(Debug, Error)]
pub enum TraverseError<E, H = Infallible> {
    /// The call itself was malformed.
    #[error(transparent)]
    Usage(#[from] UsageError),
    /// The source cannot be traversed synchronously.
    #[error(transparent)]
    Unsupported(#[from] UnsupportedModeError),
    /// A handler read a context key that is not there.
    #[error(transparent)]
    Lookup(#[from] ContextLookupError),
    /// The source failed to produce an element.
    #[error("source failed: {0}")]
    Source(E),
    /// Caller-supplied logic failed.
    #[error("handler failed: {0}")]
    Handler(H),
}

impl<E, H> TraverseError<E, H> {
    /// Transform the handler failure, leaving every other kind intact.
    pub fn map_handler<G>(self, f: impl FnOnce(H) -> G) -> TraverseError<E, G> {
        match self {
            Self::Usage(e) => TraverseError::Usage(e),
            Self::Unsupported(e) => TraverseError::Unsupported(e),
            Self::Lookup(e) => TraverseError::Lookup(e),
            Self::Source(e) => TraverseError::Source(e),
            Self::Handler(h) => TraverseError::Handler(f(h)),
        }
    }

    /// Transform the source failure, leaving every other kind intact.
    pub fn map_source<F>(self, f: impl FnOnce(E) -> F) -> TraverseError<F, H> {
        match self {
            Self::Usage(e) => TraverseError::Usage(e),
            Self::Unsupported(e) => TraverseError::Unsupported(e),
            Self::Lookup(e) => TraverseError::Lookup(e),
            Self::Source(e) => TraverseError::Source(f(e)),
            Self::Handler(h) => TraverseError::Handler(h),
        }
    }

    /// Place the handler failure in the first slot of a multi-kind channel.
    pub fn into_first<H2, H3>(self) -> TraverseError<E, Raised<H, H2, H3>> {
        self.map_handler(Raised::First)
    }

    /// Place the handler failure in the second slot of a multi-kind channel.
    pub fn into_second<H1, H3>(self) -> TraverseError<E, Raised<H1, H, H3>> {
        self.map_handler(Raised::Second)
    }

    /// Place the handler failure in the third slot of a multi-kind channel.
    pub fn into_third<H1, H2>(self) -> TraverseError<E, Raised<H1, H2, H>> {
        self.map_handler(Raised::Third)
    }

    /// The source failure, if that is what happened.
    pub fn as_source(&self) -> Option<&E> {
        match self {
            Self::Source(e) => Some(e),
            _ => None,
        }
    }

    /// The handler failure, if that is what happened.
    pub fn as_handler(&self) -> Option<&H> {
        match self {
            Self::Handler(h) => Some(h),
            _ => None,
        }
    }
}

/// Up to three independent failure kinds raised by one handler.
///
/// A handler declaring two kinds uses `Raised<H1, H2>`, three kinds
/// `Raised<H1, H2, H3>`. The unused slots are [`Infallible`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Raised<H1, H2 = Infallible, H3 = Infallible> {
    /// Failure of the first declared kind.
    #[error("{0}")]
    First(H1),
    /// Failure of the second declared kind.
    #[error("{0}")]
    Second(H2),
    /// Failure of the third declared kind.
    #[error("{0}")]
    Third(H3),
}

impl<H1> From<H1> for Raised<H1> {
    fn from(h: H1) -> Self {
        Raised::First(h)
    }
}
