/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is dual-licensed under either the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree or the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree. You may select, at your option, one of the
 * above-listed licenses.
 */

#![warn(missing_docs)]

//! Synchronous, segmentable traversal of re-traversable sources.
//!
//! A [`Source`] owns zero or more segments of elements. Each of its entry
//! operations calls a handler once per segment, passing a [`Traverser`] over
//! that segment and the call's immutable [`Context`]:
//!
//! * [`Source::sequence`] drives segments one after another on the calling
//!   thread.
//! * [`Source::parallel`] fans segments out across worker threads, falling
//!   back to sequential execution for sources that cannot parallelize.
//! * [`Source::traverse`] uses whichever of the two the source prefers.
//!
//! Each returns `true` iff every segment was driven to exhaustion. A handler
//! that stops early, e.g. by declining an element in [`Traverser::some`],
//! short-circuits the other segments and makes the call return `false`.
//!
//! Failures travel through [`TraverseError`] untouched: the source's own
//! failure kind as [`TraverseError::Source`], the handler's as
//! [`TraverseError::Handler`]. Handlers with more than one failure kind use
//! [`Raised`].
//!
//! # Example
//!
//! ```
//! use std::convert::Infallible;
//! use std::num::NonZeroUsize;
//! use std::sync::atomic::AtomicU64;
//! use std::sync::atomic::Ordering;
//!
//! use traverse_source::Source;
//! use traverse_source::SourceConfig;
//! use traverse_source::VecSource;
//! use traverse_source::context;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let source = VecSource::new((1..=100).collect::<Vec<u64>>())
//!     .with_config(SourceConfig::default().with_segment_len(NonZeroUsize::new(10).unwrap()))?;
//!
//! let total = AtomicU64::new(0);
//! let completed = source.parallel(
//!     |traverser, ctx| {
//!         let factor = *ctx.get::<u64>("factor")?;
//!         traverser.each(|v| {
//!             total.fetch_add(v * factor, Ordering::Relaxed);
//!             Ok::<_, Infallible>(())
//!         })
//!     },
//!     context! { "factor" => 2u64 },
//! )?;
//!
//! assert!(completed);
//! assert_eq!(total.load(Ordering::Relaxed), 10100);
//! # Ok(())
//! # }
//! ```

mod config;
mod context;
mod engine;
mod error;
mod signal;
mod source;
pub mod sources;
mod traverser;


pub use crate::config::SourceConfig;
pub use crate::context::Context;
pub use crate::context::IntoContext;
pub use crate::context::KeyValue;
pub use crate::error::ConfigError;
pub use crate::error::ContextLookupError;
pub use crate::error::Raised;
pub use crate::error::TraverseError;
pub use crate::error::UnsupportedModeError;
pub use crate::error::UsageError;
pub use crate::source::Mode;
pub use crate::source::Source;
pub use crate::sources::RangeSource;
pub use crate::sources::VecSource;
pub use crate::traverser::Cursor;
pub use crate::traverser::Remaining;
pub use crate::traverser::Traverser;
