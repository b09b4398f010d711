/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is dual-licensed under either the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree or the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree. You may select, at your option, one of the
 * above-listed licenses.
 */

//! In-memory [`Source`](crate::Source) implementations.

mod range;
mod vec;

pub use range::RangeCursor;
pub use range::RangeSegments;
pub use range::RangeSource;
pub use vec::SliceCursor;
pub use vec::SliceSegments;
pub use vec::VecSource;
