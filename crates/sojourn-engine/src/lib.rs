// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! # Sojourn Engine
//!
//! The routing engine seam and a reference implementation.
//!
//! * **`engine`**: the `RoutingEngine` trait (dimensions, disjunctions, cumul
//!   bounds, monitors, solve).
//! * **`dimension`**: cumul propagation along a route, soft upper bounds and
//!   span costs.
//! * **`backtracking`**: `BacktrackingEngine`, an exhaustive depth-first
//!   engine for single-route models.
//! * **`params`**, **`assignment`**, **`error`**: search parameters, solutions
//!   and `EngineError`.

pub mod assignment;
pub mod backtracking;
pub mod dimension;
pub mod engine;
pub mod error;
pub mod params;
