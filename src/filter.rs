// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Determine whether a log record should be dispatched.

use std::fmt;

use crate::record::Record;

/// A pure predicate over records, evaluated before formatting and dispatch.
pub trait Filter: fmt::Debug + Send + Sync + 'static {
    /// Decide whether the record should be dispatched.
    fn matches(&self, record: &Record<'_>) -> bool;
}

impl<T: Filter> From<T> for Box<dyn Filter> {
    fn from(filter: T) -> Self {
        Box::new(filter)
    }
}

/// The default filter; accepts every record.
#[derive(Debug, Default, Clone, Copy)]
#[non_exhaustive]
pub struct AcceptAll {}

impl Filter for AcceptAll {
    fn matches(&self, _record: &Record<'_>) -> bool {
        true
    }
}

/// Accepts records whose severity is at or above a threshold.
///
/// # Examples
///
/// ```
/// use umbra::filter::SeverityFilter;
///
/// let filter = SeverityFilter::at_least(3);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SeverityFilter {
    threshold: i32,
}

impl SeverityFilter {
    /// Accept severities greater than or equal to `threshold`.
    pub fn at_least(threshold: i32) -> Self {
        SeverityFilter { threshold }
    }
}

impl Filter for SeverityFilter {
    fn matches(&self, record: &Record<'_>) -> bool {
        record.severity() >= self.threshold
    }
}

/// A filter built from a custom predicate.
///
/// # Examples
///
/// ```
/// use umbra::filter::FilterFn;
///
/// let filter = FilterFn::new(|record| record.attributes().get("audit").is_some());
/// ```
pub struct FilterFn {
    f: Box<dyn Fn(&Record<'_>) -> bool + Send + Sync + 'static>,
}

impl fmt::Debug for FilterFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FilterFn {{ ... }}")
    }
}

impl FilterFn {
    /// Wrap `predicate` as a filter.
    pub fn new(predicate: impl Fn(&Record<'_>) -> bool + Send + Sync + 'static) -> Self {
        FilterFn {
            f: Box::new(predicate),
        }
    }
}

impl Filter for FilterFn {
    fn matches(&self, record: &Record<'_>) -> bool {
        (self.f)(record)
    }
}
