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

//! Log records.

use jiff::Timestamp;

use crate::attribute::AttributePack;
use crate::attribute::EMPTY_PACK;
use crate::ident;

/// One log event with its severity, message, attributes, and intrinsic
/// metadata.
///
/// Records borrow everything they carry from the log call frame; they own
/// nothing heap-allocated and never outlive the call that produced them.
/// Timestamp and process/thread identity are captured at construction. Once
/// a record reaches its first handler no field mutates.
#[derive(Debug)]
pub struct Record<'a> {
    severity: i32,
    message: &'a str,
    formatted: Option<&'a str>,
    attributes: &'a AttributePack<'a>,
    timestamp: Timestamp,
    pid: u32,
    tid: u64,
}

impl<'a> Record<'a> {
    /// Open a record, capturing the wall clock and process/thread identity.
    pub fn new(severity: i32, message: &'a str, attributes: &'a AttributePack<'a>) -> Self {
        Record {
            severity,
            message,
            formatted: None,
            attributes,
            timestamp: Timestamp::now(),
            pid: ident::pid(),
            tid: ident::thread_id(),
        }
    }

    /// The severity as assigned by the application.
    pub fn severity(&self) -> i32 {
        self.severity
    }

    /// The rendered message once activated, the raw pattern before that.
    pub fn message(&self) -> &'a str {
        self.formatted.unwrap_or(self.message)
    }

    /// The attribute layer stack, innermost first.
    pub fn attributes(&self) -> &'a AttributePack<'a> {
        self.attributes
    }

    /// The wall-clock instant the record was opened.
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// The process id.
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// The opaque thread id, stable for the lifetime of the thread.
    pub fn tid(&self) -> u64 {
        self.tid
    }

    /// Install the rendered message view. Called at most once, before the
    /// record reaches its first handler.
    pub fn activate(&mut self, formatted: &'a str) {
        debug_assert!(self.formatted.is_none(), "a record is activated at most once");
        self.formatted = Some(formatted);
    }
}

/// Builder for hand-assembled records.
///
/// The logger constructs records itself; this builder exists for tests and
/// for embedders that drive handlers directly.
///
/// # Examples
///
/// ```
/// use umbra::record::RecordBuilder;
///
/// let record = RecordBuilder::new().severity(3).message("out of disk").build();
/// assert_eq!(record.severity(), 3);
/// ```
#[derive(Debug)]
pub struct RecordBuilder<'a> {
    record: Record<'a>,
}

impl Default for RecordBuilder<'_> {
    fn default() -> Self {
        RecordBuilder {
            record: Record::new(0, "", &EMPTY_PACK),
        }
    }
}

impl<'a> RecordBuilder<'a> {
    /// Create a builder with an empty message and the current intrinsics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the severity.
    pub fn severity(mut self, severity: i32) -> Self {
        self.record.severity = severity;
        self
    }

    /// Set the raw message view.
    pub fn message(mut self, message: &'a str) -> Self {
        self.record.message = message;
        self
    }

    /// Set the attribute layer stack.
    pub fn attributes(mut self, attributes: &'a AttributePack<'a>) -> Self {
        self.record.attributes = attributes;
        self
    }

    /// Override the captured timestamp.
    pub fn timestamp(mut self, timestamp: Timestamp) -> Self {
        self.record.timestamp = timestamp;
        self
    }

    /// Override the captured process id.
    pub fn pid(mut self, pid: u32) -> Self {
        self.record.pid = pid;
        self
    }

    /// Override the captured thread id.
    pub fn tid(mut self, tid: u64) -> Self {
        self.record.tid = tid;
        self
    }

    /// Finish and return the record.
    pub fn build(self) -> Record<'a> {
        self.record
    }
}
