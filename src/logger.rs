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

use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::attribute::AttributePack;
use crate::attribute::AttributeSet;
use crate::error::Error;
use crate::filter::AcceptAll;
use crate::filter::Filter;
use crate::formatter::Formatter;
use crate::handler::Handler;
use crate::record::Record;
use crate::scope::ScopedGuard;
use crate::scope::ScopeSet;
use crate::sink::Sink;
use crate::writer::Writer;

#[derive(Debug)]
struct Inner {
    filter: Box<dyn Filter>,
    handlers: Arc<Vec<Handler>>,
}

/// The root logger: filter, scoped context, and handler fan-out.
///
/// The filter and handler list live in a refcounted snapshot. Every `log`
/// call takes a brief lock to clone the current snapshot and then works from
/// it, so [`set_filter`](Logger::set_filter) publishes a replacement without
/// ever blocking in-flight calls; each call observes exactly one snapshot.
///
/// Handler failures are contained: a failing sink gets one short diagnostic
/// on standard error and the remaining handlers still run.
///
/// # Examples
///
/// ```
/// use umbra::attribute::AttributePack;
/// use umbra::attribute::Attributes;
/// use umbra::formatter::PatternFormatter;
/// use umbra::sink::Stdout;
/// use umbra::Handler;
/// use umbra::Logger;
///
/// # fn main() -> Result<(), umbra::Error> {
/// let formatter = PatternFormatter::new("{severity:d} {message}\n")?;
/// let logger = Logger::new(vec![Handler::new(formatter, Stdout::default())]);
///
/// let attributes = Attributes::new().with("key", 42);
/// let mut pack = AttributePack::new();
/// pack.push(&attributes);
/// logger.log_with(3, "fatal error, please try again", &pack);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Logger {
    inner: Mutex<Arc<Inner>>,
    scopes: Arc<ScopeSet>,
}

impl Logger {
    /// Construct a logger that owns `handlers`, accepting every record.
    pub fn new(handlers: Vec<Handler>) -> Self {
        Self::with_filter(AcceptAll::default(), handlers)
    }

    /// Construct a logger that owns `handlers` with `filter` installed.
    pub fn with_filter(filter: impl Into<Box<dyn Filter>>, handlers: Vec<Handler>) -> Self {
        Logger {
            inner: Mutex::new(Arc::new(Inner {
                filter: filter.into(),
                handlers: Arc::new(handlers),
            })),
            scopes: ScopeSet::new(),
        }
    }

    /// Start configuring a logger.
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::default()
    }

    /// Publish a new filter.
    ///
    /// The snapshot is cloned, the filter substituted, and the result swapped
    /// in atomically; concurrent `log` calls finish against whichever
    /// snapshot they captured.
    pub fn set_filter(&self, filter: impl Into<Box<dyn Filter>>) {
        let mut slot = self.inner.lock();
        let next = Inner {
            filter: filter.into(),
            handlers: Arc::clone(&slot.handlers),
        };
        *slot = Arc::new(next);
    }

    /// Emit a record with no attributes; the message is emitted verbatim.
    pub fn log(&self, severity: i32, message: &str) {
        self.consume(severity, message, &AttributePack::new(), None::<fn(&mut Writer)>);
    }

    /// Emit a record carrying the caller's attribute pack.
    pub fn log_with(&self, severity: i32, message: &str, attributes: &AttributePack<'_>) {
        self.consume(severity, message, attributes, None::<fn(&mut Writer)>);
    }

    /// Emit a record whose message is rendered by `format` into a
    /// stack-allocated writer before dispatch.
    ///
    /// The raw `message` stays visible to the filter; handlers observe the
    /// rendered text.
    pub fn log_format<F>(&self, severity: i32, message: &str, attributes: &AttributePack<'_>, format: F)
    where
        F: FnOnce(&mut Writer),
    {
        self.consume(severity, message, attributes, Some(format));
    }

    /// Push a scoped attribute layer for the current thread.
    ///
    /// The layer rides on every record logged on this thread until the guard
    /// drops. Guards are not sendable across threads and must drop in
    /// reverse construction order.
    ///
    /// # Examples
    ///
    /// ```
    /// use umbra::attribute::AttributeSet;
    /// use umbra::Logger;
    ///
    /// let logger = Logger::new(vec![]);
    /// let _guard = logger.scoped(AttributeSet::new().with("request", 42u64));
    /// logger.log(1, "handling");
    /// ```
    pub fn scoped(&self, attributes: AttributeSet) -> ScopedGuard {
        self.scopes.push(attributes)
    }

    fn consume<F>(&self, severity: i32, message: &str, attributes: &AttributePack<'_>, format: Option<F>)
    where
        F: FnOnce(&mut Writer),
    {
        let inner = Arc::clone(&self.inner.lock());
        let scoped = self.scopes.collect();

        let mut pack = AttributePack::new();
        for layer in &scoped {
            pack.push(&**layer);
        }
        for layer in attributes.layers() {
            pack.push(*layer);
        }

        // The writer outlives the record so the rendered message view stays
        // valid through handler dispatch.
        let mut writer = Writer::new();
        let mut record = Record::new(severity, message, &pack);

        if !inner.filter.matches(&record) {
            return;
        }

        if let Some(format) = format {
            format(&mut writer);
            record.activate(writer.as_str());
        }

        for handler in inner.handlers.iter() {
            if let Err(error) = handler.execute(&record) {
                report_handler_error(&record, &error);
            }
        }
    }
}

fn report_handler_error(record: &Record<'_>, error: &Error) {
    let _ = writeln!(
        std::io::stderr(),
        "failed to deliver log record {message:?}: {error}",
        message = record.message(),
    );
}

/// Builder for [`Logger`].
///
/// # Examples
///
/// ```
/// use umbra::filter::SeverityFilter;
/// use umbra::formatter::JsonFormatter;
/// use umbra::sink::Stderr;
///
/// let logger = umbra::Logger::builder()
///     .filter(SeverityFilter::at_least(3))
///     .handler(JsonFormatter::builder().newline().build(), Stderr::default())
///     .build();
/// ```
#[must_use = "call `build` to construct the logger"]
#[derive(Debug, Default)]
pub struct LoggerBuilder {
    filter: Option<Box<dyn Filter>>,
    handlers: Vec<Handler>,
}

impl LoggerBuilder {
    /// Install `filter` instead of the default accept-all filter.
    pub fn filter(mut self, filter: impl Into<Box<dyn Filter>>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Add a handler pairing `formatter` with `sink`.
    pub fn handler(
        mut self,
        formatter: impl Into<Box<dyn Formatter>>,
        sink: impl Into<Box<dyn Sink>>,
    ) -> Self {
        self.handlers.push(Handler::new(formatter, sink));
        self
    }

    /// Construct the logger.
    pub fn build(self) -> Logger {
        match self.filter {
            Some(filter) => Logger::with_filter(filter, self.handlers),
            None => Logger::new(self.handlers),
        }
    }
}
