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

use crate::error::Error;
use crate::formatter::Formatter;
use crate::record::Record;
use crate::sink::Sink;
use crate::writer::Writer;

/// A formatter paired with the sink its output feeds.
///
/// The logger fans each surviving record out to every handler; errors from
/// one handler never reach the others.
///
/// # Examples
///
/// ```
/// use umbra::formatter::JsonFormatter;
/// use umbra::sink::Stdout;
/// use umbra::Handler;
///
/// let handler = Handler::new(JsonFormatter::builder().newline().build(), Stdout::default());
/// ```
#[derive(Debug)]
pub struct Handler {
    formatter: Box<dyn Formatter>,
    sink: Box<dyn Sink>,
}

impl Handler {
    /// Pair `formatter` with `sink`.
    pub fn new(formatter: impl Into<Box<dyn Formatter>>, sink: impl Into<Box<dyn Sink>>) -> Self {
        Handler {
            formatter: formatter.into(),
            sink: sink.into(),
        }
    }

    /// Render the record and hand the completed byte range to the sink.
    ///
    /// # Errors
    ///
    /// Propagates formatter and sink failures to the caller; the logger
    /// contains them per handler.
    pub fn execute(&self, record: &Record<'_>) -> Result<(), Error> {
        let mut writer = Writer::new();
        self.formatter.format(record, &mut writer)?;
        self.sink.emit(writer.as_bytes())
    }
}
