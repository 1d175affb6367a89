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

//! Formatters render records into bytes.

use std::fmt;

use crate::error::Error;
use crate::record::Record;
use crate::writer::Writer;

mod datetime;
mod json;
mod pattern;
mod spec;

pub use self::json::JsonFormatter;
pub use self::json::JsonFormatterBuilder;
pub use self::pattern::LeftoverOptions;
pub use self::pattern::PatternFormatter;
pub use self::pattern::PatternFormatterBuilder;
pub use self::pattern::SeverityMap;
pub use self::spec::Align;
pub use self::spec::Spec;

/// Renders records into a writer.
pub trait Formatter: fmt::Debug + Send + Sync + 'static {
    /// Render one record into `writer`.
    ///
    /// # Errors
    ///
    /// A formatter that cannot render the record returns an error; the
    /// logger contains it and the record is dropped for this handler only.
    fn format(&self, record: &Record<'_>, writer: &mut Writer) -> Result<(), Error>;
}

impl<T: Formatter> From<T> for Box<dyn Formatter> {
    fn from(formatter: T) -> Self {
        Box::new(formatter)
    }
}
