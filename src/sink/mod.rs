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

//! Destinations for rendered records.

use std::fmt;

use crate::error::Error;

mod stdio;
mod testing;

pub use self::stdio::Stderr;
pub use self::stdio::Stdout;
pub use self::testing::Memory;

/// A destination for the bytes a formatter produced.
///
/// Sinks receive each record's bytes in one call. A sink shared across
/// handlers or threads synchronizes internally; the logger imposes no
/// ordering across handlers.
pub trait Sink: fmt::Debug + Send + Sync + 'static {
    /// Consume one rendered record.
    fn emit(&self, bytes: &[u8]) -> Result<(), Error>;
}

impl<T: Sink> From<T> for Box<dyn Sink> {
    fn from(sink: T) -> Self {
        Box::new(sink)
    }
}
