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

use std::io;

/// The error type of umbra.
///
/// Pattern compilation errors are returned to the caller at construction
/// time. Per-record errors (`MissingAttribute`, `SpecMismatch`, `Format`,
/// `Sink`) surface from [`Handler::execute`](crate::Handler::execute) and are
/// contained by the logger so that one failing handler cannot starve the
/// others.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The pattern string failed to compile.
    #[error("malformed pattern near byte {position}: {message}")]
    PatternParse {
        /// Byte offset into the pattern where compilation stopped.
        position: usize,
        /// What went wrong.
        message: String,
    },

    /// A required placeholder referenced an attribute absent from the record.
    #[error("attribute {name:?} is missing from the record")]
    MissingAttribute {
        /// The attribute name the placeholder asked for.
        name: String,
    },

    /// A format spec was applied to a value kind it cannot express.
    #[error("format spec {spec:?} does not apply to a {kind} value")]
    SpecMismatch {
        /// The offending spec as written in the pattern.
        spec: String,
        /// The kind of the value the spec was applied to.
        kind: &'static str,
    },

    /// A formatter failed while rendering a record.
    #[error("failed to render record")]
    Format(#[source] anyhow::Error),

    /// A sink failed to consume the rendered bytes.
    #[error("sink failed to consume record")]
    Sink(#[source] anyhow::Error),
}

impl Error {
    pub(crate) fn pattern(position: usize, message: impl Into<String>) -> Self {
        Error::PatternParse {
            position,
            message: message.into(),
        }
    }

    /// Wrap an arbitrary render failure.
    pub fn format(source: impl Into<anyhow::Error>) -> Self {
        Error::Format(source.into())
    }

    /// Wrap an arbitrary sink failure.
    pub fn sink(source: impl Into<anyhow::Error>) -> Self {
        Error::Sink(source.into())
    }
}

impl From<io::Error> for Error {
    fn from(source: io::Error) -> Self {
        Error::sink(source)
    }
}
