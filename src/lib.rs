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

#![deny(missing_docs)]

//! Umbra is a structured, attribute-oriented logging library.
//!
//! # Overview
//!
//! A [`Logger`] receives events from application code, filters them against
//! a swappable predicate, enriches them with scoped thread-local attributes
//! and intrinsic metadata (timestamp, process and thread identity), and fans
//! the surviving [`record::Record`] out to handlers. Each [`Handler`] pairs
//! a formatter (the brace-pattern [`formatter::PatternFormatter`] or the
//! tree-building [`formatter::JsonFormatter`]) with a byte [`sink::Sink`].
//!
//! # Examples
//!
//! Log through a compiled pattern to standard output:
//!
//! ```
//! use umbra::attribute::AttributePack;
//! use umbra::attribute::Attributes;
//! use umbra::formatter::PatternFormatter;
//! use umbra::sink::Stdout;
//! use umbra::Handler;
//! use umbra::Logger;
//!
//! # fn main() -> Result<(), umbra::Error> {
//! let formatter = PatternFormatter::new("{severity:d}, [{timestamp}]: {message}\n")?;
//! let logger = Logger::new(vec![Handler::new(formatter, Stdout::default())]);
//!
//! let attributes = Attributes::new().with("ip", "[::]");
//! let mut pack = AttributePack::new();
//! pack.push(&attributes);
//! logger.log_with(1, "HTTP1.1 - 200 OK", &pack);
//! # Ok(())
//! # }
//! ```
//!
//! Scoped attributes ride on every record logged by the current thread:
//!
//! ```
//! use umbra::attribute::AttributeSet;
//! use umbra::formatter::JsonFormatter;
//! use umbra::sink::Stderr;
//! use umbra::Logger;
//!
//! let logger = umbra::Logger::builder()
//!     .handler(JsonFormatter::builder().newline().build(), Stderr::default())
//!     .build();
//!
//! let _guard = logger.scoped(AttributeSet::new().with("request", 42u64));
//! logger.log(9, "accepted");
//! ```

pub mod attribute;
pub mod filter;
pub mod formatter;
pub mod record;
pub mod sink;

pub use self::filter::Filter;
pub use self::formatter::Formatter;
pub use self::sink::Sink;

mod error;
pub use self::error::Error;

mod handler;
pub use self::handler::Handler;

mod ident;

mod logger;
pub use self::logger::Logger;
pub use self::logger::LoggerBuilder;

mod scope;
pub use self::scope::ScopedGuard;

mod writer;
pub use self::writer::Writer;
