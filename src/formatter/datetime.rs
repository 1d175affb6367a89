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

use jiff::fmt::strtime;
use jiff::tz::TimeZone;
use jiff::Timestamp;
use jiff::Zoned;

use crate::error::Error;
use crate::writer::Writer;

pub(crate) const DEFAULT_TIMESTAMP_PATTERN: &str = "%Y-%m-%d %H:%M:%S.%f";

/// A datetime pattern compiled into a token list so the hot path never
/// rescans the pattern. `%f` expands to six-digit zero-padded microseconds;
/// every other directive delegates to `jiff`'s strftime routine.
#[derive(Debug, Clone)]
pub(crate) struct Generator {
    tokens: Vec<Token>,
}

#[derive(Debug, Clone)]
enum Token {
    Literal(String),
    Microseconds,
}

impl Generator {
    pub(crate) fn new(pattern: &str) -> Result<Self, Error> {
        let mut tokens = Vec::new();
        let mut literal = String::new();

        let mut chars = pattern.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '%' && chars.peek() == Some(&'f') {
                chars.next();
                if !literal.is_empty() {
                    tokens.push(Token::Literal(std::mem::take(&mut literal)));
                }
                tokens.push(Token::Microseconds);
            } else if c == '%' {
                // keep directive pairs intact so "%%f" stays a literal
                literal.push(c);
                if let Some(next) = chars.next() {
                    literal.push(next);
                }
            } else {
                literal.push(c);
            }
        }
        if !literal.is_empty() {
            tokens.push(Token::Literal(literal));
        }

        // Reject unknown directives at construction rather than per record.
        let probe = Timestamp::UNIX_EPOCH.to_zoned(TimeZone::UTC);
        for token in &tokens {
            if let Token::Literal(chunk) = token {
                strtime::format(chunk, &probe).map_err(|err| {
                    Error::pattern(0, format!("bad datetime directive in {chunk:?}: {err}"))
                })?;
            }
        }

        Ok(Generator { tokens })
    }

    pub(crate) fn format(&self, time: &Zoned, writer: &mut Writer) -> Result<(), Error> {
        for token in &self.tokens {
            match token {
                Token::Literal(chunk) => {
                    let text = strtime::format(chunk, time).map_err(Error::format)?;
                    writer.push_str(&text);
                }
                Token::Microseconds => {
                    let micros = time.subsec_nanosecond() / 1_000;
                    write!(writer, "{micros:06}");
                }
            }
        }
        Ok(())
    }
}
