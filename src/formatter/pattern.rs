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

use std::collections::HashSet;
use std::fmt;

use jiff::tz::TimeZone;

use crate::attribute::Value;
use crate::error::Error;
use crate::formatter::datetime::Generator;
use crate::formatter::datetime::DEFAULT_TIMESTAMP_PATTERN;
use crate::formatter::Formatter;
use crate::formatter::Spec;
use crate::ident;
use crate::record::Record;
use crate::writer::Writer;

/// Maps a severity integer to display text.
///
/// Invoked with the severity, the raw spec as written in the pattern, and
/// the destination writer.
pub type SeverityMap = Box<dyn Fn(i32, &str, &mut Writer) + Send + Sync + 'static>;

/// Options for the `{...}` leftover placeholder.
#[derive(Debug, Clone)]
pub struct LeftoverOptions {
    /// Suppress duplicate names across layers, keeping the innermost.
    pub unique: bool,
    /// Literal emitted before the first item, only when any item is emitted.
    pub prefix: String,
    /// Literal emitted after the last item, only when any item is emitted.
    pub suffix: String,
    /// Item pattern with `{k}` and `{v[:spec]}` placeholders.
    pub pattern: String,
    /// Separator between items.
    pub separator: String,
}

impl Default for LeftoverOptions {
    fn default() -> Self {
        LeftoverOptions {
            unique: false,
            prefix: String::new(),
            suffix: String::new(),
            pattern: "{k}: {v}".to_owned(),
            separator: ", ".to_owned(),
        }
    }
}

/// The string pattern formatter.
///
/// Compiles a brace-style pattern into a token list at construction; every
/// record is then rendered by walking the tokens, so the hot path never
/// rescans the pattern.
///
/// Literal text is copied verbatim, `{{` and `}}` denote literal braces, and
/// `{name[:spec]}` renders the named attribute under a brace format spec.
/// The names `message`, `severity`, `timestamp`, `process`, and `thread` are
/// reserved and cannot be shadowed by user attributes:
///
/// - `{timestamp}` renders through a precompiled strftime-style pattern
///   (default `%Y-%m-%d %H:%M:%S.%f`, where `%f` is six-digit microseconds);
///   `{timestamp:d}` writes microseconds since epoch and
///   `{timestamp:{%Y}s}` embeds an explicit pattern.
/// - `{process:d}` writes the pid, `{process:s}` the process name.
/// - `{thread}` writes a `0x`-prefixed hex id; `:d` selects the integer id
///   and `:s` the thread name.
///
/// A required placeholder whose attribute is absent fails the record. Make a
/// placeholder optional with [`PatternFormatterBuilder::optional`], and
/// configure the `{...}` leftover placeholder, which emits every attribute
/// not referenced elsewhere, with [`PatternFormatterBuilder::leftover`].
///
/// # Examples
///
/// ```
/// use umbra::formatter::PatternFormatter;
///
/// let formatter = PatternFormatter::new("{severity:d}, [{timestamp}]: {message}")?;
/// # Ok::<(), umbra::Error>(())
/// ```
pub struct PatternFormatter {
    pattern: String,
    timezone: TimeZone,
    severity_map: Option<SeverityMap>,
    tokens: Vec<Token>,
}

impl fmt::Debug for PatternFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternFormatter")
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}

impl PatternFormatter {
    /// Compile `pattern` with default options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PatternParse`] when the pattern does not compile.
    pub fn new(pattern: impl Into<String>) -> Result<Self, Error> {
        Self::builder(pattern).build()
    }

    /// Start configuring a formatter for `pattern`.
    pub fn builder(pattern: impl Into<String>) -> PatternFormatterBuilder {
        PatternFormatterBuilder {
            pattern: pattern.into(),
            timezone: TimeZone::UTC,
            optional: Vec::new(),
            leftover: LeftoverOptions::default(),
            severity_map: None,
        }
    }
}

/// Builder for [`PatternFormatter`].
///
/// # Examples
///
/// ```
/// use umbra::formatter::PatternFormatter;
///
/// let formatter = PatternFormatter::builder("{message}{id}")
///     .optional("id", " [", "]")
///     .build()?;
/// # Ok::<(), umbra::Error>(())
/// ```
#[must_use = "call `build` to compile the pattern"]
pub struct PatternFormatterBuilder {
    pattern: String,
    timezone: TimeZone,
    optional: Vec<(String, String, String)>,
    leftover: LeftoverOptions,
    severity_map: Option<SeverityMap>,
}

impl fmt::Debug for PatternFormatterBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternFormatterBuilder")
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}

impl PatternFormatterBuilder {
    /// Make the placeholder for `name` optional: on absence it emits
    /// nothing, on presence it emits `prefix`, the value, then `suffix`.
    pub fn optional(
        mut self,
        name: impl Into<String>,
        prefix: impl Into<String>,
        suffix: impl Into<String>,
    ) -> Self {
        self.optional.push((name.into(), prefix.into(), suffix.into()));
        self
    }

    /// Configure the `{...}` leftover placeholder.
    pub fn leftover(mut self, options: LeftoverOptions) -> Self {
        self.leftover = options;
        self
    }

    /// Install a severity mapping callback, replacing the default integer
    /// rendering of `{severity}`.
    pub fn severity_map(
        mut self,
        map: impl Fn(i32, &str, &mut Writer) + Send + Sync + 'static,
    ) -> Self {
        self.severity_map = Some(Box::new(map));
        self
    }

    /// Set the timezone timestamps render in. Defaults to UTC.
    pub fn timezone(mut self, timezone: TimeZone) -> Self {
        self.timezone = timezone;
        self
    }

    /// Compile the pattern.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PatternParse`] when the pattern does not compile.
    pub fn build(self) -> Result<PatternFormatter, Error> {
        let tokens = compile(&self.pattern, &self.optional, &self.leftover)?;
        Ok(PatternFormatter {
            pattern: self.pattern,
            timezone: self.timezone,
            severity_map: self.severity_map,
            tokens,
        })
    }
}

#[derive(Debug)]
enum Token {
    Literal(String),
    Message(Spec),
    Severity { spec: Spec, raw: String },
    TimestampNumeric(Spec),
    Timestamp { generator: Generator, spec: Spec },
    ProcessId(Spec),
    ProcessName(Spec),
    ThreadHex(Spec),
    ThreadNative(Spec),
    ThreadName(Spec),
    Required { name: String, spec: Spec },
    Optional { name: String, spec: Spec, prefix: String, suffix: String },
    Leftover(LeftoverToken),
}

#[derive(Debug)]
struct LeftoverToken {
    skip: Vec<String>,
    unique: bool,
    prefix: String,
    suffix: String,
    item: ItemPattern,
    separator: String,
}

#[derive(Debug, Clone)]
struct ItemPattern {
    pieces: Vec<ItemPiece>,
}

#[derive(Debug, Clone)]
enum ItemPiece {
    Literal(String),
    Key,
    Value(Spec),
}

fn compile(
    pattern: &str,
    optional: &[(String, String, String)],
    leftover: &LeftoverOptions,
) -> Result<Vec<Token>, Error> {
    let bytes = pattern.as_bytes();
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut names: Vec<String> = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'{' if bytes.get(i + 1) == Some(&b'{') => {
                literal.push('{');
                i += 2;
            }
            b'}' if bytes.get(i + 1) == Some(&b'}') => {
                literal.push('}');
                i += 2;
            }
            b'{' => {
                let mut depth = 1usize;
                let mut j = i + 1;
                while j < bytes.len() && depth > 0 {
                    match bytes[j] {
                        b'{' => depth += 1,
                        b'}' => depth -= 1,
                        _ => {}
                    }
                    j += 1;
                }
                if depth != 0 {
                    return Err(Error::pattern(i, "unbalanced '{'"));
                }
                if !literal.is_empty() {
                    tokens.push(Token::Literal(std::mem::take(&mut literal)));
                }
                let content = &pattern[i + 1..j - 1];
                tokens.push(placeholder(content, i, optional, leftover, &mut names)?);
                i = j;
            }
            b'}' => return Err(Error::pattern(i, "unmatched '}'")),
            _ => {
                let c = pattern[i..].chars().next().expect("index lies on a char boundary");
                literal.push(c);
                i += c.len_utf8();
            }
        }
    }
    if !literal.is_empty() {
        tokens.push(Token::Literal(literal));
    }

    // Leftover placeholders skip everything referenced elsewhere; the full
    // name set is only known once the whole pattern is parsed.
    for token in &mut tokens {
        if let Token::Leftover(token) = token {
            token.skip = names.clone();
        }
    }

    Ok(tokens)
}

fn placeholder(
    content: &str,
    position: usize,
    optional: &[(String, String, String)],
    leftover: &LeftoverOptions,
    names: &mut Vec<String>,
) -> Result<Token, Error> {
    let (name, spec_str) = match content.split_once(':') {
        Some((name, spec)) => (name, Some(spec)),
        None => (content, None),
    };
    if name.is_empty() {
        return Err(Error::pattern(position, "empty placeholder name"));
    }

    let parse_spec = |spec: Option<&str>| Spec::parse(spec.unwrap_or(""));

    let token = match name {
        "message" => Token::Message(parse_spec(spec_str)?),
        "severity" => Token::Severity {
            spec: parse_spec(spec_str)?,
            raw: spec_str.unwrap_or("").to_owned(),
        },
        "timestamp" => match spec_str {
            None => Token::Timestamp {
                generator: Generator::new(DEFAULT_TIMESTAMP_PATTERN)?,
                spec: Spec::default(),
            },
            Some(spec) if spec.starts_with('{') => {
                let close = spec
                    .rfind('}')
                    .ok_or_else(|| Error::pattern(position, "unbalanced '{' in timestamp spec"))?;
                let inner = &spec[1..close];
                let rest = Spec::parse(&spec[close + 1..])?;
                let inner = if inner.is_empty() { DEFAULT_TIMESTAMP_PATTERN } else { inner };
                Token::Timestamp {
                    generator: Generator::new(inner)?,
                    spec: rest,
                }
            }
            Some(spec) => {
                let spec = Spec::parse(spec)?;
                match spec.ty() {
                    Some('d') => Token::TimestampNumeric(spec),
                    _ => Token::Timestamp {
                        generator: Generator::new(DEFAULT_TIMESTAMP_PATTERN)?,
                        spec,
                    },
                }
            }
        },
        "process" => {
            let spec = parse_spec(spec_str)?;
            match spec.ty() {
                Some('s') => Token::ProcessName(spec),
                _ => Token::ProcessId(spec),
            }
        }
        "thread" => match spec_str {
            None => Token::ThreadHex(Spec::hex_alternate()),
            Some(raw) => {
                let spec = Spec::parse(raw)?;
                match spec.ty() {
                    Some('d') => Token::ThreadNative(spec),
                    Some('s') => Token::ThreadName(spec),
                    _ => Token::ThreadHex(spec.hex_defaulted()),
                }
            }
        },
        "..." => Token::Leftover(LeftoverToken {
            skip: Vec::new(),
            unique: leftover.unique,
            prefix: leftover.prefix.clone(),
            suffix: leftover.suffix.clone(),
            item: ItemPattern::compile(spec_str.unwrap_or(leftover.pattern.as_str()), position)?,
            separator: leftover.separator.clone(),
        }),
        _ => {
            names.push(name.to_owned());
            let spec = parse_spec(spec_str)?;
            match optional.iter().find(|(key, _, _)| key == name) {
                Some((_, prefix, suffix)) => Token::Optional {
                    name: name.to_owned(),
                    spec,
                    prefix: prefix.clone(),
                    suffix: suffix.clone(),
                },
                None => Token::Required {
                    name: name.to_owned(),
                    spec,
                },
            }
        }
    };

    if matches!(
        name,
        "message" | "severity" | "timestamp" | "process" | "thread"
    ) {
        names.push(name.to_owned());
    }

    Ok(token)
}

impl ItemPattern {
    fn compile(pattern: &str, position: usize) -> Result<Self, Error> {
        let bytes = pattern.as_bytes();
        let mut pieces = Vec::new();
        let mut literal = String::new();
        let mut i = 0;

        while i < bytes.len() {
            match bytes[i] {
                b'{' if bytes.get(i + 1) == Some(&b'{') => {
                    literal.push('{');
                    i += 2;
                }
                b'}' if bytes.get(i + 1) == Some(&b'}') => {
                    literal.push('}');
                    i += 2;
                }
                b'{' => {
                    let close = pattern[i..]
                        .find('}')
                        .map(|offset| i + offset)
                        .ok_or_else(|| Error::pattern(position, "unbalanced '{' in item pattern"))?;
                    if !literal.is_empty() {
                        pieces.push(ItemPiece::Literal(std::mem::take(&mut literal)));
                    }
                    match &pattern[i + 1..close] {
                        "k" => pieces.push(ItemPiece::Key),
                        "v" => pieces.push(ItemPiece::Value(Spec::default())),
                        inner => match inner.strip_prefix("v:") {
                            Some(spec) => pieces.push(ItemPiece::Value(Spec::parse(spec)?)),
                            None => {
                                return Err(Error::pattern(
                                    position,
                                    format!("item pattern only knows {{k}} and {{v}}, got {inner:?}"),
                                ))
                            }
                        },
                    }
                    i = close + 1;
                }
                b'}' => return Err(Error::pattern(position, "unmatched '}' in item pattern")),
                _ => {
                    let c = pattern[i..].chars().next().expect("index lies on a char boundary");
                    literal.push(c);
                    i += c.len_utf8();
                }
            }
        }
        if !literal.is_empty() {
            pieces.push(ItemPiece::Literal(literal));
        }

        Ok(ItemPattern { pieces })
    }
}

impl Formatter for PatternFormatter {
    fn format(&self, record: &Record<'_>, writer: &mut Writer) -> Result<(), Error> {
        for token in &self.tokens {
            match token {
                Token::Literal(text) => writer.push_str(text),
                Token::Message(spec) => spec.apply(Value::Str(record.message()), writer)?,
                Token::Severity { spec, raw } => match &self.severity_map {
                    Some(map) => map(record.severity(), raw, writer),
                    None => spec.apply(Value::I64(record.severity().into()), writer)?,
                },
                Token::TimestampNumeric(spec) => {
                    spec.apply(Value::I64(record.timestamp().as_microsecond()), writer)?
                }
                Token::Timestamp { generator, spec } => {
                    let time = record.timestamp().to_zoned(self.timezone.clone());
                    if spec.is_plain() {
                        generator.format(&time, writer)?;
                    } else {
                        let mut scratch = Writer::new();
                        generator.format(&time, &mut scratch)?;
                        spec.apply(Value::Str(scratch.as_str()), writer)?;
                    }
                }
                Token::ProcessId(spec) => {
                    spec.apply(Value::U64(record.pid().into()), writer)?
                }
                Token::ProcessName(spec) => {
                    spec.apply(Value::Str(ident::process_name()), writer)?
                }
                Token::ThreadHex(spec) | Token::ThreadNative(spec) => {
                    spec.apply(Value::U64(record.tid()), writer)?
                }
                Token::ThreadName(spec) => {
                    let name = ident::thread_name();
                    spec.apply(Value::Str(name.as_deref().unwrap_or("")), writer)?
                }
                Token::Required { name, spec } => match record.attributes().get(name) {
                    Some(value) => spec.apply(value, writer)?,
                    None => {
                        return Err(Error::MissingAttribute { name: name.clone() });
                    }
                },
                Token::Optional { name, spec, prefix, suffix } => {
                    if let Some(value) = record.attributes().get(name) {
                        writer.push_str(prefix);
                        spec.apply(value, writer)?;
                        writer.push_str(suffix);
                    }
                }
                Token::Leftover(token) => token.render(record, writer)?,
            }
        }
        Ok(())
    }
}

impl LeftoverToken {
    fn render(&self, record: &Record<'_>, writer: &mut Writer) -> Result<(), Error> {
        let mut body = Writer::new();
        let mut seen: Option<HashSet<&str>> = self.unique.then(HashSet::new);

        for (name, value) in record.attributes().iter() {
            if self.skip.iter().any(|skip| skip == name) {
                continue;
            }
            if let Some(seen) = &mut seen {
                if !seen.insert(name) {
                    continue;
                }
            }
            if !body.is_empty() {
                body.push_str(&self.separator);
            }
            for piece in &self.item.pieces {
                match piece {
                    ItemPiece::Literal(text) => body.push_str(text),
                    ItemPiece::Key => body.push_str(name),
                    ItemPiece::Value(spec) => spec.apply(value, &mut body)?,
                }
            }
        }

        if !body.is_empty() {
            writer.push_str(&self.prefix);
            writer.push_bytes(body.as_bytes());
            writer.push_str(&self.suffix);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_literals_and_brace_escapes() {
        let formatter = PatternFormatter::new("a {{b}} c").unwrap();
        assert_eq!(formatter.tokens.len(), 1);
        assert!(matches!(&formatter.tokens[0], Token::Literal(text) if text == "a {b} c"));
    }

    #[test]
    fn rejects_unbalanced_braces() {
        assert!(PatternFormatter::new("{message").is_err());
        assert!(PatternFormatter::new("}").is_err());
        assert!(PatternFormatter::new("{}").is_err());
    }

    #[test]
    fn reserved_names_compile_to_dedicated_tokens() {
        let formatter =
            PatternFormatter::new("{message}{severity}{timestamp:d}{process:s}{thread:d}").unwrap();
        assert!(matches!(formatter.tokens[0], Token::Message(_)));
        assert!(matches!(formatter.tokens[1], Token::Severity { .. }));
        assert!(matches!(formatter.tokens[2], Token::TimestampNumeric(_)));
        assert!(matches!(formatter.tokens[3], Token::ProcessName(_)));
        assert!(matches!(formatter.tokens[4], Token::ThreadNative(_)));
    }

    #[test]
    fn embedded_timestamp_patterns_parse() {
        let formatter = PatternFormatter::new("{timestamp:{%H:%M}s}").unwrap();
        assert!(matches!(formatter.tokens[0], Token::Timestamp { .. }));
    }

    #[test]
    fn leftover_skips_every_name_referenced_elsewhere() {
        let formatter = PatternFormatter::new("{message} {id} {...}").unwrap();
        let Token::Leftover(leftover) = &formatter.tokens[4] else {
            panic!("expected a leftover token");
        };
        assert!(leftover.skip.contains(&"id".to_owned()));
        assert!(leftover.skip.contains(&"message".to_owned()));
    }
}
