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

use crate::attribute::Value;
use crate::error::Error;
use crate::writer::Writer;

/// Horizontal alignment of a padded field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    /// Pad on the right.
    Left,
    /// Pad on both sides.
    Center,
    /// Pad on the left.
    Right,
}

/// A parsed brace format spec.
///
/// The grammar is `[[fill]align][sign]['#']['0'][width]['.' precision][type]`
/// with `<`, `^`, `>` alignment, `+` sign, and one of `d x X o b e E f s` as
/// the type. Numbers pad to the right by default, text to the left; the `0`
/// flag zero-pads after the sign. A spec that does not fit the value kind
/// fails the record with [`Error::SpecMismatch`].
#[derive(Debug, Clone, PartialEq)]
pub struct Spec {
    raw: String,
    fill: char,
    align: Option<Align>,
    plus: bool,
    alternate: bool,
    zero: bool,
    width: Option<usize>,
    precision: Option<usize>,
    ty: Option<char>,
}

impl Default for Spec {
    fn default() -> Self {
        Spec {
            raw: String::new(),
            fill: ' ',
            align: None,
            plus: false,
            alternate: false,
            zero: false,
            width: None,
            precision: None,
            ty: None,
        }
    }
}

const TYPES: &str = "dxXobeEfs";

impl Spec {
    /// Parse the text that follows the `:` of a placeholder.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let mut spec = Spec {
            raw: raw.to_owned(),
            ..Default::default()
        };

        let chars: Vec<char> = raw.chars().collect();
        let mut i = 0;

        let align_of = |c: char| match c {
            '<' => Some(Align::Left),
            '^' => Some(Align::Center),
            '>' => Some(Align::Right),
            _ => None,
        };

        if chars.len() >= 2 {
            if let Some(align) = align_of(chars[1]) {
                spec.fill = chars[0];
                spec.align = Some(align);
                i = 2;
            }
        }
        if spec.align.is_none() {
            if let Some(align) = chars.first().copied().and_then(align_of) {
                spec.align = Some(align);
                i = 1;
            }
        }

        if chars.get(i) == Some(&'+') {
            spec.plus = true;
            i += 1;
        } else if chars.get(i) == Some(&'-') {
            i += 1;
        }

        if chars.get(i) == Some(&'#') {
            spec.alternate = true;
            i += 1;
        }
        if chars.get(i) == Some(&'0') {
            spec.zero = true;
            i += 1;
        }

        let mut width = 0usize;
        let mut saw_width = false;
        while let Some(c) = chars.get(i).filter(|c| c.is_ascii_digit()) {
            width = width * 10 + (*c as usize - '0' as usize);
            saw_width = true;
            i += 1;
        }
        if saw_width {
            spec.width = Some(width);
        }

        if chars.get(i) == Some(&'.') {
            i += 1;
            let mut precision = 0usize;
            let mut saw_precision = false;
            while let Some(c) = chars.get(i).filter(|c| c.is_ascii_digit()) {
                precision = precision * 10 + (*c as usize - '0' as usize);
                saw_precision = true;
                i += 1;
            }
            if !saw_precision {
                return Err(Error::pattern(i, format!("precision expects digits in spec {raw:?}")));
            }
            spec.precision = Some(precision);
        }

        if let Some(c) = chars.get(i) {
            if !TYPES.contains(*c) {
                return Err(Error::pattern(i, format!("unknown type {c:?} in spec {raw:?}")));
            }
            spec.ty = Some(*c);
            i += 1;
        }

        if i != chars.len() {
            return Err(Error::pattern(i, format!("trailing characters in spec {raw:?}")));
        }

        Ok(spec)
    }

    /// The default spec for the thread placeholder, `{:#x}`.
    pub(crate) fn hex_alternate() -> Self {
        Spec {
            raw: "#x".to_owned(),
            alternate: true,
            ty: Some('x'),
            ..Default::default()
        }
    }

    /// Fall back to `0x`-prefixed hex when the spec names no radix, keeping
    /// any padding the caller asked for.
    pub(crate) fn hex_defaulted(mut self) -> Self {
        if self.ty.is_none() {
            self.ty = Some('x');
        }
        if matches!(self.ty, Some('x') | Some('X')) {
            self.alternate = true;
        }
        self
    }

    /// The spec as written in the pattern.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub(crate) fn ty(&self) -> Option<char> {
        self.ty
    }

    /// True when the spec requests no padding, sign, or type conversion
    /// beyond plain text.
    pub(crate) fn is_plain(&self) -> bool {
        self.align.is_none()
            && !self.plus
            && !self.alternate
            && !self.zero
            && self.width.is_none()
            && self.precision.is_none()
            && matches!(self.ty, None | Some('s'))
    }

    /// Render `value` under this spec into `writer`.
    pub(crate) fn apply(&self, value: Value<'_>, writer: &mut Writer) -> Result<(), Error> {
        match value {
            Value::Null => self.apply_text("null", value.kind(), writer),
            Value::Bool(v) => self.apply_text(if v { "true" } else { "false" }, value.kind(), writer),
            Value::Str(v) => self.apply_text(v, value.kind(), writer),
            Value::I64(v) => self.apply_int(v < 0, v.unsigned_abs() as u128, value.kind(), writer),
            Value::U64(v) => self.apply_int(false, v as u128, value.kind(), writer),
            Value::F64(v) => self.apply_float(v, value.kind(), writer),
        }
    }

    fn mismatch(&self, kind: &'static str) -> Error {
        Error::SpecMismatch {
            spec: self.raw.clone(),
            kind,
        }
    }

    fn apply_text(&self, text: &str, kind: &'static str, writer: &mut Writer) -> Result<(), Error> {
        if !matches!(self.ty, None | Some('s')) || self.plus || self.alternate || self.zero {
            return Err(self.mismatch(kind));
        }
        match self.precision {
            Some(precision) if text.chars().count() > precision => {
                let truncated: String = text.chars().take(precision).collect();
                self.pad(&truncated, Align::Left, writer);
            }
            _ => self.pad(text, Align::Left, writer),
        }
        Ok(())
    }

    fn apply_int(
        &self,
        negative: bool,
        magnitude: u128,
        kind: &'static str,
        writer: &mut Writer,
    ) -> Result<(), Error> {
        if self.precision.is_some() {
            return Err(self.mismatch(kind));
        }
        let digits = match self.ty {
            None | Some('d') => magnitude.to_string(),
            Some('x') => format!("{magnitude:x}"),
            Some('X') => format!("{magnitude:X}"),
            Some('o') => format!("{magnitude:o}"),
            Some('b') => format!("{magnitude:b}"),
            _ => return Err(self.mismatch(kind)),
        };
        let prefix = if self.alternate {
            match self.ty {
                Some('x') | Some('X') => "0x",
                Some('o') => "0o",
                Some('b') => "0b",
                _ => "",
            }
        } else {
            ""
        };
        let sign = if negative {
            "-"
        } else if self.plus {
            "+"
        } else {
            ""
        };
        self.pad_number(sign, prefix, &digits, writer);
        Ok(())
    }

    fn apply_float(&self, v: f64, kind: &'static str, writer: &mut Writer) -> Result<(), Error> {
        let magnitude = v.abs();
        let body = match self.ty {
            Some('f') => format!("{:.*}", self.precision.unwrap_or(6), magnitude),
            Some('e') => match self.precision {
                Some(precision) => format!("{magnitude:.precision$e}"),
                None => format!("{magnitude:e}"),
            },
            Some('E') => match self.precision {
                Some(precision) => format!("{magnitude:.precision$E}"),
                None => format!("{magnitude:E}"),
            },
            None => match self.precision {
                Some(precision) => format!("{magnitude:.precision$}"),
                None => format!("{magnitude}"),
            },
            _ => return Err(self.mismatch(kind)),
        };
        let sign = if v.is_sign_negative() {
            "-"
        } else if self.plus {
            "+"
        } else {
            ""
        };
        self.pad_number(sign, "", &body, writer);
        Ok(())
    }

    fn pad_number(&self, sign: &str, prefix: &str, digits: &str, writer: &mut Writer) {
        let width = self.width.unwrap_or(0);
        let len = sign.chars().count() + prefix.chars().count() + digits.chars().count();

        if self.zero && self.align.is_none() && width > len {
            writer.push_str(sign);
            writer.push_str(prefix);
            self.push_fill('0', width - len, writer);
            writer.push_str(digits);
        } else {
            let mut body = String::with_capacity(len);
            body.push_str(sign);
            body.push_str(prefix);
            body.push_str(digits);
            self.pad(&body, Align::Right, writer);
        }
    }

    fn pad(&self, text: &str, default_align: Align, writer: &mut Writer) {
        let width = self.width.unwrap_or(0);
        let len = text.chars().count();
        if len >= width {
            writer.push_str(text);
            return;
        }

        let total = width - len;
        let (left, right) = match self.align.unwrap_or(default_align) {
            Align::Left => (0, total),
            Align::Right => (total, 0),
            Align::Center => (total / 2, total - total / 2),
        };
        self.push_fill(self.fill, left, writer);
        writer.push_str(text);
        self.push_fill(self.fill, right, writer);
    }

    fn push_fill(&self, fill: char, count: usize, writer: &mut Writer) {
        let mut buf = [0u8; 4];
        let fill = fill.encode_utf8(&mut buf);
        for _ in 0..count {
            writer.push_str(fill);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(spec: &str, value: Value<'_>) -> String {
        let mut writer = Writer::new();
        Spec::parse(spec).unwrap().apply(value, &mut writer).unwrap();
        writer.as_str().to_owned()
    }

    fn render_err(spec: &str, value: Value<'_>) -> Error {
        let mut writer = Writer::new();
        Spec::parse(spec).unwrap().apply(value, &mut writer).unwrap_err()
    }

    #[test]
    fn parses_the_full_grammar() {
        let spec = Spec::parse("*^+#08.3f").unwrap();
        assert_eq!(spec.fill, '*');
        assert_eq!(spec.align, Some(Align::Center));
        assert!(spec.plus);
        assert!(spec.alternate);
        assert!(spec.zero);
        assert_eq!(spec.width, Some(8));
        assert_eq!(spec.precision, Some(3));
        assert_eq!(spec.ty, Some('f'));
    }

    #[test]
    fn rejects_malformed_specs() {
        assert!(Spec::parse(".f").is_err());
        assert!(Spec::parse("8q").is_err());
        assert!(Spec::parse("d d").is_err());
    }

    #[test]
    fn signed_floats_honor_sign_and_precision() {
        assert_eq!(render("+.3f", Value::F64(3.14)), "+3.140");
        assert_eq!(render("+.6f", Value::F64(-3.14)), "-3.140000");
    }

    #[test]
    fn integers_render_in_each_radix() {
        assert_eq!(render("d", Value::I64(-42)), "-42");
        assert_eq!(render("x", Value::U64(0xdead)), "dead");
        assert_eq!(render("#x", Value::U64(0xdead)), "0xdead");
        assert_eq!(render("#o", Value::U64(8)), "0o10");
        assert_eq!(render("b", Value::U64(5)), "101");
    }

    #[test]
    fn zero_padding_sits_between_sign_and_digits() {
        assert_eq!(render("08d", Value::I64(-42)), "-0000042");
        assert_eq!(render("+08d", Value::I64(42)), "+0000042");
    }

    #[test]
    fn text_pads_left_and_numbers_pad_right_by_default() {
        assert_eq!(render("6", Value::Str("ab")), "ab    ");
        assert_eq!(render("6", Value::I64(42)), "    42");
        assert_eq!(render("*^6", Value::Str("ab")), "**ab**");
    }

    #[test]
    fn string_precision_truncates() {
        assert_eq!(render(".3", Value::Str("abcdef")), "abc");
    }

    #[test]
    fn mismatched_kinds_are_reported() {
        assert!(matches!(
            render_err("d", Value::Str("nope")),
            Error::SpecMismatch { kind: "string", .. }
        ));
        assert!(matches!(
            render_err(".3d", Value::I64(1)),
            Error::SpecMismatch { kind: "signed", .. }
        ));
        assert!(matches!(
            render_err("f", Value::Bool(true)),
            Error::SpecMismatch { kind: "bool", .. }
        ));
    }

    #[test]
    fn null_and_bool_render_as_text() {
        assert_eq!(render("", Value::Null), "null");
        assert_eq!(render("s", Value::Bool(true)), "true");
    }
}
