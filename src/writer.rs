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

use std::fmt;
use std::io;
use std::str;

use crate::attribute::Value;
use crate::error::Error;
use crate::formatter::Spec;

const INLINE_CAPACITY: usize = 512;

/// A growable byte writer handed to formatters.
///
/// The writer starts on an inline stack buffer and spills to the heap with
/// geometric growth once the inline capacity overflows. It accepts raw
/// bytes, `write!` output, and attribute values rendered under a brace
/// format spec.
///
/// # Examples
///
/// ```
/// use umbra::Writer;
///
/// let mut writer = Writer::new();
/// write!(writer, "x = {}", 42);
/// assert_eq!(writer.as_str(), "x = 42");
/// ```
pub struct Writer {
    buf: Buf,
}

enum Buf {
    Inline { data: [u8; INLINE_CAPACITY], len: usize },
    Heap(Vec<u8>),
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

impl Writer {
    /// Create an empty writer on its inline buffer.
    pub fn new() -> Self {
        Writer {
            buf: Buf::Inline {
                data: [0; INLINE_CAPACITY],
                len: 0,
            },
        }
    }

    /// The number of accumulated bytes.
    pub fn len(&self) -> usize {
        match &self.buf {
            Buf::Inline { len, .. } => *len,
            Buf::Heap(heap) => heap.len(),
        }
    }

    /// Whether nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append raw bytes, spilling to the heap on overflow.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        match &mut self.buf {
            Buf::Inline { data, len } => {
                let total = *len + bytes.len();
                if total <= INLINE_CAPACITY {
                    data[*len..total].copy_from_slice(bytes);
                    *len = total;
                } else {
                    let mut heap = Vec::with_capacity(total.next_power_of_two());
                    heap.extend_from_slice(&data[..*len]);
                    heap.extend_from_slice(bytes);
                    self.buf = Buf::Heap(heap);
                }
            }
            Buf::Heap(heap) => heap.extend_from_slice(bytes),
        }
    }

    /// Append a string slice.
    pub fn push_str(&mut self, text: &str) {
        self.push_bytes(text.as_bytes());
    }

    /// Append a value rendered under a brace format spec.
    pub fn write_value(&mut self, value: Value<'_>, spec: &Spec) -> Result<(), Error> {
        spec.apply(value, self)
    }

    /// Infallible `write!` target; writes into the writer never error.
    pub fn write_fmt(&mut self, args: fmt::Arguments<'_>) {
        // The fmt::Write impl below cannot fail.
        let _ = fmt::Write::write_fmt(self, args);
    }

    /// The accumulated bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match &self.buf {
            Buf::Inline { data, len } => &data[..*len],
            Buf::Heap(heap) => heap,
        }
    }

    /// The accumulated text, or the empty string if raw non-UTF-8 bytes were
    /// appended.
    pub fn as_str(&self) -> &str {
        str::from_utf8(self.as_bytes()).unwrap_or_default()
    }

    /// Discard the accumulated bytes, keeping any heap capacity.
    pub fn clear(&mut self) {
        match &mut self.buf {
            Buf::Inline { len, .. } => *len = 0,
            Buf::Heap(heap) => heap.clear(),
        }
    }
}

impl fmt::Debug for Writer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Writer")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl fmt::Write for Writer {
    fn write_str(&mut self, text: &str) -> fmt::Result {
        self.push_bytes(text.as_bytes());
        Ok(())
    }
}

impl io::Write for Writer {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.push_bytes(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn growth_across_the_inline_boundary_preserves_all_bytes() {
        let chunk = "0123456789abcdef".repeat(13); // 208 bytes
        let mut writer = Writer::new();
        writer.push_str(&chunk);
        writer.push_str(&chunk);
        assert!(writer.len() <= INLINE_CAPACITY);
        writer.push_str(&chunk); // spills
        assert_eq!(writer.len(), chunk.len() * 3);
        assert_eq!(writer.as_str(), chunk.repeat(3));
    }

    #[test]
    fn exact_fit_stays_inline() {
        let mut writer = Writer::new();
        writer.push_bytes(&[b'x'; INLINE_CAPACITY]);
        assert_eq!(writer.len(), INLINE_CAPACITY);
        writer.push_bytes(b"y");
        assert_eq!(writer.len(), INLINE_CAPACITY + 1);
        assert_eq!(writer.as_bytes()[INLINE_CAPACITY], b'y');
    }

    #[test]
    fn clear_resets_the_accumulated_view() {
        let mut writer = Writer::new();
        writer.push_str("hello");
        writer.clear();
        assert!(writer.is_empty());
        writer.push_str("world");
        assert_eq!(writer.as_str(), "world");
    }
}
