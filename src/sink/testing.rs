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

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Error;
use crate::sink::Sink;

/// A sink that captures every rendered record in memory.
///
/// Cloning the sink shares the capture buffer, so a test can keep one handle
/// while the logger owns the other.
///
/// # Examples
///
/// ```
/// use umbra::sink::Memory;
/// use umbra::sink::Sink;
///
/// let sink = Memory::new();
/// let capture = sink.clone();
/// sink.emit(b"hello").unwrap();
/// assert_eq!(capture.records(), ["hello"]);
/// ```
#[derive(Debug, Default, Clone)]
pub struct Memory {
    records: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl Memory {
    /// Create an empty capture sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// The captured records decoded as text, in emission order.
    pub fn records(&self) -> Vec<String> {
        self.records
            .lock()
            .iter()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .collect()
    }

    /// The number of captured records.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Whether nothing has been captured yet.
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl Sink for Memory {
    fn emit(&self, bytes: &[u8]) -> Result<(), Error> {
        self.records.lock().push(bytes.to_vec());
        Ok(())
    }
}
