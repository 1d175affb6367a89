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

use std::io::Write;

use crate::error::Error;
use crate::sink::Sink;

/// A sink that writes rendered records to standard output.
///
/// Bytes are emitted exactly as the formatter produced them; formatters that
/// should terminate lines append the newline themselves.
#[derive(Debug, Default, Clone, Copy)]
#[non_exhaustive]
pub struct Stdout {}

impl Sink for Stdout {
    fn emit(&self, bytes: &[u8]) -> Result<(), Error> {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(bytes)?;
        stdout.flush()?;
        Ok(())
    }
}

/// A sink that writes rendered records to standard error.
#[derive(Debug, Default, Clone, Copy)]
#[non_exhaustive]
pub struct Stderr {}

impl Sink for Stderr {
    fn emit(&self, bytes: &[u8]) -> Result<(), Error> {
        let mut stderr = std::io::stderr().lock();
        stderr.write_all(bytes)?;
        stderr.flush()?;
        Ok(())
    }
}
