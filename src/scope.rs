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

//! Thread-local scoped attribute context.
//!
//! Every logger owns a scope registry. Pushing a layer yields a guard whose
//! drop pops exactly that layer; the stack is strictly per-thread and layers
//! pushed on one thread never leak into records logged on another.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::attribute::AttributeSet;

thread_local! {
    static STACKS: RefCell<HashMap<u64, Vec<Rc<AttributeSet>>>> = RefCell::new(HashMap::new());
}

static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(1);

/// Per-logger registry of thread-local scope stacks.
///
/// The registry is addressed by id through a shared handle, so moving the
/// owning logger leaves outstanding guards valid.
#[derive(Debug)]
pub(crate) struct ScopeSet {
    id: u64,
}

impl ScopeSet {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(ScopeSet {
            id: NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed),
        })
    }

    pub(crate) fn push(self: &Arc<Self>, attributes: AttributeSet) -> ScopedGuard {
        let layer = Rc::new(attributes);
        STACKS.with(|stacks| {
            stacks
                .borrow_mut()
                .entry(self.id)
                .or_default()
                .push(Rc::clone(&layer));
        });
        ScopedGuard {
            set: Arc::clone(self),
            layer,
        }
    }

    /// Snapshot the current thread's layers, innermost (most recent) first.
    pub(crate) fn collect(&self) -> Vec<Rc<AttributeSet>> {
        STACKS.with(|stacks| {
            stacks
                .borrow()
                .get(&self.id)
                .map(|stack| stack.iter().rev().cloned().collect())
                .unwrap_or_default()
        })
    }
}

/// Guard for one scoped attribute layer, returned by
/// [`Logger::scoped`](crate::Logger::scoped).
///
/// Dropping the guard pops the layer it pushed. Guards must drop in reverse
/// construction order; violating that order is a programming error and
/// panics. The guard holds its layer through an `Rc`, so it cannot be sent
/// to another thread.
#[derive(Debug)]
pub struct ScopedGuard {
    set: Arc<ScopeSet>,
    layer: Rc<AttributeSet>,
}

impl Drop for ScopedGuard {
    fn drop(&mut self) {
        STACKS.with(|stacks| {
            let mut stacks = stacks.borrow_mut();
            let stack = stacks
                .get_mut(&self.set.id)
                .expect("scope stack exists while a guard is live");
            let popped = stack.pop().expect("scope stack is non-empty while a guard is live");
            assert!(
                Rc::ptr_eq(&popped, &self.layer),
                "scoped guards must drop in reverse construction order"
            );
            if stack.is_empty() {
                stacks.remove(&self.set.id);
            }
        });
    }
}
