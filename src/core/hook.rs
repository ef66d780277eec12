//! Hook addressing types.
//!
//! Hooks are observers attached to one `(state, point, phase)` bucket of a
//! running machine. They are registered and removed at runtime and never
//! influence which state the machine moves to.

use super::state::StateNumber;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The state callback a hook is attached around.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum HookPoint {
    Enter,
    Process,
    Exit,
}

impl HookPoint {
    pub const ALL: [HookPoint; 3] = [HookPoint::Enter, HookPoint::Process, HookPoint::Exit];

    pub const fn label(self) -> &'static str {
        match self {
            HookPoint::Enter => "enter",
            HookPoint::Process => "process",
            HookPoint::Exit => "exit",
        }
    }
}

/// Whether a hook runs before or after the callback of its point.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum HookPhase {
    Pre,
    Post,
}

impl HookPhase {
    pub const ALL: [HookPhase; 2] = [HookPhase::Pre, HookPhase::Post];

    pub const fn label(self) -> &'static str {
        match self {
            HookPhase::Pre => "pre",
            HookPhase::Post => "post",
        }
    }
}

/// What a hook is told when it fires.
///
/// For enter and exit hooks `from` is the state being left and `to` the state
/// being entered. Process hooks see `from == to`, the state being processed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct HookEvent {
    pub point: HookPoint,
    pub phase: HookPhase,
    pub from: StateNumber,
    pub to: StateNumber,
}

/// Per-machine unique hook identifier. Identifiers are never reused.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct HookId(pub(crate) u64);

impl fmt::Display for HookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hook#{}", self.0)
    }
}

/// Handle returned by hook registration, used to remove the hook again.
///
/// Handles are plain values: removing through a stale handle (a one-shot hook
/// that already fired, or a hook removed twice) is a harmless no-op.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct HookHandle {
    pub(crate) id: HookId,
    pub(crate) state: StateNumber,
    pub(crate) point: HookPoint,
    pub(crate) phase: HookPhase,
}

impl HookHandle {
    pub fn id(&self) -> HookId {
        self.id
    }

    pub fn state(&self) -> StateNumber {
        self.state
    }

    pub fn point(&self) -> HookPoint {
        self.point
    }

    pub fn phase(&self) -> HookPhase {
        self.phase
    }
}

/// Set of hook handles owned by one subsystem.
///
/// A subsystem that observes a machine records every handle it registers here
/// and releases them together on its own teardown path, so its hooks never
/// outlive it.
#[derive(Debug, Default)]
pub struct HookScope {
    handles: Vec<HookHandle>,
}

impl HookScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a handle and hand it back for chaining.
    pub fn track(&mut self, handle: HookHandle) -> HookHandle {
        self.handles.push(handle);
        handle
    }

    pub fn handles(&self) -> &[HookHandle] {
        &self.handles
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub(crate) fn drain(&mut self) -> std::vec::Drain<'_, HookHandle> {
        self.handles.drain(..)
    }
}
