use std::fmt;

use crate::environment::GrantHandle;

/// State of the single external grant held by the coordinator. The handle
/// never leaves the crate; callers see [`GrantStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum GrantState {
    /// No grant held; the next task triggers an acquisition.
    #[default]
    Absent,
    /// A grant is held and shared by every registered task.
    Active(GrantHandle),
    /// The grant was revoked; new tasks are refused until resumed.
    Expired,
}

impl GrantState {
    pub(crate) fn is_active(&self) -> bool {
        matches!(self, GrantState::Active(_))
    }

    pub(crate) fn handle(&self) -> Option<GrantHandle> {
        match self {
            GrantState::Active(handle) => Some(*handle),
            _ => None,
        }
    }

    pub(crate) fn status(&self) -> GrantStatus {
        match self {
            GrantState::Absent => GrantStatus::Absent,
            GrantState::Active(_) => GrantStatus::Active,
            GrantState::Expired => GrantStatus::Expired,
        }
    }
}

impl fmt::Display for GrantState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.status().as_str())
    }
}

/// Observable coordinator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GrantStatus {
    #[default]
    Absent,
    Active,
    Expired,
}

impl GrantStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, GrantStatus::Active)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GrantStatus::Absent => "absent",
            GrantStatus::Active => "active",
            GrantStatus::Expired => "expired",
        }
    }
}

impl fmt::Display for GrantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
