//! Lifecycle, priority, and family enums shared by every task.

/// Lifecycle state of a task.
///
/// Exactly one state holds at any time; legal transitions are enforced by
/// [`Task`](crate::task::Task) and illegal requests degrade to warnings.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    serde::Serialize,
    serde::Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TaskStatus {
    /// Created, not yet started.
    #[default]
    Idle,
    /// Between a successful start request and the first running tick.
    Starting,
    /// Actively ticking.
    Running,
    /// Suspended by an interruptible pause; resumable.
    Paused,
    /// Terminal: finished successfully.
    Completed,
    /// Terminal: finished unsuccessfully (timeout, invalid conditions, or
    /// subtype-reported failure).
    Failed,
    /// Terminal: stopped explicitly before finishing.
    Cancelled,
    /// Terminal: displaced by the manager's explicit interrupt.
    Interrupted,
}

impl TaskStatus {
    /// Returns true once the task can never run again.
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Failed | Self::Cancelled | Self::Interrupted
        )
    }

    /// Returns true while the task occupies its owner's behavior slot.
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Starting | Self::Running | Self::Paused)
    }
}

/// Preemption ordering for competing tasks.
///
/// Variant order is the ordering: a later variant outranks an earlier one.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    serde::Serialize,
    serde::Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TaskPriority {
    Lowest,
    Low,
    #[default]
    Normal,
    High,
    Critical,
    Emergency,
}

/// The three tiers of behavioral complexity.
///
/// Fixed at construction; it never changes for the lifetime of a task.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    serde::Serialize,
    serde::Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TaskFamily {
    /// Instantaneous or short, non-phased actions.
    OneShot,
    /// Multi-phase actions with a linear phase sequence.
    Complex,
    /// Adaptive AI-driven actions with an analyze/plan/execute/adapt loop.
    WildComplex,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states_are_exactly_the_four() {
        for status in [
            TaskStatus::Completed,
            TaskStatus::Failed,
            TaskStatus::Cancelled,
            TaskStatus::Interrupted,
        ] {
            assert!(status.is_terminal());
            assert!(!status.is_active());
        }
        for status in [TaskStatus::Idle, TaskStatus::Starting, TaskStatus::Running] {
            assert!(!status.is_terminal());
        }
    }

    #[test]
    fn priority_ordering_matches_declaration() {
        assert!(TaskPriority::Emergency > TaskPriority::Critical);
        assert!(TaskPriority::Critical > TaskPriority::High);
        assert!(TaskPriority::High > TaskPriority::Normal);
        assert!(TaskPriority::Normal > TaskPriority::Low);
        assert!(TaskPriority::Low > TaskPriority::Lowest);
    }
}
