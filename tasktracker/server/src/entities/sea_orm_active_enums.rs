use sea_orm::entity::prelude::*;
use sea_orm::sea_query::StringLen;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// How urgent a task is.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[sea_orm(string_value = "low")]
    Low,
    #[default]
    #[sea_orm(string_value = "medium")]
    Medium,
    #[sea_orm(string_value = "high")]
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a task is in its lifecycle.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "in-process")]
    InProcess,
    #[sea_orm(string_value = "completed")]
    Completed,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::InProcess => "in-process",
            Status::Completed => "completed",
        }
    }

    /// Returns whether a task currently in `self` may be moved to `next`.
    ///
    /// Tasks only move forward one step at a time (pending to in-process,
    /// in-process to completed). Keeping the current status is always allowed.
    pub fn can_transition_to(self, next: Status) -> bool {
        self == next
            || matches!(
                (self, next),
                (Status::Pending, Status::InProcess) | (Status::InProcess, Status::Completed)
            )
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;

    #[test]
    fn can_move_status_forward_one_step() {
        assert!(Status::Pending.can_transition_to(Status::InProcess));
        assert!(Status::InProcess.can_transition_to(Status::Completed));
    }

    #[test]
    fn can_keep_the_same_status() {
        for status in Status::iter() {
            assert!(status.can_transition_to(status));
        }
    }

    #[test]
    fn cannot_skip_or_reverse_status() {
        assert!(!Status::Pending.can_transition_to(Status::Completed));
        assert!(!Status::InProcess.can_transition_to(Status::Pending));
        assert!(!Status::Completed.can_transition_to(Status::Pending));
        assert!(!Status::Completed.can_transition_to(Status::InProcess));
    }

    #[test]
    fn can_serialize_status_with_hyphenated_names() {
        assert_eq!(
            serde_json::to_string(&Status::InProcess).unwrap(),
            "\"in-process\""
        );
        assert_eq!(
            serde_json::from_str::<Priority>("\"high\"").unwrap(),
            Priority::High
        );
    }
}
