use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            pub fn get(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(value: u32) -> Self {
                Self(value)
            }
        }
    };
}

entity_id!(
    /// Identifier of a task within one project.
    TaskId
);
entity_id!(
    /// Identifier of a resource within one project.
    ResourceId
);
entity_id!(
    /// Identifier of a task/resource assignment within one project.
    AssignmentId
);

/// Monotonic id counters owned by a [`crate::Project`].
///
/// Ids start at 1 and are never handed out twice, even after the entity they
/// named has been removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdGenerator {
    next_task: u32,
    next_resource: u32,
    next_assignment: u32,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self {
            next_task: 1,
            next_resource: 1,
            next_assignment: 1,
        }
    }
}

impl IdGenerator {
    pub fn next_task(&mut self) -> TaskId {
        let id = TaskId(self.next_task);
        self.next_task = self.next_task.saturating_add(1);
        id
    }

    pub fn next_resource(&mut self) -> ResourceId {
        let id = ResourceId(self.next_resource);
        self.next_resource = self.next_resource.saturating_add(1);
        id
    }

    pub fn next_assignment(&mut self) -> AssignmentId {
        let id = AssignmentId(self.next_assignment);
        self.next_assignment = self.next_assignment.saturating_add(1);
        id
    }

    /// True once any counter has reached the top of the id space.
    pub fn is_exhausted(&self) -> bool {
        [self.next_task, self.next_resource, self.next_assignment].contains(&u32::MAX)
    }

    /// Moves every counter past the given ids so that restored entities keep
    /// their ids and new ones never collide with them.
    pub(crate) fn reserve_past(
        &mut self,
        task: Option<TaskId>,
        resource: Option<ResourceId>,
        assignment: Option<AssignmentId>,
    ) -> Result<(), ValidationError> {
        if let Some(TaskId(id)) = task {
            self.next_task = self.next_task.max(successor("task", id)?);
        }
        if let Some(ResourceId(id)) = resource {
            self.next_resource = self.next_resource.max(successor("resource", id)?);
        }
        if let Some(AssignmentId(id)) = assignment {
            self.next_assignment = self.next_assignment.max(successor("assignment", id)?);
        }
        Ok(())
    }
}

fn successor(kind: &str, id: u32) -> Result<u32, ValidationError> {
    id.checked_add(1)
        .filter(|next| *next < u32::MAX)
        .ok_or_else(|| ValidationError::new(format!("{kind} id {id} leaves no room for new ids")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_are_independent_and_monotonic() {
        let mut ids = IdGenerator::default();
        assert_eq!(ids.next_task(), TaskId(1));
        assert_eq!(ids.next_task(), TaskId(2));
        assert_eq!(ids.next_resource(), ResourceId(1));
        assert_eq!(ids.next_assignment(), AssignmentId(1));
        assert_eq!(ids.next_task(), TaskId(3));
    }

    #[test]
    fn reserve_past_never_moves_backwards() {
        let mut ids = IdGenerator::default();
        ids.reserve_past(Some(TaskId(10)), None, Some(AssignmentId(4)))
            .unwrap();
        assert_eq!(ids.next_task(), TaskId(11));
        ids.reserve_past(Some(TaskId(3)), None, None).unwrap();
        assert_eq!(ids.next_task(), TaskId(12));
        assert_eq!(ids.next_resource(), ResourceId(1));
        assert_eq!(ids.next_assignment(), AssignmentId(5));
    }

    #[test]
    fn ids_at_the_top_of_the_range_are_refused() {
        let mut ids = IdGenerator::default();
        assert!(ids.reserve_past(Some(TaskId(u32::MAX)), None, None).is_err());
        assert!(ids.reserve_past(None, Some(ResourceId(u32::MAX - 1)), None).is_err());
        assert!(!ids.is_exhausted());
        assert_eq!(ids.next_task(), TaskId(1));
    }

    #[test]
    fn exhausted_counter_does_not_wrap() {
        let mut ids = IdGenerator {
            next_task: u32::MAX - 1,
            ..IdGenerator::default()
        };
        assert_eq!(ids.next_task(), TaskId(u32::MAX - 1));
        assert!(ids.is_exhausted());
        assert_eq!(ids.next_task(), TaskId(u32::MAX));
    }
}
