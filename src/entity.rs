use crate::class_session::ClassSession;
use crate::holiday::{Holiday, VacationPeriod};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which of the three editable collections an action targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Class,
    Holiday,
    Vacation,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Class => "class",
            EntityKind::Holiday => "holiday",
            EntityKind::Vacation => "vacation",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = crate::calendar::UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "class" | "classes" => Ok(EntityKind::Class),
            "holiday" | "holidays" => Ok(EntityKind::Holiday),
            "vacation" | "vacations" => Ok(EntityKind::Vacation),
            _ => Err(crate::calendar::UnknownValue {
                kind: "entity kind",
                value: s.to_string(),
            }),
        }
    }
}

/// A finished entity handed back by an editor.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Class(ClassSession),
    Holiday(Holiday),
    Vacation(VacationPeriod),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Class(_) => EntityKind::Class,
            Entity::Holiday(_) => EntityKind::Holiday,
            Entity::Vacation(_) => EntityKind::Vacation,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Entity::Class(session) => session.id(),
            Entity::Holiday(holiday) => holiday.id(),
            Entity::Vacation(period) => period.id(),
        }
    }
}

pub trait Identified {
    fn id(&self) -> &str;
}

pub fn new_entity_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Replace the item sharing `item`'s id, or append it. Returns true on replace.
pub fn upsert_by_id<T: Identified>(items: &mut Vec<T>, item: T) -> bool {
    match items.iter().position(|existing| existing.id() == item.id()) {
        Some(idx) => {
            items[idx] = item;
            true
        }
        None => {
            items.push(item);
            false
        }
    }
}

/// Drop every item with the given id. Returns true if anything was removed.
pub fn remove_by_id<T: Identified>(items: &mut Vec<T>, id: &str) -> bool {
    let before = items.len();
    items.retain(|item| item.id() != id);
    items.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Row(String, u8);

    impl Identified for Row {
        fn id(&self) -> &str {
            &self.0
        }
    }

    #[test]
    fn upsert_replaces_in_place() {
        let mut rows = vec![Row("a".into(), 1), Row("b".into(), 2)];
        assert!(upsert_by_id(&mut rows, Row("a".into(), 9)));
        assert_eq!(rows, vec![Row("a".into(), 9), Row("b".into(), 2)]);
        assert!(!upsert_by_id(&mut rows, Row("c".into(), 3)));
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn remove_reports_whether_anything_matched() {
        let mut rows = vec![Row("a".into(), 1)];
        assert!(!remove_by_id(&mut rows, "zzz"));
        assert!(remove_by_id(&mut rows, "a"));
        assert!(rows.is_empty());
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(new_entity_id(), new_entity_id());
    }
}
