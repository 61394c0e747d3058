//! Weekly timetable over the `schedule` store key.
//!
//! A lesson occupies the `(day, period, class)` cell. Saving into an
//! occupied cell is rejected; editing an existing lesson keeps its id and
//! may move it. The whole table is rewritten on every change.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::error::{ScheduleError, ScheduleResult, StorageResult};
use crate::store::{StateStore, KEY_SCHEDULE};

/// School week, Monday through Saturday.
pub const DAYS: [&str; 6] = [
    "Дүйсенбі",
    "Сейсенбі",
    "Сәрсенбі",
    "Бейсенбі",
    "Жұма",
    "Сенбі",
];

/// Lesson periods of a school day.
pub const PERIODS: [u8; 8] = [1, 2, 3, 4, 5, 6, 7, 8];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonSlot {
    #[serde(default)]
    pub id: String,
    pub day: String,
    pub period: u8,
    /// Subject id from the catalog.
    pub subject: String,
    /// Class id from the catalog.
    pub class: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
}

impl LessonSlot {
    pub fn new(day: &str, period: u8, subject: &str, class: &str, room: Option<&str>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            day: day.to_string(),
            period,
            subject: subject.to_string(),
            class: class.to_string(),
            teacher: None,
            room: room.map(|r| r.to_string()),
        }
    }
}

pub struct ScheduleStore {
    store: Arc<dyn StateStore>,
}

impl ScheduleStore {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    /// The whole table. A corrupt payload reads as an empty week.
    pub fn entries(&self) -> Vec<LessonSlot> {
        let raw = match self.store.get(KEY_SCHEDULE) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!(target: "ustaz::store", "timetable unreadable: {err}");
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(target: "ustaz::store", "timetable corrupt, starting empty: {err}");
                Vec::new()
            }
        }
    }

    /// Inserts or moves a lesson. A different lesson already sitting in
    /// the `(day, period, class)` cell rejects the save and leaves the
    /// stored table untouched.
    pub fn upsert(&self, mut slot: LessonSlot) -> ScheduleResult<()> {
        if slot.id.is_empty() {
            slot.id = Uuid::new_v4().to_string();
        }

        let mut entries: Vec<LessonSlot> = self
            .entries()
            .into_iter()
            .filter(|s| s.id.is_empty() || s.id != slot.id)
            .collect();

        let occupied = entries.iter().any(|s| {
            s.day == slot.day && s.period == slot.period && s.class == slot.class && s.id != slot.id
        });
        if occupied {
            return Err(ScheduleError::Conflict {
                day: slot.day,
                period: slot.period,
                class: slot.class,
            });
        }

        entries.push(slot);
        self.persist(&entries)?;
        Ok(())
    }

    /// Deletes whatever occupies the cell.
    pub fn remove(&self, day: &str, period: u8, class: &str) -> ScheduleResult<()> {
        let entries: Vec<LessonSlot> = self
            .entries()
            .into_iter()
            .filter(|s| !(s.day == day && s.period == period && s.class == class))
            .collect();
        self.persist(&entries)?;
        Ok(())
    }

    /// First lesson in the `(day, period)` grid cell, any class.
    pub fn slot_at(&self, day: &str, period: u8) -> Option<LessonSlot> {
        self.entries()
            .into_iter()
            .find(|s| s.day == day && s.period == period)
    }

    pub fn find(&self, day: &str, period: u8, class: &str) -> Option<LessonSlot> {
        self.entries()
            .into_iter()
            .find(|s| s.day == day && s.period == period && s.class == class)
    }

    /// Replaces the table with the built-in demonstration week.
    pub fn load_demo(&self) -> StorageResult<()> {
        self.persist(&demo_week())
    }

    pub fn clear(&self) -> StorageResult<()> {
        self.persist(&[])
    }

    fn persist(&self, entries: &[LessonSlot]) -> StorageResult<()> {
        let json = serde_json::to_string(entries)?;
        self.store.put(KEY_SCHEDULE, &json)
    }
}

/// Demonstration timetable: three parallel classes across the week.
pub fn demo_week() -> Vec<LessonSlot> {
    // (id, day index, period, subject, class, room)
    const WEEK: [(u8, usize, u8, &str, &str, &str); 74] = [
        (1, 0, 1, "kazakh", "7a", "101"),
        (2, 0, 2, "math", "7a", "205"),
        (3, 0, 3, "russian", "7a", "103"),
        (4, 0, 4, "english", "7a", "201"),
        (5, 0, 5, "physics", "7a", "301"),
        (6, 0, 1, "math", "7b", "205"),
        (7, 0, 2, "kazakh", "7b", "101"),
        (8, 0, 3, "chemistry", "7b", "302"),
        (9, 0, 4, "english", "7b", "201"),
        (10, 0, 1, "kazakh", "8a", "102"),
        (11, 0, 2, "math", "8a", "206"),
        (12, 0, 3, "biology", "8a", "303"),
        (13, 0, 4, "russian", "8a", "104"),
        (14, 1, 1, "math", "7a", "205"),
        (15, 1, 2, "kazakh", "7a", "101"),
        (16, 1, 3, "history", "7a", "105"),
        (17, 1, 4, "english", "7a", "201"),
        (18, 1, 5, "geography", "7a", "106"),
        (19, 1, 1, "kazakh", "7b", "101"),
        (20, 1, 2, "math", "7b", "205"),
        (21, 1, 3, "russian", "7b", "103"),
        (22, 1, 4, "physics", "7b", "301"),
        (23, 1, 1, "math", "8a", "206"),
        (24, 1, 2, "kazakh", "8a", "102"),
        (25, 1, 3, "chemistry", "8a", "302"),
        (26, 1, 4, "english", "8a", "202"),
        (27, 2, 1, "kazakh", "7a", "101"),
        (28, 2, 2, "math", "7a", "205"),
        (29, 2, 3, "russian", "7a", "103"),
        (30, 2, 4, "biology", "7a", "303"),
        (31, 2, 5, "english", "7a", "201"),
        (32, 2, 1, "math", "7b", "205"),
        (33, 2, 2, "kazakh", "7b", "101"),
        (34, 2, 3, "geography", "7b", "106"),
        (35, 2, 4, "english", "7b", "201"),
        (36, 2, 1, "kazakh", "8a", "102"),
        (37, 2, 2, "math", "8a", "206"),
        (38, 2, 3, "physics", "8a", "301"),
        (39, 2, 4, "russian", "8a", "104"),
        (40, 3, 1, "math", "7a", "205"),
        (41, 3, 2, "kazakh", "7a", "101"),
        (42, 3, 3, "chemistry", "7a", "302"),
        (43, 3, 4, "english", "7a", "201"),
        (44, 3, 5, "history", "7a", "105"),
        (45, 3, 1, "kazakh", "7b", "101"),
        (46, 3, 2, "math", "7b", "205"),
        (47, 3, 3, "russian", "7b", "103"),
        (48, 3, 4, "biology", "7b", "303"),
        (49, 3, 1, "math", "8a", "206"),
        (50, 3, 2, "kazakh", "8a", "102"),
        (51, 3, 3, "english", "8a", "202"),
        (52, 3, 4, "geography", "8a", "106"),
        (53, 4, 1, "kazakh", "7a", "101"),
        (54, 4, 2, "math", "7a", "205"),
        (55, 4, 3, "russian", "7a", "103"),
        (56, 4, 4, "physics", "7a", "301"),
        (57, 4, 5, "english", "7a", "201"),
        (58, 4, 1, "math", "7b", "205"),
        (59, 4, 2, "kazakh", "7b", "101"),
        (60, 4, 3, "chemistry", "7b", "302"),
        (61, 4, 4, "english", "7b", "201"),
        (62, 4, 1, "kazakh", "8a", "102"),
        (63, 4, 2, "math", "8a", "206"),
        (64, 4, 3, "biology", "8a", "303"),
        (65, 4, 4, "russian", "8a", "104"),
        (66, 5, 1, "math", "7a", "205"),
        (67, 5, 2, "kazakh", "7a", "101"),
        (68, 5, 3, "history", "7a", "105"),
        (69, 5, 1, "kazakh", "7b", "101"),
        (70, 5, 2, "math", "7b", "205"),
        (71, 5, 3, "geography", "7b", "106"),
        (72, 5, 1, "math", "8a", "206"),
        (73, 5, 2, "kazakh", "8a", "102"),
        (74, 5, 3, "chemistry", "8a", "302"),
    ];

    WEEK.iter()
        .map(|&(id, day, period, subject, class, room)| LessonSlot {
            id: id.to_string(),
            day: DAYS[day].to_string(),
            period,
            subject: subject.to_string(),
            class: class.to_string(),
            teacher: None,
            room: Some(room.to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn timetable() -> ScheduleStore {
        ScheduleStore::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn occupied_cell_rejects_a_different_lesson() {
        let table = timetable();
        let monday_math = LessonSlot::new(DAYS[0], 1, "math", "7a", Some("205"));
        table.upsert(monday_math.clone()).unwrap();

        let clash = LessonSlot::new(DAYS[0], 1, "physics", "7a", Some("301"));
        let err = table.upsert(clash).expect_err("cell already taken");
        assert!(matches!(err, ScheduleError::Conflict { .. }));

        let entries = table.entries();
        assert_eq!(entries.len(), 1, "rejected save leaves the table as it was");
        assert_eq!(entries[0].subject, "math");
    }

    #[test]
    fn same_cell_different_class_is_fine() {
        let table = timetable();
        table
            .upsert(LessonSlot::new(DAYS[0], 1, "math", "7a", None))
            .unwrap();
        table
            .upsert(LessonSlot::new(DAYS[0], 1, "kazakh", "7b", None))
            .unwrap();
        assert_eq!(table.entries().len(), 2);
    }

    #[test]
    fn editing_keeps_the_id_and_may_move_the_lesson() {
        let table = timetable();
        let mut lesson = LessonSlot::new(DAYS[0], 1, "math", "7a", Some("205"));
        table.upsert(lesson.clone()).unwrap();

        lesson.period = 3;
        lesson.room = Some("206".to_string());
        table.upsert(lesson.clone()).unwrap();

        let entries = table.entries();
        assert_eq!(entries.len(), 1, "an edit must not duplicate the lesson");
        assert_eq!(entries[0].period, 3);
        assert_eq!(table.find(DAYS[0], 1, "7a"), None, "the old cell is free");
    }

    #[test]
    fn remove_targets_the_exact_cell() {
        let table = timetable();
        table
            .upsert(LessonSlot::new(DAYS[0], 1, "math", "7a", None))
            .unwrap();
        table
            .upsert(LessonSlot::new(DAYS[0], 1, "kazakh", "7b", None))
            .unwrap();

        table.remove(DAYS[0], 1, "7a").unwrap();
        assert!(table.find(DAYS[0], 1, "7a").is_none());
        assert!(table.find(DAYS[0], 1, "7b").is_some(), "other classes stay");
    }

    #[test]
    fn grid_cell_lookup_returns_the_first_match() {
        let table = timetable();
        table
            .upsert(LessonSlot::new(DAYS[1], 2, "math", "7a", None))
            .unwrap();
        let cell = table.slot_at(DAYS[1], 2).expect("cell occupied");
        assert_eq!(cell.subject, "math");
        assert!(table.slot_at(DAYS[1], 3).is_none());
    }

    #[test]
    fn demo_week_fills_three_classes_without_conflicts() {
        let week = demo_week();
        assert_eq!(week.len(), 74);

        // No two lessons share a (day, period, class) cell.
        let mut cells: Vec<(String, u8, String)> = week
            .iter()
            .map(|s| (s.day.clone(), s.period, s.class.clone()))
            .collect();
        cells.sort();
        cells.dedup();
        assert_eq!(cells.len(), 74, "demo data must be conflict-free");

        let table = timetable();
        table.load_demo().unwrap();
        assert_eq!(table.entries().len(), 74);
        assert_eq!(
            table.find(DAYS[5], 3, "8a").unwrap().subject,
            "chemistry",
            "Saturday third period of 8А"
        );
    }

    #[test]
    fn corrupt_table_reads_as_empty() {
        let backing = Arc::new(MemoryStore::new());
        backing.put(KEY_SCHEDULE, "[{oops").unwrap();
        let table = ScheduleStore::new(backing);
        assert!(table.entries().is_empty());
    }
}
