use std::collections::BTreeMap;
use std::fmt::{self, Formatter};

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const POMODOROS_PER_DAY: usize = 8;
pub const POMODORO_MINUTES: u32 = 30;
pub const TARGET_HOURS: u32 = 100;
pub const TRAILING_WEEKS: u32 = 4;
pub const DAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// One day's pomodoro slots, filled front to back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Day {
    pub slots: [bool; POMODOROS_PER_DAY],
}

impl Day {
    pub fn completed(&self) -> usize {
        self.slots.iter().filter(|slot| **slot).count()
    }

    pub fn minutes(&self) -> u32 {
        self.completed() as u32 * POMODORO_MINUTES
    }

    /// Marks the first empty slot. Returns false when the day is already full.
    pub fn add_pomodoro(&mut self) -> bool {
        match self.slots.iter_mut().find(|slot| !**slot) {
            Some(slot) => {
                *slot = true;
                true
            }
            None => false,
        }
    }

    /// Clears the last filled slot. Returns false when nothing was set.
    pub fn remove_pomodoro(&mut self) -> bool {
        match self.slots.iter_mut().rev().find(|slot| **slot) {
            Some(slot) => {
                *slot = false;
                true
            }
            None => false,
        }
    }
}

/// Seven days, Monday first. Serialized as an object keyed by day name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Week {
    pub days: [Day; DAYS.len()],
}

impl Week {
    pub fn day(&self, index: usize) -> &Day {
        &self.days[index]
    }

    pub fn day_mut(&mut self, index: usize) -> &mut Day {
        &mut self.days[index]
    }

    pub fn minutes(&self) -> u32 {
        self.days.iter().map(Day::minutes).sum()
    }
}

impl Serialize for Week {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(DAYS.len()))?;
        for (name, day) in DAYS.iter().zip(self.days.iter()) {
            map.serialize_entry(name, day)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Week {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(WeekVisitor)
    }
}

struct WeekVisitor;

impl<'de> Visitor<'de> for WeekVisitor {
    type Value = Week;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("an object keyed by the seven day names")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Week, A::Error> {
        let mut seen: [Option<Day>; DAYS.len()] = [None; DAYS.len()];
        while let Some(name) = access.next_key::<String>()? {
            let index =
                day_position(&name).ok_or_else(|| de::Error::unknown_field(&name, &DAYS))?;
            if seen[index].replace(access.next_value()?).is_some() {
                return Err(de::Error::custom(format!("duplicate day: {name}")));
            }
        }

        let mut week = Week::default();
        for (index, name) in DAYS.iter().enumerate() {
            week.days[index] = seen[index].ok_or_else(|| de::Error::missing_field(*name))?;
        }
        Ok(week)
    }
}

pub fn day_position(name: &str) -> Option<usize> {
    DAYS.iter().position(|day| *day == name)
}

/// Week number to week. Weeks are created on first access and never removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeekStore {
    weeks: BTreeMap<u32, Week>,
}

impl WeekStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ensure_week(&mut self, week: u32) {
        self.weeks.entry(week).or_default();
    }

    pub fn week(&mut self, week: u32) -> &mut Week {
        self.weeks.entry(week).or_default()
    }

    pub fn contains(&self, week: u32) -> bool {
        self.weeks.contains_key(&week)
    }

    pub fn week_numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.weeks.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.weeks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }

    pub fn day_minutes(&mut self, week: u32, day: usize) -> u32 {
        self.week(week).day(day).minutes()
    }

    pub fn week_minutes(&mut self, week: u32) -> u32 {
        self.week(week).minutes()
    }

    /// Minutes over `week` and up to three weeks before it, never below week 1.
    /// Every week in the window is created if absent.
    pub fn trailing_minutes(&mut self, week: u32) -> u32 {
        let first = week.saturating_sub(TRAILING_WEEKS - 1).max(1);
        (first..=week).map(|number| self.week_minutes(number)).sum()
    }
}

pub fn format_minutes(total: u32) -> String {
    format!("{}h {}m", total / 60, total % 60)
}
