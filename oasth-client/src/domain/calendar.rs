//! Operating calendars.

use chrono::Weekday;
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

use super::CalendarId;

/// Error returned when a weekday bit string does not have exactly seven
/// characters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("weekday bit string must be exactly 7 characters, got {len}")]
pub struct InvalidBitString {
    pub len: usize,
}

/// A set of weekdays stored as a 7-bit membership mask.
///
/// Bit `n` is the day `n` days after Monday, matching
/// [`Weekday::num_days_from_monday`]. This is the only granularity the
/// model carries; the upstream month field is not represented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    /// The empty set.
    pub const EMPTY: WeekdaySet = WeekdaySet(0);

    /// Parses the wire bit string: seven characters, leftmost for Sunday,
    /// the rest Monday through Saturday in order. Every character other
    /// than `'0'` marks its day active.
    pub fn from_bit_string(bits: &str) -> Result<Self, InvalidBitString> {
        let len = bits.chars().count();
        if len != 7 {
            return Err(InvalidBitString { len });
        }

        let mut set = WeekdaySet::EMPTY;
        for (index, ch) in bits.chars().enumerate() {
            if ch == '0' {
                continue;
            }
            let day = match index {
                0 => Weekday::Sun,
                1 => Weekday::Mon,
                2 => Weekday::Tue,
                3 => Weekday::Wed,
                4 => Weekday::Thu,
                5 => Weekday::Fri,
                _ => Weekday::Sat,
            };
            set.insert(day);
        }
        Ok(set)
    }

    /// Adds a day to the set.
    pub fn insert(&mut self, day: Weekday) {
        self.0 |= 1 << day.num_days_from_monday();
    }

    /// Whether the set contains the given day.
    pub fn contains(self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_monday()) != 0
    }

    /// Number of days in the set.
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Whether the set contains no days.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates the days in Monday-to-Sunday order.
    pub fn iter(self) -> impl Iterator<Item = Weekday> {
        [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ]
        .into_iter()
        .filter(move |day| self.contains(*day))
    }
}

impl FromIterator<Weekday> for WeekdaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(days: I) -> Self {
        let mut set = WeekdaySet::EMPTY;
        for day in days {
            set.insert(day);
        }
        set
    }
}

impl Serialize for WeekdaySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for day in self.iter() {
            seq.serialize_element(&day.to_string())?;
        }
        seq.end()
    }
}

/// A named set of active weekdays that determines when a schedule is in
/// effect.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Calendar {
    pub id: CalendarId,
    pub name_el: String,
    pub name_en: String,
    pub active_days: WeekdaySet,
}

impl Calendar {
    /// Whether this calendar is active on the given weekday.
    pub fn is_active_on(&self, day: Weekday) -> bool {
        self.active_days.contains(day)
    }
}
