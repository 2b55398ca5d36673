//! Departure schedules.

use std::sync::Arc;

use chrono::NaiveTime;
use serde::Serialize;

use super::Calendar;

/// The departure times of a line under one calendar, split by direction.
///
/// Both lists are ascending and duplicate-free. Lines whose routes are
/// circular carry entries only in `outbound`; this is a property of the
/// upstream data, not something the model enforces.
///
/// Schedules live in a line's schedule *set*, so two identical
/// (calendar, time-lists) schedules collapse into one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Schedule {
    pub calendar: Arc<Calendar>,
    pub outbound: Vec<NaiveTime>,
    pub inbound: Vec<NaiveTime>,
}
