//! Domain types for the transit network model.
//!
//! This module contains the typed entity graph assembled from the upstream
//! datasets. All entities are immutable once constructed and hold their
//! children behind [`std::sync::Arc`], so a route and the snapshot's stop
//! map share the same stop values.

mod calendar;
mod ids;
mod line;
mod master_line;
mod route;
mod schedule;
mod snapshot;
mod stop;

pub use calendar::{Calendar, InvalidBitString, WeekdaySet};
pub use ids::{CalendarId, LineId, MasterLineId, RouteId, StopId};
pub use line::Line;
pub use master_line::MasterLine;
pub use route::{Direction, Route, UnknownDirectionCode};
pub use schedule::Schedule;
pub use snapshot::Snapshot;
pub use stop::Stop;
