//! Lines.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;

use super::{Direction, LineId, Route, Schedule};

/// A numbered service composed of directional routes and operating
/// schedules.
///
/// A line may legitimately have no routes or schedules when the upstream
/// data carries none for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    pub id: LineId,
    pub number: String,
    pub name_el: String,
    pub name_en: String,
    pub routes: Vec<Arc<Route>>,
    pub schedules: HashSet<Schedule>,
}

impl Line {
    /// Routes of this line running in the outbound direction.
    pub fn outbound_routes(&self) -> impl Iterator<Item = &Arc<Route>> {
        self.routes_with_direction(Direction::Outbound)
    }

    /// Routes of this line running in the inbound direction.
    pub fn inbound_routes(&self) -> impl Iterator<Item = &Arc<Route>> {
        self.routes_with_direction(Direction::Inbound)
    }

    /// Circular routes of this line.
    pub fn circular_routes(&self) -> impl Iterator<Item = &Arc<Route>> {
        self.routes_with_direction(Direction::Circular)
    }

    fn routes_with_direction(&self, direction: Direction) -> impl Iterator<Item = &Arc<Route>> {
        self.routes
            .iter()
            .filter(move |route| route.direction == direction)
    }
}
