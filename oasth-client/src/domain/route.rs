//! Routes and their direction of travel.

use std::sync::Arc;

use serde::Serialize;

use super::{RouteId, Stop};

/// Direction of travel of a route.
///
/// Outbound runs start to end, inbound runs end to start and circular
/// routes return to their starting point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Direction {
    Outbound,
    Inbound,
    Circular,
}

/// Error returned when a wire direction code is not one of the known
/// values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown direction code {0}")]
pub struct UnknownDirectionCode(pub u32);

impl Direction {
    /// Decodes the wire direction code: 1 outbound, 2 inbound, 3 circular.
    pub fn from_code(code: u32) -> Result<Self, UnknownDirectionCode> {
        match code {
            1 => Ok(Direction::Outbound),
            2 => Ok(Direction::Inbound),
            3 => Ok(Direction::Circular),
            other => Err(UnknownDirectionCode(other)),
        }
    }
}

/// One directional traversal of an ordered sequence of stops.
///
/// The stop sequence is the physical order along the route, recovered from
/// the stop-assignment dataset. A route with no assignment records has an
/// empty sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    pub id: RouteId,
    pub name_el: String,
    pub name_en: String,
    pub stops: Vec<Arc<Stop>>,
    pub direction: Direction,
}
