//! Stops.

use serde::Serialize;

use super::StopId;

/// A physical stop on the network.
///
/// `id` is the internal id every other dataset references; `public_code`
/// is the code printed on the stop sign and used by the trip-estimation
/// endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stop {
    pub id: StopId,
    pub public_code: String,
    pub name_el: String,
    pub name_en: String,
    /// Heading of the stop in degrees.
    pub heading: i32,
    pub longitude: f64,
    pub latitude: f64,
}
