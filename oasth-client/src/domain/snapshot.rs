//! The assembled network snapshot.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use super::{
    Calendar, CalendarId, Line, LineId, MasterLine, MasterLineId, Route, RouteId, Stop, StopId,
};

/// The complete, immutable, cross-referenced result of one assembly run.
///
/// `master_lines` reaches essentially the whole connected network: every
/// master line holds its lines, each line its routes and schedules, each
/// route its stops. The other four maps are independently complete
/// supersets of what the master-line graph reaches.
///
/// That completeness is deliberate. A stop served only by a seasonal line
/// is absent from the master-line graph outside that season but still
/// present in `stops`, so use the individual maps when you need every
/// entity and the master-line graph when you need connectivity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub master_lines: HashMap<MasterLineId, Arc<MasterLine>>,
    pub lines: HashMap<LineId, Arc<Line>>,
    pub routes: HashMap<RouteId, Arc<Route>>,
    pub stops: HashMap<StopId, Arc<Stop>>,
    pub calendars: HashMap<CalendarId, Arc<Calendar>>,
}

impl Snapshot {
    /// An empty snapshot, useful as a placeholder in tests.
    pub fn empty() -> Self {
        Snapshot {
            master_lines: HashMap::new(),
            lines: HashMap::new(),
            routes: HashMap::new(),
            stops: HashMap::new(),
            calendars: HashMap::new(),
        }
    }
}
