//! Typed records for the static endpoints.
//!
//! One struct per endpoint. Each [`FromRecord`] impl is that endpoint's
//! positional schema: the only place its field indices appear. Positions
//! are fixed by the upstream contract and unused trailing fields are never
//! read.

use chrono::NaiveTime;

use super::records::{FieldError, FromRecord, RecordView};
use crate::domain::{CalendarId, Direction, LineId, MasterLineId, RouteId, StopId, WeekdaySet};

/// Endpoint names of the static datasets.
pub(crate) mod endpoints {
    pub const STOPS: &str = "getStopsB";
    pub const ROUTES: &str = "getRoutes";
    pub const ROUTE_STOPS: &str = "getRouteStops";
    pub const LINES: &str = "getLines";
    pub const MASTER_LINES: &str = "getMasterlines";
    pub const MASTER_LINE_DETAILS: &str = "getMasterlinesDetails";
    pub const CALENDARS: &str = "getSched_cats";
    pub const SCHEDULE_ENTRIES: &str = "getSched_entries";
}

/// One stop.
///
/// Layout: `stop id, public code, name EL, name EN, address EL, address EN,
/// heading, longitude, latitude, type, accessible, destinations EL,
/// destinations EN`; the address, type, accessibility and destination
/// fields are not carried into the model.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StopRecord {
    pub stop_id: StopId,
    pub public_code: String,
    pub name_el: String,
    pub name_en: String,
    pub heading: i32,
    pub longitude: f64,
    pub latitude: f64,
}

impl FromRecord for StopRecord {
    fn from_record(view: &RecordView<'_>) -> Result<Self, FieldError> {
        Ok(StopRecord {
            stop_id: StopId(view.int(0, "stop_id")?),
            public_code: view.text(1, "public_code")?.to_string(),
            name_el: view.text(2, "name_el")?.to_string(),
            name_en: view.text(3, "name_en")?.to_string(),
            heading: view.signed_int(6, "heading")?,
            longitude: view.float(7, "longitude")?,
            latitude: view.float(8, "latitude")?,
        })
    }
}

/// One route.
///
/// Layout: `route id, line id, name EL, name EN, direction code,
/// distance`; the distance is not carried. The same dataset is read twice
/// during assembly: once to build routes and once to group them by line.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RouteRecord {
    pub route_id: RouteId,
    pub line_id: LineId,
    pub name_el: String,
    pub name_en: String,
    pub direction: Direction,
}

impl FromRecord for RouteRecord {
    fn from_record(view: &RecordView<'_>) -> Result<Self, FieldError> {
        let code = view.int(4, "direction")?;
        let direction =
            Direction::from_code(code).map_err(|e| FieldError {
                field: "direction",
                reason: e.to_string(),
            })?;

        Ok(RouteRecord {
            route_id: RouteId(view.int(0, "route_id")?),
            line_id: LineId(view.int(1, "line_id")?),
            name_el: view.text(2, "name_el")?.to_string(),
            name_en: view.text(3, "name_en")?.to_string(),
            direction,
        })
    }
}

/// One stop-to-route assignment.
///
/// Layout: `entry id, route id, stop id, order index`. The order index is
/// the stop's position along the route; the dataset itself is unordered.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RouteStopRecord {
    pub route_id: RouteId,
    pub stop_id: StopId,
    pub order_index: u32,
}

impl FromRecord for RouteStopRecord {
    fn from_record(view: &RecordView<'_>) -> Result<Self, FieldError> {
        Ok(RouteStopRecord {
            route_id: RouteId(view.int(1, "route_id")?),
            stop_id: StopId(view.int(2, "stop_id")?),
            order_index: view.int(3, "order_index")?,
        })
    }
}

/// One line.
///
/// Layout: `line id, line number, name EL, name EN`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LineRecord {
    pub line_id: LineId,
    pub number: String,
    pub name_el: String,
    pub name_en: String,
}

impl FromRecord for LineRecord {
    fn from_record(view: &RecordView<'_>) -> Result<Self, FieldError> {
        Ok(LineRecord {
            line_id: LineId(view.int(0, "line_id")?),
            number: view.text(1, "number")?.to_string(),
            name_el: view.text(2, "name_el")?.to_string(),
            name_en: view.text(3, "name_en")?.to_string(),
        })
    }
}

/// One master line.
///
/// Layout: `master line id, number, name EL, name EN`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MasterLineRecord {
    pub master_line_id: MasterLineId,
    pub number: String,
    pub name_el: String,
    pub name_en: String,
}

impl FromRecord for MasterLineRecord {
    fn from_record(view: &RecordView<'_>) -> Result<Self, FieldError> {
        Ok(MasterLineRecord {
            master_line_id: MasterLineId(view.int(0, "master_line_id")?),
            number: view.text(1, "number")?.to_string(),
            name_el: view.text(2, "name_el")?.to_string(),
            name_en: view.text(3, "name_en")?.to_string(),
        })
    }
}

/// One master-line membership entry.
///
/// Layout: `entry id, master line id, line id`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MasterLineDetailRecord {
    pub master_line_id: MasterLineId,
    pub line_id: LineId,
}

impl FromRecord for MasterLineDetailRecord {
    fn from_record(view: &RecordView<'_>) -> Result<Self, FieldError> {
        Ok(MasterLineDetailRecord {
            master_line_id: MasterLineId(view.int(1, "master_line_id")?),
            line_id: LineId(view.int(2, "line_id")?),
        })
    }
}

/// One operating calendar.
///
/// Layout: `calendar id, name EL, name EN, weekday bit string, month bit
/// string`; months are not modelled.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CalendarRecord {
    pub calendar_id: CalendarId,
    pub name_el: String,
    pub name_en: String,
    pub active_days: WeekdaySet,
}

impl FromRecord for CalendarRecord {
    fn from_record(view: &RecordView<'_>) -> Result<Self, FieldError> {
        let bits = view.text(3, "active_days")?;
        let active_days = WeekdaySet::from_bit_string(bits).map_err(|e| FieldError {
            field: "active_days",
            reason: e.to_string(),
        })?;

        Ok(CalendarRecord {
            calendar_id: CalendarId(view.int(0, "calendar_id")?),
            name_el: view.text(1, "name_el")?.to_string(),
            name_en: view.text(2, "name_en")?.to_string(),
            active_days,
        })
    }
}

/// One departure observation inside a schedule entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Departure {
    pub line_id: LineId,
    pub time: NaiveTime,
}

/// One schedule entry.
///
/// Layout: `entry id, calendar id, _, _, outbound line id, _, outbound
/// time, _, inbound line id, _, inbound time, _, _`. Each entry carries two
/// independent (line, departure time) observations sharing the calendar
/// id. Either time may be the literal `"null"`, in which case that
/// direction contributes nothing and its line-id field is not read.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ScheduleRecord {
    pub calendar_id: CalendarId,
    pub outbound: Option<Departure>,
    pub inbound: Option<Departure>,
}

impl FromRecord for ScheduleRecord {
    fn from_record(view: &RecordView<'_>) -> Result<Self, FieldError> {
        let calendar_id = CalendarId(view.int(1, "calendar_id")?);

        let outbound = match view.time_or_null(6, "outbound_time")? {
            Some(time) => Some(Departure {
                line_id: LineId(view.int(4, "outbound_line_id")?),
                time,
            }),
            None => None,
        };

        let inbound = match view.time_or_null(10, "inbound_time")? {
            Some(time) => Some(Departure {
                line_id: LineId(view.int(8, "inbound_line_id")?),
                time,
            }),
            None => None,
        };

        Ok(ScheduleRecord {
            calendar_id,
            outbound,
            inbound,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Weekday;

    use super::*;
    use crate::feed::error::FeedError;
    use crate::feed::records::decode_records;

    #[test]
    fn decodes_stop_record() {
        let body = "(339,01001,ΠΛΑΤΕΙΑ,SQUARE,ΟΔΟΣ 1,STREET 1,270,22.948482,40.629350,1,0,,)";
        let stops: Vec<StopRecord> = decode_records(endpoints::STOPS, body).unwrap();

        assert_eq!(stops.len(), 1);
        let stop = &stops[0];
        assert_eq!(stop.stop_id, StopId(339));
        assert_eq!(stop.public_code, "01001");
        assert_eq!(stop.name_el, "ΠΛΑΤΕΙΑ");
        assert_eq!(stop.name_en, "SQUARE");
        assert_eq!(stop.heading, 270);
        assert_eq!(stop.longitude, 22.948482);
        assert_eq!(stop.latitude, 40.629350);
    }

    #[test]
    fn stop_record_with_bad_coordinate_fails() {
        let body = "(339,01001,A,B,C,D,270,not-a-number,40.6)";
        let err = decode_records::<StopRecord>(endpoints::STOPS, body).unwrap_err();
        match err {
            FeedError::MalformedRecord {
                endpoint, reason, ..
            } => {
                assert_eq!(endpoint, endpoints::STOPS);
                assert!(reason.contains("longitude"));
            }
            other => panic!("expected MalformedRecord, got {other:?}"),
        }
    }

    #[test]
    fn decodes_route_record() {
        let body = "(10,5,ΟΝΟΜΑ,NAME,1,12.5),(11,5,ΟΝΟΜΑ,NAME,2,12.5)";
        let routes: Vec<RouteRecord> = decode_records(endpoints::ROUTES, body).unwrap();

        assert_eq!(routes[0].route_id, RouteId(10));
        assert_eq!(routes[0].line_id, LineId(5));
        assert_eq!(routes[0].direction, Direction::Outbound);
        assert_eq!(routes[1].direction, Direction::Inbound);
    }

    #[test]
    fn route_record_with_unknown_direction_fails() {
        let body = "(10,5,A,B,7,0)";
        let err = decode_records::<RouteRecord>(endpoints::ROUTES, body).unwrap_err();
        match err {
            FeedError::MalformedRecord { reason, .. } => {
                assert!(reason.contains("unknown direction code 7"));
            }
            other => panic!("expected MalformedRecord, got {other:?}"),
        }
    }

    #[test]
    fn decodes_route_stop_record() {
        let body = "(1000,10,339,3)";
        let assignments: Vec<RouteStopRecord> =
            decode_records(endpoints::ROUTE_STOPS, body).unwrap();

        assert_eq!(
            assignments[0],
            RouteStopRecord {
                route_id: RouteId(10),
                stop_id: StopId(339),
                order_index: 3,
            }
        );
    }

    #[test]
    fn decodes_calendar_record() {
        let body = "(1,ΚΑΘΗΜΕΡΙΝΗ,WEEKDAYS,0111110,111111111111)";
        let calendars: Vec<CalendarRecord> = decode_records(endpoints::CALENDARS, body).unwrap();

        let calendar = &calendars[0];
        assert_eq!(calendar.calendar_id, CalendarId(1));
        assert!(calendar.active_days.contains(Weekday::Mon));
        assert!(calendar.active_days.contains(Weekday::Fri));
        assert!(!calendar.active_days.contains(Weekday::Sat));
        assert!(!calendar.active_days.contains(Weekday::Sun));
    }

    #[test]
    fn calendar_record_with_short_bit_string_fails() {
        let body = "(1,A,B,011111,111111111111)";
        let err = decode_records::<CalendarRecord>(endpoints::CALENDARS, body).unwrap_err();
        match err {
            FeedError::MalformedRecord { reason, .. } => {
                assert!(reason.contains("exactly 7 characters"));
            }
            other => panic!("expected MalformedRecord, got {other:?}"),
        }
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn decodes_schedule_record_with_both_observations() {
        let body = "(1,2,0,0,5,0,06:30,x,5,0,07:15,0,0)";
        let entries: Vec<ScheduleRecord> =
            decode_records(endpoints::SCHEDULE_ENTRIES, body).unwrap();

        let entry = &entries[0];
        assert_eq!(entry.calendar_id, CalendarId(2));
        assert_eq!(
            entry.outbound,
            Some(Departure {
                line_id: LineId(5),
                time: time(6, 30),
            })
        );
        assert_eq!(
            entry.inbound,
            Some(Departure {
                line_id: LineId(5),
                time: time(7, 15),
            })
        );
    }

    #[test]
    fn null_time_suppresses_that_observation() {
        let body = "(1,2,0,0,5,0,null,x,5,0,07:15,0,0)";
        let entries: Vec<ScheduleRecord> =
            decode_records(endpoints::SCHEDULE_ENTRIES, body).unwrap();

        assert_eq!(entries[0].outbound, None);
        assert_eq!(
            entries[0].inbound.map(|d| d.time),
            Some(time(7, 15))
        );
    }

    #[test]
    fn null_time_leaves_its_line_id_unread() {
        // The line-id slot of a suppressed observation may hold anything.
        let body = "(1,2,0,0,null,0,null,x,5,0,07:15,0,0)";
        let entries: Vec<ScheduleRecord> =
            decode_records(endpoints::SCHEDULE_ENTRIES, body).unwrap();

        assert_eq!(entries[0].outbound, None);
        assert!(entries[0].inbound.is_some());
    }

    #[test]
    fn decodes_master_line_detail_record() {
        let body = "(1,3,12),(2,3,14)";
        let details: Vec<MasterLineDetailRecord> =
            decode_records(endpoints::MASTER_LINE_DETAILS, body).unwrap();

        assert_eq!(details[0].master_line_id, MasterLineId(3));
        assert_eq!(details[0].line_id, LineId(12));
        assert_eq!(details[1].line_id, LineId(14));
    }
}
