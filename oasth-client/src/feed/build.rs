//! Entity builders.
//!
//! Pure functions turning typed wire records into the domain maps,
//! resolving cross-dataset references against the maps built before them.
//! A reference to an id that is absent from its map is fatal, with one
//! deliberate exception in [`lines_by_master_line`]. The reverse is
//! tolerated everywhere: an entity with no children is built with empty
//! children, never dropped.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use chrono::NaiveTime;

use super::error::FeedError;
use super::wire::{
    CalendarRecord, LineRecord, MasterLineDetailRecord, MasterLineRecord, RouteRecord,
    RouteStopRecord, ScheduleRecord, StopRecord, endpoints,
};
use crate::domain::{
    Calendar, CalendarId, Line, LineId, MasterLine, MasterLineId, Route, RouteId, Schedule, Stop,
    StopId,
};

/// Builds the stop map. Stops reference nothing, so construction is
/// unconditional.
pub(crate) fn build_stops(records: Vec<StopRecord>) -> HashMap<StopId, Arc<Stop>> {
    records
        .into_iter()
        .map(|record| {
            let stop = Stop {
                id: record.stop_id,
                public_code: record.public_code,
                name_el: record.name_el,
                name_en: record.name_en,
                heading: record.heading,
                longitude: record.longitude,
                latitude: record.latitude,
            };
            (stop.id, Arc::new(stop))
        })
        .collect()
}

/// Recovers each route's physical stop sequence from the unordered
/// assignment dataset.
///
/// Assignments are grouped by route and sorted by their order index; the
/// sort is stable, so the result is deterministic for any input
/// permutation.
pub(crate) fn stop_ids_by_route(records: &[RouteStopRecord]) -> HashMap<RouteId, Vec<StopId>> {
    let mut unordered: HashMap<RouteId, Vec<(u32, StopId)>> = HashMap::new();
    for record in records {
        unordered
            .entry(record.route_id)
            .or_default()
            .push((record.order_index, record.stop_id));
    }

    unordered
        .into_iter()
        .map(|(route_id, mut pairs)| {
            pairs.sort_by_key(|(order, _)| *order);
            let stop_ids = pairs.into_iter().map(|(_, stop_id)| stop_id).collect();
            (route_id, stop_ids)
        })
        .collect()
}

/// Builds the route map, substituting each assigned stop id with its stop.
///
/// A route without assignment records gets an empty stop sequence. A stop
/// id present in the assignment data but absent from `stops` is a hard
/// error; stops are never silently dropped from a route.
pub(crate) fn build_routes(
    stops: &HashMap<StopId, Arc<Stop>>,
    records: &[RouteRecord],
    stop_ids: &HashMap<RouteId, Vec<StopId>>,
) -> Result<HashMap<RouteId, Arc<Route>>, FeedError> {
    let mut routes = HashMap::with_capacity(records.len());
    for record in records {
        let assigned = stop_ids.get(&record.route_id).map(Vec::as_slice).unwrap_or(&[]);
        let matched = assigned
            .iter()
            .map(|stop_id| {
                stops
                    .get(stop_id)
                    .cloned()
                    .ok_or(FeedError::DanglingReference {
                        endpoint: endpoints::ROUTE_STOPS,
                        entity: "stop",
                        id: stop_id.get(),
                    })
            })
            .collect::<Result<Vec<Arc<Stop>>, FeedError>>()?;

        let route = Route {
            id: record.route_id,
            name_el: record.name_el.clone(),
            name_en: record.name_en.clone(),
            stops: matched,
            direction: record.direction,
        };
        routes.insert(route.id, Arc::new(route));
    }
    Ok(routes)
}

/// Builds the calendar map. Weekday bit strings were already validated at
/// decode time.
pub(crate) fn build_calendars(
    records: Vec<CalendarRecord>,
) -> HashMap<CalendarId, Arc<Calendar>> {
    records
        .into_iter()
        .map(|record| {
            let calendar = Calendar {
                id: record.calendar_id,
                name_el: record.name_el,
                name_en: record.name_en,
                active_days: record.active_days,
            };
            (calendar.id, Arc::new(calendar))
        })
        .collect()
}

/// Departure times accumulated for one (line, calendar) combination.
///
/// Sets dedup repeated identical departure times across records and keep
/// the times ascending for free.
#[derive(Default)]
struct DirectionTimes {
    outbound: BTreeSet<NaiveTime>,
    inbound: BTreeSet<NaiveTime>,
}

/// Builds each line's schedule set from the schedule entries.
///
/// Every entry carries up to two observations (see
/// [`ScheduleRecord`]); each one lands in its line's outbound or inbound
/// time set under the entry's calendar. One schedule is materialised per
/// (line, calendar) combination seen. A calendar id referenced by any
/// entry but absent from `calendars` is a hard error.
///
/// Lines with circular routes end up with times only in the outbound set;
/// that is how the upstream encodes them, not a rule enforced here.
pub(crate) fn build_schedules(
    records: &[ScheduleRecord],
    calendars: &HashMap<CalendarId, Arc<Calendar>>,
) -> Result<HashMap<LineId, HashSet<Schedule>>, FeedError> {
    let mut times: HashMap<LineId, HashMap<CalendarId, DirectionTimes>> = HashMap::new();
    for record in records {
        if let Some(departure) = record.outbound {
            times
                .entry(departure.line_id)
                .or_default()
                .entry(record.calendar_id)
                .or_default()
                .outbound
                .insert(departure.time);
        }
        if let Some(departure) = record.inbound {
            times
                .entry(departure.line_id)
                .or_default()
                .entry(record.calendar_id)
                .or_default()
                .inbound
                .insert(departure.time);
        }
    }

    let mut schedules: HashMap<LineId, HashSet<Schedule>> = HashMap::new();
    for (line_id, by_calendar) in times {
        let line_schedules = schedules.entry(line_id).or_default();
        for (calendar_id, direction_times) in by_calendar {
            let calendar =
                calendars
                    .get(&calendar_id)
                    .cloned()
                    .ok_or(FeedError::DanglingReference {
                        endpoint: endpoints::SCHEDULE_ENTRIES,
                        entity: "calendar",
                        id: calendar_id.get(),
                    })?;
            line_schedules.insert(Schedule {
                calendar,
                outbound: direction_times.outbound.into_iter().collect(),
                inbound: direction_times.inbound.into_iter().collect(),
            });
        }
    }
    Ok(schedules)
}

/// Groups the built routes by the line id embedded in each route record.
///
/// A route id referenced by a record but absent from `routes` is a hard
/// error.
pub(crate) fn routes_by_line(
    records: &[RouteRecord],
    routes: &HashMap<RouteId, Arc<Route>>,
) -> Result<HashMap<LineId, Vec<Arc<Route>>>, FeedError> {
    let mut by_line: HashMap<LineId, Vec<Arc<Route>>> = HashMap::new();
    for record in records {
        let route = routes
            .get(&record.route_id)
            .cloned()
            .ok_or(FeedError::DanglingReference {
                endpoint: endpoints::ROUTES,
                entity: "route",
                id: record.route_id.get(),
            })?;
        by_line.entry(record.line_id).or_default().push(route);
    }
    Ok(by_line)
}

/// Builds the line map.
///
/// A line with no entry in either grouping is built with an empty route
/// list and an empty schedule set; absent children are legitimate.
pub(crate) fn build_lines(
    records: &[LineRecord],
    mut routes_by_line: HashMap<LineId, Vec<Arc<Route>>>,
    mut schedules_by_line: HashMap<LineId, HashSet<Schedule>>,
) -> HashMap<LineId, Arc<Line>> {
    records
        .iter()
        .map(|record| {
            let line = Line {
                id: record.line_id,
                number: record.number.clone(),
                name_el: record.name_el.clone(),
                name_en: record.name_en.clone(),
                routes: routes_by_line.remove(&record.line_id).unwrap_or_default(),
                schedules: schedules_by_line
                    .remove(&record.line_id)
                    .unwrap_or_default(),
            };
            (line.id, Arc::new(line))
        })
        .collect()
}

/// Groups the built lines by master line, from the membership dataset.
///
/// The upstream data is known to contain one membership record whose line
/// and master line do not exist anywhere else; such records are skipped,
/// not errored. This is the single tolerated dangling reference in the
/// whole pipeline — nothing else may reuse it.
pub(crate) fn lines_by_master_line(
    records: &[MasterLineDetailRecord],
    lines: &HashMap<LineId, Arc<Line>>,
) -> HashMap<MasterLineId, Vec<Arc<Line>>> {
    let mut by_master: HashMap<MasterLineId, Vec<Arc<Line>>> = HashMap::new();
    for record in records {
        match lines.get(&record.line_id) {
            Some(line) => {
                by_master
                    .entry(record.master_line_id)
                    .or_default()
                    .push(line.clone());
            }
            None => {
                tracing::debug!(
                    master_line_id = record.master_line_id.get(),
                    line_id = record.line_id.get(),
                    "skipping master-line membership record for unknown line"
                );
            }
        }
    }
    by_master
}

/// Builds the master-line map. A master line with no grouped lines is
/// built with an empty line list.
pub(crate) fn build_master_lines(
    records: &[MasterLineRecord],
    mut lines_by_master: HashMap<MasterLineId, Vec<Arc<Line>>>,
) -> HashMap<MasterLineId, Arc<MasterLine>> {
    records
        .iter()
        .map(|record| {
            let master_line = MasterLine {
                id: record.master_line_id,
                number: record.number.clone(),
                name_el: record.name_el.clone(),
                name_en: record.name_en.clone(),
                lines: lines_by_master
                    .remove(&record.master_line_id)
                    .unwrap_or_default(),
            };
            (master_line.id, Arc::new(master_line))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Weekday;

    use super::*;
    use crate::domain::{Direction, WeekdaySet};
    use crate::feed::wire::Departure;

    fn stop_record(id: u32) -> StopRecord {
        StopRecord {
            stop_id: StopId(id),
            public_code: format!("{id:05}"),
            name_el: format!("ΣΤΑΣΗ {id}"),
            name_en: format!("STOP {id}"),
            heading: 0,
            longitude: 22.9,
            latitude: 40.6,
        }
    }

    fn route_record(route_id: u32, line_id: u32, direction: Direction) -> RouteRecord {
        RouteRecord {
            route_id: RouteId(route_id),
            line_id: LineId(line_id),
            name_el: format!("ΔΙΑΔΡΟΜΗ {route_id}"),
            name_en: format!("ROUTE {route_id}"),
            direction,
        }
    }

    fn assignment(route_id: u32, stop_id: u32, order_index: u32) -> RouteStopRecord {
        RouteStopRecord {
            route_id: RouteId(route_id),
            stop_id: StopId(stop_id),
            order_index,
        }
    }

    fn calendar_record(id: u32) -> CalendarRecord {
        CalendarRecord {
            calendar_id: CalendarId(id),
            name_el: String::new(),
            name_en: String::new(),
            active_days: [Weekday::Mon].into_iter().collect::<WeekdaySet>(),
        }
    }

    fn line_record(id: u32, number: &str) -> LineRecord {
        LineRecord {
            line_id: LineId(id),
            number: number.to_string(),
            name_el: String::new(),
            name_en: String::new(),
        }
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn stops_are_built_unconditionally() {
        let stops = build_stops(vec![stop_record(1), stop_record(2)]);
        assert_eq!(stops.len(), 2);
        assert_eq!(stops[&StopId(1)].public_code, "00001");
    }

    #[test]
    fn stop_sequence_is_sorted_by_order_index() {
        let by_route = stop_ids_by_route(&[
            assignment(10, 300, 2),
            assignment(10, 100, 0),
            assignment(10, 200, 1),
            assignment(11, 500, 0),
        ]);

        assert_eq!(
            by_route[&RouteId(10)],
            vec![StopId(100), StopId(200), StopId(300)]
        );
        assert_eq!(by_route[&RouteId(11)], vec![StopId(500)]);
    }

    #[test]
    fn routes_resolve_their_stop_sequences() {
        let stops = build_stops(vec![stop_record(100), stop_record(200)]);
        let records = vec![route_record(10, 5, Direction::Outbound)];
        let assignments = stop_ids_by_route(&[
            assignment(10, 200, 1),
            assignment(10, 100, 0),
        ]);

        let routes = build_routes(&stops, &records, &assignments).unwrap();
        let route = &routes[&RouteId(10)];
        let sequence: Vec<StopId> = route.stops.iter().map(|s| s.id).collect();
        assert_eq!(sequence, vec![StopId(100), StopId(200)]);
    }

    #[test]
    fn route_without_assignments_gets_empty_sequence() {
        // Route 10 has no assignment records at all; that is not an error.
        let stops = build_stops(vec![stop_record(100)]);
        let records = vec![route_record(10, 5, Direction::Outbound)];

        let routes = build_routes(&stops, &records, &HashMap::new()).unwrap();
        let route = &routes[&RouteId(10)];
        assert_eq!(route.id, RouteId(10));
        assert_eq!(route.direction, Direction::Outbound);
        assert!(route.stops.is_empty());
    }

    #[test]
    fn route_referencing_unknown_stop_fails() {
        let stops = build_stops(vec![stop_record(100)]);
        let records = vec![route_record(10, 5, Direction::Outbound)];
        let assignments = stop_ids_by_route(&[assignment(10, 999, 0)]);

        let err = build_routes(&stops, &records, &assignments).unwrap_err();
        assert_eq!(
            err,
            FeedError::DanglingReference {
                endpoint: endpoints::ROUTE_STOPS,
                entity: "stop",
                id: 999,
            }
        );
    }

    #[test]
    fn schedules_group_by_line_and_calendar() {
        let calendars = build_calendars(vec![calendar_record(1), calendar_record(2)]);
        let records = vec![
            ScheduleRecord {
                calendar_id: CalendarId(1),
                outbound: Some(Departure {
                    line_id: LineId(5),
                    time: time(7, 0),
                }),
                inbound: Some(Departure {
                    line_id: LineId(5),
                    time: time(7, 45),
                }),
            },
            ScheduleRecord {
                calendar_id: CalendarId(2),
                outbound: Some(Departure {
                    line_id: LineId(5),
                    time: time(9, 0),
                }),
                inbound: None,
            },
        ];

        let schedules = build_schedules(&records, &calendars).unwrap();
        let line_schedules = &schedules[&LineId(5)];
        assert_eq!(line_schedules.len(), 2);

        let weekday = line_schedules
            .iter()
            .find(|s| s.calendar.id == CalendarId(1))
            .unwrap();
        assert_eq!(weekday.outbound, vec![time(7, 0)]);
        assert_eq!(weekday.inbound, vec![time(7, 45)]);
    }

    #[test]
    fn null_outbound_contributes_only_inbound() {
        let calendars = build_calendars(vec![calendar_record(1)]);
        let records = vec![ScheduleRecord {
            calendar_id: CalendarId(1),
            outbound: None,
            inbound: Some(Departure {
                line_id: LineId(5),
                time: time(22, 15),
            }),
        }];

        let schedules = build_schedules(&records, &calendars).unwrap();
        let schedule = schedules[&LineId(5)].iter().next().unwrap();
        assert!(schedule.outbound.is_empty());
        assert_eq!(schedule.inbound, vec![time(22, 15)]);
    }

    #[test]
    fn repeated_departure_times_collapse() {
        let calendars = build_calendars(vec![calendar_record(1)]);
        let record = ScheduleRecord {
            calendar_id: CalendarId(1),
            outbound: Some(Departure {
                line_id: LineId(5),
                time: time(6, 30),
            }),
            inbound: None,
        };
        let records = vec![record.clone(), record.clone(), record];

        let schedules = build_schedules(&records, &calendars).unwrap();
        let schedule = schedules[&LineId(5)].iter().next().unwrap();
        assert_eq!(schedule.outbound, vec![time(6, 30)]);
    }

    #[test]
    fn observations_of_one_record_can_target_different_lines() {
        let calendars = build_calendars(vec![calendar_record(1)]);
        let records = vec![ScheduleRecord {
            calendar_id: CalendarId(1),
            outbound: Some(Departure {
                line_id: LineId(5),
                time: time(6, 30),
            }),
            inbound: Some(Departure {
                line_id: LineId(6),
                time: time(6, 50),
            }),
        }];

        let schedules = build_schedules(&records, &calendars).unwrap();
        assert!(schedules[&LineId(5)]
            .iter()
            .all(|s| s.inbound.is_empty()));
        assert!(schedules[&LineId(6)]
            .iter()
            .all(|s| s.outbound.is_empty()));
    }

    #[test]
    fn schedule_referencing_unknown_calendar_fails() {
        let calendars = build_calendars(vec![calendar_record(1)]);
        let records = vec![ScheduleRecord {
            calendar_id: CalendarId(9),
            outbound: Some(Departure {
                line_id: LineId(5),
                time: time(6, 30),
            }),
            inbound: None,
        }];

        let err = build_schedules(&records, &calendars).unwrap_err();
        assert_eq!(
            err,
            FeedError::DanglingReference {
                endpoint: endpoints::SCHEDULE_ENTRIES,
                entity: "calendar",
                id: 9,
            }
        );
    }

    #[test]
    fn routes_group_by_their_line() {
        let stops = HashMap::new();
        let records = vec![
            route_record(10, 5, Direction::Outbound),
            route_record(11, 5, Direction::Inbound),
            route_record(12, 6, Direction::Circular),
        ];
        let routes = build_routes(&stops, &records, &HashMap::new()).unwrap();

        let by_line = routes_by_line(&records, &routes).unwrap();
        assert_eq!(by_line[&LineId(5)].len(), 2);
        assert_eq!(by_line[&LineId(6)].len(), 1);
    }

    #[test]
    fn grouping_unknown_route_fails() {
        let records = vec![route_record(10, 5, Direction::Outbound)];
        let err = routes_by_line(&records, &HashMap::new()).unwrap_err();
        assert_eq!(
            err,
            FeedError::DanglingReference {
                endpoint: endpoints::ROUTES,
                entity: "route",
                id: 10,
            }
        );
    }

    #[test]
    fn line_without_children_is_built_empty() {
        let lines = build_lines(&[line_record(5, "27")], HashMap::new(), HashMap::new());
        let line = &lines[&LineId(5)];
        assert_eq!(line.number, "27");
        assert!(line.routes.is_empty());
        assert!(line.schedules.is_empty());
    }

    #[test]
    fn membership_record_for_unknown_line_is_skipped() {
        let lines = build_lines(&[line_record(5, "27")], HashMap::new(), HashMap::new());
        let details = vec![
            MasterLineDetailRecord {
                master_line_id: MasterLineId(1),
                line_id: LineId(5),
            },
            // Known upstream defect: references a line that exists nowhere.
            MasterLineDetailRecord {
                master_line_id: MasterLineId(99),
                line_id: LineId(999),
            },
        ];

        let by_master = lines_by_master_line(&details, &lines);
        assert_eq!(by_master.len(), 1);
        assert_eq!(by_master[&MasterLineId(1)].len(), 1);
        assert!(!by_master.contains_key(&MasterLineId(99)));
    }

    #[test]
    fn master_line_without_lines_is_built_empty() {
        let master_lines = build_master_lines(
            &[MasterLineRecord {
                master_line_id: MasterLineId(1),
                number: "01".to_string(),
                name_el: String::new(),
                name_en: String::new(),
            }],
            HashMap::new(),
        );
        assert!(master_lines[&MasterLineId(1)].lines.is_empty());
    }
}
