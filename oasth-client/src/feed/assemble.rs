//! Snapshot assembly.
//!
//! The datasets form a small dependency graph that is executed as named
//! tasks over shared futures. Each task declares its inputs by awaiting
//! the corresponding handles before doing any of its own work, so
//! independent branches interleave freely while a dependent task can never
//! observe an unfinished input. The first failure aborts the whole run;
//! partial results are never exposed.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use futures::try_join;

use super::build;
use super::error::FeedError;
use super::records::{FromRecord, decode_records};
use super::wire::{
    CalendarRecord, LineRecord, MasterLineDetailRecord, MasterLineRecord, RouteRecord,
    RouteStopRecord, ScheduleRecord, StopRecord, endpoints,
};
use crate::domain::{
    Calendar, CalendarId, Line, LineId, MasterLine, MasterLineId, Route, RouteId, Schedule,
    Snapshot, Stop, StopId,
};
use crate::transport::Transport;

/// Names of the assembly tasks.
pub(crate) mod tasks {
    pub const CALENDARS: &str = "calendars";
    pub const STOPS: &str = "stops";
    pub const ROUTE_RECORDS: &str = "route_records";
    pub const ROUTE_STOP_RECORDS: &str = "route_stop_records";
    pub const LINE_RECORDS: &str = "line_records";
    pub const MASTER_LINE_RECORDS: &str = "master_line_records";
    pub const MASTER_LINE_DETAIL_RECORDS: &str = "master_line_detail_records";
    pub const SCHEDULES: &str = "schedules";
    pub const ROUTES: &str = "routes";
    pub const LINES: &str = "lines";
    pub const MASTER_LINES: &str = "master_lines";
}

/// Lifecycle event of a named assembly task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TaskEvent {
    Started(&'static str),
    Finished(&'static str),
}

/// Event log of one assembly run.
///
/// A task records `Started` only after every declared input has resolved
/// and `Finished` once its result is ready, so the log is what the
/// ordering tests assert against.
#[derive(Clone, Default)]
pub(crate) struct TaskTrace(Arc<Mutex<Vec<TaskEvent>>>);

impl TaskTrace {
    fn started(&self, name: &'static str) {
        tracing::debug!(task = name, "assembly task started");
        self.push(TaskEvent::Started(name));
    }

    fn finished(&self, name: &'static str) {
        tracing::debug!(task = name, "assembly task finished");
        self.push(TaskEvent::Finished(name));
    }

    fn push(&self, event: TaskEvent) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    /// The events recorded so far, in order.
    #[cfg(test)]
    pub(crate) fn events(&self) -> Vec<TaskEvent> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// A named task handle. Cloning hands the (eventual) result to another
/// dependent; the work itself runs once.
type SharedTask<T> = Shared<BoxFuture<'static, Result<T, FeedError>>>;

/// A root task that fetches and decodes one static dataset.
fn record_task<T, R>(
    transport: &Arc<T>,
    trace: &TaskTrace,
    name: &'static str,
    endpoint: &'static str,
) -> SharedTask<Arc<Vec<R>>>
where
    T: Transport + 'static,
    R: FromRecord + Send + Sync + 'static,
{
    let transport = Arc::clone(transport);
    let trace = trace.clone();
    async move {
        trace.started(name);
        let body = transport.fetch_gzipped_text(endpoint).await?;
        let records = decode_records::<R>(endpoint, &body)?;
        trace.finished(name);
        Ok(Arc::new(records))
    }
    .boxed()
    .shared()
}

/// Fetches all datasets and assembles one snapshot.
///
/// The task graph, with declared inputs:
///
/// ```text
/// calendars                    (root; fetch + build)
/// stops                        (root; fetch + build)
/// route_records                (root; consumed by routes and by lines)
/// route_stop_records           (root)
/// line_records                 (root)
/// master_line_records          (root)
/// master_line_detail_records   (root)
/// schedules                    <- calendars
/// routes                       <- stops, route_records, route_stop_records
/// lines                        <- line_records, route_records, routes, schedules
/// master_lines                 <- master_line_records, master_line_detail_records, lines
/// ```
///
/// Root tasks run fully in parallel. The schedule-entry fetch belongs to
/// the `schedules` task and so starts only once `calendars` has resolved;
/// every other fetch is a root.
pub(crate) async fn assemble<T>(
    transport: Arc<T>,
    trace: TaskTrace,
) -> Result<Snapshot, FeedError>
where
    T: Transport + 'static,
{
    let calendars: SharedTask<Arc<HashMap<CalendarId, Arc<Calendar>>>> = {
        let transport = Arc::clone(&transport);
        let trace = trace.clone();
        async move {
            trace.started(tasks::CALENDARS);
            let body = transport.fetch_gzipped_text(endpoints::CALENDARS).await?;
            let records = decode_records::<CalendarRecord>(endpoints::CALENDARS, &body)?;
            let map = build::build_calendars(records);
            trace.finished(tasks::CALENDARS);
            Ok(Arc::new(map))
        }
        .boxed()
        .shared()
    };

    let stops: SharedTask<Arc<HashMap<StopId, Arc<Stop>>>> = {
        let transport = Arc::clone(&transport);
        let trace = trace.clone();
        async move {
            trace.started(tasks::STOPS);
            let body = transport.fetch_gzipped_text(endpoints::STOPS).await?;
            let records = decode_records::<StopRecord>(endpoints::STOPS, &body)?;
            let map = build::build_stops(records);
            trace.finished(tasks::STOPS);
            Ok(Arc::new(map))
        }
        .boxed()
        .shared()
    };

    let route_records: SharedTask<Arc<Vec<RouteRecord>>> = record_task(
        &transport,
        &trace,
        tasks::ROUTE_RECORDS,
        endpoints::ROUTES,
    );
    let route_stop_records: SharedTask<Arc<Vec<RouteStopRecord>>> = record_task(
        &transport,
        &trace,
        tasks::ROUTE_STOP_RECORDS,
        endpoints::ROUTE_STOPS,
    );
    let line_records: SharedTask<Arc<Vec<LineRecord>>> =
        record_task(&transport, &trace, tasks::LINE_RECORDS, endpoints::LINES);
    let master_line_records: SharedTask<Arc<Vec<MasterLineRecord>>> = record_task(
        &transport,
        &trace,
        tasks::MASTER_LINE_RECORDS,
        endpoints::MASTER_LINES,
    );
    let master_line_detail_records: SharedTask<Arc<Vec<MasterLineDetailRecord>>> = record_task(
        &transport,
        &trace,
        tasks::MASTER_LINE_DETAIL_RECORDS,
        endpoints::MASTER_LINE_DETAILS,
    );

    let schedules: SharedTask<Arc<HashMap<LineId, HashSet<Schedule>>>> = {
        let transport = Arc::clone(&transport);
        let trace = trace.clone();
        let calendars = calendars.clone();
        async move {
            let calendars = calendars.await?;
            trace.started(tasks::SCHEDULES);
            let body = transport
                .fetch_gzipped_text(endpoints::SCHEDULE_ENTRIES)
                .await?;
            let records = decode_records::<ScheduleRecord>(endpoints::SCHEDULE_ENTRIES, &body)?;
            let map = build::build_schedules(&records, &calendars)?;
            trace.finished(tasks::SCHEDULES);
            Ok(Arc::new(map))
        }
        .boxed()
        .shared()
    };

    let routes: SharedTask<Arc<HashMap<RouteId, Arc<Route>>>> = {
        let trace = trace.clone();
        let stops = stops.clone();
        let route_records = route_records.clone();
        let route_stop_records = route_stop_records.clone();
        async move {
            let (stops, route_records, assignments) =
                try_join!(stops, route_records, route_stop_records)?;
            trace.started(tasks::ROUTES);
            let stop_ids = build::stop_ids_by_route(&assignments);
            let map = build::build_routes(&stops, &route_records, &stop_ids)?;
            trace.finished(tasks::ROUTES);
            Ok(Arc::new(map))
        }
        .boxed()
        .shared()
    };

    let lines: SharedTask<Arc<HashMap<LineId, Arc<Line>>>> = {
        let trace = trace.clone();
        let line_records = line_records.clone();
        let route_records = route_records.clone();
        let routes = routes.clone();
        let schedules = schedules.clone();
        async move {
            let (line_records, route_records, routes, schedules) =
                try_join!(line_records, route_records, routes, schedules)?;
            trace.started(tasks::LINES);
            let by_line = build::routes_by_line(&route_records, &routes)?;
            let map = build::build_lines(&line_records, by_line, (*schedules).clone());
            trace.finished(tasks::LINES);
            Ok(Arc::new(map))
        }
        .boxed()
        .shared()
    };

    let master_lines: SharedTask<Arc<HashMap<MasterLineId, Arc<MasterLine>>>> = {
        let trace = trace.clone();
        let master_line_records = master_line_records.clone();
        let details = master_line_detail_records.clone();
        let lines = lines.clone();
        async move {
            let (master_line_records, details, lines) =
                try_join!(master_line_records, details, lines)?;
            trace.started(tasks::MASTER_LINES);
            let by_master = build::lines_by_master_line(&details, &lines);
            let map = build::build_master_lines(&master_line_records, by_master);
            trace.finished(tasks::MASTER_LINES);
            Ok(Arc::new(map))
        }
        .boxed()
        .shared()
    };

    let (master_lines, lines, routes, stops, calendars) =
        try_join!(master_lines, lines, routes, stops, calendars)?;

    let snapshot = Snapshot {
        master_lines: (*master_lines).clone(),
        lines: (*lines).clone(),
        routes: (*routes).clone(),
        stops: (*stops).clone(),
        calendars: (*calendars).clone(),
    };

    tracing::info!(
        master_lines = snapshot.master_lines.len(),
        lines = snapshot.lines.len(),
        routes = snapshot.routes.len(),
        stops = snapshot.stops.len(),
        calendars = snapshot.calendars.len(),
        "assembled network snapshot"
    );

    Ok(snapshot)
}
