//! Trip-time estimation.
//!
//! The estimation endpoint lives outside the data API and answers with an
//! English sentence rather than structured data; the estimated minutes are
//! scraped out of it. Callers build a transport against
//! [`ESTIMATION_BASE_URL`] and pick a one-hour interval; only the hour of
//! the given time is used.

use std::sync::OnceLock;

use chrono::{NaiveTime, Timelike, Weekday};
use regex::Regex;

use crate::domain::{Direction, LineId};
use crate::transport::{Transport, TransportError};

/// Base URL of the trip-estimation endpoint.
pub const ESTIMATION_BASE_URL: &str = "https://oasth.gr/en/routeinfo";

fn minutes_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"It is estimated that the bus route .+ executing the outward journey, \w+ at \d?\d:\d\d , from bus stop .+ to bus stop .+ will cross the distance in (\d+)' minutes approximately",
        )
        .expect("estimation pattern is valid")
    })
}

/// Fetches the estimated trip time in minutes between two stops of a line.
///
/// Stops are addressed by their public codes. `day` and `time` pick the
/// one-hour interval the estimate applies to: 16:38 asks about trips
/// between 16:00 and 17:00. Answers `None` when the upstream does not
/// recognise the parameters.
pub async fn trip_time_estimate<T: Transport>(
    transport: &T,
    line_id: LineId,
    direction: Direction,
    origin_code: &str,
    destination_code: &str,
    day: Weekday,
    time: NaiveTime,
) -> Result<Option<u32>, TransportError> {
    let endpoint = format!(
        "estimation/{}/{}/{}/{}/{}/{}",
        direction_segment(direction),
        origin_code,
        destination_code,
        day_number(day),
        time.hour(),
        line_id,
    );
    let body = transport.fetch_text(&endpoint).await?;
    Ok(extract_minutes(&body))
}

/// The endpoint encodes outward and circular journeys as `a`, return
/// journeys as `b`.
fn direction_segment(direction: Direction) -> &'static str {
    match direction {
        Direction::Outbound | Direction::Circular => "a",
        Direction::Inbound => "b",
    }
}

/// Upstream weekday numbering runs 1 Sunday through 7 Saturday.
fn day_number(day: Weekday) -> u32 {
    day.num_days_from_sunday() + 1
}

fn extract_minutes(body: &str) -> Option<u32> {
    let captures = minutes_pattern().captures(body)?;
    captures.get(1)?.as_str().parse().ok()
}
