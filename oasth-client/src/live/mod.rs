//! Live single-call endpoints.
//!
//! These are plain request, parse, map operations with no dependency
//! graph and no joins. The endpoints answer loose JSON; an empty response
//! (`null`, `[]` or a blank body) means zero results, which is also what
//! an invalid parameter produces, so the two cannot be told apart.
//!
//! The weakly-typed field maps stay behind [`FieldBag`] at this boundary.
//! Entries missing a required key are skipped, never errors, and nothing
//! weakly typed leaks further into the crate.

mod estimation;

pub use estimation::{ESTIMATION_BASE_URL, trip_time_estimate};

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::{RouteId, StopId};
use crate::feed::json::extract_objects;
use crate::transport::{Transport, TransportError};

/// One extracted loose-JSON object with typed optional getters.
///
/// Every value arrives as a string; the getters re-parse on access and
/// answer `None` for a missing key or an unparseable value.
struct FieldBag(HashMap<String, String>);

impl FieldBag {
    fn text(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    fn int(&self, key: &str) -> Option<u32> {
        self.text(key)?.parse().ok()
    }

    fn float(&self, key: &str) -> Option<f64> {
        self.text(key)?.parse().ok()
    }
}

/// Fetches one loose-JSON endpoint and extracts its objects.
async fn fetch_objects<T: Transport>(
    transport: &T,
    endpoint: &str,
) -> Result<Vec<FieldBag>, TransportError> {
    let body = transport.fetch_text(endpoint).await?;
    Ok(extract_objects(&body).into_iter().map(FieldBag).collect())
}

/// Geographic position of a point, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
}

/// An estimated vehicle arrival at a stop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Arrival {
    /// Route the vehicle is running.
    pub route_id: RouteId,
    /// Code of the vehicle performing the route.
    pub vehicle_code: String,
    /// Estimated minutes until arrival.
    pub minutes: u32,
}

/// A reported vehicle position on a route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleLocation {
    pub vehicle_code: String,
    /// When the position was reported, in local time.
    pub reported_at: NaiveDateTime,
    pub position: Coordinates,
    pub route_id: RouteId,
}

/// Estimated arrivals at a stop, soonest first as served upstream.
///
/// An empty result means no vehicle is currently due or the stop id is
/// unknown.
pub async fn stop_arrivals<T: Transport>(
    transport: &T,
    stop_id: StopId,
) -> Result<Vec<Arrival>, TransportError> {
    let objects = fetch_objects(transport, &format!("getStopArrivals/{stop_id}")).await?;

    Ok(objects
        .into_iter()
        .filter_map(|bag| {
            Some(Arrival {
                route_id: RouteId(bag.int("route_code")?),
                vehicle_code: bag.text("veh_code")?.to_string(),
                minutes: bag.int("btime2")?,
            })
        })
        .collect())
}

/// Positions of the vehicles currently running a route.
///
/// An empty result means no vehicle is on the route or the route id is
/// unknown.
pub async fn vehicle_locations<T: Transport>(
    transport: &T,
    route_id: RouteId,
) -> Result<Vec<VehicleLocation>, TransportError> {
    let objects = fetch_objects(transport, &format!("getBusLocation/{route_id}")).await?;

    Ok(objects
        .into_iter()
        .filter_map(|bag| {
            let reported_at =
                NaiveDateTime::parse_from_str(bag.text("CS_DATE")?, "%Y-%m-%d %H:%M:%S").ok()?;
            Some(VehicleLocation {
                vehicle_code: bag.text("VEH_NO")?.to_string(),
                reported_at,
                position: Coordinates {
                    longitude: bag.float("CS_LNG")?,
                    latitude: bag.float("CS_LAT")?,
                },
                route_id: RouteId(bag.int("ROUTE_CODE")?),
            })
        })
        .collect())
}

/// Ordered points for drawing a route's detailed geometry.
pub async fn route_points<T: Transport>(
    transport: &T,
    route_id: RouteId,
) -> Result<Vec<Coordinates>, TransportError> {
    let objects = fetch_objects(transport, &format!("getRouteDetailPerRoute/{route_id}")).await?;

    Ok(objects
        .into_iter()
        .filter_map(|bag| {
            Some(Coordinates {
                longitude: bag.float("x")?,
                latitude: bag.float("y")?,
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::transport::StaticTransport;

    #[tokio::test]
    async fn arrivals_are_parsed_in_order() {
        let transport = StaticTransport::new().with_body(
            "getStopArrivals/15",
            r#"[{"route_code":"123","veh_code":"1042","btime2":"4"},{"route_code":"88","veh_code":"1107","btime2":"11"}]"#,
        );

        let arrivals = stop_arrivals(&transport, StopId(15)).await.unwrap();
        assert_eq!(
            arrivals,
            vec![
                Arrival {
                    route_id: RouteId(123),
                    vehicle_code: "1042".to_string(),
                    minutes: 4,
                },
                Arrival {
                    route_id: RouteId(88),
                    vehicle_code: "1107".to_string(),
                    minutes: 11,
                },
            ]
        );
    }

    #[tokio::test]
    async fn arrival_missing_a_required_key_is_skipped() {
        let transport = StaticTransport::new().with_body(
            "getStopArrivals/15",
            r#"[{"route_code":"123","veh_code":"1042","btime2":"4"},{"route_code":"88","veh_code":"1107"}]"#,
        );

        let arrivals = stop_arrivals(&transport, StopId(15)).await.unwrap();
        assert_eq!(arrivals.len(), 1);
        assert_eq!(arrivals[0].route_id, RouteId(123));
    }

    #[tokio::test]
    async fn null_response_means_no_arrivals() {
        let transport = StaticTransport::new().with_body("getStopArrivals/15", "null");
        let arrivals = stop_arrivals(&transport, StopId(15)).await.unwrap();
        assert!(arrivals.is_empty());
    }

    #[tokio::test]
    async fn vehicle_locations_parse_the_report_timestamp() {
        let transport = StaticTransport::new().with_body(
            "getBusLocation/123",
            r#"[{"VEH_NO":"1042","CS_DATE":"2021-05-01 13:45:07","CS_LAT":"40.6293","CS_LNG":"22.9485","ROUTE_CODE":"123"}]"#,
        );

        let locations = vehicle_locations(&transport, RouteId(123)).await.unwrap();
        assert_eq!(locations.len(), 1);

        let location = &locations[0];
        assert_eq!(location.vehicle_code, "1042");
        assert_eq!(location.route_id, RouteId(123));
        assert_eq!(location.position.longitude, 22.9485);
        assert_eq!(location.position.latitude, 40.6293);
        assert_eq!(
            location.reported_at,
            NaiveDate::from_ymd_opt(2021, 5, 1)
                .unwrap()
                .and_hms_opt(13, 45, 7)
                .unwrap()
        );
    }

    #[tokio::test]
    async fn vehicle_location_with_bad_timestamp_is_skipped() {
        let transport = StaticTransport::new().with_body(
            "getBusLocation/123",
            r#"[{"VEH_NO":"1042","CS_DATE":"not a date","CS_LAT":"40.6","CS_LNG":"22.9","ROUTE_CODE":"123"}]"#,
        );

        let locations = vehicle_locations(&transport, RouteId(123)).await.unwrap();
        assert!(locations.is_empty());
    }

    #[tokio::test]
    async fn route_points_keep_their_order() {
        let transport = StaticTransport::new().with_body(
            "getRouteDetailPerRoute/10",
            r#"[{"x":"22.94","y":"40.62"},{"x":"22.95","y":"40.63"},{"x":"22.96","y":"40.64"}]"#,
        );

        let points = route_points(&transport, RouteId(10)).await.unwrap();
        let longitudes: Vec<f64> = points.iter().map(|p| p.longitude).collect();
        assert_eq!(longitudes, vec![22.94, 22.95, 22.96]);
    }

    #[tokio::test]
    async fn empty_array_means_no_route_points() {
        let transport = StaticTransport::new().with_body("getRouteDetailPerRoute/10", "[]");
        let points = route_points(&transport, RouteId(10)).await.unwrap();
        assert!(points.is_empty());
    }
}
