//! Numeric entity identifiers.
//!
//! The upstream API keys every dataset by a small internal integer id.
//! Each entity kind gets its own newtype so a route id cannot be passed
//! where a line id is expected.

use std::fmt;

use serde::Serialize;

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            /// Returns the raw numeric id.
            pub fn get(self) -> u32 {
                self.0
            }
        }

        impl From<u32> for $name {
            fn from(id: u32) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

id_type!(
    /// Internal id of a stop.
    StopId
);
id_type!(
    /// Internal id of a route.
    RouteId
);
id_type!(
    /// Internal id of a line.
    LineId
);
id_type!(
    /// Internal id of a master line.
    MasterLineId
);
id_type!(
    /// Internal id of an operating calendar.
    CalendarId
);
