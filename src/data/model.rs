use std::fmt;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;

/// Format of the `cd` field in the JPL close-approach data, e.g. `1900-Jan-01 00:00`.
pub const APPROACH_TIME_FORMAT: &str = "%Y-%b-%d %H:%M";

/// Format used when rendering an approach time for people and for export.
pub const DISPLAY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Parse a JPL calendar date-hour string into a naive timestamp.
pub fn parse_approach_time(cd: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(cd.trim(), APPROACH_TIME_FORMAT)
        .with_context(|| format!("'{cd}' is not a calendar date like 1900-Jan-01 00:00"))
}

/// Render a timestamp as `YYYY-MM-DD HH:MM`.
pub fn format_time(time: &NaiveDateTime) -> String {
    time.format(DISPLAY_TIME_FORMAT).to_string()
}

// ---------------------------------------------------------------------------
// Handles into the database collections
// ---------------------------------------------------------------------------

/// Position of a [`NearEarthObject`] in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NeoId(pub(crate) usize);

/// Position of a [`CloseApproach`] in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ApproachId(pub(crate) usize);

// ---------------------------------------------------------------------------
// NearEarthObject
// ---------------------------------------------------------------------------

/// Fields used to build a [`NearEarthObject`].
#[derive(Debug, Clone, Default)]
pub struct NeoInfo {
    /// Primary designation; surrounding whitespace is dropped.
    pub designation: String,
    /// IAU name. `None` and `Some("")` both mean unnamed.
    pub name: Option<String>,
    /// Diameter in km. `None` means unknown and is stored as `NaN`.
    pub diameter: Option<f64>,
    pub hazardous: bool,
}

/// A near-Earth object.
#[derive(Debug, Clone, PartialEq)]
pub struct NearEarthObject {
    pub designation: String,
    pub name: Option<String>,
    /// Diameter in km, `NaN` when unknown.
    pub diameter: f64,
    pub hazardous: bool,
    /// Filled in once by the database while linking.
    pub(crate) approaches: Vec<ApproachId>,
}

impl NearEarthObject {
    pub fn new(info: NeoInfo) -> Self {
        let name = info
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        NearEarthObject {
            designation: info.designation.trim().to_string(),
            name,
            diameter: info.diameter.unwrap_or(f64::NAN),
            hazardous: info.hazardous,
            approaches: Vec::new(),
        }
    }

    /// `433 (Eros)` when named, otherwise just the designation.
    pub fn fullname(&self) -> String {
        match &self.name {
            Some(name) => format!("{} ({name})", self.designation),
            None => self.designation.clone(),
        }
    }

    /// The name, or `no name` for unnamed objects.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("no name")
    }

    /// Handles of this object's close approaches, in load order.
    pub fn approach_ids(&self) -> &[ApproachId] {
        &self.approaches
    }
}

impl fmt::Display for NearEarthObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hazard = if self.hazardous {
            "is potentially hazardous"
        } else {
            "is not potentially hazardous"
        };
        write!(
            f,
            "NEO {} has a diameter of {:.3} km and {hazard}.",
            self.fullname(),
            self.diameter
        )
    }
}

// ---------------------------------------------------------------------------
// CloseApproach
// ---------------------------------------------------------------------------

/// Fields used to build a [`CloseApproach`].
#[derive(Debug, Clone, Default)]
pub struct ApproachInfo {
    /// Designation of the approaching object, resolved during linking.
    /// Kept as given; it must match the NEO's designation exactly.
    pub designation: String,
    pub time: NaiveDateTime,
    /// Nominal approach distance in au.
    pub distance: f64,
    /// Velocity relative to Earth in km/s.
    pub velocity: f64,
}

/// A single close approach to Earth by an NEO.
#[derive(Debug, Clone, PartialEq)]
pub struct CloseApproach {
    pub(crate) designation: String,
    pub time: NaiveDateTime,
    pub distance: f64,
    pub velocity: f64,
    /// Set by the database when the designation resolves.
    pub(crate) neo: Option<NeoId>,
}

impl CloseApproach {
    pub fn new(info: ApproachInfo) -> Self {
        CloseApproach {
            designation: info.designation,
            time: info.time,
            distance: info.distance,
            velocity: info.velocity,
            neo: None,
        }
    }

    /// Designation this approach was loaded with.
    pub fn designation(&self) -> &str {
        &self.designation
    }

    /// The linked NEO, if the designation resolved.
    pub fn neo_id(&self) -> Option<NeoId> {
        self.neo
    }

    pub fn time_str(&self) -> String {
        format_time(&self.time)
    }

    /// Describe this approach, naming `neo` when it is known.
    pub fn describe(&self, neo: Option<&NearEarthObject>) -> String {
        let who = neo
            .map(NearEarthObject::fullname)
            .unwrap_or_else(|| self.designation.clone());
        format!(
            "On {}, '{who}' approaches Earth at a distance of {:.2} au and a velocity of {:.2} km/s.",
            self.time_str(),
            self.distance,
            self.velocity
        )
    }
}
