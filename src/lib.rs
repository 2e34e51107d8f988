//! Near-Earth objects and their close approaches to Earth: load the JPL data
//! files, link both collections in memory, and query approaches by date,
//! distance, velocity, diameter and hazard.

pub mod data;
pub mod error;

pub use data::database::NeoDatabase;
pub use data::filter::{
    create_filters, limit, requires_linked_neo, AttributeFilter, Bound, Comparator, Criteria,
};
pub use data::model::{ApproachInfo, CloseApproach, NearEarthObject, NeoInfo};
pub use error::{FilterError, NeoError};
