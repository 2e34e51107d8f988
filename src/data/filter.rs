use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use super::database::NeoDatabase;
use super::model::{CloseApproach, NearEarthObject};
use crate::error::FilterError;

// ---------------------------------------------------------------------------
// Comparator + reference value
// ---------------------------------------------------------------------------

/// Binary comparison applied as `op(attribute, reference)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Eq,
    Ge,
    Le,
}

impl Comparator {
    /// Compare an attribute value against a reference value.
    /// Unordered values (a `NaN` diameter) never compare true.
    pub fn apply<T: PartialOrd + ?Sized>(self, attribute: &T, reference: &T) -> bool {
        match self {
            Comparator::Eq => attribute == reference,
            Comparator::Ge => attribute >= reference,
            Comparator::Le => attribute <= reference,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Comparator::Eq => "eq",
            Comparator::Ge => "ge",
            Comparator::Le => "le",
        }
    }
}

/// A comparator paired with the value it compares against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound<T> {
    pub op: Comparator,
    pub value: T,
}

impl<T: PartialOrd> Bound<T> {
    pub fn new(op: Comparator, value: T) -> Self {
        Bound { op, value }
    }

    pub fn test(&self, attribute: &T) -> bool {
        self.op.apply(attribute, &self.value)
    }
}

// ---------------------------------------------------------------------------
// AttributeFilter – one predicate per close-approach attribute
// ---------------------------------------------------------------------------

/// A single-attribute predicate over a close approach.
///
/// The variant selects the attribute; the [`Bound`] supplies the comparator
/// and the reference value. Diameter and hazard are read from the linked NEO.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttributeFilter {
    Date(Bound<NaiveDate>),
    StartDate(Bound<NaiveDate>),
    EndDate(Bound<NaiveDate>),
    DistanceMin(Bound<f64>),
    DistanceMax(Bound<f64>),
    VelocityMin(Bound<f64>),
    VelocityMax(Bound<f64>),
    DiameterMin(Bound<f64>),
    DiameterMax(Bound<f64>),
    Hazardous(Bound<bool>),
}

/// The attribute an [`AttributeFilter`] reads, without its bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Date,
    StartDate,
    EndDate,
    DistanceMin,
    DistanceMax,
    VelocityMin,
    VelocityMax,
    DiameterMin,
    DiameterMax,
    Hazardous,
}

impl AttributeFilter {
    /// Evaluate the filter against one approach.
    pub fn matches(&self, db: &NeoDatabase, approach: &CloseApproach) -> Result<bool, FilterError> {
        use AttributeFilter::*;
        Ok(match self {
            Date(b) | StartDate(b) | EndDate(b) => b.test(&approach.time.date()),
            DistanceMin(b) | DistanceMax(b) => b.test(&approach.distance),
            VelocityMin(b) | VelocityMax(b) => b.test(&approach.velocity),
            DiameterMin(b) | DiameterMax(b) => b.test(&linked_neo(db, approach)?.diameter),
            Hazardous(b) => b.test(&linked_neo(db, approach)?.hazardous),
        })
    }

    pub fn kind(&self) -> FilterKind {
        use AttributeFilter::*;
        match self {
            Date(_) => FilterKind::Date,
            StartDate(_) => FilterKind::StartDate,
            EndDate(_) => FilterKind::EndDate,
            DistanceMin(_) => FilterKind::DistanceMin,
            DistanceMax(_) => FilterKind::DistanceMax,
            VelocityMin(_) => FilterKind::VelocityMin,
            VelocityMax(_) => FilterKind::VelocityMax,
            DiameterMin(_) => FilterKind::DiameterMin,
            DiameterMax(_) => FilterKind::DiameterMax,
            Hazardous(_) => FilterKind::Hazardous,
        }
    }
}

fn linked_neo<'a>(
    db: &'a NeoDatabase,
    approach: &CloseApproach,
) -> Result<&'a NearEarthObject, FilterError> {
    db.neo_of(approach)
        .ok_or_else(|| FilterError::UnlinkedApproach {
            designation: approach.designation().to_string(),
        })
}

impl FilterKind {
    pub const ALL: [FilterKind; 10] = [
        FilterKind::Date,
        FilterKind::StartDate,
        FilterKind::EndDate,
        FilterKind::DistanceMin,
        FilterKind::DistanceMax,
        FilterKind::VelocityMin,
        FilterKind::VelocityMax,
        FilterKind::DiameterMin,
        FilterKind::DiameterMax,
        FilterKind::Hazardous,
    ];

    /// Criterion key this filter is built from.
    pub fn key(self) -> &'static str {
        match self {
            FilterKind::Date => "date",
            FilterKind::StartDate => "start_date",
            FilterKind::EndDate => "end_date",
            FilterKind::DistanceMin => "distance_min",
            FilterKind::DistanceMax => "distance_max",
            FilterKind::VelocityMin => "velocity_min",
            FilterKind::VelocityMax => "velocity_max",
            FilterKind::DiameterMin => "diameter_min",
            FilterKind::DiameterMax => "diameter_max",
            FilterKind::Hazardous => "hazardous",
        }
    }

    /// Whether evaluating the filter needs the approach's linked NEO.
    pub fn reads_neo(self) -> bool {
        matches!(
            self,
            FilterKind::DiameterMin | FilterKind::DiameterMax | FilterKind::Hazardous
        )
    }
}

impl FromStr for FilterKind {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterKind::ALL
            .into_iter()
            .find(|kind| kind.key() == s)
            .ok_or_else(|| FilterError::UnsupportedCriterion(s.to_string()))
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl fmt::Display for AttributeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use AttributeFilter::*;
        let (name, op, value) = match self {
            Date(b) => ("DateFilter", b.op, b.value.to_string()),
            StartDate(b) => ("StartDateFilter", b.op, b.value.to_string()),
            EndDate(b) => ("EndDateFilter", b.op, b.value.to_string()),
            DistanceMin(b) => ("DistanceFilterMin", b.op, b.value.to_string()),
            DistanceMax(b) => ("DistanceFilterMax", b.op, b.value.to_string()),
            VelocityMin(b) => ("VelocityFilterMin", b.op, b.value.to_string()),
            VelocityMax(b) => ("VelocityFilterMax", b.op, b.value.to_string()),
            DiameterMin(b) => ("DiameterFilterMin", b.op, b.value.to_string()),
            DiameterMax(b) => ("DiameterFilterMax", b.op, b.value.to_string()),
            Hazardous(b) => ("HazardousFilter", b.op, b.value.to_string()),
        };
        write!(f, "{name}(op={}, value={value})", op.as_str())
    }
}

// ---------------------------------------------------------------------------
// Criteria → filter set
// ---------------------------------------------------------------------------

/// User-selected query criteria. `None` means "no constraint"; zero and
/// `false` are real constraints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    pub date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// au
    pub distance_min: Option<f64>,
    pub distance_max: Option<f64>,
    /// km/s
    pub velocity_min: Option<f64>,
    pub velocity_max: Option<f64>,
    /// km
    pub diameter_min: Option<f64>,
    pub diameter_max: Option<f64>,
    pub hazardous: Option<bool>,
}

/// Build the filters for every criterion that is set, in field order.
pub fn create_filters(criteria: &Criteria) -> Vec<AttributeFilter> {
    use AttributeFilter::*;
    use Comparator::{Eq, Ge, Le};

    let candidates = [
        criteria.date.map(|v| Date(Bound::new(Eq, v))),
        criteria.start_date.map(|v| StartDate(Bound::new(Ge, v))),
        criteria.end_date.map(|v| EndDate(Bound::new(Le, v))),
        criteria.distance_min.map(|v| DistanceMin(Bound::new(Ge, v))),
        criteria.distance_max.map(|v| DistanceMax(Bound::new(Le, v))),
        criteria.velocity_min.map(|v| VelocityMin(Bound::new(Ge, v))),
        criteria.velocity_max.map(|v| VelocityMax(Bound::new(Le, v))),
        criteria.diameter_min.map(|v| DiameterMin(Bound::new(Ge, v))),
        criteria.diameter_max.map(|v| DiameterMax(Bound::new(Le, v))),
        criteria.hazardous.map(|v| Hazardous(Bound::new(Eq, v))),
    ];
    candidates.into_iter().flatten().collect()
}

/// Whether any filter reads the linked NEO, so orphan approaches must be
/// left out before the filters run.
pub fn requires_linked_neo(filters: &[AttributeFilter]) -> bool {
    filters.iter().any(|f| f.kind().reads_neo())
}

// ---------------------------------------------------------------------------
// Limiter
// ---------------------------------------------------------------------------

/// Yield at most `n` items. `None` and `Some(0)` leave the stream unbounded.
///
/// Items past the limit are never pulled from `iter`.
pub fn limit<I: Iterator>(iter: I, n: Option<usize>) -> std::iter::Take<I> {
    match n {
        None | Some(0) => iter.take(usize::MAX),
        Some(n) => iter.take(n),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::data::model::{parse_approach_time, ApproachInfo, NeoInfo};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sample_db() -> NeoDatabase {
        let neo = |designation: &str, diameter: Option<f64>, hazardous: bool| {
            NearEarthObject::new(NeoInfo {
                designation: designation.into(),
                diameter,
                hazardous,
                ..Default::default()
            })
        };
        let approach = |designation: &str, cd: &str, distance: f64, velocity: f64| {
            CloseApproach::new(ApproachInfo {
                designation: designation.into(),
                time: parse_approach_time(cd).unwrap(),
                distance,
                velocity,
            })
        };
        NeoDatabase::new(
            vec![neo("A", Some(1.5), true), neo("B", None, false)],
            vec![
                approach("A", "2020-Jan-01 23:59", 0.01, 20.0),
                approach("B", "2020-Jan-02 00:00", 0.2, 5.0),
                approach("A", "2020-Mar-15 12:00", 0.0, 12.5),
            ],
        )
    }

    fn matching(db: &NeoDatabase, filter: AttributeFilter) -> Vec<usize> {
        db.approaches()
            .iter()
            .enumerate()
            .filter(|(_, a)| filter.matches(db, a).unwrap())
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn comparators() {
        assert!(Comparator::Eq.apply(&1.0, &1.0));
        assert!(Comparator::Ge.apply(&2, &1));
        assert!(!Comparator::Le.apply(&2, &1));
        assert!(!Comparator::Ge.apply(&f64::NAN, &0.0));
        assert!(!Comparator::Le.apply(&f64::NAN, &0.0));
        assert!(!Comparator::Eq.apply(&f64::NAN, &f64::NAN));
    }

    #[test]
    fn date_filters_ignore_time_of_day() {
        let db = sample_db();
        let jan1 = date("2020-01-01");
        use AttributeFilter::*;
        assert_eq!(matching(&db, Date(Bound::new(Comparator::Eq, jan1))), [0]);
        assert_eq!(
            matching(&db, StartDate(Bound::new(Comparator::Ge, date("2020-01-02")))),
            [1, 2]
        );
        assert_eq!(
            matching(&db, EndDate(Bound::new(Comparator::Le, date("2020-01-02")))),
            [0, 1]
        );
    }

    #[test]
    fn numeric_filters() {
        let db = sample_db();
        use AttributeFilter::*;
        use Comparator::{Ge, Le};
        assert_eq!(matching(&db, DistanceMin(Bound::new(Ge, 0.01))), [0, 1]);
        assert_eq!(matching(&db, DistanceMax(Bound::new(Le, 0.0))), [2]);
        assert_eq!(matching(&db, VelocityMin(Bound::new(Ge, 12.5))), [0, 2]);
        assert_eq!(matching(&db, VelocityMax(Bound::new(Le, 12.5))), [1, 2]);
    }

    #[test]
    fn neo_filters_skip_unknown_diameter() {
        let db = sample_db();
        use AttributeFilter::*;
        use Comparator::{Eq, Ge, Le};
        assert_eq!(matching(&db, DiameterMin(Bound::new(Ge, 0.0))), [0, 2]);
        assert_eq!(matching(&db, DiameterMax(Bound::new(Le, 100.0))), [0, 2]);
        assert_eq!(matching(&db, Hazardous(Bound::new(Eq, true))), [0, 2]);
        assert_eq!(matching(&db, Hazardous(Bound::new(Eq, false))), [1]);
    }

    #[test]
    fn create_filters_skips_unset_criteria() {
        assert!(create_filters(&Criteria::default()).is_empty());

        let criteria = Criteria {
            start_date: Some(date("2020-01-01")),
            distance_max: Some(0.0),
            velocity_min: Some(0.0),
            hazardous: Some(false),
            ..Default::default()
        };
        let filters = create_filters(&criteria);
        let kinds: Vec<FilterKind> = filters.iter().map(AttributeFilter::kind).collect();
        assert_eq!(
            kinds,
            [
                FilterKind::StartDate,
                FilterKind::DistanceMax,
                FilterKind::VelocityMin,
                FilterKind::Hazardous
            ]
        );
        assert_eq!(
            filters[1],
            AttributeFilter::DistanceMax(Bound::new(Comparator::Le, 0.0))
        );
        assert_eq!(
            filters[3],
            AttributeFilter::Hazardous(Bound::new(Comparator::Eq, false))
        );
    }

    #[test]
    fn contradictory_dates_match_nothing() {
        let db = sample_db();
        let filters = create_filters(&Criteria {
            date: Some(date("2020-01-01")),
            start_date: Some(date("2020-02-01")),
            ..Default::default()
        });
        assert_eq!(db.query(&filters).count(), 0);
    }

    #[test]
    fn filter_kind_names() {
        assert_eq!("diameter_max".parse::<FilterKind>(), Ok(FilterKind::DiameterMax));
        assert!(FilterKind::Hazardous.reads_neo());
        assert!(!FilterKind::Date.reads_neo());

        let by_velocity = create_filters(&Criteria {
            velocity_min: Some(1.0),
            ..Default::default()
        });
        assert!(!requires_linked_neo(&by_velocity));
        let by_diameter = create_filters(&Criteria {
            velocity_min: Some(1.0),
            diameter_max: Some(0.0),
            ..Default::default()
        });
        assert!(requires_linked_neo(&by_diameter));
        assert!(!requires_linked_neo(&[]));
        assert_eq!(
            "magnitude".parse::<FilterKind>(),
            Err(FilterError::UnsupportedCriterion("magnitude".into()))
        );
    }

    #[test]
    fn filter_display() {
        let filter = AttributeFilter::DistanceMax(Bound::new(Comparator::Le, 0.1));
        assert_eq!(filter.to_string(), "DistanceFilterMax(op=le, value=0.1)");
    }

    #[test]
    fn limit_passthrough_when_unset_or_zero() {
        assert_eq!(limit(1..=5, None).count(), 5);
        assert_eq!(limit(1..=5, Some(0)).count(), 5);
        assert_eq!(limit(1..=5, Some(9)).collect::<Vec<_>>(), [1, 2, 3, 4, 5]);
        assert_eq!(limit(1..=5, Some(2)).collect::<Vec<_>>(), [1, 2]);
    }

    #[test]
    fn limit_never_pulls_past_n() {
        let pulled = Cell::new(0);
        let source = (0..100).inspect(|_| pulled.set(pulled.get() + 1));
        let taken: Vec<_> = limit(source, Some(3)).collect();
        assert_eq!(taken, [0, 1, 2]);
        assert_eq!(pulled.get(), 3);
    }
}
