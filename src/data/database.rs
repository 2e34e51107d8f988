use std::collections::HashMap;

use log::debug;

use super::filter::AttributeFilter;
use super::model::{ApproachId, CloseApproach, NearEarthObject, NeoId};
use crate::error::FilterError;

// ---------------------------------------------------------------------------
// NeoDatabase – NEOs and close approaches linked together
// ---------------------------------------------------------------------------

/// An interconnected set of NEOs and their close approaches.
///
/// Built once from unlinked collections; read-only afterwards. NEOs are
/// indexed by designation and by name, and every close approach whose
/// designation resolves carries a [`NeoId`] back to its object.
#[derive(Debug, Clone, Default)]
pub struct NeoDatabase {
    neos: Vec<NearEarthObject>,
    approaches: Vec<CloseApproach>,
    by_designation: HashMap<String, NeoId>,
    by_name: HashMap<String, NeoId>,
}

impl NeoDatabase {
    /// Index the NEOs and link every close approach to its object.
    ///
    /// Duplicate designations or names keep the last object seen. Approaches
    /// whose designation matches nothing stay unlinked but are kept.
    pub fn new(mut neos: Vec<NearEarthObject>, mut approaches: Vec<CloseApproach>) -> Self {
        let mut by_designation = HashMap::with_capacity(neos.len());
        let mut by_name = HashMap::new();

        for (i, neo) in neos.iter().enumerate() {
            if by_designation
                .insert(neo.designation.clone(), NeoId(i))
                .is_some()
            {
                debug!("duplicate designation '{}', keeping the last", neo.designation);
            }
            if let Some(name) = neo.name.as_ref().filter(|n| !n.is_empty()) {
                if by_name.insert(name.clone(), NeoId(i)).is_some() {
                    debug!("duplicate name '{name}', keeping the last");
                }
            }
        }

        // Objects from the loader come unlinked; linking is owned by the database.
        for neo in &mut neos {
            neo.approaches.clear();
        }

        let mut orphans = 0usize;
        for (i, approach) in approaches.iter_mut().enumerate() {
            approach.neo = by_designation.get(&approach.designation).copied();
            match approach.neo {
                Some(id) => neos[id.0].approaches.push(ApproachId(i)),
                None => orphans += 1,
            }
        }

        debug!(
            "linked {} of {} close approaches to {} NEOs ({orphans} unmatched)",
            approaches.len() - orphans,
            approaches.len(),
            neos.len()
        );

        NeoDatabase {
            neos,
            approaches,
            by_designation,
            by_name,
        }
    }

    /// Find an NEO by its primary designation.
    pub fn get_neo_by_designation(&self, designation: &str) -> Option<&NearEarthObject> {
        self.by_designation.get(designation).map(|id| self.neo(*id))
    }

    /// Find an NEO by its IAU name.
    pub fn get_neo_by_name(&self, name: &str) -> Option<&NearEarthObject> {
        self.by_name.get(name).map(|id| self.neo(*id))
    }

    /// Stream the close approaches that pass every filter, in load order.
    ///
    /// Each call starts a fresh pass. A filter that cannot be evaluated
    /// yields an `Err` in place of that approach.
    pub fn query<'a>(
        &'a self,
        filters: &'a [AttributeFilter],
    ) -> impl Iterator<Item = Result<&'a CloseApproach, FilterError>> + 'a {
        self.scan(filters, false)
    }

    /// Like [`query`](Self::query), but only over approaches with a linked
    /// NEO, so diameter and hazard filters always have an object to read.
    pub fn query_linked<'a>(
        &'a self,
        filters: &'a [AttributeFilter],
    ) -> impl Iterator<Item = Result<&'a CloseApproach, FilterError>> + 'a {
        self.scan(filters, true)
    }

    fn scan<'a>(
        &'a self,
        filters: &'a [AttributeFilter],
        linked_only: bool,
    ) -> impl Iterator<Item = Result<&'a CloseApproach, FilterError>> + 'a {
        self.approaches.iter().filter_map(move |approach| {
            if linked_only && approach.neo.is_none() {
                return None;
            }
            for filter in filters {
                match filter.matches(self, approach) {
                    Ok(true) => {}
                    Ok(false) => return None,
                    Err(e) => return Some(Err(e)),
                }
            }
            Some(Ok(approach))
        })
    }

    pub fn neo(&self, id: NeoId) -> &NearEarthObject {
        &self.neos[id.0]
    }

    pub fn approach(&self, id: ApproachId) -> &CloseApproach {
        &self.approaches[id.0]
    }

    /// The object a close approach is linked to.
    pub fn neo_of(&self, approach: &CloseApproach) -> Option<&NearEarthObject> {
        approach.neo.map(|id| self.neo(id))
    }

    /// Close approaches of an NEO, in load order.
    pub fn approaches_of<'a>(
        &'a self,
        neo: &'a NearEarthObject,
    ) -> impl Iterator<Item = &'a CloseApproach> + 'a {
        neo.approaches.iter().map(move |id| self.approach(*id))
    }

    pub fn neos(&self) -> &[NearEarthObject] {
        &self.neos
    }

    pub fn approaches(&self) -> &[CloseApproach] {
        &self.approaches
    }
}
