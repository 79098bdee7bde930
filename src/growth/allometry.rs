//! Derived stand metrics.
//!
//! Pure allometric transformations of the current stand state. Metrics are
//! recomputed every month and never fed back into the recurrence except
//! implicitly through stem biomass (the partitioning stage reads last
//! month's diameter).

use crate::parameters::SpeciesParameters;
use crate::state::{StandMetrics, StandState};
use crate::FloatValue;
use std::f64::consts::PI;

/// Mean stem diameter at breast height (cm), inverted from the mean
/// individual stem mass `ws/n = aws·(b/100)^nws`.
pub fn mean_dbh(species: &SpeciesParameters, stem_biomass: FloatValue, tree_count: FloatValue) -> FloatValue {
    if tree_count <= 0.0 || stem_biomass <= 0.0 {
        return 0.0;
    }
    (stem_biomass / tree_count / species.aws).powf(1.0 / species.nws) * 100.0
}

/// Mean tree height (m) from dbh.
pub fn mean_height(species: &SpeciesParameters, dbh_cm: FloatValue) -> FloatValue {
    1.3 + species.ah * (-species.nhb / dbh_cm).exp() + species.nhc * dbh_cm
}

/// Live crown length (m) from dbh.
pub fn live_crown_length(species: &SpeciesParameters, dbh_cm: FloatValue) -> FloatValue {
    1.3 + species.acl * (-species.ncl_b / dbh_cm).exp() + species.ncl_c * dbh_cm
}

/// Crown diameter (m) from dbh and height.
pub fn crown_diameter(
    species: &SpeciesParameters,
    dbh_cm: FloatValue,
    height_m: FloatValue,
) -> FloatValue {
    species.ak * dbh_cm.powf(species.nkb) * height_m.powf(species.nkh)
}

/// Mean single-tree basal area (m²) from dbh.
pub fn basal_area(dbh_cm: FloatValue) -> FloatValue {
    PI * dbh_cm * dbh_cm / 40_000.0
}

/// Stand volume (m³/ha) from dbh, height and stand density.
pub fn stand_volume(
    species: &SpeciesParameters,
    dbh_cm: FloatValue,
    height_m: FloatValue,
    tree_count: FloatValue,
) -> FloatValue {
    species.av
        * dbh_cm.powf(species.nvb)
        * height_m.powf(species.nvh)
        * (dbh_cm * dbh_cm * height_m).powf(species.nvbh)
        * tree_count
}

/// Trunk diameter (cm) recovered from basal area; the inverse of
/// [`basal_area`] up to floating error.
pub fn trunk_diameter(basal_area_m2: FloatValue) -> FloatValue {
    (4.0 * basal_area_m2 / PI).sqrt() * 100.0
}

/// Compute the full metrics record for a stand state.
///
/// An extinct or massless stand yields zeroed metrics rather than NaN.
pub fn stand_metrics(species: &SpeciesParameters, state: &StandState) -> StandMetrics {
    let dbh = mean_dbh(species, state.stem_biomass, state.tree_count);
    if dbh <= 0.0 {
        return StandMetrics::zeroed();
    }

    let height = mean_height(species, dbh);
    let ba = basal_area(dbh);
    StandMetrics {
        dbh,
        height,
        live_crown_length: live_crown_length(species, dbh),
        crown_diameter: crown_diameter(species, dbh, height),
        basal_area: ba,
        stand_volume: stand_volume(species, dbh, height, state.tree_count),
        trunk_diameter: trunk_diameter(ba),
    }
}
