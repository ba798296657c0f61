//! Pure SQL generators for the remote analytical database.
//!
//! No validation happens here: a viewport with NaN bounds produces a query
//! containing `NaN`, and the database is left to reject it.

use cfd_core::dates::format_cutoff;
use cfd_core::{DamageCategory, DamageFilter, Viewport};
use chrono::NaiveDateTime;

/// Damage inspection points with earliest damage timestamp.
pub const POINTS_TABLE: &str = "ca_butte_county_damaged_points_earliestdate";
/// County parcel polygons.
pub const PARCELS_TABLE: &str = "ca_butte_county_parcels";
/// Building footprints with their damage category.
pub const BUILDINGS_TABLE: &str = "camp_fire_damaged_buildings_viirs_earliest_damage_date";
/// Pre-fire vegetation index samples.
pub const NDVI_TABLE: &str = "fire_prefire_ndvi";

/// Row cap on count queries. There are never more than five categories.
pub const COUNT_LIMIT: u32 = 100;
/// Row cap on the point layer.
pub const POINT_LIMIT: u32 = 2_000_000;

/// Pixel-space hex bin size used by the heatmap query and marks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HexMark {
    pub width: f64,
    pub height: f64,
}

impl HexMark {
    /// Horizontal hexagon of the given width.
    pub fn with_width(width: f64) -> Self {
        Self {
            width,
            height: 2.0 * width / 3.0_f64.sqrt(),
        }
    }
}

impl Default for HexMark {
    fn default() -> Self {
        Self::with_width(10.0)
    }
}

/// Quote a string as a SQL literal.
pub fn sql_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Bounding box predicate over `omnisci_geo` for the viewport.
pub fn bbox_clause(viewport: &Viewport) -> String {
    let sw = viewport.south_west();
    let ne = viewport.north_east();
    format!(
        "((ST_X(omnisci_geo) >= {} AND ST_X(omnisci_geo) <= {}) AND (ST_Y(omnisci_geo) >= {} AND ST_Y(omnisci_geo) <= {}))",
        sw.lng, ne.lng, sw.lat, ne.lat
    )
}

/// `perDatTime <= '<cutoff>'`.
pub fn cutoff_clause(cutoff: &NaiveDateTime) -> String {
    format!("perDatTime <= {}", sql_literal(&format_cutoff(cutoff)))
}

/// Category restriction on `column`.
///
/// `All` yields no fragment at all rather than a trivially-true condition.
/// One category is a single equality; several are OR-combined in parentheses.
pub fn damage_filter_clause(column: &str, filter: &DamageFilter) -> Option<String> {
    match filter {
        DamageFilter::All => None,
        DamageFilter::Only(set) => {
            let terms: Vec<String> = set
                .iter()
                .map(|c| format!("{} = {}", column, sql_literal(c.key())))
                .collect();
            match terms.len() {
                0 => None,
                1 => terms.into_iter().next(),
                _ => Some(format!("({})", terms.join(" OR "))),
            }
        }
    }
}

/// Filler CTE body listing every category with a zero count.
fn filler_rows() -> String {
    DamageCategory::ALL
        .iter()
        .enumerate()
        .map(|(i, c)| {
            if i == 0 {
                format!("select {} as DAMAGE, 0 as nonecount", sql_literal(c.key()))
            } else {
                format!("union all select {}, 0", sql_literal(c.key()))
            }
        })
        .collect::<Vec<_>>()
        .join("\n    ")
}

fn counts_query(predicates: &[String]) -> String {
    format!(
        "with filler as (
    {filler}
),
damagequery as (
    SELECT {table}.DAMAGE, COUNT(*) AS val
    FROM {table}
    WHERE {predicates}
    GROUP BY 1
    ORDER BY val DESC
    NULLS LAST
    LIMIT {limit}
)
select
    filler.DAMAGE as key0,
    filler.nonecount + coalesce(damagequery.val, 0) as val
from filler
left join damagequery on filler.DAMAGE = damagequery.DAMAGE
order by val desc nulls last",
        filler = filler_rows(),
        table = POINTS_TABLE,
        predicates = predicates.join(" AND "),
        limit = COUNT_LIMIT,
    )
}

/// Damage point counts per category inside the viewport up to `cutoff`.
///
/// Every category appears exactly once; categories with no matching points
/// get a count of 0. Columns: `key0` (category key), `val` (count).
pub fn damage_counts_query(viewport: &Viewport, cutoff: &NaiveDateTime) -> String {
    counts_query(&[bbox_clause(viewport), cutoff_clause(cutoff)])
}

/// Like [`damage_counts_query`], restricted to a point-of-interest window
/// and a damage allow-list.
pub fn poi_damage_counts_query(
    viewport: &Viewport,
    poi_start: &NaiveDateTime,
    poi_end: &NaiveDateTime,
    filter: &DamageFilter,
) -> String {
    let mut predicates = vec![
        bbox_clause(viewport),
        format!("perDatTime >= {}", sql_literal(&format_cutoff(poi_start))),
        cutoff_clause(poi_end),
    ];
    if let Some(clause) = damage_filter_clause(&format!("{}.DAMAGE", POINTS_TABLE), filter) {
        predicates.push(clause);
    }
    counts_query(&predicates)
}

/// Point layer: projected coordinates and damage category per point.
pub fn points_layer_query(
    viewport: &Viewport,
    cutoff: &NaiveDateTime,
    filter: &DamageFilter,
) -> String {
    let mut predicates = vec![bbox_clause(viewport), cutoff_clause(cutoff)];
    if let Some(clause) = damage_filter_clause("DAMAGE", filter) {
        predicates.push(clause);
    }
    format!(
        "SELECT conv_4326_900913_x(ST_X(omnisci_geo)) as x, conv_4326_900913_y(ST_Y(omnisci_geo)) as y, DAMAGE as color, {table}.rowid FROM {table} WHERE {predicates} LIMIT {limit}",
        table = POINTS_TABLE,
        predicates = predicates.join(" AND "),
        limit = POINT_LIMIT,
    )
}

/// Residential parcel polygons.
pub fn parcels_layer_query() -> String {
    format!(
        "SELECT {table}.rowid as rowid FROM {table} WHERE ({table}.LandUse ILIKE '%RS%')",
        table = PARCELS_TABLE
    )
}

/// Damaged building polygons colored by category.
pub fn buildings_layer_query(filter: &DamageFilter) -> String {
    let mut sql = format!(
        "SELECT s2_DAMAGE as color, {table}.rowid as rowid FROM {table}",
        table = BUILDINGS_TABLE
    );
    if let Some(clause) = damage_filter_clause(&format!("{}.s2_DAMAGE", BUILDINGS_TABLE), filter) {
        sql.push_str(" WHERE (");
        sql.push_str(&clause);
        sql.push(')');
    }
    sql
}

/// Hex-binned average NDVI per pixel bin inside the viewport.
pub fn ndvi_heatmap_query(viewport: &Viewport, mark: HexMark) -> String {
    let (x_min, y_min, x_max, y_max) = viewport.bounds.projected();
    let bin_args = format!(
        "conv_4326_900913_x(ST_X(omnisci_geo)), {x_min}, {x_max}, conv_4326_900913_y(ST_Y(omnisci_geo)), {y_min}, {y_max}, {w}, {h}, 0, 0, {width}, {height}",
        w = mark.width,
        h = mark.height,
        width = viewport.width,
        height = viewport.height,
    );
    format!(
        "SELECT reg_hex_horiz_pixel_bin_x({args}) as x, reg_hex_horiz_pixel_bin_y({args}) as y, avg(ndvi) as color FROM {table} WHERE {bbox} GROUP BY x, y",
        args = bin_args,
        table = NDVI_TABLE,
        bbox = bbox_clause(viewport),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfd_core::{Bounds, LngLat};
    use chrono::NaiveDate;

    fn viewport() -> Viewport {
        Viewport {
            bounds: Bounds::new(LngLat::new(-121.79, 39.63), LngLat::new(-121.34, 39.87)),
            zoom: 12.0,
            min_zoom: 11.0,
            max_zoom: 15.7,
            width: 800,
            height: 600,
        }
    }

    fn cutoff() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2018, 11, 10)
            .unwrap()
            .and_hms_opt(14, 0, 0)
            .unwrap()
    }

    #[test]
    fn bbox_uses_exact_viewport_coordinates() {
        let clause = bbox_clause(&viewport());
        assert_eq!(
            clause,
            "((ST_X(omnisci_geo) >= -121.79 AND ST_X(omnisci_geo) <= -121.34) AND (ST_Y(omnisci_geo) >= 39.63 AND ST_Y(omnisci_geo) <= 39.87))"
        );
    }

    #[test]
    fn counts_query_carries_bbox_and_cutoff() {
        let sql = damage_counts_query(&viewport(), &cutoff());
        assert!(sql.contains(&bbox_clause(&viewport())));
        assert!(sql.contains("perDatTime <= '2018-11-10 14:00:00'"));
        assert!(sql.contains("ORDER BY val DESC"));
        assert!(sql.contains("NULLS LAST"));
        assert!(sql.contains("LIMIT 100"));
        for category in DamageCategory::ALL {
            assert!(sql.contains(&sql_literal(category.key())));
        }
    }

    #[test]
    fn nan_bounds_pass_through() {
        let mut vp = viewport();
        vp.bounds.south_west.lng = f64::NAN;
        let sql = damage_counts_query(&vp, &cutoff());
        assert!(sql.contains("ST_X(omnisci_geo) >= NaN"));
    }

    #[test]
    fn all_filter_has_no_clause() {
        assert_eq!(damage_filter_clause("DAMAGE", &DamageFilter::All), None);

        let start = cutoff();
        let sql = poi_damage_counts_query(&viewport(), &start, &start, &DamageFilter::All);
        assert!(!sql.contains("damagequery.DAMAGE ="));
        assert!(!sql.contains(&format!("{}.DAMAGE = ", POINTS_TABLE)));

        let buildings = buildings_layer_query(&DamageFilter::All);
        assert!(!buildings.contains("WHERE"));
    }

    #[test]
    fn single_category_is_one_equality_without_or() {
        let filter = DamageFilter::only(DamageCategory::Destroyed);
        let clause = damage_filter_clause("DAMAGE", &filter).unwrap();
        assert_eq!(clause, "DAMAGE = 'Destroyed (>50%)'");

        let start = cutoff();
        let sql = poi_damage_counts_query(&viewport(), &start, &start, &filter);
        assert_eq!(sql.matches(" OR ").count(), 0);
        assert_eq!(
            sql.matches(&format!("{}.DAMAGE = 'Destroyed (>50%)'", POINTS_TABLE)).count(),
            1
        );
    }

    #[test]
    fn several_categories_are_or_combined() {
        let filter = DamageFilter::from_categories([DamageCategory::Major, DamageCategory::Minor]);
        let clause = damage_filter_clause("DAMAGE", &filter).unwrap();
        assert_eq!(clause, "(DAMAGE = 'Major (26-50%)' OR DAMAGE = 'Minor (10-25%)')");
    }

    #[test]
    fn poi_query_restricts_to_window() {
        let start = NaiveDate::from_ymd_opt(2018, 11, 8).unwrap().and_hms_opt(6, 30, 0).unwrap();
        let end = NaiveDate::from_ymd_opt(2018, 11, 25).unwrap().and_hms_opt(23, 59, 59).unwrap();
        let sql = poi_damage_counts_query(&viewport(), &start, &end, &DamageFilter::All);
        assert!(sql.contains("perDatTime >= '2018-11-08 06:30:00'"));
        assert!(sql.contains("perDatTime <= '2018-11-25 23:59:59'"));
    }

    #[test]
    fn literals_are_escaped() {
        assert_eq!(sql_literal("O'Brien"), "'O''Brien'");
    }

    #[test]
    fn buildings_filter_wraps_clause() {
        let sql = buildings_layer_query(&DamageFilter::only(DamageCategory::Minor));
        assert!(sql.ends_with(&format!(
            "WHERE ({}.s2_DAMAGE = 'Minor (10-25%)')",
            BUILDINGS_TABLE
        )));
    }

    #[test]
    fn heatmap_query_uses_projected_bounds_and_size() {
        let vp = viewport();
        let sql = ndvi_heatmap_query(&vp, HexMark::default());
        let (x_min, _, x_max, _) = vp.bounds.projected();
        assert!(sql.contains(&x_min.to_string()));
        assert!(sql.contains(&x_max.to_string()));
        assert!(sql.contains(", 800, 600)"));
        assert!(sql.contains("GROUP BY x, y"));
    }

    #[test]
    fn hex_mark_height() {
        let mark = HexMark::default();
        assert_eq!(mark.width, 10.0);
        assert!((mark.height - 11.547005383792516).abs() < 1e-12);
    }
}
