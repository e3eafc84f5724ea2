//! Aggregations over a published [`AnalysisOutcome`].
//!
//! Three views are offered: headline counts ([`AnalysisStats`]), footfall by
//! ward and road ([`WardSummary`]), and chosen sensors by ward and road
//! ([`SensorSummary`]). All of them serialise straight to JSON.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::bins::BinRecord;
use crate::category::category_label;
use crate::pipeline::AnalysisOutcome;

/// Roads listed per ward in a [`WardSummary`].
pub const WARD_ROAD_LIMIT: usize = 15;

/// Roads listed per ward in a [`SensorSummary`].
pub const SENSOR_ROAD_LIMIT: usize = 10;

/// Bins listed per road in a [`SensorSummary`].
pub const ROAD_BIN_LIMIT: usize = 5;

/// Count for one footfall band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    /// Band index.
    pub category: usize,
    /// Band label.
    pub label: String,
    /// Number of cells or sensors in the band.
    pub count: usize,
}

/// Headline figures for a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisStats {
    /// Transit stations considered.
    pub transit_count: usize,
    /// Bus stops considered.
    pub bus_stop_count: usize,
    /// Venues considered.
    pub venue_count: usize,
    /// Grid cells inside the region.
    pub cell_count: usize,
    /// Candidate bins.
    pub bin_count: usize,
    /// Bins linked to a cell.
    pub assigned_bins: usize,
    /// Bins left without a cell.
    pub unassigned_bins: usize,
    /// Bins chosen for sensors.
    pub selected_bins: usize,
    /// Whether every assigned bin was selected without balancing.
    pub short_circuited: bool,
    /// Cells per band.
    pub category_distribution: Vec<CategoryCount>,
    /// Sensors per band.
    pub sensor_distribution: Vec<CategoryCount>,
}

fn distribution(
    category_count: usize,
    categories: impl Iterator<Item = usize>,
) -> Vec<CategoryCount> {
    let mut counts = vec![0_usize; category_count];
    for category in categories {
        if let Some(slot) = counts.get_mut(category) {
            *slot += 1;
        }
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(category, count)| CategoryCount {
            category,
            label: category_label(category, category_count).to_owned(),
            count,
        })
        .collect()
}

impl AnalysisStats {
    /// Collect headline figures from `outcome`.
    #[must_use]
    pub fn from_outcome(outcome: &AnalysisOutcome) -> Self {
        let [transit_count, bus_stop_count, venue_count] = outcome.poi_counts;
        let category_count = outcome.config.category_count;
        Self {
            transit_count,
            bus_stop_count,
            venue_count,
            cell_count: outcome.cells.len(),
            bin_count: outcome.bins.len(),
            assigned_bins: outcome.assignment.assigned,
            unassigned_bins: outcome.assignment.unassigned,
            selected_bins: outcome.placement.selected,
            short_circuited: outcome.placement.short_circuited,
            category_distribution: distribution(
                category_count,
                outcome.cells.iter().map(|cell| cell.category),
            ),
            sensor_distribution: distribution(
                category_count,
                outcome
                    .bins
                    .iter()
                    .filter(|bin| bin.is_selected())
                    .filter_map(BinRecord::category),
            ),
        }
    }
}

/// Running sum used for totals and means.
#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    count: usize,
    people_per_hour: f64,
    fill_rate: f64,
}

impl Tally {
    #[expect(clippy::float_arithmetic, reason = "running sums of estimates")]
    fn add(&mut self, people_per_hour: f64, fill_rate: f64) {
        self.count += 1;
        self.people_per_hour += people_per_hour;
        self.fill_rate += fill_rate;
    }

    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "mean of summed fill rates"
    )]
    fn mean_fill_rate(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.fill_rate / self.count as f64
        }
    }
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "mean over ward means"
)]
fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[expect(clippy::float_arithmetic, reason = "one decimal place for display")]
fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn assignment_estimates(bin: &BinRecord) -> (f64, f64) {
    bin.assignment
        .as_ref()
        .map_or((0.0, 0.0), |a| (a.people_per_hour, a.bin_fill_rate))
}

/// Totals across every ward of a summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SummaryTotals {
    /// Sum of people per hour over all wards.
    pub total_people_per_hour: f64,
    /// Mean of the per-ward mean fill rates.
    pub mean_fill_rate: f64,
    /// Sensors across all wards.
    pub total_sensors: usize,
    /// Wards listed.
    pub ward_count: usize,
}

/// Footfall along one road of a ward.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoadFootfall {
    /// Road name.
    pub road: String,
    /// Cells tagged with the road.
    pub cell_count: usize,
    /// Sum of people per hour over those cells.
    pub total_people_per_hour: f64,
    /// Mean daily fill rate over those cells.
    pub mean_fill_rate: f64,
    /// Sensors on the road.
    pub sensor_count: usize,
}

/// Footfall within one ward.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WardFootfall {
    /// Ward name.
    pub ward: String,
    /// Cells in the ward.
    pub cell_count: usize,
    /// Sum of people per hour over the ward's cells.
    pub total_people_per_hour: f64,
    /// Mean daily fill rate over the ward's cells.
    pub mean_fill_rate: f64,
    /// Cells per band label.
    pub categories: BTreeMap<String, usize>,
    /// Sensors in the ward.
    pub sensor_count: usize,
    /// Busiest roads, by people per hour.
    pub roads: Vec<RoadFootfall>,
}

/// Footfall grouped by ward, busiest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WardSummary {
    /// Wards ordered by total people per hour, descending.
    pub wards: Vec<WardFootfall>,
    /// Figures across all wards.
    pub totals: SummaryTotals,
}

#[derive(Default)]
struct RoadAccumulator {
    tally: Tally,
    sensors: usize,
}

#[derive(Default)]
struct WardAccumulator {
    tally: Tally,
    categories: BTreeMap<String, usize>,
    sensors: usize,
    roads: BTreeMap<String, RoadAccumulator>,
}

fn sort_descending<T>(items: &mut [T], key: impl Fn(&T) -> f64) {
    items.sort_by(|a, b| key(b).total_cmp(&key(a)));
}

impl WardSummary {
    /// Group cells and selected bins of `outcome` by ward.
    ///
    /// Sensors count towards a ward (and road) only when some cell carries
    /// the same tag. Ties in the ordering fall back to name order.
    #[must_use]
    pub fn from_outcome(outcome: &AnalysisOutcome) -> Self {
        let mut wards: BTreeMap<String, WardAccumulator> = BTreeMap::new();
        for cell in &outcome.cells {
            let ward = wards.entry(cell.ward_or_unknown().to_owned()).or_default();
            ward.tally.add(cell.people_per_hour, cell.bin_fill_rate);
            *ward
                .categories
                .entry(cell.category_label.clone())
                .or_default() += 1;
            ward.roads
                .entry(cell.road_or_unknown().to_owned())
                .or_default()
                .tally
                .add(cell.people_per_hour, cell.bin_fill_rate);
        }

        for bin in outcome.bins.iter().filter(|bin| bin.is_selected()) {
            if let Some(ward) = wards.get_mut(bin.ward_or_unknown()) {
                ward.sensors += 1;
                if let Some(road) = ward.roads.get_mut(bin.road_or_unknown()) {
                    road.sensors += 1;
                }
            }
        }

        let mut listed: Vec<WardFootfall> = wards
            .into_iter()
            .map(|(name, ward)| {
                let mut roads: Vec<RoadFootfall> = ward
                    .roads
                    .into_iter()
                    .map(|(road, acc)| RoadFootfall {
                        road,
                        cell_count: acc.tally.count,
                        total_people_per_hour: acc.tally.people_per_hour,
                        mean_fill_rate: acc.tally.mean_fill_rate(),
                        sensor_count: acc.sensors,
                    })
                    .collect();
                sort_descending(&mut roads, |road| road.total_people_per_hour);
                roads.truncate(WARD_ROAD_LIMIT);
                WardFootfall {
                    ward: name,
                    cell_count: ward.tally.count,
                    total_people_per_hour: ward.tally.people_per_hour,
                    mean_fill_rate: ward.tally.mean_fill_rate(),
                    categories: ward.categories,
                    sensor_count: ward.sensors,
                    roads,
                }
            })
            .collect();
        sort_descending(&mut listed, |ward| ward.total_people_per_hour);

        let totals = totals_of(
            listed
                .iter()
                .map(|w| (w.total_people_per_hour, w.mean_fill_rate, w.sensor_count)),
        );
        Self {
            wards: listed,
            totals,
        }
    }
}

#[expect(clippy::float_arithmetic, reason = "sum of ward totals")]
fn totals_of(wards: impl Iterator<Item = (f64, f64, usize)>) -> SummaryTotals {
    let mut totals = SummaryTotals::default();
    let mut means = Vec::new();
    for (people_per_hour, fill_rate, sensors) in wards {
        totals.total_people_per_hour += people_per_hour;
        totals.total_sensors += sensors;
        totals.ward_count += 1;
        means.push(fill_rate);
    }
    totals.mean_fill_rate = mean(&means);
    totals
}

/// A selected bin listed under its road.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorBin {
    /// Bin identifier.
    pub bin_id: String,
    /// Selection rank.
    pub rank: usize,
    /// Daily fill rate rounded to one decimal place.
    pub fill_rate: f64,
}

/// Sensors placed along one road.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoadSensors {
    /// Road name.
    pub road: String,
    /// Sensors on the road.
    pub sensor_count: usize,
    /// Sum of people per hour at those sensors.
    pub total_people_per_hour: f64,
    /// Mean daily fill rate at those sensors.
    pub mean_fill_rate: f64,
    /// Best-ranked bins on the road.
    pub bins: Vec<SensorBin>,
}

/// Sensors placed within one ward.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WardSensors {
    /// Ward name.
    pub ward: String,
    /// Sensors in the ward.
    pub sensor_count: usize,
    /// Sum of people per hour at those sensors.
    pub total_people_per_hour: f64,
    /// Mean daily fill rate at those sensors.
    pub mean_fill_rate: f64,
    /// Sensors per band label.
    pub categories: BTreeMap<String, usize>,
    /// Roads with the most sensors.
    pub roads: Vec<RoadSensors>,
}

/// Selected sensors grouped by ward, most sensors first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorSummary {
    /// Wards ordered by sensor count, descending.
    pub wards: Vec<WardSensors>,
    /// Figures across all wards.
    pub totals: SummaryTotals,
}

#[derive(Default)]
struct RoadSensorAccumulator {
    tally: Tally,
    bins: Vec<SensorBin>,
}

#[derive(Default)]
struct WardSensorAccumulator {
    tally: Tally,
    categories: BTreeMap<String, usize>,
    roads: BTreeMap<String, RoadSensorAccumulator>,
}

impl SensorSummary {
    /// Group selected bins of `outcome` by ward and road.
    #[must_use]
    pub fn from_outcome(outcome: &AnalysisOutcome) -> Self {
        let mut wards: BTreeMap<String, WardSensorAccumulator> = BTreeMap::new();
        for bin in &outcome.bins {
            let Some(rank) = bin.selection_rank() else {
                continue;
            };
            let (people_per_hour, fill_rate) = assignment_estimates(bin);
            let ward = wards.entry(bin.ward_or_unknown().to_owned()).or_default();
            ward.tally.add(people_per_hour, fill_rate);
            let label = bin
                .assignment
                .as_ref()
                .map_or_else(String::new, |a| a.category_label.clone());
            *ward.categories.entry(label).or_default() += 1;
            let road = ward.roads.entry(bin.road_or_unknown().to_owned()).or_default();
            road.tally.add(people_per_hour, fill_rate);
            road.bins.push(SensorBin {
                bin_id: bin.id.clone(),
                rank,
                fill_rate: round_one_decimal(fill_rate),
            });
        }

        let mut listed: Vec<WardSensors> = wards
            .into_iter()
            .map(|(name, ward)| {
                let mut roads: Vec<RoadSensors> = ward
                    .roads
                    .into_iter()
                    .map(|(road, mut acc)| {
                        acc.bins.sort_by_key(|bin| bin.rank);
                        acc.bins.truncate(ROAD_BIN_LIMIT);
                        RoadSensors {
                            road,
                            sensor_count: acc.tally.count,
                            total_people_per_hour: acc.tally.people_per_hour,
                            mean_fill_rate: acc.tally.mean_fill_rate(),
                            bins: acc.bins,
                        }
                    })
                    .collect();
                roads.sort_by(|a, b| b.sensor_count.cmp(&a.sensor_count));
                roads.truncate(SENSOR_ROAD_LIMIT);
                WardSensors {
                    ward: name,
                    sensor_count: ward.tally.count,
                    total_people_per_hour: ward.tally.people_per_hour,
                    mean_fill_rate: ward.tally.mean_fill_rate(),
                    categories: ward.categories,
                    roads,
                }
            })
            .collect();
        listed.sort_by(|a, b| b.sensor_count.cmp(&a.sensor_count));

        let totals = totals_of(
            listed
                .iter()
                .map(|w| (w.total_people_per_hour, w.mean_fill_rate, w.sensor_count)),
        );
        Self {
            wards: listed,
            totals,
        }
    }
}

#[cfg(test)]
#[expect(
    clippy::float_arithmetic,
    clippy::indexing_slicing,
    reason = "tests build fixtures by position and compare float totals"
)]
mod tests {
    use super::*;
    use crate::bins::{AssignmentReport, CellAssignment};
    use crate::config::AnalysisConfig;
    use crate::grid::{CellId, GridCell};
    use crate::placement::PlacementReport;
    use crate::scoring::{ComponentRange, ScoringSummary};
    use geo::Coord;
    use rstest::{fixture, rstest};

    fn cell(id: u32, ward: &str, road: &str, people_per_hour: f64, category: usize) -> GridCell {
        let mut cell = GridCell::new(CellId::new(id), Coord { x: 0.0, y: 0.0 });
        cell.ward = Some(ward.to_owned());
        cell.road = Some(road.to_owned());
        cell.people_per_hour = people_per_hour;
        cell.bin_fill_rate = 10.0;
        cell.category = category;
        cell.category_label = category_label(category, 2).to_owned();
        cell
    }

    fn bin(id: &str, source: &GridCell, rank: Option<usize>) -> BinRecord {
        let mut bin = BinRecord::new(id, source.center);
        bin.assignment = Some(CellAssignment {
            cell_id: source.id,
            distance: 0.0,
            category: source.category,
            category_label: source.category_label.clone(),
            footfall_score: source.footfall_score,
            people_per_hour: source.people_per_hour,
            bin_fill_rate: 12.34,
            ward: source.ward.clone(),
            road: source.road.clone(),
        });
        bin.selection = rank;
        bin
    }

    #[fixture]
    fn outcome() -> AnalysisOutcome {
        let cells = vec![
            cell(0, "Soho", "Old Compton Street", 900.0, 1),
            cell(1, "Soho", "Dean Street", 400.0, 0),
            cell(2, "Pimlico North", "Belgrave Road", 200.0, 0),
        ];
        let bins = vec![
            bin("BIN00001", &cells[0], Some(2)),
            bin("BIN00002", &cells[0], Some(1)),
            bin("BIN00003", &cells[2], Some(3)),
            bin("BIN00004", &cells[1], None),
        ];
        let empty = ComponentRange { min: 0.0, max: 0.0 };
        AnalysisOutcome {
            config: AnalysisConfig::default().with_category_count(2),
            region: "test".to_owned(),
            poi_counts: [1, 2, 3],
            cells,
            bins,
            scoring: ScoringSummary {
                transit: empty,
                bus_stop: empty,
                venue: empty,
                footfall: empty,
            },
            category_counts: vec![2, 1],
            assignment: AssignmentReport {
                assigned: 4,
                unassigned: 0,
            },
            placement: PlacementReport {
                selected: 3,
                candidates: 4,
                short_circuited: true,
                targets: Vec::new(),
            },
        }
    }

    #[rstest]
    fn stats_count_cells_and_sensors_per_band(outcome: AnalysisOutcome) {
        let stats = AnalysisStats::from_outcome(&outcome);
        assert_eq!(stats.venue_count, 3);
        assert_eq!(stats.cell_count, 3);
        assert_eq!(stats.selected_bins, 3);
        let cells: Vec<usize> = stats.category_distribution.iter().map(|c| c.count).collect();
        let sensors: Vec<usize> = stats.sensor_distribution.iter().map(|c| c.count).collect();
        assert_eq!(cells, vec![2, 1]);
        assert_eq!(sensors, vec![1, 2]);
    }

    #[rstest]
    fn ward_summary_orders_by_people_per_hour(outcome: AnalysisOutcome) {
        let summary = WardSummary::from_outcome(&outcome);
        let names: Vec<&str> = summary.wards.iter().map(|w| w.ward.as_str()).collect();
        assert_eq!(names, vec!["Soho", "Pimlico North"]);

        let soho = summary.wards.first().expect("soho listed");
        assert_eq!(soho.cell_count, 2);
        assert_eq!(soho.sensor_count, 2);
        assert!((soho.total_people_per_hour - 1_300.0).abs() < 1e-9);
        let roads: Vec<&str> = soho.roads.iter().map(|r| r.road.as_str()).collect();
        assert_eq!(roads, vec!["Old Compton Street", "Dean Street"]);
        assert_eq!(summary.totals.total_sensors, 3);
        assert_eq!(summary.totals.ward_count, 2);
        assert!((summary.totals.mean_fill_rate - 10.0).abs() < 1e-9);
    }

    #[rstest]
    fn sensor_summary_lists_bins_by_rank(outcome: AnalysisOutcome) {
        let summary = SensorSummary::from_outcome(&outcome);
        let soho = summary.wards.first().expect("soho listed");
        assert_eq!(soho.ward, "Soho");
        assert_eq!(soho.sensor_count, 2);
        let road = soho.roads.first().expect("road listed");
        let ranks: Vec<usize> = road.bins.iter().map(|b| b.rank).collect();
        assert_eq!(ranks, vec![1, 2]);
        assert!(road.bins.iter().all(|b| (b.fill_rate - 12.3).abs() < 1e-9));
        assert_eq!(summary.totals.total_sensors, 3);
    }

    #[rstest]
    fn summaries_serialise_to_json(outcome: AnalysisOutcome) {
        let json = serde_json::to_value(SensorSummary::from_outcome(&outcome)).expect("serialise");
        assert_eq!(json["totals"]["total_sensors"], 3);
        assert_eq!(json["wards"][0]["roads"][0]["bins"][0]["bin_id"], "BIN00002");
    }

    #[rstest]
    fn empty_outcome_has_no_wards(mut outcome: AnalysisOutcome) {
        outcome.cells.clear();
        outcome.bins.clear();
        let summary = WardSummary::from_outcome(&outcome);
        assert!(summary.wards.is_empty());
        assert_eq!(summary.totals, SummaryTotals::default());
        assert!(SensorSummary::from_outcome(&outcome).wards.is_empty());
    }
}
