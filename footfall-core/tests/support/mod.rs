//! Bin fixtures shared by the integration tests.

use footfall_core::{BinRecord, CellAssignment, CellId};
use geo::Coord;

fn assigned_bin(index: usize, category: usize, location: Coord<f64>) -> BinRecord {
    let mut bin = BinRecord::new(format!("BIN{:05}", index + 1), location);
    bin.assignment = Some(CellAssignment {
        cell_id: CellId::new(0),
        distance: 0.0,
        category,
        category_label: String::new(),
        footfall_score: 0.0,
        people_per_hour: 0.0,
        bin_fill_rate: 0.0,
        ward: None,
        road: None,
    });
    bin
}

/// Assigned bins laid out one row per band, `counts[c]` bins in band `c`.
#[expect(clippy::float_arithmetic, reason = "bins are spaced along each row")]
pub fn banded_bins(counts: &[usize]) -> Vec<BinRecord> {
    let mut bins = Vec::new();
    for (category, &count) in counts.iter().enumerate() {
        let row = f64::from(u32::try_from(category).unwrap_or(u32::MAX));
        for offset in 0..count {
            let column = f64::from(u32::try_from(offset).unwrap_or(u32::MAX));
            let index = bins.len();
            bins.push(assigned_bin(
                index,
                category,
                Coord {
                    x: column * 0.001,
                    y: row,
                },
            ));
        }
    }
    bins
}
