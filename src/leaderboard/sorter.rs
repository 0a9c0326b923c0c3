//! Running-order sort.

use super::record::CarRecord;

pub struct CarSorter;

impl CarSorter {
    /// Stable sort: classified cars by position, then unclassified (0), then unknown.
    pub fn sort(cars: &mut [CarRecord]) {
        cars.sort_by_key(|car| sort_key(car.pos));
    }
}

fn sort_key(pos: Option<i32>) -> (u8, i32) {
    match pos {
        Some(pos) if pos > 0 => (0, pos),
        Some(0) => (1, 0),
        _ => (2, 0),
    }
}
