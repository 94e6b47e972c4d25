//! Circular seat placement around a round table.

use std::f64::consts::{FRAC_PI_2, TAU};

use serde::Serialize;
use shared::domain::Person;

pub const TABLE_RADIUS: f64 = 60.0;
pub const SEAT_RADIUS: f64 = 20.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeatPosition {
    pub person: Person,
    /// Top-left anchor of the seat marker inside the table's bounding box.
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeatLayout {
    pub table_radius: f64,
    pub seat_radius: f64,
}

impl Default for SeatLayout {
    fn default() -> Self {
        Self {
            table_radius: TABLE_RADIUS,
            seat_radius: SEAT_RADIUS,
        }
    }
}

impl SeatLayout {
    /// Places `occupants` clockwise starting at 12 o'clock. Occupant order is
    /// seat order; the result depends on nothing but the arguments.
    pub fn layout(&self, _table_index: u32, occupants: &[Person]) -> Vec<SeatPosition> {
        let n = occupants.len();
        if n == 0 {
            return Vec::new();
        }
        let r = self.table_radius;
        occupants
            .iter()
            .enumerate()
            .map(|(i, person)| {
                let angle = seat_angle(i, n);
                SeatPosition {
                    person: person.clone(),
                    x: r + r * angle.cos() - self.seat_radius,
                    y: r + r * angle.sin() - self.seat_radius,
                }
            })
            .collect()
    }

    /// Side of the square that bounds the table circle.
    pub fn table_diameter(&self) -> f64 {
        self.table_radius * 2.0
    }

    pub fn seat_diameter(&self) -> f64 {
        self.seat_radius * 2.0
    }
}

fn seat_angle(i: usize, n: usize) -> f64 {
    (i as f64 / n as f64) * TAU - FRAC_PI_2
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn people(n: usize) -> Vec<Person> {
        (0..n)
            .map(|i| Person {
                name: format!("guest {i}"),
                initials: format!("G{i}"),
                table_index: 1,
            })
            .collect()
    }

    fn centre_angle(layout: &SeatLayout, seat: &SeatPosition) -> f64 {
        let cx = seat.x + layout.seat_radius - layout.table_radius;
        let cy = seat.y + layout.seat_radius - layout.table_radius;
        cy.atan2(cx)
    }

    #[test]
    fn empty_table_has_no_seats() {
        assert!(SeatLayout::default().layout(3, &[]).is_empty());
    }

    #[test]
    fn first_seat_is_at_the_top() {
        let layout = SeatLayout::default();
        let seats = layout.layout(1, &people(5));
        assert!((seats[0].x - (TABLE_RADIUS - SEAT_RADIUS)).abs() < EPS);
        assert!((seats[0].y - (-SEAT_RADIUS)).abs() < EPS);
    }

    #[test]
    fn seats_are_evenly_spaced_clockwise() {
        let layout = SeatLayout::default();
        for n in 1..=12 {
            let seats = layout.layout(1, &people(n));
            assert_eq!(seats.len(), n);
            let step = TAU / n as f64;
            for (i, seat) in seats.iter().enumerate() {
                let expected = i as f64 * step - FRAC_PI_2;
                let diff = (centre_angle(&layout, seat) - expected).rem_euclid(TAU);
                assert!(
                    diff < 1e-6 || (TAU - diff) < 1e-6,
                    "seat {i} of {n} off by {diff}"
                );
            }
        }
    }

    #[test]
    fn four_seats_land_on_the_compass_points() {
        let seats = SeatLayout::default().layout(2, &people(4));
        let coords: Vec<(i64, i64)> = seats
            .iter()
            .map(|s| (s.x.round() as i64, s.y.round() as i64))
            .collect();
        assert_eq!(coords, vec![(40, -20), (100, 40), (40, 100), (-20, 40)]);
    }

    #[test]
    fn layout_is_deterministic_and_order_preserving() {
        let layout = SeatLayout::default();
        let guests = people(6);
        let first = layout.layout(4, &guests);
        let second = layout.layout(4, &guests);
        assert_eq!(first, second);
        let initials: Vec<_> = first.iter().map(|s| s.person.initials.as_str()).collect();
        assert_eq!(initials, vec!["G0", "G1", "G2", "G3", "G4", "G5"]);
    }
}
