use crate::shared::geometry::interpolate;

/// Which end of the movement the counter is waiting for next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// At the bottom, waiting for the percentage to reach 100.
    Down,
    /// At the top, waiting for the percentage to return to 0.
    Up,
}

/// Counts exercise repetitions from a joint angle.
///
/// The angle is mapped onto a 0-100 completion percentage through
/// `angle_range` (saturating). Each time the percentage hits an end of the
/// range opposite to the current direction, half a rep is added, so one
/// full 0 → 100 → 0 cycle counts 1.0. Values in between never count.
#[derive(Clone, Debug, PartialEq)]
pub struct RepCounter {
    angle_range: (f64, f64),
    direction: Direction,
    count: f64,
}

impl RepCounter {
    pub fn new(angle_range: (f64, f64)) -> Self {
        Self {
            angle_range,
            direction: Direction::Down,
            count: 0.0,
        }
    }

    /// Completion percentage for `angle`, in `[0, 100]`.
    pub fn percentage(&self, angle: f64) -> f64 {
        interpolate(angle, self.angle_range, (0.0, 100.0), true)
    }

    /// Feeds one angle sample and returns its completion percentage.
    pub fn update(&mut self, angle: f64) -> f64 {
        let pct = self.percentage(angle);
        match self.direction {
            Direction::Down if pct >= 100.0 => {
                self.count += 0.5;
                self.direction = Direction::Up;
            }
            Direction::Up if pct <= 0.0 => {
                self.count += 0.5;
                self.direction = Direction::Down;
            }
            _ => {}
        }
        pct
    }

    pub fn count(&self) -> f64 {
        self.count
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}
