//! Bracket search and linear interpolation over a [`PropellerDataset`].
//!
//! Velocity interpolation works inside one RPM table. Dynamic thrust and
//! equivalent RPM then interpolate across two RPM tables, using the power
//! each table reaches at the target velocity as the axis and the motor's
//! power ceiling as the evaluation point.

use log::{debug, warn};

use super::model::{Field, PropellerDataset};
use crate::config::MotorLimits;

/// Returned by [`PropellerDataset::dynamic_thrust`] and
/// [`PropellerDataset::interpolate_rpm`] when the power ceiling is not
/// bracketed by the two RPM curves.
pub const NOT_BRACKETED: f64 = -1.0;

/// Linear interpolation through `(x0, y0)` and `(x1, y1)`, evaluated at `x`.
///
/// Coincident x-coordinates (within `f64::EPSILON`) return `y0`.
pub fn interpolate(x0: f64, y0: f64, x1: f64, y1: f64, x: f64) -> f64 {
    let dx = x1 - x0;
    if dx.abs() <= f64::EPSILON {
        return y0;
    }
    y0 + (x - x0) * (y1 - y0) / dx
}

/// Adjacent rows of one RPM table around a target velocity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VelocityBracket {
    /// Row before `upper`; `None` when the target is at or before the first row.
    pub lower: Option<usize>,
    /// First row whose velocity reaches the target.
    pub upper: usize,
}

impl VelocityBracket {
    /// `(lower, upper)` when both rows exist.
    pub fn indices(&self) -> Option<(usize, usize)> {
        self.lower.map(|lower| (lower, self.upper))
    }
}

/// Quantity read from the bracketing rows by
/// [`PropellerDataset::interpolate_at_velocity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    Power,
    Thrust,
}

impl From<Quantity> for Field {
    fn from(quantity: Quantity) -> Self {
        match quantity {
            Quantity::Power => Field::Power,
            Quantity::Thrust => Field::Thrust,
        }
    }
}

/// Power and thrust reached by one RPM table at a given velocity.
#[derive(Debug, Clone, Copy)]
struct OperatingPoint {
    power: f64,
    thrust: f64,
}

impl PropellerDataset {
    /// Locate the rows of the `rpm` table around `target_velocity`.
    ///
    /// Scans in row order and stops at the first row whose velocity is at
    /// least the target. `None` when no row reaches the target.
    ///
    /// # Panics
    ///
    /// Panics if the dataset has no table for `rpm`.
    pub fn find_closest_velocities(
        &self,
        target_velocity: f64,
        rpm: u32,
    ) -> Option<VelocityBracket> {
        (0..self.num_rows(rpm))
            .find(|&i| self.value(rpm, i, Field::Velocity) >= target_velocity)
            .map(|upper| VelocityBracket {
                lower: upper.checked_sub(1),
                upper,
            })
    }

    /// Power or thrust of the `rpm` table at `velocity`, interpolated over
    /// velocity between the bracketing rows.
    ///
    /// Returns `0.0` when the velocity has no valid bracket in the table.
    pub fn interpolate_at_velocity(&self, velocity: f64, rpm: u32, quantity: Quantity) -> f64 {
        let Some((lower, upper)) = self
            .find_closest_velocities(velocity, rpm)
            .and_then(|bracket| bracket.indices())
        else {
            return 0.0;
        };
        let field = Field::from(quantity);
        interpolate(
            self.value(rpm, lower, Field::Velocity),
            self.value(rpm, lower, field),
            self.value(rpm, upper, Field::Velocity),
            self.value(rpm, upper, field),
            velocity,
        )
    }

    fn operating_point(&self, velocity: f64, rpm: u32) -> OperatingPoint {
        OperatingPoint {
            power: self.interpolate_at_velocity(velocity, rpm, Quantity::Power),
            thrust: self.interpolate_at_velocity(velocity, rpm, Quantity::Thrust),
        }
    }

    /// Operating points of both RPM tables when the ceiling lies strictly
    /// between their powers, low below and high above.
    fn ceiling_crossing(
        &self,
        velocity: f64,
        rpm_low: u32,
        rpm_high: u32,
        ceiling: f64,
    ) -> Option<(OperatingPoint, OperatingPoint)> {
        let low = self.operating_point(velocity, rpm_low);
        let high = self.operating_point(velocity, rpm_high);
        (high.power > ceiling && low.power < ceiling).then_some((low, high))
    }

    /// Thrust at `velocity` with the motor at its power ceiling, interpolated
    /// between the `rpm_low` and `rpm_high` tables. `None` when the ceiling is
    /// not bracketed.
    pub fn try_dynamic_thrust(
        &self,
        velocity: f64,
        rpm_low: u32,
        rpm_high: u32,
        limits: &MotorLimits,
    ) -> Option<f64> {
        let ceiling = limits.power_ceiling;
        let (low, high) = self.ceiling_crossing(velocity, rpm_low, rpm_high, ceiling)?;
        Some(interpolate(low.power, low.thrust, high.power, high.thrust, ceiling))
    }

    /// [`try_dynamic_thrust`](Self::try_dynamic_thrust) with
    /// [`NOT_BRACKETED`] in place of `None`.
    pub fn dynamic_thrust(
        &self,
        velocity: f64,
        rpm_low: u32,
        rpm_high: u32,
        limits: &MotorLimits,
    ) -> f64 {
        self.try_dynamic_thrust(velocity, rpm_low, rpm_high, limits)
            .unwrap_or(NOT_BRACKETED)
    }

    /// RPM at which the motor reaches its power ceiling at `velocity`,
    /// interpolated between `rpm_low` and `rpm_high`.
    pub fn try_interpolate_rpm(
        &self,
        velocity: f64,
        rpm_low: u32,
        rpm_high: u32,
        limits: &MotorLimits,
    ) -> Option<f64> {
        let ceiling = limits.power_ceiling;
        let (low, high) = self.ceiling_crossing(velocity, rpm_low, rpm_high, ceiling)?;
        Some(interpolate(
            low.power,
            f64::from(rpm_low),
            high.power,
            f64::from(rpm_high),
            ceiling,
        ))
    }

    /// [`try_interpolate_rpm`](Self::try_interpolate_rpm) with
    /// [`NOT_BRACKETED`] in place of `None`.
    pub fn interpolate_rpm(
        &self,
        velocity: f64,
        rpm_low: u32,
        rpm_high: u32,
        limits: &MotorLimits,
    ) -> f64 {
        self.try_interpolate_rpm(velocity, rpm_low, rpm_high, limits)
            .unwrap_or(NOT_BRACKETED)
    }

    /// Zero-airspeed thrust with the motor at its power ceiling.
    ///
    /// Walks the RPM tables in file order and interpolates the first-row
    /// thrust between the first table whose first-row power exceeds the
    /// ceiling and the table before it. Returns `0.0` when no table exceeds
    /// the ceiling. Cached per power ceiling.
    pub fn static_thrust(&self, limits: &MotorLimits) -> f64 {
        let ceiling = limits.power_ceiling;
        if let Some(thrust) = self.cached_static_thrust(ceiling) {
            return thrust;
        }
        let thrust = self.compute_static_thrust(ceiling);
        self.cache_static_thrust(ceiling, thrust);
        thrust
    }

    fn compute_static_thrust(&self, ceiling: f64) -> f64 {
        let rpms = self.rpm_keys();
        let Some(i) = rpms
            .iter()
            .position(|&rpm| self.value(rpm, 0, Field::Power) > ceiling)
        else {
            debug!("{}: no RPM reaches {ceiling} hp at zero airspeed", self.name());
            return 0.0;
        };
        if i == 0 {
            warn!(
                "{}: lowest RPM {} already exceeds {ceiling} hp, static thrust unavailable",
                self.name(),
                rpms[0]
            );
            return 0.0;
        }

        let (below, above) = (rpms[i - 1], rpms[i]);
        interpolate(
            self.value(below, 0, Field::Power),
            self.value(below, 0, Field::Thrust),
            self.value(above, 0, Field::Power),
            self.value(above, 0, Field::Thrust),
            ceiling,
        )
    }

    /// Linear thrust decay from static thrust at zero airspeed to nothing at
    /// the maximum forward airspeed. Independent of the measured tables.
    pub fn dynamic_thrust_prediction(&self, velocity: f64, limits: &MotorLimits) -> f64 {
        self.static_thrust(limits) * (1.0 - velocity / limits.max_forward_airspeed)
    }

    /// The decay model behind
    /// [`dynamic_thrust_prediction`](Self::dynamic_thrust_prediction), as text.
    pub fn thrust_formula(&self, limits: &MotorLimits) -> String {
        let static_thrust = self.static_thrust(limits);
        let slope = static_thrust / limits.max_forward_airspeed;
        format!("T(v) = {static_thrust:.4} - {slope:.6}*v")
    }
}
