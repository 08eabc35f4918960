use log::debug;
use serde::Serialize;

use crate::config::{MotorLimits, SweepSettings};
use crate::data::model::PropellerDataset;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One line of the dynamic-thrust report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThrustRecord {
    #[serde(rename = "PropName")]
    pub prop_name: String,
    #[serde(rename = "Velocity (mph)")]
    pub velocity: f64,
    #[serde(rename = "RPM")]
    pub rpm: f64,
    #[serde(rename = "Power (hp)")]
    pub power: f64,
    #[serde(rename = "Thrust (Lbf)")]
    pub thrust: f64,
    #[serde(rename = "Predicted Thrust")]
    pub predicted_thrust: f64,
    #[serde(rename = "Thrust Formula")]
    pub thrust_formula: String,
}

// ---------------------------------------------------------------------------
// Sweep
// ---------------------------------------------------------------------------

/// Dynamic thrust at the power ceiling, one record per mph.
///
/// Starts with the static-thrust record at 0 mph, then walks the velocity up
/// from 1 mph through consecutive RPM pairs, emitting a record while the pair
/// brackets the ceiling with positive thrust. A sweep that reaches
/// `num_data_points` ends with a record carrying the thrust formula.
pub fn sweep(
    dataset: &PropellerDataset,
    limits: &MotorLimits,
    settings: &SweepSettings,
) -> Vec<ThrustRecord> {
    let name = dataset.name();
    let last = settings.num_data_points;
    let record = |velocity: u32, rpm: f64, thrust: f64, thrust_formula: String| {
        let velocity = f64::from(velocity);
        ThrustRecord {
            prop_name: name.to_string(),
            velocity,
            rpm,
            power: limits.power_ceiling,
            thrust,
            predicted_thrust: dataset.dynamic_thrust_prediction(velocity, limits),
            thrust_formula,
        }
    };

    let mut records = vec![record(0, 0.0, dataset.static_thrust(limits), String::new())];

    let rpms = dataset.rpm_keys();
    let mut velocity: u32 = 1;
    for pair in rpms.windows(2) {
        let (low, high) = (pair[0], pair[1]);
        for _ in 0..settings.max_steps_per_pair {
            if velocity >= last {
                break;
            }
            let v = f64::from(velocity);
            let Some(thrust) = dataset
                .try_dynamic_thrust(v, low, high, limits)
                .filter(|&t| t > 0.0)
            else {
                break;
            };
            let rpm = dataset.interpolate_rpm(v, low, high, limits);

            records.push(record(velocity, rpm, thrust, String::new()));
            if velocity == last - 1 {
                records.push(record(last, rpm, thrust, dataset.thrust_formula(limits)));
                return records;
            }
            velocity += 1;
        }
    }

    debug!("{name}: sweep stopped at {velocity} mph");
    records
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use indexmap::IndexMap;

    use super::*;
    use crate::data::model::{Row, Table};

    fn row(velocity: f64, power: f64, thrust: f64) -> Row {
        Row {
            velocity,
            power,
            thrust,
            ..Row::default()
        }
    }

    /// Power falls 0.01 hp per mph; thrust 0.02 lbf per mph.
    fn table(power0: f64, thrust0: f64, max_velocity: u32) -> Table {
        (0..=max_velocity)
            .map(|v| {
                let v = f64::from(v);
                row(v, power0 - 0.01 * v, thrust0 - 0.02 * v)
            })
            .collect::<Vec<_>>()
            .into()
    }

    fn dataset(tables: Vec<(u32, Table)>) -> PropellerDataset {
        let tables: IndexMap<u32, Table> = tables.into_iter().collect();
        PropellerDataset::new("sweep", tables)
    }

    #[test]
    fn full_sweep_ends_with_formula() {
        let ds = dataset(vec![(4000, table(0.5, 2.0, 10)), (6000, table(1.5, 4.0, 10))]);
        let limits = MotorLimits::new(1.0, 20.0).unwrap();
        let settings = SweepSettings {
            num_data_points: 5,
            max_steps_per_pair: 200,
        };

        let records = sweep(&ds, &limits, &settings);
        let velocities: Vec<f64> = records.iter().map(|r| r.velocity).collect();
        assert_eq!(velocities, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);

        let first = &records[0];
        assert_relative_eq!(first.thrust, 3.0);
        assert_eq!(first.rpm, 0.0);
        assert!(first.thrust_formula.is_empty());

        // The ceiling moves 1% of the power gap per mph towards the low curve,
        // which exactly cancels the thrust lost per mph.
        for r in &records[1..5] {
            assert_relative_eq!(r.rpm, 5000.0 + 20.0 * r.velocity, epsilon = 1e-9);
            assert_relative_eq!(r.thrust, 3.0, epsilon = 1e-9);
            assert_relative_eq!(r.power, 1.0);
        }
        assert_relative_eq!(records[2].predicted_thrust, 2.7, epsilon = 1e-9);

        let tail = &records[5];
        assert_eq!(tail.thrust, records[4].thrust);
        assert_eq!(tail.rpm, records[4].rpm);
        assert_eq!(tail.thrust_formula, ds.thrust_formula(&limits));
    }

    #[test]
    fn sweep_moves_to_next_pair_when_ceiling_leaves_bracket() {
        // 2000 RPM drops below 1.0 hp past 5.5 mph, handing over to 2000/3000.
        let ds = dataset(vec![
            (1000, table(0.5, 1.0, 20)),
            (2000, table(1.055, 2.0, 20)),
            (3000, table(2.0, 3.0, 20)),
        ]);
        let limits = MotorLimits::new(1.0, 100.0).unwrap();
        let settings = SweepSettings {
            num_data_points: 8,
            max_steps_per_pair: 200,
        };

        let records = sweep(&ds, &limits, &settings);
        let rpms: Vec<f64> = records.iter().map(|r| r.rpm).collect();
        assert_eq!(records.len(), 9);
        assert!(rpms[1..6].iter().all(|&rpm| rpm > 1000.0 && rpm < 2000.0));
        assert!(rpms[6..].iter().all(|&rpm| rpm > 2000.0 && rpm < 3000.0));
        assert!(records.last().unwrap().thrust_formula.starts_with("T(v) = "));
    }

    #[test]
    fn unbracketed_dataset_yields_only_static_record() {
        let ds = dataset(vec![(4000, table(0.2, 1.0, 10)), (5000, table(0.4, 2.0, 10))]);
        let limits = MotorLimits::default();
        let records = sweep(&ds, &limits, &SweepSettings::default());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].thrust, 0.0);
        assert_eq!(records[0].predicted_thrust, 0.0);
    }
}
