use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

use crate::data::model::{Field, PropellerDataset};

const IN_LBF_PER_FT_LBF: f64 = 12.0;

// ---------------------------------------------------------------------------
// Torque / RPM export
// ---------------------------------------------------------------------------

/// A measured torque at one RPM, for matching against motor catalogues.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TorqueRecord {
    #[serde(rename = "PropName")]
    pub prop_name: String,
    #[serde(rename = "RPM")]
    pub rpm: u32,
    #[serde(rename = "Torque (ft-lbf)")]
    pub torque: f64,
}

/// Every row with positive torque, table by table in file order.
pub fn torque_records(dataset: &PropellerDataset) -> Vec<TorqueRecord> {
    dataset
        .tables()
        .flat_map(|(rpm, table)| {
            table
                .rows()
                .iter()
                .map(|row| row.get(Field::Torque))
                .filter(|&torque| torque > 0.0)
                .map(move |torque| TorqueRecord {
                    prop_name: dataset.name().to_string(),
                    rpm,
                    torque: torque / IN_LBF_PER_FT_LBF,
                })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// CSV writing
// ---------------------------------------------------------------------------

/// Write a header row followed by every record.
pub fn write_records<W: Write, R: Serialize>(writer: W, records: &[R]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for (i, record) in records.iter().enumerate() {
        csv.serialize(record)
            .with_context(|| format!("writing CSV record {i}"))?;
    }
    csv.flush().context("flushing CSV output")?;
    Ok(())
}

/// Create `path` and write the records to it.
pub fn write_csv_file<R: Serialize>(path: &Path, records: &[R]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_records(file, records).with_context(|| format!("writing {}", path.display()))?;
    info!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

/// First of `stem.csv`, `stem1.csv`, `stem2.csv`, … that does not exist yet.
pub fn next_output_path(dir: &Path, stem: &str) -> PathBuf {
    let first = dir.join(format!("{stem}.csv"));
    if !first.exists() {
        return first;
    }
    (1u32..)
        .map(|n| dir.join(format!("{stem}{n}.csv")))
        .find(|path| !path.exists())
        .unwrap_or(first)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use indexmap::IndexMap;
    use tempfile::tempdir;

    use super::*;
    use crate::data::model::{Row, Table};
    use crate::sweep::ThrustRecord;

    #[test]
    fn thrust_records_get_report_headers() {
        let records = vec![ThrustRecord {
            prop_name: "10x7E".to_string(),
            velocity: 0.0,
            rpm: 0.0,
            power: 1.0,
            thrust: 2.5,
            predicted_thrust: 2.5,
            thrust_formula: String::new(),
        }];
        let mut buf = Vec::new();
        write_records(&mut buf, &records).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "PropName,Velocity (mph),RPM,Power (hp),Thrust (Lbf),Predicted Thrust,Thrust Formula"
        );
        assert_eq!(lines.next().unwrap(), "10x7E,0.0,0.0,1.0,2.5,2.5,");
        assert!(lines.next().is_none());
    }

    #[test]
    fn torque_export_converts_and_skips_zero_torque() {
        let row = |torque: f64| Row {
            torque,
            ..Row::default()
        };
        let mut tables = IndexMap::new();
        tables.insert(2000, Table::new(vec![row(24.0), row(0.0)]));
        tables.insert(1000, Table::new(vec![row(6.0)]));
        let ds = PropellerDataset::new("8x4", tables);

        let records = torque_records(&ds);
        let pairs: Vec<(u32, f64)> = records.iter().map(|r| (r.rpm, r.torque)).collect();
        assert_eq!(pairs, vec![(2000, 2.0), (1000, 0.5)]);
        assert!(records.iter().all(|r| r.prop_name == "8x4"));
    }

    #[test]
    fn output_path_avoids_existing_files() {
        let dir = tempdir().unwrap();
        let first = next_output_path(dir.path(), "out");
        assert_eq!(first, dir.path().join("out.csv"));

        fs::write(&first, "").unwrap();
        let second = next_output_path(dir.path(), "out");
        assert_eq!(second, dir.path().join("out1.csv"));

        write_csv_file::<TorqueRecord>(&second, &[]).unwrap();
        assert_eq!(next_output_path(dir.path(), "out"), dir.path().join("out2.csv"));
    }
}
