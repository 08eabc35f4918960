use approx::assert_relative_eq;
use tempfile::tempdir;

use prop_thrust::data::loader::{load_all, DirSource};
use prop_thrust::output::{next_output_path, write_csv_file};
use prop_thrust::sweep::sweep;
use prop_thrust::{Field, MotorLimits, SweepSettings};

const PROP_FILE: &str = "\
         PERFORMANCE DATA (9x6E.dat)


                    PROP RPM =     4000

   V          J           Pe          Ct          Cp          PWR         Torque      Thrust
  (mph)      (Adv_Ratio)  -           -           -           (Hp)        (In-Lbf)    (Lbf)
     0.0        0.00        -NaN      0.1100      0.0500       0.500       7.878       2.000
    10.0        0.29      0.6000      0.1000      0.0480       0.450       7.090       1.800
    20.0        0.59           -      0.0900      0.0460       0.400       6.302       1.600


                    PROP RPM =     6000

   V          J           Pe          Ct          Cp          PWR         Torque      Thrust
  (mph)      (Adv_Ratio)  -           -           -           (Hp)        (In-Lbf)    (Lbf)
     0.0        0.00        -NaN      0.1100      0.0500       1.500      15.756       4.000
    10.0        0.20      0.5000      0.1050      0.0490       1.450      15.231       3.800
    20.0        0.39      0.7000      0.1000      0.0480       1.400      14.706       3.600
";

#[test]
fn parse_sweep_and_write_report() {
    let data = tempdir().unwrap();
    std::fs::write(data.path().join("PER3_9x6E.dat"), PROP_FILE).unwrap();
    std::fs::write(data.path().join("README"), "not a propeller file").unwrap();

    let datasets = load_all(&DirSource::new(data.path())).unwrap();
    assert_eq!(datasets.len(), 1);
    let ds = &datasets[0];
    assert_eq!(ds.name(), "9x6E");
    assert_eq!(ds.rpm_keys(), vec![4000, 6000]);
    assert_eq!(ds.value(4000, 0, Field::Efficiency), 0.0);
    assert_eq!(ds.value(4000, 2, Field::Efficiency), 0.0);
    assert_eq!(ds.value(6000, 1, Field::Torque), 15.231);

    let limits = MotorLimits::new(1.0, 60.0).unwrap();
    assert_relative_eq!(ds.static_thrust(&limits), 3.0, epsilon = 1e-12);
    assert_relative_eq!(ds.dynamic_thrust(5.0, 4000, 6000, &limits), 2.95, epsilon = 1e-9);
    assert_relative_eq!(ds.interpolate_rpm(5.0, 4000, 6000, &limits), 5050.0, epsilon = 1e-6);
    assert_eq!(ds.dynamic_thrust(25.0, 4000, 6000, &limits), -1.0);

    // The tables end at 20 mph, so the sweep stops there without a formula row.
    let records = sweep(ds, &limits, &SweepSettings::default());
    assert_eq!(records.len(), 21);
    assert_eq!(records.last().unwrap().velocity, 20.0);
    assert!(records.iter().all(|r| r.thrust_formula.is_empty()));

    let out = tempdir().unwrap();
    let path = next_output_path(out.path(), "UsefulPropellerData");
    write_csv_file(&path, &records).unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(headers[0], "PropName");
    assert_eq!(headers[4], "Thrust (Lbf)");

    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), 21);
    assert_eq!(&rows[5][0], "9x6E");
    assert_eq!(&rows[5][1], "5.0");
    let thrust: f64 = rows[5][4].parse().unwrap();
    assert_relative_eq!(thrust, 2.95, epsilon = 1e-9);

    assert_eq!(
        next_output_path(out.path(), "UsefulPropellerData"),
        out.path().join("UsefulPropellerData1.csv")
    );
}
