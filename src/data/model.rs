use std::cell::Cell;
use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Field – one column of a dynamometer table
// ---------------------------------------------------------------------------

/// Number of measured values in every table row.
pub const ROW_FIELDS: usize = 8;

/// The columns of a propeller performance table, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    /// Airspeed (mph).
    Velocity,
    /// Advance ratio J.
    AdvanceRatio,
    /// Propulsive efficiency.
    Efficiency,
    /// Thrust coefficient Ct.
    ThrustCoefficient,
    /// Power coefficient Cp.
    PowerCoefficient,
    /// Shaft power (hp).
    Power,
    /// Shaft torque (in-lbf).
    Torque,
    /// Thrust (lbf).
    Thrust,
}

impl Field {
    /// All fields, in the column order of the source file.
    pub const ALL: [Field; ROW_FIELDS] = [
        Field::Velocity,
        Field::AdvanceRatio,
        Field::Efficiency,
        Field::ThrustCoefficient,
        Field::PowerCoefficient,
        Field::Power,
        Field::Torque,
        Field::Thrust,
    ];

    /// Column position in the source file.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Velocity => "velocity",
            Field::AdvanceRatio => "advance ratio",
            Field::Efficiency => "efficiency",
            Field::ThrustCoefficient => "thrust coefficient",
            Field::PowerCoefficient => "power coefficient",
            Field::Power => "power",
            Field::Torque => "torque",
            Field::Thrust => "thrust",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Row – one velocity sample
// ---------------------------------------------------------------------------

/// One measured velocity sample. Missing measurements are stored as `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Row {
    pub velocity: f64,
    pub advance_ratio: f64,
    pub efficiency: f64,
    pub thrust_coefficient: f64,
    pub power_coefficient: f64,
    pub power: f64,
    pub torque: f64,
    pub thrust: f64,
}

impl Row {
    /// Build a row from parsed values in file order.
    ///
    /// Values past the eighth are ignored; fewer than eight yields `None`.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.len() < ROW_FIELDS {
            return None;
        }
        Some(Row {
            velocity: values[0],
            advance_ratio: values[1],
            efficiency: values[2],
            thrust_coefficient: values[3],
            power_coefficient: values[4],
            power: values[5],
            torque: values[6],
            thrust: values[7],
        })
    }

    pub fn get(&self, field: Field) -> f64 {
        match field {
            Field::Velocity => self.velocity,
            Field::AdvanceRatio => self.advance_ratio,
            Field::Efficiency => self.efficiency,
            Field::ThrustCoefficient => self.thrust_coefficient,
            Field::PowerCoefficient => self.power_coefficient,
            Field::Power => self.power,
            Field::Torque => self.torque,
            Field::Thrust => self.thrust,
        }
    }
}

// ---------------------------------------------------------------------------
// Table – all rows recorded at one RPM
// ---------------------------------------------------------------------------

/// Rows measured at a single RPM, in source order (ascending velocity).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    rows: Vec<Row>,
}

impl Table {
    pub fn new(rows: Vec<Row>) -> Self {
        Table { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether velocities never decrease from one row to the next.
    pub fn is_velocity_sorted(&self) -> bool {
        self.rows
            .windows(2)
            .all(|pair| pair[0].velocity <= pair[1].velocity)
    }
}

impl From<Vec<Row>> for Table {
    fn from(rows: Vec<Row>) -> Self {
        Table::new(rows)
    }
}

// ---------------------------------------------------------------------------
// PropellerDataset – every RPM table of one propeller
// ---------------------------------------------------------------------------

/// Static thrust computed for a given power ceiling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct CachedStaticThrust {
    pub ceiling: f64,
    pub thrust: f64,
}

/// One propeller's performance data: RPM → table, in file order.
///
/// Immutable after construction apart from the static-thrust cache.
#[derive(Debug, Clone)]
pub struct PropellerDataset {
    name: String,
    tables: IndexMap<u32, Table>,
    static_thrust: Cell<Option<CachedStaticThrust>>,
}

impl PropellerDataset {
    pub fn new(name: impl Into<String>, tables: IndexMap<u32, Table>) -> Self {
        PropellerDataset {
            name: name.into(),
            tables,
            static_thrust: Cell::new(None),
        }
    }

    /// Display name of the propeller.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// RPM keys in file order.
    pub fn rpms(&self) -> impl Iterator<Item = u32> + '_ {
        self.tables.keys().copied()
    }

    /// RPM keys in file order, collected.
    pub fn rpm_keys(&self) -> Vec<u32> {
        self.rpms().collect()
    }

    /// `(rpm, table)` pairs in file order.
    pub fn tables(&self) -> impl Iterator<Item = (u32, &Table)> + '_ {
        self.tables.iter().map(|(rpm, table)| (*rpm, table))
    }

    pub fn table(&self, rpm: u32) -> Option<&Table> {
        self.tables.get(&rpm)
    }

    /// Number of RPM tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Row count of the table at `rpm`.
    ///
    /// # Panics
    ///
    /// Panics if the dataset has no table for `rpm`.
    pub fn num_rows(&self, rpm: u32) -> usize {
        self.expect_table(rpm).len()
    }

    /// Value of `field` in row `row` of the table at `rpm`.
    ///
    /// # Panics
    ///
    /// Panics if the dataset has no table for `rpm` or the row is out of range.
    pub fn value(&self, rpm: u32, row: usize, field: Field) -> f64 {
        let table = self.expect_table(rpm);
        match table.row(row) {
            Some(r) => r.get(field),
            None => panic!(
                "{}: row {row} out of range for {rpm} RPM table ({} rows)",
                self.name,
                table.len()
            ),
        }
    }

    /// Non-panicking variant of [`PropellerDataset::value`].
    pub fn try_value(&self, rpm: u32, row: usize, field: Field) -> Option<f64> {
        self.table(rpm)?.row(row).map(|r| r.get(field))
    }

    fn expect_table(&self, rpm: u32) -> &Table {
        match self.tables.get(&rpm) {
            Some(table) => table,
            None => panic!("{}: no table for {rpm} RPM", self.name),
        }
    }

    pub(crate) fn cached_static_thrust(&self, ceiling: f64) -> Option<f64> {
        self.static_thrust
            .get()
            .filter(|cached| cached.ceiling == ceiling)
            .map(|cached| cached.thrust)
    }

    pub(crate) fn cache_static_thrust(&self, ceiling: f64, thrust: f64) {
        self.static_thrust
            .set(Some(CachedStaticThrust { ceiling, thrust }));
    }
}

impl PartialEq for PropellerDataset {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.tables == other.tables
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(velocity: f64, power: f64, thrust: f64) -> Row {
        Row {
            velocity,
            power,
            thrust,
            ..Row::default()
        }
    }

    fn dataset() -> PropellerDataset {
        let mut tables = IndexMap::new();
        tables.insert(6000, Table::new(vec![row(0.0, 1.5, 3.0), row(5.0, 1.4, 2.6)]));
        tables.insert(5000, Table::new(vec![row(0.0, 0.5, 2.0)]));
        PropellerDataset::new("10x7E", tables)
    }

    #[test]
    fn row_from_values_maps_fields_in_file_order() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
        let row = Row::from_values(&values).unwrap();
        for field in Field::ALL {
            assert_eq!(row.get(field), values[field.index()]);
        }
        assert!(Row::from_values(&values[..7]).is_none());
    }

    #[test]
    fn rpm_keys_keep_insertion_order() {
        let ds = dataset();
        assert_eq!(ds.name(), "10x7E");
        assert_eq!(ds.rpm_keys(), vec![6000, 5000]);
        assert_eq!(ds.num_rows(6000), 2);
        assert_eq!(ds.value(6000, 1, Field::Thrust), 2.6);
        assert_eq!(ds.try_value(5000, 3, Field::Power), None);
        assert_eq!(ds.try_value(7000, 0, Field::Power), None);
    }

    #[test]
    #[should_panic(expected = "no table for 7000 RPM")]
    fn unknown_rpm_panics() {
        dataset().num_rows(7000);
    }

    #[test]
    #[should_panic(expected = "row 2 out of range")]
    fn row_out_of_range_panics() {
        dataset().value(6000, 2, Field::Power);
    }

    #[test]
    fn velocity_ordering_check() {
        let sorted = Table::new(vec![row(0.0, 0.0, 0.0), row(0.0, 0.0, 0.0), row(3.0, 0.0, 0.0)]);
        let unsorted = Table::new(vec![row(4.0, 0.0, 0.0), row(3.0, 0.0, 0.0)]);
        assert!(sorted.is_velocity_sorted());
        assert!(!unsorted.is_velocity_sorted());
    }
}
