//! Propeller dynamometer tables and thrust interpolation.
//!
//! [`data::parser`] turns one performance file into a
//! [`PropellerDataset`]; [`data::interpolate`] answers thrust and RPM queries
//! at a motor's power ceiling; [`sweep`] and [`output`] turn those answers
//! into CSV reports.

pub mod config;
pub mod data;
pub mod output;
pub mod sweep;

pub use config::{Config, MotorLimits, SweepSettings};
pub use data::interpolate::{interpolate, Quantity, VelocityBracket, NOT_BRACKETED};
pub use data::model::{Field, PropellerDataset, Row, Table};
pub use data::parser::{parse_propeller, ParseError};
