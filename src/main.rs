use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use prop_thrust::data::loader::{load_all, DirSource};
use prop_thrust::output::{next_output_path, torque_records, write_csv_file};
use prop_thrust::sweep::sweep;
use prop_thrust::Config;

/// Thrust at a motor's power ceiling, interpolated from propeller
/// dynamometer tables.
#[derive(Parser, Debug)]
#[command(name = "prop-thrust", version, about)]
struct Cli {
    /// JSON configuration file; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Folder of propeller data files.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Folder the CSV report is written to.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Motor power ceiling (hp).
    #[arg(long)]
    power_ceiling: Option<f64>,

    /// Airspeed where predicted thrust reaches zero (mph).
    #[arg(long)]
    max_airspeed: Option<f64>,

    /// Export torque/RPM pairs instead of the dynamic thrust sweep.
    #[arg(long)]
    torque: bool,
}

impl Cli {
    fn into_config(self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_json_file(path)?,
            None => Config::default(),
        };
        if let Some(dir) = self.data_dir {
            config.data_dir = dir;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if let Some(ceiling) = self.power_ceiling {
            config.limits.power_ceiling = ceiling;
        }
        if let Some(airspeed) = self.max_airspeed {
            config.limits.max_forward_airspeed = airspeed;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let torque = cli.torque;
    let config = cli.into_config()?;

    let datasets = load_all(&DirSource::new(&config.data_dir))?;

    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("creating {}", config.output_dir.display()))?;

    if torque {
        let records: Vec<_> = datasets.iter().flat_map(torque_records).collect();
        let path = next_output_path(&config.output_dir, &format!("{}Torque", config.output_stem));
        return write_csv_file(&path, &records);
    }

    let mut records = Vec::new();
    for dataset in &datasets {
        info!("Writing prop: {}", dataset.name());
        records.extend(sweep(dataset, &config.limits, &config.sweep));
    }
    let path = next_output_path(&config.output_dir, &config.output_stem);
    write_csv_file(&path, &records)
}
