use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use log::info;

/// Air density at sea level (slug/ft³).
const RHO: f64 = 0.002377;
const FT_LBF_PER_S_PER_HP: f64 = 550.0;
const ROWS_PER_TABLE: usize = 30;

/// Synthetic propeller: diameter and pitch in inches, static Ct/Cp, and the
/// advance ratio at which thrust vanishes.
struct Prop {
    diameter: f64,
    pitch: f64,
    ct0: f64,
    cp0: f64,
    j_max: f64,
}

impl Prop {
    fn name(&self) -> String {
        format!("{}x{}E", self.diameter, self.pitch)
    }

    fn ct(&self, j: f64) -> f64 {
        (self.ct0 * (1.0 - j / self.j_max)).max(0.0)
    }

    fn cp(&self, j: f64) -> f64 {
        self.cp0 * (1.0 - 0.6 * (j / self.j_max).powi(2))
    }
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn range(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.next_f64()
    }
}

fn random_prop(rng: &mut SimpleRng) -> Prop {
    let diameter = (rng.range(6.0, 16.0) * 2.0).round() / 2.0;
    let pitch = (rng.range(0.4, 0.9) * diameter).round();
    let pitch_ratio = pitch / diameter;
    Prop {
        diameter,
        pitch,
        ct0: rng.range(0.09, 0.13),
        cp0: 0.02 + 0.05 * pitch_ratio,
        j_max: pitch_ratio * rng.range(1.05, 1.2),
    }
}

/// One performance file in the dynamometer table format.
fn render(prop: &Prop, rng: &mut SimpleRng) -> String {
    let name = prop.name();
    let d_ft = prop.diameter / 12.0;
    let mut out = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(out, "         PERFORMANCE DATA ({name}.dat)");
    for rpm in (1000..=20000).step_by(1000) {
        let n = f64::from(rpm) / 60.0;
        let v_max = prop.j_max * n * d_ft * 3600.0 / 5280.0;

        let _ = writeln!(out, "\n\n                    PROP RPM =     {rpm}\n");
        let _ = writeln!(
            out,
            "   V          J           Pe          Ct          Cp          PWR         Torque      Thrust"
        );
        let _ = writeln!(
            out,
            "  (mph)      (Adv_Ratio)  -           -           -           (Hp)        (In-Lbf)    (Lbf)"
        );

        for i in 0..ROWS_PER_TABLE {
            let v = v_max * i as f64 / ROWS_PER_TABLE as f64;
            let j = v * 5280.0 / 3600.0 / (n * d_ft);
            let noise = 1.0 + rng.range(-0.005, 0.005);
            let ct = prop.ct(j) * noise;
            let cp = prop.cp(j) * noise;
            let thrust = ct * RHO * n.powi(2) * d_ft.powi(4);
            let power = cp * RHO * n.powi(3) * d_ft.powi(5) / FT_LBF_PER_S_PER_HP;
            let torque = power * 63025.0 / f64::from(rpm);

            let efficiency = if i == 0 {
                "-NaN".to_string()
            } else if rng.next_f64() < 0.05 {
                "-".to_string()
            } else {
                format!("{:.4}", j * ct / cp)
            };
            let _ = writeln!(
                out,
                "{v:8.1}{j:12.2}{efficiency:>12}{ct:12.4}{cp:12.4}{power:12.3}{torque:12.3}{thrust:12.3}"
            );
        }
    }
    out
}

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| "propellerData".to_string()));
    let count: usize = match args.next() {
        Some(arg) => arg.parse().with_context(|| format!("invalid file count {arg:?}"))?,
        None => 5,
    };

    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);
    for _ in 0..count {
        let prop = random_prop(&mut rng);
        let path = out_dir.join(format!("PER3_{}.dat", prop.name()));
        std::fs::write(&path, render(&prop, &mut rng))
            .with_context(|| format!("writing {}", path.display()))?;
        info!("Wrote {}", path.display());
    }

    println!("Wrote {count} propeller files to {}", out_dir.display());
    Ok(())
}
