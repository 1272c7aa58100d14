use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;

const SENSITIVITY_MV_PER_G: f64 = 250.0;

/// Onset Γ of the synthetic fluid; the down sweep sits below the up sweep.
fn onset_gamma(frequency: f64, hysteresis: f64) -> f64 {
    0.35 + 0.004 * (frequency - 5.0).powi(2) - hysteresis
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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// One generated row, already in table units (Hz, mV).
struct SampleRow {
    drive_frequency: f64,
    frequency: f64,
    gamma_lower_mv: f64,
    gamma_upper_mv: Option<f64>,
    picture_id: Option<String>,
}

fn generate_sweep(fluid: &str, sweep: &str, hysteresis: f64, rng: &mut SimpleRng) -> Vec<SampleRow> {
    let mut rows = Vec::new();
    for step in 0..16 {
        let frequency = 5.0 + step as f64;
        let onset_mv = onset_gamma(frequency, hysteresis) * SENSITIVITY_MV_PER_G;

        // Base state first, then pattern observations around the onset.
        rows.push(SampleRow {
            drive_frequency: 2.0 * frequency,
            frequency,
            gamma_lower_mv: (onset_mv * 0.6).round(),
            gamma_upper_mv: Some(onset_mv.round()),
            picture_id: None,
        });
        for k in 0..3 {
            let lower = (onset_mv + rng.gauss(0.0, 4.0).abs() + 15.0 * k as f64).round();
            // The highest amplitude is often left unmeasured.
            let upper = if k == 2 && rng.next_f64() < 0.5 {
                None
            } else {
                Some(lower + 20.0 + rng.next_f64() * 10.0)
            };
            rows.push(SampleRow {
                drive_frequency: 2.0 * frequency,
                frequency,
                gamma_lower_mv: lower,
                gamma_upper_mv: upper.map(f64::round),
                picture_id: Some(format!("{fluid}/{sweep}/f{frequency:.0}_{k}")),
            });
        }
    }
    rows
}

fn write_csv(path: &Path, rows: &[SampleRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(["drive_frequency", "Frequency", "gamma_lower", "gamma_upper", "picture_id"])?;
    for r in rows {
        writer.write_record([
            r.drive_frequency.to_string(),
            r.frequency.to_string(),
            r.gamma_lower_mv.to_string(),
            r.gamma_upper_mv.map_or("-".to_string(), |v| v.to_string()),
            r.picture_id.clone().unwrap_or_else(|| "-".to_string()),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[SampleRow]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("drive_frequency", DataType::Float64, false),
        Field::new("Frequency", DataType::Float64, false),
        Field::new("gamma_lower", DataType::Float64, false),
        Field::new("gamma_upper", DataType::Float64, true),
        Field::new("picture_id", DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.drive_frequency))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.frequency))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.gamma_lower_mv))),
            Arc::new(Float64Array::from(
                rows.iter().map(|r| r.gamma_upper_mv).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(
                rows.iter()
                    .map(|r| r.picture_id.clone().unwrap_or_else(|| "-".to_string()))
                    .collect::<Vec<_>>(),
            )),
        ],
    )?;

    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

/// Write synthetic up/down sweep tables as CSV and Parquet.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Directory receiving the tables
    #[arg(default_value = "data/raw")]
    out_dir: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let out_dir = args.out_dir.as_path();
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);
    let fluid = "silicone_oil";

    for (sweep, hysteresis) in [("up", 0.0), ("down", 0.05)] {
        let rows = generate_sweep(fluid, sweep, hysteresis, &mut rng);
        let csv_path = out_dir.join(format!("{fluid}_{sweep}.csv"));
        write_csv(&csv_path, &rows)?;
        let pq_path = out_dir.join(format!("{fluid}_typed_{sweep}.parquet"));
        write_parquet(&pq_path, &rows)?;
        println!(
            "Wrote {} rows to {} and {}",
            rows.len(),
            csv_path.display(),
            pq_path.display()
        );
    }

    Ok(())
}
