//! Write a demo background / sample pair for offline runs:
//!
//! ```text
//! generate-sample [OUT_DIR]   # default: demo_data
//! reflectance-classifier --headless \
//!     --background demo_data/background.json --sample demo_data/sample.parquet
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde_json::{Map, Value as JsonValue};

/// Channels per reading, matching the full-graph models' input width.
const CHANNELS: usize = 19;

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
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

fn main() -> Result<()> {
    let out_dir = PathBuf::from(std::env::args().nth(1).unwrap_or_else(|| "demo_data".to_string()));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);

    // Wavelengths: 400 → 940 nm, step 30
    let wavelengths: Vec<u32> = (0..CHANNELS as u32).map(|i| 400 + i * 30).collect();

    // Lamp emission for the background, sample = background × a reflectance
    // curve with an absorption dip around 640 nm.
    let background: Vec<f64> = wavelengths
        .iter()
        .map(|&wl| gaussian(wl as f64, 620.0, 180.0, 1000.0) + rng.gauss(0.0, 2.0))
        .collect();
    let sample: Vec<f64> = wavelengths
        .iter()
        .zip(&background)
        .map(|(&wl, &bg)| {
            let reflectance = 0.9 - gaussian(wl as f64, 640.0, 40.0, 0.35);
            bg * reflectance.sqrt() + rng.gauss(0.0, 2.0)
        })
        .collect();

    // Background as records-oriented JSON, the shape the endpoints return
    let record: Map<String, JsonValue> = wavelengths
        .iter()
        .zip(&background)
        .map(|(wl, v)| (wl.to_string(), JsonValue::from(*v)))
        .collect();
    let json_path = out_dir.join("background.json");
    let json = serde_json::to_string_pretty(&JsonValue::Array(vec![JsonValue::Object(record)]))?;
    std::fs::write(&json_path, json).with_context(|| format!("writing {}", json_path.display()))?;

    // Sample as Parquet, one Float64 column per wavelength
    let schema = Arc::new(Schema::new(
        wavelengths
            .iter()
            .map(|wl| Field::new(wl.to_string(), DataType::Float64, true))
            .collect::<Vec<_>>(),
    ));
    let columns: Vec<ArrayRef> = sample
        .iter()
        .map(|&v| Arc::new(Float64Array::from(vec![v])) as ArrayRef)
        .collect();
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let parquet_path = out_dir.join("sample.parquet");
    let file = std::fs::File::create(&parquet_path)
        .with_context(|| format!("creating {}", parquet_path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating Parquet writer")?;
    writer.write(&batch).context("writing Parquet batch")?;
    writer.close().context("closing Parquet writer")?;

    println!(
        "Wrote {} ({CHANNELS} channels) and {}",
        json_path.display(),
        parquet_path.display()
    );
    Ok(())
}
