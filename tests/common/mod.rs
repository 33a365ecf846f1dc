#![allow(dead_code)]

use custseg::encoder::RawRecord;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use std::io::Write;
use tempfile::NamedTempFile;

/// Segment centres (age, income, spending), loosely shaped like mall customer data.
const CENTRES: [(f64, f64, f64); 5] = [
    (25.0, 25.0, 80.0),
    (45.0, 25.0, 20.0),
    (42.0, 55.0, 50.0),
    (32.0, 85.0, 82.0),
    (40.0, 88.0, 17.0),
];

/// `n` reproducible customers spread over five segments.
pub fn synthetic_records(n: usize, seed: u64) -> Vec<RawRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 4.0).expect("valid normal");
    (0..n)
        .map(|i| {
            let (age, income, spending) = CENTRES[i % CENTRES.len()];
            RawRecord {
                age: (age + noise.sample(&mut rng)).round().clamp(18.0, 70.0),
                annual_income: (income + noise.sample(&mut rng)).round().max(15.0),
                spending_score: (spending + noise.sample(&mut rng)).round().clamp(1.0, 99.0),
                genre: if rng.random_bool(0.44) { "Male" } else { "Female" }.to_string(),
            }
        })
        .collect()
}

/// Write records as a dataset CSV with the production header.
pub fn write_csv(records: &[RawRecord]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    writeln!(file, "CustomerID,Genre,Age,Annual Income (k$),Spending Score (1-100)").unwrap();
    for (i, r) in records.iter().enumerate() {
        writeln!(
            file,
            "{},{},{},{},{}",
            i + 1,
            r.genre,
            r.age,
            r.annual_income,
            r.spending_score
        )
        .unwrap();
    }
    file.flush().unwrap();
    file
}
