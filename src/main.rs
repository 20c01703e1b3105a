use std::env;
use std::error::Error;
use std::fs::File;
use std::time::Instant;

use chrono::Local;
use log::{info, LevelFilter};
use ndarray::Array2;
use ndarray_npy::ReadNpyExt;

use nmf::{factorize, NmfConfig};

fn timestamp() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

/// Usage: nmf <matrix.npy> [k] [tol] [max_iter]
fn main() -> Result<(), Box<dyn Error>> {
    simple_logger::SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .init()?;

    let mut args = env::args().skip(1);
    let path = args
        .next()
        .ok_or("usage: nmf <matrix.npy> [k] [tol] [max_iter]")?;

    let mut config = NmfConfig::default();
    if let Some(arg) = args.next() {
        config.k = Some(arg.parse()?);
    }
    if let Some(arg) = args.next() {
        config.tol = arg.parse()?;
    }
    if let Some(arg) = args.next() {
        config.max_iter = arg.parse()?;
    }

    let reader = File::open(&path)?;
    let v = Array2::<f64>::read_npy(reader)?;
    info!(
        "[{}] loaded {}x{} matrix from {}",
        timestamp(),
        v.nrows(),
        v.ncols(),
        path
    );

    let start = Instant::now();
    let result = factorize(&v, &config)?;
    let elapsed = start.elapsed();

    let approx = result.w.dot(&result.h);
    let err = (&v - &approx).mapv(|x| x * x).sum().sqrt();
    let v_norm = v.mapv(|x| x * x).sum().sqrt();
    let relative = if v_norm > 0.0 { err / v_norm } else { err };
    info!(
        "[{}] rank {} factorization done in {:.2?}, relative residual {:.4}",
        timestamp(),
        result.w.ncols(),
        elapsed,
        relative
    );

    Ok(())
}
