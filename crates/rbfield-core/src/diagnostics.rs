// ─────────────────────────────────────────────────────────────────────
// RBField — Diagnostic Dumps
// ─────────────────────────────────────────────────────────────────────
//! Plain-text series files: one scalar per line in `{:.12e}` format.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use rbfield_physics::CouplingMatrix;
use rbfield_types::{FieldError, FieldResult};

fn write_values<P, I>(path: P, values: I) -> FieldResult<usize>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = f64>,
{
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    let mut n = 0;
    for v in values {
        writeln!(writer, "{v:.12e}")?;
        n += 1;
    }
    writer.flush()?;
    log::debug!("wrote {n} values to {}", path.as_ref().display());
    Ok(n)
}

/// Write `values`, one per line.
pub fn write_series<P: AsRef<Path>>(path: P, values: &[f64]) -> FieldResult<()> {
    write_values(path, values.iter().copied()).map(|_| ())
}

/// Write the weights of `matrix` in entry order, one per line.
pub fn write_coupling_weights<P: AsRef<Path>>(path: P, matrix: &CouplingMatrix) -> FieldResult<()> {
    write_values(path, matrix.weights()).map(|_| ())
}

/// Read a series written by [`write_series`]. Blank lines are skipped.
pub fn read_series<P: AsRef<Path>>(path: P) -> FieldResult<Vec<f64>> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    let mut values = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        let v = text.parse::<f64>().map_err(|e| {
            FieldError::InvalidArgument(format!(
                "{}:{}: cannot parse {text:?}: {e}",
                path.as_ref().display(),
                lineno + 1
            ))
        })?;
        values.push(v);
    }
    Ok(values)
}
