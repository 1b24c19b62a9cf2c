use std::io::Write;

use serde::Serialize;

use super::error::IoError;
use crate::step::Arg;
use crate::streaming::Pipeline;

/// Serialize every output record as CSV (header from the first record)
pub fn write_csv<T, R, W>(pipeline: &mut Pipeline<T>, writer: W) -> Result<(), IoError>
where
    T: Arg,
    R: Arg + Serialize,
    W: Write,
{
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in pipeline.iter_as::<R>() {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Render every output record as CSV text; empty output renders as ""
pub fn to_csv<T, R>(pipeline: &mut Pipeline<T>) -> Result<String, IoError>
where
    T: Arg,
    R: Arg + Serialize,
{
    let mut buffer = Vec::new();
    write_csv::<T, R, _>(pipeline, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}
