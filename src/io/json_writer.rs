use std::io::Write;

use serde::Serialize;

use super::error::IoError;
use crate::step::Arg;
use crate::streaming::Pipeline;

/// Render all output records as one JSON array
pub fn to_json<T, R>(pipeline: &mut Pipeline<T>) -> Result<String, IoError>
where
    T: Arg,
    R: Arg + Serialize,
{
    let records: Vec<R> = pipeline.collect();
    Ok(serde_json::to_string(&records)?)
}

/// Write output records one JSON document per line
pub fn write_json_lines<T, R, W>(pipeline: &mut Pipeline<T>, mut writer: W) -> Result<(), IoError>
where
    T: Arg,
    R: Arg + Serialize,
    W: Write,
{
    for record in pipeline.iter_as::<R>() {
        serde_json::to_writer(&mut writer, &record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}
