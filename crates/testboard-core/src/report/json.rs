use crate::error::BoardError;
use crate::report::Report;
use std::path::Path;

pub fn to_json_string(report: &Report) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

pub fn write_json(report: &Report, out: &Path) -> anyhow::Result<()> {
    std::fs::write(out, to_json_string(report)?).map_err(|source| BoardError::Io {
        path: out.to_path_buf(),
        source,
    })?;
    Ok(())
}
