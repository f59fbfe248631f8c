//! Reporting back to the invoking pipeline, `GITHUB_OUTPUT` style.

use std::{
    fs::OpenOptions,
    io::{self, Write},
    path::Path,
};

use davit_release::RunOutputs;
use tracing::info;

const HEREDOC_DELIMITER: &str = "DAVIT_OUTPUT";

/// Appends one `name=value` line; multi-line values use heredoc framing.
fn append_output(out: &mut impl Write, name: &str, value: &str) -> io::Result<()> {
    if value.contains('\n') {
        writeln!(out, "{name}<<{HEREDOC_DELIMITER}\n{value}\n{HEREDOC_DELIMITER}")
    } else {
        writeln!(out, "{name}={value}")
    }
}

/// Writes the run's outputs to the pipeline's output file.
pub fn write_outputs(path: &Path, outputs: &RunOutputs) -> anyhow::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    append_output(&mut file, "url", &outputs.url)?;
    append_output(&mut file, "id", &outputs.id.to_string())?;
    append_output(&mut file, "upload_url", &outputs.upload_url)?;
    if let Some(assets) = &outputs.assets {
        append_output(&mut file, "assets", &serde_json::to_string(assets)?)?;
    }
    Ok(())
}

/// Fallback when no output file is configured: log the outputs instead.
pub fn log_outputs(outputs: &RunOutputs) {
    info!(url = %outputs.url, id = outputs.id, "release outputs");
    if let Some(assets) = &outputs.assets {
        info!(count = assets.len(), "uploaded assets");
    }
}
