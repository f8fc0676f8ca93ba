use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use ezhlog_core::{LayoutId, decode_dump_file};

fn main() -> ExitCode {
    if let Err(err) = run() {
        eprintln!("error: {}", err);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn run() -> Result<(), String> {
    let root = PathBuf::from("tests").join("golden");
    let entries =
        fs::read_dir(&root).map_err(|err| format!("failed to read {}: {}", root.display(), err))?;

    for entry in entries {
        let entry = entry.map_err(|err| format!("failed to read entry: {}", err))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let input = path.join("input.ezh");
        if !input.exists() {
            continue;
        }
        let layout = layout_for_case(&path)?;
        let output = path.join("expected_report.json");
        regenerate_one(&input, &output, layout)?;
    }

    Ok(())
}

// Case directories are named `<layout>_<scenario>`.
fn layout_for_case(dir: &Path) -> Result<LayoutId, String> {
    let name = dir
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| format!("unreadable case directory: {}", dir.display()))?;
    let tag = name.split('_').next().unwrap_or(name);
    tag.parse().map_err(|err| format!("case '{}': {}", name, err))
}

fn regenerate_one(input: &Path, output: &Path, layout: LayoutId) -> Result<(), String> {
    let report = decode_dump_file(input, Some(layout))
        .map_err(|err| format!("decode failed for {}: {}", input.display(), err))?;
    let json = serde_json::to_string(&report)
        .map_err(|err| format!("JSON serialization failed: {}", err))?;
    fs::write(output, json)
        .map_err(|err| format!("failed to write {}: {}", output.display(), err))?;
    Ok(())
}
