use anyhow::{Context, Result};
use serde_json::json;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::EngineArgs;

/// Write `<stem>.run.json` next to `artifact`: engine version, input label,
/// engine flags and the artifact path.
pub fn write_sidecar(artifact: &Path, input: &str, args: &EngineArgs) -> Result<PathBuf> {
    let path = sidecar_path(artifact);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating sidecar dir {}", parent.display()))?;
        }
    }
    let doc = json!({
        "engine_version": descent::VERSION,
        "input": input,
        "flags": {
            "exploit_automs": args.exploit_automs,
            "strict": args.strict,
            "bigint": args.bigint,
            "threads": args.threads,
            "mode": args.mode.map(|m| format!("{m:?}").to_lowercase()),
        },
        "outputs": [artifact.to_string_lossy()]
    });
    fs::write(&path, serde_json::to_vec_pretty(&doc)?)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

fn sidecar_path(artifact: &Path) -> PathBuf {
    let mut name = artifact
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| OsString::from("report"));
    name.push(".run.json");
    artifact.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tempfile::tempdir;

    #[test]
    fn sidecar_path_replaces_extension() {
        let derived = sidecar_path(Path::new("/tmp/out/cube4.json"));
        assert_eq!(derived, Path::new("/tmp/out/cube4.run.json"));
    }

    #[test]
    fn sidecar_records_flags() {
        let dir = tempdir().unwrap();
        let artifact = dir.path().join("r.json");
        fs::write(&artifact, "{}").unwrap();
        let args = EngineArgs {
            strict: true,
            threads: Some(3),
            ..EngineArgs::default()
        };
        let path = write_sidecar(&artifact, "cube:3", &args).unwrap();
        let parsed: Value = serde_json::from_slice(&fs::read(path).unwrap()).unwrap();
        assert_eq!(parsed["input"], "cube:3");
        assert_eq!(parsed["flags"]["strict"], true);
        assert_eq!(parsed["flags"]["threads"], 3);
        assert_eq!(parsed["outputs"][0], artifact.to_string_lossy().as_ref());
    }
}
