// Copyright (c) 2022 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

use std::env;
use std::fs;
use std::path::Path;
use std::process::Command;

fn main() {
    built::write_built_file().expect("Failed to acquire build-time information");

    let version = git_output(&["describe", "--match", "v[0-9]*", "--tags", "HEAD"])
        .map(|v| v.trim_start_matches('v').to_string())
        .or_else(|| git_output(&["rev-parse", "--short", "HEAD"]));
    let dirty = git_output(&["diff-index", "--name-only", "HEAD", "--"]).is_some();

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR not set by cargo");
    let version = match version {
        Some(v) => format!("Some(\"{v}\")"),
        None => "None".to_string(),
    };
    let dirty = if dirty { "Some(true)" } else { "None" };

    fs::write(
        Path::new(&out_dir).join("git_built.rs"),
        format!(
            "// Git information generated at build time\n\
             pub const GIT_VERSION: Option<&'static str> = {version};\n\
             pub const GIT_DIRTY: Option<bool> = {dirty};\n"
        ),
    )
    .expect("Failed to write git_built.rs");
}

/// Run a git command and return its trimmed output, `None` if git failed or printed nothing.
fn git_output(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
