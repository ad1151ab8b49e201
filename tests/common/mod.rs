//! Builds the dummy `oftr_call` libraries of this workspace once per test binary.
#![allow(dead_code)]

use std::path::PathBuf;
use std::process::Command;

use once_cell::sync::Lazy;

pub const FAKE_VERSION: &str = "1.14.0 (abcdef1) <https://github.com/byllyfish/oftr>";

const FIXTURES: &[&str] = &["fakeoftr", "badversion", "empty"];

static FIXTURE_DIR: Lazy<PathBuf> = Lazy::new(|| {
    // A separate target dir keeps this build clear of the lock held by the outer cargo.
    let target_dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("fixtures");
    let cargo = std::env::var("CARGO").unwrap_or_else(|_| "cargo".to_string());
    let mut cmd = Command::new(cargo);
    cmd.arg("build")
        .arg("--manifest-path")
        .arg(concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml"))
        .arg("--target-dir")
        .arg(&target_dir);
    for name in FIXTURES {
        cmd.args(["-p", name]);
    }
    let output = cmd.output().expect("run cargo build for fixture libraries");
    assert!(
        output.status.success(),
        "building fixture libraries failed:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );
    target_dir.join("debug")
});

pub fn fixture(name: &str) -> PathBuf {
    let file = format!("{}{name}{}", std::env::consts::DLL_PREFIX, std::env::consts::DLL_SUFFIX);
    FIXTURE_DIR.join(file)
}
