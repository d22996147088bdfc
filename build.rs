use std::process::Command;
use vergen::{BuildBuilder, Emitter};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let build = BuildBuilder::default().build_timestamp(true).build()?;
    Emitter::default().add_instructions(&build)?.emit()?;

    let git_vars = [
        ("VERGEN_GIT_SHA", &["rev-parse", "HEAD"][..]),
        ("VERGEN_GIT_BRANCH", &["rev-parse", "--abbrev-ref", "HEAD"][..]),
    ];
    for (var, args) in git_vars {
        if let Some(value) = git(args) {
            println!("cargo:rustc-env={var}={value}");
        }
    }

    let dirty = git(&["status", "--porcelain"]).is_some_and(|s| !s.is_empty());
    println!("cargo:rustc-env=VERGEN_GIT_DIRTY={dirty}");

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");
    Ok(())
}

/// Trimmed stdout of a successful git invocation.
fn git(args: &[&str]) -> Option<String> {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
}
