use std::process::Command;

fn command_output(program: &str, args: &[&str]) -> String {
    Command::new(program)
        .args(args)
        .output()
        .ok()
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

fn main() {
    let git_hash = command_output("git", &["rev-parse", "--short", "HEAD"]);
    let build_time = command_output("date", &["-u", "+%Y-%m-%dT%H:%M:%SZ"]);

    println!("cargo:rustc-env=GIT_HASH={}", git_hash);
    println!("cargo:rustc-env=BUILD_TIME={}", build_time);

    let version = std::env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "0.0.0".to_string());
    let long_version = format!("{} ({} {})", version, git_hash, build_time);
    println!("cargo:rustc-env=LONG_VERSION={}", long_version);

    println!("cargo:rerun-if-changed=.git/HEAD");
    // Embedded by rust-embed and static_toml.
    println!("cargo:rerun-if-changed=fixtures");
    println!("cargo:rerun-if-changed=config.toml");
}
