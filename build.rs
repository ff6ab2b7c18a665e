use std::fs;

// Keeps the VERSION file and the crate version in lockstep.
fn main() {
    let recorded = fs::read_to_string("VERSION")
        .expect("VERSION file not found - run: echo \"$CARGO_PKG_VERSION\" > VERSION");
    let recorded = recorded.trim();
    let package = env!("CARGO_PKG_VERSION");

    if recorded != package {
        panic!(
            "\n\nrenewable version mismatch\n  VERSION:    {}\n  Cargo.toml: {}\n\n",
            recorded, package
        );
    }

    println!("cargo:rerun-if-changed=VERSION");
}
