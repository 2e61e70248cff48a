// Copyright © 2024 Folio. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Build script that checks the Rust compiler version.

use std::process;

/// Minimum supported Rust version, kept in sync with `rust-version` in `Cargo.toml`.
const MIN_VERSION: &str = "1.74.0";

fn main() {
    match version_check::is_min_version(MIN_VERSION) {
        Some(true) => {}
        _ => {
            eprintln!(
                "folio requires Rust {} or newer. Please update your toolchain.",
                MIN_VERSION
            );
            process::exit(1);
        }
    }
    println!("cargo:rerun-if-changed=build.rs");
}
