// Copyright © 2024 Folio. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Output Generators
//!
//! The build stages that touch the filesystem, in the order a build runs them:
//!
//! - [`output`]: resets the output root
//! - [`assets`]: copies the static asset tree
//! - [`pages`]: renders and writes each page

/// Static asset copying.
pub mod assets;

/// Output directory reset.
pub mod output;

/// Build targets and page rendering.
pub mod pages;

pub use assets::copy_assets;
pub use output::reset_output_dir;
pub use pages::{build_page, build_targets, BuildTarget, Page};
