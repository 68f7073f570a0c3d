//! # sjzip Core Library
//!
//! This crate packs a directory into a single zip archive whose file names are guaranteed to be
//! representable in a legacy encoding (Shift_JIS by default), for recipients whose extraction
//! tools assume that encoding.
//!
//! It is designed to be used by the `sjzip` command-line application, but [`cli_runner::run`]
//! and the building blocks below can be used directly.
//!
//! ## Key Modules
//!
//! - [`transcode`]: Sanitizes names and checks they survive the legacy encoding.
//! - [`exclude`]: Glob-based exclusion of names such as `.DS_Store`.
//! - [`password`]: Password generation and the explicit/generated/none decision.
//! - [`staging`]: The disposable staging directory and its cleanup guard.
//! - [`mirror`]: Depth-limited copy of the input into the staging directory under new names.
//! - [`archive`]: Writes the staged tree into a (ZipCrypto-encrypted) zip file.
//! - [`cli_runner`]: Sequences all of the above.
//!
//! ## Examples
//!
//! ```no_run
//! use sjzip::cli_runner::{run, RunOptions};
//!
//! let mut opts = RunOptions::new("/tmp/photos");
//! opts.password_length = Some(12);
//! let outcome = run(&opts, None)?;
//! println!("{} (password {:?})", outcome.archive.display(), outcome.password.generated());
//! # Ok::<(), sjzip::ArchiverError>(())
//! ```

pub mod archive;
pub mod cli;
pub mod cli_runner;
pub mod error;
pub use error::ArchiverError;

pub mod exclude;
pub mod mirror;
pub mod password;
pub mod progress;
pub mod staging;
pub mod transcode;

// Path-aware filesystem helpers
pub mod fsx;
