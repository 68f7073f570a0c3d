use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::cli_runner::RunOptions;
use crate::transcode::DEFAULT_ENCODING;

/// Environment variable consulted when `--password` is not given.
pub const PASSWORD_ENV: &str = "SJZIP_PASSWORD";

/// Create a (password-protected) zip file whose names survive Shift_JIS-only tools.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// The directory to zip. The archive is written next to it as `<directory>.zip`.
    #[arg(required = true)]
    pub input_directory: PathBuf,

    /// The password to encrypt the zip file with. Falls back to the SJZIP_PASSWORD environment variable.
    #[arg(short, long)]
    pub password: Option<String>,

    /// Generate a random password of this length and print it. Ignored when a password is given.
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub length_of_password: Option<u32>,

    /// Additional glob pattern of names to leave out (repeatable). Always excluded: *.DS_Store, __MACOSX.
    #[arg(short, long = "exclude", value_name = "GLOB")]
    pub excludes: Vec<String>,

    /// Legacy encoding every name must be representable in.
    #[arg(long, default_value = DEFAULT_ENCODING)]
    pub encoding: String,

    /// Directory to stage files in. Defaults to the system temporary directory.
    #[arg(long, value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Increase log output on stderr (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Library-level options for this invocation. The password environment fallback is applied here.
    pub fn to_run_options(&self) -> RunOptions {
        RunOptions {
            input: self.input_directory.clone(),
            password: get_password_from_opt_or_env(self.password.clone()),
            password_length: self.length_of_password.map(|n| n as usize),
            excludes: self.excludes.clone(),
            encoding: self.encoding.clone(),
            temp_dir: self.temp_dir.clone(),
        }
    }
}

/// Gets the password from the command-line option or the `SJZIP_PASSWORD` environment variable.
///
/// Priority:
/// 1. `--password` command-line argument.
/// 2. `SJZIP_PASSWORD` environment variable (ignored when empty).
/// 3. `None`, leaving generation or a plain archive to the caller.
pub fn get_password_from_opt_or_env(password_opt: Option<String>) -> Option<String> {
    if let Some(pass) = password_opt {
        return Some(pass);
    }
    match std::env::var(PASSWORD_ENV) {
        Ok(pass) if !pass.is_empty() => Some(pass),
        _ => None,
    }
}

/// Parses command-line arguments using `clap`.
pub fn run() -> Args {
    Args::parse()
}
