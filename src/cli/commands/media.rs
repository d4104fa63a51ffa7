//! Media upload CLI arguments.

use clap::{Arg, ArgMatches, Command};

pub const ARG_BASE_URL: &str = "base-url";
pub const ARG_UPLOAD_DIR: &str = "upload-dir";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_BASE_URL)
                .long(ARG_BASE_URL)
                .help("Public base URL used to build media links")
                .env("BLIP_BASE_URL")
                .default_value("http://localhost:8080"),
        )
        .arg(
            Arg::new(ARG_UPLOAD_DIR)
                .long(ARG_UPLOAD_DIR)
                .help("Directory where uploaded media files are stored")
                .env("BLIP_UPLOAD_DIR")
                .default_value("uploads"),
        )
}

pub struct Options {
    pub base_url: String,
    pub upload_dir: String,
}

impl Options {
    #[must_use]
    pub fn parse(matches: &ArgMatches) -> Self {
        let base_url = matches
            .get_one::<String>(ARG_BASE_URL)
            .cloned()
            .unwrap_or_else(|| "http://localhost:8080".to_string());

        let upload_dir = matches
            .get_one::<String>(ARG_UPLOAD_DIR)
            .cloned()
            .unwrap_or_else(|| "uploads".to_string());

        Self {
            base_url,
            upload_dir,
        }
    }
}
