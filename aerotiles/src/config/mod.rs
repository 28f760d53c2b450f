//! User configuration
//!
//! Settings are read from an INI file (default `~/.aerotiles/config.ini`)
//! and converted into the typed configuration of each component.
//!
//! ```ini
//! [source]
//! url_template = https://tiles.example.com/{z}/{x}/{y}.png?path={cycle}/aero/latest
//!
//! [download]
//! parallel_downloads = 8
//! max_retries = 3
//!
//! [pipeline]
//! output_dir = ~/charts
//! ```

mod file;
mod parser;
mod settings;

pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    AiracSettings, ConfigFile, DownloadSettings, PipelineSettings, SourceSettings,
    DEFAULT_DOWNLOAD_TIMEOUT_SECS, DEFAULT_MAX_RETRIES,
};
