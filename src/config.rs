use crate::error::ConfigError;
use crate::settings::{
    DEFAULT_COLUMN_WIDTH, DEFAULT_SPARE_COLUMNS, DEFAULT_SPARE_ROWS, GridSettings, Matrix,
};
use clap::Parser;
use std::path::PathBuf;

/// Runtime configuration of the shell, from the command line or environment.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "datable")]
#[command(about = "Serve a spreadsheet grid backed by a single state store", long_about = None)]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "DATABLE_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "DATABLE_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Directory served under /static
    #[arg(long, env = "DATABLE_STATIC_DIR", default_value = "static")]
    pub static_dir: PathBuf,

    /// Default column width in pixels
    #[arg(long, default_value_t = DEFAULT_COLUMN_WIDTH)]
    pub column_width: u32,

    /// Blank rows kept below the data
    #[arg(long, default_value_t = DEFAULT_SPARE_ROWS)]
    pub spare_rows: u32,

    /// Blank columns kept right of the data
    #[arg(long, default_value_t = DEFAULT_SPARE_COLUMNS)]
    pub spare_cols: u32,

    /// Start with the grid read-only
    #[arg(long)]
    pub read_only: bool,

    /// Location the history starts at
    #[arg(long, default_value = "/")]
    pub initial_path: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: "127.0.0.1".to_string(),
            port: 3000,
            static_dir: PathBuf::from("static"),
            column_width: DEFAULT_COLUMN_WIDTH,
            spare_rows: DEFAULT_SPARE_ROWS,
            spare_cols: DEFAULT_SPARE_COLUMNS,
            read_only: false,
            initial_path: "/".to_string(),
            verbose: false,
        }
    }
}

impl Config {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.column_width == 0 {
            return Err(ConfigError::InvalidValue {
                field: "column_width",
                reason: "must be greater than zero".to_string(),
            });
        }
        if !self.initial_path.starts_with('/') {
            return Err(ConfigError::InvalidValue {
                field: "initial_path",
                reason: format!("'{}' does not start with '/'", self.initial_path),
            });
        }
        Ok(())
    }

    /// Initial grid settings seeded with `data`.
    pub fn grid_settings(&self, data: Matrix) -> GridSettings {
        GridSettings {
            read_only: self.read_only,
            column_width: self.column_width,
            spare_row_count: self.spare_rows,
            spare_column_count: self.spare_cols,
            ..GridSettings::with_data(data)
        }
    }
}
