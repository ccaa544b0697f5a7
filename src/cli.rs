// cli.rs - Command-line interface configuration
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::core::ColorMode;

#[derive(Parser, Debug, Clone)]
#[command(name = "binviz")]
#[command(about = "Inspect binary files as pixels", long_about = None)]
pub struct Cli {
    /// File to inspect
    pub file: PathBuf,

    /// Pixels per row (defaults to the window width)
    #[arg(long)]
    pub width: Option<u32>,

    /// Rows (defaults to the window height)
    #[arg(long)]
    pub height: Option<u32>,

    /// First byte shown, decimal or 0x-prefixed hex
    #[arg(long, value_parser = parse_offset)]
    pub offset: Option<u64>,

    /// Initial color mode
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// JSON file with start-up settings
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Hide the control panel
    #[arg(long = "no-ui", default_value = "false")]
    pub no_ui: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    Grayscale,
    Thresholding,
    Paletted,
}

impl From<ModeArg> for ColorMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Grayscale => ColorMode::Grayscale,
            ModeArg::Thresholding => ColorMode::default(),
            ModeArg::Paletted => ColorMode::Paletted,
        }
    }
}

pub fn parse_offset(text: &str) -> Result<u64, String> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => text.parse(),
    };
    parsed.map_err(|e| format!("invalid offset '{}': {}", text, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_offset() {
        assert_eq!(parse_offset("4096"), Ok(4096));
        assert_eq!(parse_offset("0x1000"), Ok(4096));
        assert_eq!(parse_offset("0XfF"), Ok(255));
        assert!(parse_offset("1000h").is_err());
        assert!(parse_offset("-1").is_err());
    }

    #[test]
    fn test_full_command_line() {
        let cli = Cli::try_parse_from([
            "binviz", "dump.bin", "--width", "512", "--offset", "0x20", "--mode", "paletted", "--no-ui",
        ])
        .expect("parse");

        assert_eq!(cli.file, PathBuf::from("dump.bin"));
        assert_eq!(cli.width, Some(512));
        assert_eq!(cli.height, None);
        assert_eq!(cli.offset, Some(0x20));
        assert_eq!(cli.mode, Some(ModeArg::Paletted));
        assert!(cli.no_ui);
    }

    #[test]
    fn test_file_is_required() {
        assert!(Cli::try_parse_from(["binviz"]).is_err());
    }
}
