//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::journey::JourneyId;

/// Record command arguments.
#[derive(Debug, Clone, Copy, Args)]
pub struct RecordCommand {
    /// Latitude of the current position
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude of the current position
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Label positions with coordinates instead of querying the postcode service
    #[arg(long)]
    pub offline: bool,
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Journey id
    pub id: i64,

    /// Text layout to print
    #[arg(long, value_enum, default_value = "file")]
    pub variant: VariantArg,
}

/// Delete command arguments.
#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// Journey id
    pub id: i64,
}

/// Export command arguments.
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// Journey id
    pub id: i64,

    /// Copy the share text to the clipboard
    #[arg(short, long)]
    pub share: bool,

    /// Save the file text as journey-<date>.txt
    #[arg(short, long)]
    pub file: bool,

    /// Directory to save into (overrides export.directory)
    #[arg(short, long, value_name = "DIR", requires = "file")]
    pub dir: Option<PathBuf>,
}

impl ShowCommand {
    /// The requested journey id.
    #[must_use]
    pub fn journey_id(&self) -> JourneyId {
        JourneyId(self.id)
    }
}

impl DeleteCommand {
    /// The requested journey id.
    #[must_use]
    pub fn journey_id(&self) -> JourneyId {
        JourneyId(self.id)
    }
}

impl ExportCommand {
    /// The requested journey id.
    #[must_use]
    pub fn journey_id(&self) -> JourneyId {
        JourneyId(self.id)
    }
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Export layout argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum VariantArg {
    /// Normalized clipboard text
    Share,
    /// Downloaded file text
    #[default]
    File,
}

impl From<VariantArg> for crate::export::ExportVariant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Share => Self::Share,
            VariantArg::File => Self::File,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ExportVariant;

    #[test]
    fn test_variant_arg_conversion() {
        assert_eq!(ExportVariant::from(VariantArg::Share), ExportVariant::Share);
        assert_eq!(ExportVariant::from(VariantArg::File), ExportVariant::File);
    }

    #[test]
    fn test_variant_arg_default() {
        assert_eq!(VariantArg::default(), VariantArg::File);
    }

    #[test]
    fn test_record_command_debug() {
        let cmd = RecordCommand {
            lat: Some(51.5),
            lon: Some(-0.14),
            offline: true,
        };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("offline"));
        assert!(debug_str.contains("51.5"));
    }

    #[test]
    fn test_journey_ids() {
        assert_eq!(ShowCommand { id: 7, variant: VariantArg::File }.journey_id(), JourneyId(7));
        assert_eq!(DeleteCommand { id: 8 }.journey_id(), JourneyId(8));
        let export = ExportCommand {
            id: 9,
            share: false,
            file: true,
            dir: None,
        };
        assert_eq!(export.journey_id(), JourneyId(9));
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Show"));
    }
}
