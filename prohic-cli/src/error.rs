//! Error handling for ProHiC CLI

use prohic_core::colormap::ColormapError;
use prohic_core::io::SourceError;
use prohic_core::ProhicError;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for ProHiC CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Input/Output error: {message}")]
    Io { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    #[error("Parsing error in {file}: {message}")]
    Parse { file: String, message: String },

    #[error("Missing feature: {message}")]
    Feature { message: String },

    #[error("Unknown colormap: {name}")]
    Colormap { name: String },

    #[error("Validation error: {message}")]
    Validation { message: String },
}

impl CliError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io { message: message.into() }
    }

    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    pub fn invalid_format<S: Into<String>>(message: S) -> Self {
        Self::InvalidFormat { message: message.into() }
    }

    pub fn parse<S: Into<String>>(file: S, message: S) -> Self {
        Self::Parse {
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation { message: message.into() }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}

impl From<toml::de::Error> for CliError {
    fn from(err: toml::de::Error) -> Self {
        Self::config(format!("TOML parsing error: {}", err))
    }
}

impl From<ProhicError> for CliError {
    fn from(err: ProhicError) -> Self {
        match err {
            ProhicError::Source(SourceError::Io(io)) => io.into(),
            ProhicError::Source(SourceError::Unrecognized { path }) => {
                Self::invalid_format(format!("unrecognized contact map: {}", path.display()))
            }
            ProhicError::Source(SourceError::Parse { path, line, message }) => {
                Self::parse(path.display().to_string(), format!("line {}: {}", line, message))
            }
            ProhicError::Source(SourceError::FeatureDisabled { path, feature }) => Self::Feature {
                message: format!("{} needs the '{}' feature", path.display(), feature),
            },
            ProhicError::Colormap(ColormapError::Unknown(name)) => Self::Colormap { name },
            ProhicError::UnsupportedTrack { path } => {
                Self::invalid_format(format!("unsupported track file: {}", path.display()))
            }
            other => Self::validation(other.to_string()),
        }
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Provide helpful error messages and suggestions
pub fn format_error_with_suggestions(error: &CliError) -> String {
    let mut message = error.to_string();

    // Add helpful suggestions based on error type
    match error {
        CliError::FileNotFound { path } => {
            message.push_str(&format!(
                "\n\nSuggestions:\n\
                 • Check that the file path is correct: {}\n\
                 • Ensure you have read permissions for the file",
                path.display()
            ));
        }

        CliError::InvalidFormat { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Contact maps: .mcool, .cool, .np, .txt, .tsv, .matrix (optionally .gz)\n\
                 • Tracks: .bed, .gff, .gff2, .gff3, .bedgraph (optionally .gz)"
            );
        }

        CliError::Feature { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Rebuild with: cargo install prohic-cli --features cooler\n\
                 • Or export the matrix to a text format first"
            );
        }

        CliError::Colormap { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Run 'prohic colormaps' to list the available names"
            );
        }

        CliError::Config { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Check your prohic.toml configuration file\n\
                 • Use 'prohic config --example' to generate a sample configuration"
            );
        }

        _ => {}
    }

    message
}

/// Print error with helpful suggestions and exit
pub fn print_error_and_exit(error: &CliError) -> ! {
    eprintln!("Error: {}", format_error_with_suggestions(error));
    std::process::exit(1);
}
