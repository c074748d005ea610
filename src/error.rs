use std::path::PathBuf;
use thiserror::Error;

/// Fatal problems with the command line
#[derive(Error, Debug, PartialEq)]
pub enum ArgsError {
    #[error("Flag {flag} requires a value")]
    MissingValue { flag: String },

    #[error("Invalid value for {flag}: {value} is not a number")]
    InvalidNumber { flag: String, value: String },

    #[error("Scene threshold must be between 0.0 and 1.0, got {value}")]
    ThresholdOutOfRange { value: String },

    #[error("Unexpected argument: {arg}")]
    UnexpectedArgument { arg: String },
}

/// Fatal problems while processing a single input file
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("File does not exist: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("Failed to launch {}", tool.display())]
    ToolLaunch {
        tool: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
