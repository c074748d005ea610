use std::path::PathBuf;

use crate::error::ArgsError;

pub const USAGE: &str = "Syntax: detect_scenes <filename> [-sceneThreshold <0.0-1.0>] [-ffmpeg <path>]
   Filename should be a video file such as .mp4.
   Wildcards are acceptable.
   -sceneThreshold  Scene change sensitivity (default 0.4).
   -ffmpeg          Path to the ffmpeg executable (default: ffmpeg on PATH).";

pub const DEFAULT_SCENE_THRESHOLD: f64 = 0.4;
pub const DEFAULT_FFMPEG: &str = "ffmpeg";

const HELP_FLAGS: &[&str] = &["-h", "-?", "-help", "/h", "/?"];
const THRESHOLD_FLAG: &str = "-scenethreshold";
const FFMPEG_FLAG: &str = "-ffmpeg";

/// Settings for one run, fixed once parsed
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory plus wildcard file name, e.g. `videos/*.mp4`
    pub pattern: String,
    pub scene_threshold: f64,
    pub ffmpeg: PathBuf,
}

/// What the command line asked for
#[derive(Debug, PartialEq)]
pub enum Command {
    Run(Config),
    /// Help was requested or no file pattern was given
    Usage,
}

impl Command {
    /// Parse the process command line
    pub fn parse() -> Result<Self, ArgsError> {
        Self::parse_from(std::env::args().skip(1))
    }

    /// Parse arguments, excluding the program name
    pub fn parse_from<I, S>(args: I) -> Result<Self, ArgsError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args = args.into_iter().map(Into::into);

        let mut pattern: Option<String> = None;
        let mut scene_threshold = DEFAULT_SCENE_THRESHOLD;
        let mut ffmpeg = PathBuf::from(DEFAULT_FFMPEG);

        while let Some(arg) = args.next() {
            let flag = arg.to_lowercase();

            if HELP_FLAGS.contains(&flag.as_str()) {
                return Ok(Command::Usage);
            }

            if flag == THRESHOLD_FLAG {
                let value = args.next().ok_or_else(|| ArgsError::MissingValue { flag: arg.clone() })?;
                scene_threshold = parse_threshold(&arg, &value)?;
            } else if flag == FFMPEG_FLAG {
                let value = args.next().ok_or_else(|| ArgsError::MissingValue { flag: arg.clone() })?;
                ffmpeg = PathBuf::from(value);
            } else if pattern.is_none() {
                pattern = Some(arg);
            } else {
                return Err(ArgsError::UnexpectedArgument { arg });
            }
        }

        Ok(match pattern {
            Some(pattern) => Command::Run(Config {
                pattern,
                scene_threshold,
                ffmpeg,
            }),
            None => Command::Usage,
        })
    }
}

fn parse_threshold(flag: &str, value: &str) -> Result<f64, ArgsError> {
    let threshold: f64 = value.trim().parse().map_err(|_| ArgsError::InvalidNumber {
        flag: flag.to_string(),
        value: value.to_string(),
    })?;

    // NaN fails the range check too
    if !(0.0..=1.0).contains(&threshold) {
        return Err(ArgsError::ThresholdOutOfRange {
            value: value.to_string(),
        });
    }

    Ok(threshold)
}
