use anyhow::{bail, Context, Result};
use glob::{MatchOptions, Pattern};
use log::warn;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Split a pattern into an absolute directory and a file name pattern.
/// Without a directory component the current working directory is used.
pub fn split_pattern(pattern: &str) -> Result<(PathBuf, String)> {
    let path = Path::new(pattern);

    let file_pattern = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let directory = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => cwd.join(dir),
        _ => cwd,
    };

    Ok((directory, file_pattern))
}

/// List the files directly inside the pattern's directory whose names match
/// its wildcard file name, in directory order
pub fn matching_files(pattern: &str) -> Result<Vec<PathBuf>> {
    let (directory, file_pattern) = split_pattern(pattern)?;
    let name_glob = name_pattern(&file_pattern)?;

    if !directory.is_dir() {
        bail!("Directory does not exist: {}", directory.display());
    }

    let mut files = Vec::new();

    for entry_result in WalkDir::new(&directory)
        .max_depth(1)
        .min_depth(1)
        .into_iter()
    {
        let entry = match entry_result {
            Ok(e) => e,
            Err(err) => {
                match err.path() {
                    Some(path) => warn!("Failed to access {}: {}", path.display(), err),
                    None => warn!("Failed to read directory entry: {}", err),
                }
                continue;
            }
        };

        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if name_glob.matches_with(&name, NAME_MATCH) {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}

/// Wildcard options for file names: `*` and `?` also match a leading dot,
/// and case only matters off Windows
pub const NAME_MATCH: MatchOptions = MatchOptions {
    case_sensitive: !cfg!(windows),
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Compile the file name part of a pattern
pub fn name_pattern(file_pattern: &str) -> Result<Pattern> {
    Pattern::new(file_pattern).with_context(|| format!("Invalid file pattern: {}", file_pattern))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn wildcard_match(pattern: &str, name: &str) -> bool {
        name_pattern(pattern).unwrap().matches_with(name, NAME_MATCH)
    }

    #[test]
    fn test_wildcard_star() {
        assert!(wildcard_match("*.mp4", "movie.mp4"));
        assert!(wildcard_match("*.mp4", ".mp4"));
        assert!(wildcard_match("*", "anything"));
        assert!(wildcard_match("a*b*c", "aXXbYYc"));
        assert!(wildcard_match("a*c", "abcbc"));
        assert!(!wildcard_match("*.mp4", "movie.mkv"));
        assert!(!wildcard_match("*.mp4", "movie.mp4.part"));
    }

    #[test]
    fn test_wildcard_question_mark() {
        assert!(wildcard_match("clip?.mov", "clip1.mov"));
        assert!(!wildcard_match("clip?.mov", "clip.mov"));
        assert!(!wildcard_match("clip?.mov", "clip12.mov"));
    }

    #[test]
    fn test_wildcard_literal() {
        assert!(wildcard_match("movie.mp4", "movie.mp4"));
        assert!(!wildcard_match("movie.mp4", "movie.mp"));
        assert!(!wildcard_match("", "movie.mp4"));
    }

    #[test]
    fn test_unclosed_bracket_is_rejected() {
        assert!(name_pattern("clip[.mp4").is_err());

        let tmp = TempDir::new().unwrap();
        let pattern = tmp.path().join("clip[.mp4");
        assert!(matching_files(pattern.to_str().unwrap()).is_err());
    }

    #[test]
    fn test_split_pattern_without_directory_uses_cwd() {
        let (dir, file) = split_pattern("*.mp4").unwrap();
        assert_eq!(dir, std::env::current_dir().unwrap());
        assert_eq!(file, "*.mp4");
    }

    #[test]
    fn test_split_pattern_with_directory() {
        let tmp = TempDir::new().unwrap();
        let pattern = tmp.path().join("*.mov");
        let (dir, file) = split_pattern(pattern.to_str().unwrap()).unwrap();
        assert_eq!(dir, tmp.path());
        assert_eq!(file, "*.mov");

        let (dir, _) = split_pattern("videos/*.mov").unwrap();
        assert!(dir.is_absolute());
        assert!(dir.ends_with("videos"));
    }

    #[test]
    fn test_matching_files_filters_by_pattern() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.mp4"), b"").unwrap();
        fs::write(tmp.path().join("b.mp4"), b"").unwrap();
        fs::write(tmp.path().join("a scenes.csv"), b"seconds\n").unwrap();
        fs::create_dir(tmp.path().join("nested.mp4")).unwrap();
        fs::write(tmp.path().join("nested.mp4").join("c.mp4"), b"").unwrap();

        let pattern = tmp.path().join("*.mp4");
        let mut files = matching_files(pattern.to_str().unwrap()).unwrap();
        files.sort();

        assert_eq!(
            files,
            vec![tmp.path().join("a.mp4"), tmp.path().join("b.mp4")]
        );
    }

    #[test]
    fn test_matching_files_empty_match() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.mkv"), b"").unwrap();

        let pattern = tmp.path().join("*.mp4");
        assert!(matching_files(pattern.to_str().unwrap()).unwrap().is_empty());
    }

    #[test]
    fn test_matching_files_missing_directory() {
        let tmp = TempDir::new().unwrap();
        let pattern = tmp.path().join("missing").join("*.mp4");
        assert!(matching_files(pattern.to_str().unwrap()).is_err());
    }
}
