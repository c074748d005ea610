use std::path::{Path, PathBuf};

/// Appended to the input's base name to form the results file name
pub const OUTPUT_SUFFIX: &str = " scenes.csv";

/// Results path for an input: same directory, `<stem> scenes.csv`
pub fn scenes_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let dir = input.parent().unwrap_or_else(|| Path::new(""));
    dir.join(format!("{}{}", stem, OUTPUT_SUFFIX))
}
