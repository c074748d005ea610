use anyhow::{Context, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, warn};
use std::ffi::OsString;
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

use crate::args::Config;
use crate::error::ProcessError;
use crate::filename::scenes_path;
use crate::files::matching_files;
use crate::scanner::{scan_line, DiagnosticLines};

/// Header row of every results file
pub const CSV_HEADER: &str = "seconds";

/// Runs scene detection over every file matching the configured pattern
pub struct Processor<'a> {
    config: &'a Config,
    stats: ProcessingStats,
}

#[derive(Debug, Default, PartialEq)]
pub struct ProcessingStats {
    pub total_files: usize,
    pub processed: usize,
    pub skipped: usize,
    pub scenes: usize,
}

/// How a single input ended up
#[derive(Debug, PartialEq)]
pub enum FileOutcome {
    /// Results file already existed, nothing was touched
    Skipped,
    /// ffmpeg ran to completion and this many timestamps were written
    Done { scenes: usize },
}

impl<'a> Processor<'a> {
    pub fn new(config: &'a Config) -> Self {
        Processor {
            config,
            stats: ProcessingStats::default(),
        }
    }

    pub fn stats(&self) -> &ProcessingStats {
        &self.stats
    }

    /// Process the matching files one at a time, in directory order.
    /// Any error aborts the remaining files.
    pub fn process_pattern(&mut self) -> Result<()> {
        let files = matching_files(&self.config.pattern)?;
        self.stats.total_files = files.len();

        if files.is_empty() {
            println!("No files match {}", self.config.pattern);
        }

        for file in files {
            let scene_file = SceneFile::new(file)?;
            match scene_file.process(self.config)? {
                FileOutcome::Skipped => self.stats.skipped += 1,
                FileOutcome::Done { scenes } => {
                    self.stats.processed += 1;
                    self.stats.scenes += scenes;
                }
            }
        }

        self.print_summary();
        Ok(())
    }

    fn print_summary(&self) {
        println!();
        println!("=== SCENE DETECTION COMPLETE ===");
        println!("Matching files: {}", self.stats.total_files);
        println!("Processed: {}", self.stats.processed);
        println!("Skipped (results exist): {}", self.stats.skipped);
        println!("Scene changes written: {}", self.stats.scenes);
    }
}

/// One input video and its results file
#[derive(Debug)]
pub struct SceneFile {
    input: PathBuf,
    output: PathBuf,
}

impl SceneFile {
    pub fn new(input: PathBuf) -> Result<Self, ProcessError> {
        if !input.is_file() {
            return Err(ProcessError::InputNotFound { path: input });
        }

        let output = scenes_path(&input);
        Ok(SceneFile { input, output })
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn output_exists(&self) -> bool {
        self.output.exists()
    }

    /// Run ffmpeg over the input and record every reported scene change,
    /// unless a results file is already present
    pub fn process(&self, config: &Config) -> Result<FileOutcome> {
        if self.output_exists() {
            println!("Skipping: {}", self.input.display());
            debug!("Results already present at {}", self.output.display());
            return Ok(FileOutcome::Skipped);
        }

        println!("Processing: {}", self.input.display());
        println!("Results to: {}", self.output.display());

        let mut writer = SceneWriter::create(&self.output)?;
        let scenes = self.run_ffmpeg(config, &mut writer)?;
        // Dropping the writer releases the handle; rows were flushed as written

        debug!("{}: {} scene changes", self.input.display(), scenes);
        Ok(FileOutcome::Done { scenes })
    }

    fn run_ffmpeg<W: Write>(&self, config: &Config, writer: &mut SceneWriter<W>) -> Result<usize> {
        let args = ffmpeg_args(&self.input, config.scene_threshold);
        debug!("Running {} {:?}", config.ffmpeg.display(), args);

        let mut child = Command::new(&config.ffmpeg)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ProcessError::ToolLaunch {
                tool: config.ffmpeg.clone(),
                source,
            })?;

        let stderr = child
            .stderr
            .take()
            .context("ffmpeg stderr was not captured")?;

        let (line_sender, line_receiver) = unbounded::<String>();
        let reader = thread::spawn(move || forward_lines(stderr, line_sender));

        let mut console = io::stdout();
        let scenes = match record_scenes(line_receiver, writer, Some(&mut console)) {
            Ok(scenes) => scenes,
            Err(e) => {
                // Don't leave ffmpeg running behind an aborted run
                if let Err(kill_err) = child.kill() {
                    debug!("Failed to kill ffmpeg: {}", kill_err);
                }
                let _ = child.wait();
                let _ = reader.join();
                return Err(e).with_context(|| format!("Failed to write {}", self.output.display()));
            }
        };

        // Exit status is not inspected; rows written before a crash are kept
        let status = child
            .wait()
            .with_context(|| format!("Failed to wait for {}", config.ffmpeg.display()))?;
        debug!("ffmpeg exited with {}", status);

        if reader.join().is_err() {
            warn!("stderr reader for {} panicked", self.input.display());
        }

        Ok(scenes)
    }
}

/// ffmpeg arguments that print showinfo for each frame past the scene threshold
/// and throw away the decoded output
pub fn ffmpeg_args(input: &Path, scene_threshold: f64) -> Vec<OsString> {
    vec![
        "-hide_banner".into(),
        "-i".into(),
        input.as_os_str().to_os_string(),
        "-filter:v".into(),
        format!("select='gt(scene,{})',showinfo", scene_threshold).into(),
        "-f".into(),
        "null".into(),
        "-".into(),
    ]
}

/// Reader thread body: push each diagnostic line onto the channel until
/// the stream closes
fn forward_lines<R: io::Read>(stream: R, sender: Sender<String>) {
    for line in DiagnosticLines::new(BufReader::new(stream)) {
        match line {
            Ok(line) => {
                if sender.send(line).is_err() {
                    break; // Receiver has gone away
                }
            }
            Err(e) => {
                warn!("Failed to read ffmpeg output: {}", e);
                break;
            }
        }
    }
}

/// Scan diagnostic lines as they arrive and write each timestamp found,
/// echoing progress to `console` when given. Returns the number of rows written.
pub fn record_scenes<W: Write>(
    lines: Receiver<String>,
    writer: &mut SceneWriter<W>,
    mut console: Option<&mut dyn Write>,
) -> io::Result<usize> {
    let mut scenes = 0;

    for line in lines {
        if let Some(console) = console.as_deref_mut() {
            echo(console, format_args!("{}\r", line));
        }

        if let Some(seconds) = scan_line(&line) {
            writer.record(seconds)?;
            scenes += 1;

            if let Some(console) = console.as_deref_mut() {
                echo(console, format_args!("\n    ==>{}<==\n\n", seconds));
            }
        }
    }

    Ok(scenes)
}

/// Write and flush right away so `\r` progress lines show up live
fn echo(console: &mut dyn Write, text: fmt::Arguments) {
    if let Err(e) = console.write_fmt(text).and_then(|_| console.flush()) {
        debug!("Failed to echo to console: {}", e);
    }
}

/// Results file: header first, then one flushed row per scene
pub struct SceneWriter<W: Write = BufWriter<File>> {
    out: W,
}

impl SceneWriter {
    /// Create (or truncate) the results file at `path`
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        Self::new(BufWriter::new(file))
            .with_context(|| format!("Failed to write header to {}", path.display()))
    }
}

impl<W: Write> SceneWriter<W> {
    pub fn new(mut out: W) -> io::Result<Self> {
        writeln!(out, "{}", CSV_HEADER)?;
        out.flush()?;
        Ok(SceneWriter { out })
    }

    pub fn record(&mut self, seconds: &str) -> io::Result<()> {
        writeln!(self.out, "{}", seconds)?;
        self.out.flush()
    }
}
