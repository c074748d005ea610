use std::io::{self, BufRead};

/// Marker that precedes a frame's presentation time in showinfo output
pub const PTS_MARKER: &str = "pts_time:";

/// Extract the presentation time following `pts_time:` in a diagnostic line.
///
/// The digits and dots after the marker are returned verbatim, without any
/// numeric validation. A marker at the very start of the line is ignored.
pub fn scan_line(line: &str) -> Option<&str> {
    let index = line.find(PTS_MARKER)?;
    if index == 0 {
        return None;
    }

    let rest = &line[index + PTS_MARKER.len()..];
    let end = rest
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(rest.len());

    Some(&rest[..end])
}

/// Splits a diagnostic stream into lines on `\n`, `\r` or `\r\n`.
///
/// ffmpeg redraws its progress line with a bare carriage return, so plain
/// `BufRead::lines` would glue many updates together. Empty lines are skipped.
pub struct DiagnosticLines<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: BufRead> DiagnosticLines<R> {
    pub fn new(reader: R) -> Self {
        DiagnosticLines {
            reader,
            buf: Vec::new(),
        }
    }

    fn next_line(&mut self) -> io::Result<Option<String>> {
        loop {
            self.buf.clear();

            // Read up to the next terminator of either kind
            loop {
                let available = self.reader.fill_buf()?;
                if available.is_empty() {
                    break;
                }

                match available.iter().position(|&b| b == b'\n' || b == b'\r') {
                    Some(pos) => {
                        self.buf.extend_from_slice(&available[..pos]);
                        self.reader.consume(pos + 1);
                        break;
                    }
                    None => {
                        let len = available.len();
                        self.buf.extend_from_slice(available);
                        self.reader.consume(len);
                    }
                }
            }

            if !self.buf.is_empty() {
                return Ok(Some(String::from_utf8_lossy(&self.buf).into_owned()));
            }

            // Either an empty line (e.g. the `\n` of `\r\n`) or end of stream
            if self.reader.fill_buf()?.is_empty() {
                return Ok(None);
            }
        }
    }
}

impl<R: BufRead> Iterator for DiagnosticLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line().transpose()
    }
}
