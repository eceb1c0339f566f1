use std::fmt;
use std::fs;
use std::path::Path;
use anyhow::{Result, Context, anyhow};
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{AppError, EncodingError, SubtitleError};

// @module: SubRip document model, parsing and serialization

// @const: SRT timestamp line, tolerating '.' separators, any hour width and trailing coordinates
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d+):(\d{2}):(\d{2})[,.](\d{1,3})\s*-->\s*(\d+):(\d{2}):(\d{2})[,.](\d{1,3})").unwrap()
});

// @const: Bare index line
static INDEX_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\d+\s*$").unwrap()
});

// @struct: Single subtitle entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    // @field: Sequence number (1-based position in the document)
    pub seq_num: usize,

    // @field: Start time in ms
    pub start_time_ms: u64,

    // @field: End time in ms
    pub end_time_ms: u64,

    // @field: Subtitle text, lines joined with '\n'
    pub text: String,
}

impl SubtitleEntry {
    /// Creates a new subtitle entry
    pub fn new(seq_num: usize, start_time_ms: u64, end_time_ms: u64, text: String) -> Self {
        SubtitleEntry {
            seq_num,
            start_time_ms,
            end_time_ms,
            text,
        }
    }

    /// Parse an SRT timestamp (`HH:MM:SS,mmm` or `HH:MM:SS.mmm`) to milliseconds
    pub fn parse_timestamp(timestamp: &str) -> Result<u64> {
        let parts: Vec<&str> = timestamp.trim().split(&[':', ',', '.'][..]).collect();

        if parts.len() != 4 {
            return Err(anyhow!("Invalid timestamp format: {}", timestamp));
        }

        let hours: u64 = parts[0].parse().context("Failed to parse hours")?;
        let minutes: u64 = parts[1].parse().context("Failed to parse minutes")?;
        let seconds: u64 = parts[2].parse().context("Failed to parse seconds")?;
        let millis = parse_millis(parts[3])?;

        if minutes >= 60 || seconds >= 60 {
            return Err(anyhow!("Invalid time components in timestamp: {}", timestamp));
        }

        Ok(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
    }

    /// Convert start time to formatted SRT timestamp
    pub fn format_start_time(&self) -> String {
        Self::format_timestamp(self.start_time_ms)
    }

    /// Convert end time to formatted SRT timestamp
    pub fn format_end_time(&self) -> String {
        Self::format_timestamp(self.end_time_ms)
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.seq_num)?;
        writeln!(f, "{} --> {}", self.format_start_time(), self.format_end_time())?;
        // A blank line inside the text would terminate the block
        for line in self.text.lines().filter(|line| !line.trim().is_empty()) {
            writeln!(f, "{}", line.trim_end())?;
        }
        writeln!(f)
    }
}

/// Milliseconds field with one to three digits; ",5" means 500 ms
fn parse_millis(digits: &str) -> Result<u64> {
    if digits.is_empty() || digits.len() > 3 {
        return Err(anyhow!("Invalid milliseconds: {}", digits));
    }
    let value: u64 = digits.parse().context("Failed to parse milliseconds")?;
    Ok(value * 10u64.pow(3 - digits.len() as u32))
}

/// Parse the captures of a timestamp line into (start, end) milliseconds
fn parse_timestamp_line(line: &str) -> Option<(u64, u64)> {
    let caps = TIMESTAMP_REGEX.captures(line)?;
    let at = |start: usize| -> Option<u64> {
        let hours: u64 = caps.get(start)?.as_str().parse().ok()?;
        let minutes: u64 = caps.get(start + 1)?.as_str().parse().ok()?;
        let seconds: u64 = caps.get(start + 2)?.as_str().parse().ok()?;
        let millis = parse_millis(caps.get(start + 3)?.as_str()).ok()?;
        if minutes >= 60 || seconds >= 60 {
            return None;
        }
        Some((hours * 3600 + minutes * 60 + seconds) * 1000 + millis)
    };
    Some((at(1)?, at(5)?))
}

/// Decode raw bytes, detecting the encoding
///
/// A byte order mark wins; otherwise strict UTF-8 is tried and windows-1252
/// is used as the fallback, so decoding itself never fails.
pub fn decode_bytes(raw: &[u8]) -> (String, &'static Encoding) {
    if let Some((encoding, bom_len)) = Encoding::for_bom(raw) {
        let (text, had_errors) = encoding.decode_without_bom_handling(&raw[bom_len..]);
        if had_errors {
            warn!("Input marked as {} contains invalid sequences, replaced", encoding.name());
        }
        return (text.into_owned(), encoding);
    }

    match std::str::from_utf8(raw) {
        Ok(text) => (text.to_string(), UTF_8),
        Err(_) => {
            let error = EncodingError {
                encoding: UTF_8.name().to_string(),
                fallback: WINDOWS_1252.name().to_string(),
            };
            warn!("{}", error);
            let (text, _, _) = WINDOWS_1252.decode(raw);
            (text.into_owned(), WINDOWS_1252)
        }
    }
}

/// Parsed SubRip document
#[derive(Debug, Clone)]
pub struct SubtitleDocument {
    /// Entries in file order
    entries: Vec<SubtitleEntry>,

    /// Encoding the input was decoded with
    encoding: &'static Encoding,

    /// Number of raw blocks dropped because they had no valid timestamp line
    skipped_blocks: usize,
}

impl SubtitleDocument {
    /// Build a document from entries, renumbering them 1..N
    pub fn from_entries(entries: Vec<SubtitleEntry>) -> Self {
        let mut document = Self {
            entries,
            encoding: UTF_8,
            skipped_blocks: 0,
        };
        document.renumber();
        document
    }

    /// Read and parse an SRT file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let path = path.as_ref();
        let raw = fs::read(path).map_err(|e| AppError::fatal_io(path, e))?;
        Ok(Self::parse(&raw))
    }

    /// Parse raw SRT bytes
    ///
    /// Malformed blocks are skipped and counted rather than failing the whole
    /// document. Missing or out-of-sequence index numbers are tolerated; the
    /// entries are renumbered by position.
    pub fn parse(raw: &[u8]) -> Self {
        let (content, encoding) = decode_bytes(raw);
        let content = content.replace("\r\n", "\n").replace('\r', "\n");

        let mut entries = Vec::new();
        let mut skipped_blocks = 0;
        let mut chunk: Vec<&str> = Vec::new();
        let mut block_no = 0;

        let lines = content.lines().chain(std::iter::once(""));
        for line in lines {
            if line.trim().is_empty() {
                if !chunk.is_empty() {
                    block_no += 1;
                    if let Err(e) = Self::parse_chunk(&chunk, block_no, &mut entries) {
                        warn!("Skipping block: {}", e);
                        skipped_blocks += 1;
                    }
                    chunk.clear();
                }
                continue;
            }
            chunk.push(line.trim_end());
        }

        if skipped_blocks > 0 {
            warn!("Skipped {} malformed subtitle block(s)", skipped_blocks);
        }
        debug!("Parsed {} subtitle entries ({})", entries.len(), encoding.name());

        let mut document = Self {
            entries,
            encoding,
            skipped_blocks,
        };
        document.renumber();
        document
    }

    /// Parse one blank-line separated chunk, which may hold several blocks
    /// when the separating blank line is missing
    fn parse_chunk(lines: &[&str], block_no: usize, entries: &mut Vec<SubtitleEntry>) -> Result<(), SubtitleError> {
        let stamps: Vec<(usize, (u64, u64))> = lines
            .iter()
            .enumerate()
            .filter_map(|(i, line)| parse_timestamp_line(line).map(|times| (i, times)))
            .collect();

        if stamps.is_empty() {
            return Err(SubtitleError::Parse {
                block: block_no,
                reason: format!("no timestamp line in {:?}", lines.first().unwrap_or(&"")),
            });
        }

        if stamps[0].0 > 1 || (stamps[0].0 == 1 && !INDEX_REGEX.is_match(lines[0])) {
            debug!("Ignoring {} stray line(s) before timestamp in block {}", stamps[0].0, block_no);
        }

        for (k, &(line_idx, (start, end))) in stamps.iter().enumerate() {
            let text_end = match stamps.get(k + 1) {
                Some(&(next_idx, _)) if next_idx > line_idx + 1 && INDEX_REGEX.is_match(lines[next_idx - 1]) => next_idx - 1,
                Some(&(next_idx, _)) => next_idx,
                None => lines.len(),
            };

            let end = if end < start {
                warn!("Block {} ends before it starts, clamping end time", block_no);
                start
            } else {
                end
            };

            let text = lines[line_idx + 1..text_end].join("\n");
            entries.push(SubtitleEntry::new(entries.len() + 1, start, end, text));
        }

        Ok(())
    }

    fn renumber(&mut self) {
        for (i, entry) in self.entries.iter_mut().enumerate() {
            entry.seq_num = i + 1;
        }
    }

    /// Snapshot of (index, text) pairs for translation
    pub fn get_texts(&self) -> Vec<(usize, String)> {
        self.entries
            .iter()
            .map(|entry| (entry.seq_num, entry.text.clone()))
            .collect()
    }

    /// Overwrite entry texts by index
    ///
    /// All indices are checked before anything is modified, so a failing call
    /// leaves the document untouched.
    pub fn set_texts(&mut self, texts: Vec<(usize, String)>) -> Result<(), SubtitleError> {
        if let Some((index, _)) = texts.iter().find(|(index, _)| *index == 0 || *index > self.entries.len()) {
            return Err(SubtitleError::UnknownIndex(*index));
        }

        for (index, text) in texts {
            self.entries[index - 1].text = text;
        }
        Ok(())
    }

    /// Render the document as UTF-8 SRT bytes, renumbered 1..N
    pub fn serialize(&self) -> Vec<u8> {
        let mut output = String::new();
        for (i, entry) in self.entries.iter().enumerate() {
            if entry.seq_num == i + 1 {
                output.push_str(&entry.to_string());
            } else {
                let mut renumbered = entry.clone();
                renumbered.seq_num = i + 1;
                output.push_str(&renumbered.to_string());
            }
        }
        output.into_bytes()
    }

    pub fn entries(&self) -> &[SubtitleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Name of the encoding the input was decoded with
    pub fn encoding(&self) -> &'static str {
        self.encoding.name()
    }

    pub fn skipped_blocks(&self) -> usize {
        self.skipped_blocks
    }
}

impl fmt::Display for SubtitleDocument {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Document")?;
        writeln!(f, "Encoding: {}", self.encoding.name())?;
        writeln!(f, "Entries: {}", self.entries.len())?;
        writeln!(f, "Skipped blocks: {}", self.skipped_blocks)?;
        Ok(())
    }
}
