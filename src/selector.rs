//! Line protocol for the external fuzzy selector (fzf or compatible).
//!
//! Each record becomes one `<uid>;<description>` line on the selector's
//! stdin; the selector echoes back the chosen lines and we read the UIDs
//! off the front again.

use std::io::{self, Write};
use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::{debug, warn};

use crate::record::ScraperRecord;

const UID_SEPARATOR: char = ';';
const UNKNOWN: &str = "Unknown";

#[derive(Debug, Error)]
pub enum SelectorError {
    #[error("failed to run selector `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("selector i/o failed")]
    Io(#[from] io::Error),
    #[error("selector reported an internal error")]
    Internal,
    #[error("selector exited unexpectedly ({0})")]
    Unexpected(String),
}

/// Line breaks inside a field would split one record across lines.
fn single_line(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}

/// `<uid>;<song> [part] by <artist> (<type>) [v<version>]`
pub fn format_line(record: &ScraperRecord) -> String {
    let version = record.version_or_default();
    let tokens = [
        format!(
            "{}{}{}",
            record.scrape_uid,
            UID_SEPARATOR,
            single_line(record.song_name.as_deref().unwrap_or(UNKNOWN))
        ),
        single_line(record.part.as_deref().unwrap_or_default()),
        format!(
            "by {}",
            single_line(record.artist_name.as_deref().unwrap_or(UNKNOWN))
        ),
        format!("({})", record.kind),
        if version != 1 {
            format!("v{}", version)
        } else {
            String::new()
        },
    ];
    tokens
        .iter()
        .filter(|t| !t.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}

/// UIDs of the selected lines, in output order. Lines without a numeric
/// prefix before the first `;` are ignored.
pub fn parse_selection(output: &str) -> Vec<u32> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let uid = line
                .split_once(UID_SEPARATOR)
                .and_then(|(head, _)| head.trim().parse().ok());
            if uid.is_none() {
                warn!("Ignoring unparseable selector line: {:?}", line);
            }
            uid
        })
        .collect()
}

/// Map the selector's exit status onto a selection.
///
/// 0 = selection made, 1 = no match, 2 = selector error, 130 = interrupted.
/// "No match" and "interrupted" are empty selections, not failures.
pub fn interpret_exit(code: Option<i32>, stdout: &str) -> Result<Vec<u32>, SelectorError> {
    match code {
        Some(0) => Ok(parse_selection(stdout)),
        Some(1) | Some(130) => Ok(Vec::new()),
        Some(2) => Err(SelectorError::Internal),
        Some(other) => Err(SelectorError::Unexpected(format!("exit code {}", other))),
        None => Err(SelectorError::Unexpected("terminated by signal".to_string())),
    }
}

/// Runs the selector as a blocking child process.
#[derive(Debug, Clone)]
pub struct Selector {
    command: String,
    multi: bool,
}

impl Selector {
    pub fn new(command: impl Into<String>, multi: bool) -> Self {
        Selector {
            command: command.into(),
            multi,
        }
    }

    fn args(&self) -> [&'static str; 6] {
        // Field 1 (the uid) is hidden from display and from matching.
        [
            "-d",
            ";",
            "--with-nth=2..",
            "--nth=1",
            "--reverse",
            if self.multi { "-m" } else { "+m" },
        ]
    }

    pub fn select(&self, records: &[ScraperRecord]) -> Result<Vec<u32>, SelectorError> {
        let mut child = Command::new(&self.command)
            .args(self.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|source| SelectorError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            for record in records {
                match writeln!(stdin, "{}", format_line(record)) {
                    Ok(()) => {}
                    // Selector quit before reading everything.
                    Err(e) if e.kind() == io::ErrorKind::BrokenPipe => break,
                    Err(e) => return Err(e.into()),
                }
            }
        }

        let output = child.wait_with_output()?;
        debug!("Selector exited with {:?}", output.status.code());
        interpret_exit(output.status.code(), &String::from_utf8_lossy(&output.stdout))
    }
}
