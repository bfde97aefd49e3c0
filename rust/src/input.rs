use std::sync::OnceLock;

use regex::Regex;

/// How an input string reaches the child process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// `http://`, `https://` or `ftp://` address, passed as the first argument.
    RemoteAddress,
    /// Path to an existing regular file, passed as the first argument.
    LocalFile,
    /// Anything else, written to the child's stdin.
    LiteralData,
}

impl InputKind {
    /// True when the input is handed over as an argument rather than piped.
    pub fn is_reference(self) -> bool {
        matches!(self, Self::RemoteAddress | Self::LocalFile)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::RemoteAddress => "remote-address",
            Self::LocalFile => "local-file",
            Self::LiteralData => "literal-data",
        }
    }
}

/// Result of asking the filesystem whether a path names a regular file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileProbe {
    RegularFile,
    /// Missing, unreadable, or not a regular file (directories included).
    NotRegularFile,
}

fn remote_address_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^(https?|ftp)://").expect("remote address pattern is valid")
    })
}

pub fn is_remote_address(input: &str) -> bool {
    remote_address_pattern().is_match(input)
}

pub async fn probe_file(path: &str) -> FileProbe {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => FileProbe::RegularFile,
        Ok(_) => FileProbe::NotRegularFile,
        Err(err) => {
            tracing::debug!("input probe for {path:?} failed: {err}");
            FileProbe::NotRegularFile
        }
    }
}

/// Classifies `input`. Never fails: anything that is neither an address nor a
/// regular file degrades to [`InputKind::LiteralData`].
pub async fn classify(input: &str) -> InputKind {
    if is_remote_address(input) {
        return InputKind::RemoteAddress;
    }
    if input.is_empty() {
        return InputKind::LiteralData;
    }
    match probe_file(input).await {
        FileProbe::RegularFile => InputKind::LocalFile,
        FileProbe::NotRegularFile => InputKind::LiteralData,
    }
}
