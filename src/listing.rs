//! Parsing and summarizing remote `ls -lrth` output.

/// Entries shown in the "largest files" part of a summary
pub const LARGEST_SHOWN: usize = 3;

const KIB: f64 = 1024.0;
const MIB: f64 = KIB * 1024.0;
const GIB: f64 = MIB * 1024.0;
const TIB: f64 = GIB * 1024.0;

/// One line of long-format `ls` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub permissions: String,
    pub links: String,
    pub owner: String,
    pub group: String,
    /// Human-readable size as printed by `ls -h`, e.g. `4.0K`.
    pub size: String,
    pub month: String,
    pub day: String,
    /// Time of day, or year for older files.
    pub time: String,
    pub name: String,
}

impl FileEntry {
    pub fn is_dir(&self) -> bool {
        self.permissions.starts_with('d')
    }

    pub fn size_bytes(&self) -> u64 {
        parse_size(&self.size)
    }
}

/// The remote command listing `dir`, single-quoted for the shell.
pub fn listing_command(dir: &str) -> String {
    format!("ls -lrth {}", shell_quote(dir))
}

fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Parse long-format listing output.
///
/// A leading `total` line is skipped, as is any line with fewer than nine
/// fields. Names containing spaces are rejoined with single spaces.
pub fn parse_listing(stdout: &str) -> Vec<FileEntry> {
    let mut lines = stdout.lines().peekable();
    if lines
        .peek()
        .is_some_and(|line| line.trim_start().starts_with("total"))
    {
        lines.next();
    }

    lines.filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<FileEntry> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 9 {
        return None;
    }

    // Device files print `major, minor` where the size goes
    let (size, rest) = if parts[4].ends_with(',') && parts.len() >= 10 {
        (format!("{} {}", parts[4], parts[5]), &parts[6..])
    } else {
        (parts[4].to_string(), &parts[5..])
    };

    Some(FileEntry {
        permissions: parts[0].to_string(),
        links: parts[1].to_string(),
        owner: parts[2].to_string(),
        group: parts[3].to_string(),
        size,
        month: rest[0].to_string(),
        day: rest[1].to_string(),
        time: rest[2].to_string(),
        name: rest[3..].join(" "),
    })
}

/// Bytes for an `ls -h` size such as `512`, `4.0K` or `1.5G`.
///
/// Unparseable sizes count as zero.
pub fn parse_size(size: &str) -> u64 {
    let (number, multiplier) = match size.chars().last() {
        Some('K') => (&size[..size.len() - 1], KIB),
        Some('M') => (&size[..size.len() - 1], MIB),
        Some('G') => (&size[..size.len() - 1], GIB),
        Some('T') => (&size[..size.len() - 1], TIB),
        _ => (size, 1.0),
    };

    match number.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => (value * multiplier).round() as u64,
        _ => 0,
    }
}

/// Format a byte count the way the summary reports it.
pub fn format_size(bytes: u64) -> String {
    let value = bytes as f64;
    if value > GIB {
        format!("{:.1}GB", value / GIB)
    } else if value > MIB {
        format!("{:.1}MB", value / MIB)
    } else if value > KIB {
        format!("{:.1}KB", value / KIB)
    } else {
        format!("{bytes} bytes")
    }
}

/// Aggregate view of one directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySummary {
    pub total_items: usize,
    pub directories: usize,
    pub files: usize,
    pub total_bytes: u64,
    /// Largest entries first, at most [`LARGEST_SHOWN`].
    pub largest: Vec<FileEntry>,
}

impl DirectorySummary {
    pub fn from_entries(entries: &[FileEntry]) -> Self {
        let directories = entries.iter().filter(|e| e.is_dir()).count();

        let mut largest = entries.to_vec();
        // Stable sort keeps listing order among equal sizes
        largest.sort_by_key(|e| std::cmp::Reverse(e.size_bytes()));
        largest.truncate(LARGEST_SHOWN);

        Self {
            total_items: entries.len(),
            directories,
            files: entries.len() - directories,
            total_bytes: entries.iter().map(FileEntry::size_bytes).sum(),
            largest,
        }
    }

    pub fn total_size(&self) -> String {
        format_size(self.total_bytes)
    }
}
