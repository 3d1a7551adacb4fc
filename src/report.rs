//! Plain-text rendering of survey results.
//!
//! Results go to the wrapped writer (stdout in the binary). Warnings and
//! errors are logged through `tracing`, which writes to stderr.

use std::io::{self, Write};

use crate::config::Settings;
use crate::error::CommandError;
use crate::listing::{DirectorySummary, FileEntry};

/// Entries shown per directory below the summary
pub const ENTRIES_SHOWN: usize = 5;

/// Entries shown from the root directory listing
pub const ROOT_ENTRIES_SHOWN: usize = 10;

const ROOT_SECTION: &str = "Root Directory Contents";
const UNAVAILABLE: &str = "Unable to retrieve";

const RULE_WIDTH: usize = 50;

/// Writes survey results as plain text.
pub struct Presenter<W> {
    out: W,
}

impl<W: Write> Presenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Connection banner printed before connecting.
    pub fn header(&mut self, settings: &Settings) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "Connecting to {}", settings.target())?;
        writeln!(self.out, "Using SSH key: {}", settings.key_path.display())?;
        writeln!(self.out, "{}", "-".repeat(RULE_WIDTH))
    }

    pub fn section(&mut self, title: &str) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "=== {title} ===")
    }

    /// One line of the system information block.
    pub fn system_fact(
        &mut self,
        label: &str,
        value: Result<&str, &CommandError>,
    ) -> io::Result<()> {
        match value {
            Ok(value) => writeln!(self.out, "{}: {}", label.to_uppercase(), value.trim()),
            Err(e) => writeln!(self.out, "{}: Error: {}", label.to_uppercase(), e),
        }
    }

    /// Summary and first entries of a listed directory.
    pub fn directory(&mut self, dir: &str, entries: &[FileEntry]) -> io::Result<()> {
        self.section(&format!("Directory Analysis: {dir}"))?;

        if entries.is_empty() {
            return writeln!(self.out, "Directory is empty");
        }

        let summary = DirectorySummary::from_entries(entries);
        writeln!(self.out, "Total items: {}", summary.total_items)?;
        writeln!(self.out, "Directories: {}", summary.directories)?;
        writeln!(self.out, "Files: {}", summary.files)?;
        writeln!(self.out, "Total size: {}", summary.total_size())?;

        writeln!(self.out, "Largest files:")?;
        for entry in &summary.largest {
            writeln!(self.out, "   {} ({})", entry.name, entry.size)?;
        }

        writeln!(self.out, "Entries (showing first {ENTRIES_SHOWN}):")?;
        for entry in entries.iter().take(ENTRIES_SHOWN) {
            let kind = if entry.is_dir() { "dir " } else { "file" };
            writeln!(
                self.out,
                "   [{}] {} - {} ({} {} {})",
                kind, entry.name, entry.size, entry.month, entry.day, entry.time
            )?;
        }
        Ok(())
    }

    /// A directory whose listing command failed.
    pub fn directory_error(&mut self, dir: &str, error: &CommandError) -> io::Result<()> {
        self.section(&format!("Directory Analysis: {dir}"))?;
        writeln!(self.out, "Unable to list directory: {error}")
    }

    /// First entries of `/` in `ls` column order, without the link count.
    pub fn root_listing(&mut self, entries: &[FileEntry]) -> io::Result<()> {
        self.section(ROOT_SECTION)?;
        for entry in entries.iter().take(ROOT_ENTRIES_SHOWN) {
            writeln!(
                self.out,
                "{} {} {} {} {} {} {} {}",
                entry.permissions,
                entry.owner,
                entry.group,
                entry.size,
                entry.month,
                entry.day,
                entry.time,
                entry.name
            )?;
        }
        Ok(())
    }

    pub fn root_listing_error(&mut self, error: &CommandError) -> io::Result<()> {
        self.section(ROOT_SECTION)?;
        writeln!(self.out, "Unable to list directory: {error}")
    }

    /// `containers` is the `docker ps` table, or `None` when Docker is
    /// unavailable.
    pub fn docker(&mut self, containers: Option<&str>) -> io::Result<()> {
        self.section("Docker Containers")?;
        match containers {
            Some(table) => {
                writeln!(self.out, "Running Docker containers:")?;
                writeln!(self.out, "{}", table.trim_end())
            }
            None => writeln!(self.out, "Docker not running or not installed"),
        }
    }

    /// One line of the resources block.
    pub fn resource(&mut self, label: &str, value: Option<&str>) -> io::Result<()> {
        writeln!(self.out, "{}: {}", label, value.unwrap_or(UNAVAILABLE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::parse_listing;
    use std::path::PathBuf;

    fn render(f: impl FnOnce(&mut Presenter<Vec<u8>>) -> io::Result<()>) -> String {
        let mut presenter = Presenter::new(Vec::new());
        f(&mut presenter).unwrap();
        String::from_utf8(presenter.into_inner()).unwrap()
    }

    #[test]
    fn test_header() {
        let settings = Settings {
            host: "10.0.0.1".to_string(),
            user: "forge".to_string(),
            key_path: PathBuf::from("/keys/aws.pem"),
            port: 22,
            directories: vec![],
        };
        let out = render(|p| p.header(&settings));

        assert!(out.contains("Connecting to forge@10.0.0.1:22\n"));
        assert!(out.contains("Using SSH key: /keys/aws.pem\n"));
        assert!(out.ends_with(&format!("{}\n", "-".repeat(50))));
    }

    #[test]
    fn test_directory_summary() {
        let entries = parse_listing(
            "total 8\n\
             drwxr-xr-x 2 forge forge 4.0K Jan 5 10:12 logs\n\
             -rw-r--r-- 1 forge forge 2.0K Jan 5 10:13 app.conf\n",
        );
        let out = render(|p| p.directory("/opt", &entries));

        assert!(out.contains("=== Directory Analysis: /opt ===\n"));
        assert!(out.contains("Total items: 2\n"));
        assert!(out.contains("Directories: 1\n"));
        assert!(out.contains("Files: 1\n"));
        assert!(out.contains("Total size: 6.0KB\n"));
        assert!(out.contains("   logs (4.0K)\n"));
        assert!(out.contains("   [dir ] logs - 4.0K (Jan 5 10:12)\n"));
        assert!(out.contains("   [file] app.conf - 2.0K (Jan 5 10:13)\n"));
    }

    #[test]
    fn test_entries_are_capped() {
        let listing: String = (0..8)
            .map(|i| format!("-rw-r--r-- 1 u g 1 Jan 1 00:00 f{i}\n"))
            .collect();
        let out = render(|p| p.directory("/tmp", &parse_listing(&listing)));

        assert!(out.contains("] f4 "));
        assert!(!out.contains("] f5 "));
    }

    #[test]
    fn test_empty_directory() {
        let out = render(|p| p.directory("/opt", &[]));
        assert!(out.ends_with("Directory is empty\n"));
    }

    #[test]
    fn test_directory_error() {
        let error = CommandError::NonZeroExit {
            command: "ls -lrth '/root'".to_string(),
            exit_code: 2,
            stderr: "Permission denied".to_string(),
        };
        let out = render(|p| p.directory_error("/root", &error));

        assert!(out.contains("=== Directory Analysis: /root ===\n"));
        assert!(out.contains("Unable to list directory:"));
        assert!(out.contains("Permission denied"));
    }

    #[test]
    fn test_root_listing_is_capped() {
        let listing: String = (0..12)
            .map(|i| format!("drwxr-xr-x 2 root root 4.0K Jan 1 00:00 d{i}\n"))
            .collect();
        let out = render(|p| p.root_listing(&parse_listing(&listing)));

        assert!(out.starts_with("\n=== Root Directory Contents ===\n"));
        assert!(out.contains("drwxr-xr-x root root 4.0K Jan 1 00:00 d0\n"));
        assert_eq!(out.lines().filter(|line| line.starts_with('d')).count(), 10);
    }

    #[test]
    fn test_docker() {
        let out = render(|p| p.docker(Some("CONTAINER ID   IMAGE\nabc123   redis\n\n")));
        assert!(out.contains("Running Docker containers:\nCONTAINER ID   IMAGE\nabc123   redis\n"));
        assert!(out.ends_with("redis\n"));

        let out = render(|p| p.docker(None));
        assert!(out.ends_with("=== Docker Containers ===\nDocker not running or not installed\n"));
    }

    #[test]
    fn test_resource() {
        let out = render(|p| {
            p.resource("Load Average", Some("load average: 0.08, 0.03, 0.01"))?;
            p.resource("Memory Usage", None)
        });
        assert_eq!(
            out,
            "Load Average: load average: 0.08, 0.03, 0.01\nMemory Usage: Unable to retrieve\n"
        );
    }

    #[test]
    fn test_system_fact() {
        let error = CommandError::NonZeroExit {
            command: "lscpu".to_string(),
            exit_code: 127,
            stderr: "lscpu: not found".to_string(),
        };
        let out = render(|p| {
            p.system_fact("hostname", Ok("ip-10-0-0-1\n"))?;
            p.system_fact("cpu_info", Err(&error))
        });

        assert!(out.contains("HOSTNAME: ip-10-0-0-1\n"));
        assert!(out.contains("CPU_INFO: Error: "));
        assert!(out.contains("lscpu: not found"));
    }
}
