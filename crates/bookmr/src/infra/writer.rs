//! Serializing config sections in the myrepos file format.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::domain::model::ConfigSection;

/// Incremental writer for `.mrconfig` style files.
///
/// Every section is preceded by a blank line, followed by its `[name]` header and its lines.
pub struct ConfigWriter<W: Write> {
    inner: W,
}

impl<W: Write> ConfigWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Write a `#` comment line.
    pub fn write_comment(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.inner, "# {text}")
    }

    pub fn write_section(&mut self, section: &ConfigSection) -> io::Result<()> {
        writeln!(self.inner)?;
        writeln!(self.inner, "[{}]", section.name)?;
        for line in section.lines() {
            writeln!(self.inner, "{line}")?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// Create or truncate the output file, readable by everyone and writable by the owner.
pub fn create_output(path: &Path) -> io::Result<ConfigWriter<BufWriter<File>>> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o644);
    }
    let file = options.open(path)?;
    Ok(ConfigWriter::new(BufWriter::new(file)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_printed_for_empty_sections() -> io::Result<()> {
        let mut writer = ConfigWriter::new(Vec::new());
        writer.write_comment("generated")?;
        writer.write_section(
            &ConfigSection::new("DEFAULT").with_line("update = git pull --rebase"),
        )?;
        writer.write_section(&ConfigSection::new("src/empty"))?;

        assert_eq!(
            String::from_utf8_lossy(&writer.into_inner()),
            "# generated\n\n[DEFAULT]\nupdate = git pull --rebase\n\n[src/empty]\n"
        );
        Ok(())
    }

    #[test]
    fn output_file_is_truncated() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join(".mrconfig");
        std::fs::write(&path, "stale content that is much longer than the new file\n")?;

        let mut writer = create_output(&path)?;
        writer.write_comment("fresh")?;
        writer.flush()?;
        drop(writer);

        assert_eq!(std::fs::read_to_string(&path)?, "# fresh\n");
        Ok(())
    }
}
