//! Output sink for the final profile list.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

/// Where ranked profiles end up, one display string per line.
pub trait OutputSink {
    fn write_lines(&self, lines: &[String]) -> Result<()>;
}

/// UTF-8 text file, one profile per line.
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl OutputSink for FileSink {
    fn write_lines(&self, lines: &[String]) -> Result<()> {
        let mut file = fs::File::create(&self.path)
            .with_context(|| format!("creating output file {}", self.path.display()))?;
        for line in lines {
            writeln!(file, "{line}")
                .with_context(|| format!("writing to {}", self.path.display()))?;
        }
        info!("Wrote {} profiles to {}", lines.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_one_profile_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiles.txt");
        let sink = FileSink::new(&path);

        sink.write_lines(&["a://1".to_string(), "b://2".to_string()])
            .unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "a://1\nb://2\n");
    }

    #[test]
    fn empty_list_produces_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiles.txt");
        FileSink::new(&path).write_lines(&[]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }
}
