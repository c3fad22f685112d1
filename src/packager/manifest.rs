//! Requirements manifest inspection.
//!
//! Only used to report what pip is about to install; pip itself stays the
//! authority on the file's meaning.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Parsed view of a pip requirements file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub path: PathBuf,
    /// Requirement specifiers (`name`, `name==1.2`, `name>=1; python_version<"3.12"`)
    pub requirements: Vec<String>,
    /// Option lines (`-r other.txt`, `--index-url ...`)
    pub options: Vec<String>,
}

impl Manifest {
    /// Read and parse `path`.
    pub fn load(path: &Path) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(Manifest::parse(path, &content))
    }

    /// Parse manifest text. Blank lines and comments are skipped.
    pub fn parse(path: &Path, content: &str) -> Self {
        let mut manifest = Manifest {
            path: path.to_path_buf(),
            ..Default::default()
        };

        for raw in content.lines() {
            let line = strip_comment(raw).trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('-') {
                manifest.options.push(line.to_string());
            } else {
                manifest.requirements.push(line.to_string());
            }
        }

        manifest
    }

    /// Distribution names without version specifiers or markers.
    pub fn package_names(&self) -> Vec<String> {
        self.requirements
            .iter()
            .map(|req| {
                req.split(|c: char| matches!(c, '=' | '<' | '>' | '!' | '~' | ';' | '[' | '@' | ' '))
                    .next()
                    .unwrap_or(req)
                    .to_string()
            })
            .collect()
    }
}

/// pip treats `#` as a comment only at line start or after whitespace.
fn strip_comment(line: &str) -> &str {
    if line.trim_start().starts_with('#') {
        return "";
    }
    match line.find(" #").or_else(|| line.find("\t#")) {
        Some(idx) => &line[..idx],
        None => line,
    }
}
