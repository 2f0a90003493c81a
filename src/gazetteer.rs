/*!
 * Company-name gazetteer.
 *
 * A flat text file with one organization name per line. Each name becomes
 * an entity mapping entry labelled `COMP`.
 */

use log::debug;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::entities::{COMPANY_LABEL, EntityMap, EntitySource};
use crate::errors::GazetteerError;

/// Lower-cased organization names read from a gazetteer file
#[derive(Debug, Clone, Default)]
pub struct Gazetteer {
    names: Vec<String>,
}

impl Gazetteer {
    /// Read a gazetteer file. Blank lines are skipped.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, GazetteerError> {
        let path = path.as_ref();
        let io_error = |source| GazetteerError::Io {
            path: PathBuf::from(path),
            source,
        };

        let reader = BufReader::new(File::open(path).map_err(io_error)?);
        let mut names = Vec::new();
        for line in reader.lines() {
            let line = line.map_err(io_error)?;
            if let Some(name) = normalize_line(&line) {
                names.push(name);
            }
        }

        debug!("Loaded {} gazetteer entries from {:?}", names.len(), path);
        Ok(Self { names })
    }

    /// Build a gazetteer from in-memory names
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .filter_map(|n| normalize_line(n.as_ref()))
                .collect(),
        }
    }

    /// Insert every name into the map with the company label
    pub fn apply(&self, map: &mut EntityMap) {
        for name in &self.names {
            map.insert(name, COMPANY_LABEL, EntitySource::Gazetteer);
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

// `lines()` already drops "\n"; a trailing "\r" survives on CRLF files.
fn normalize_line(line: &str) -> Option<String> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    if line.trim().is_empty() {
        return None;
    }
    Some(line.to_lowercase())
}
