//! Result files: directory layout, timestamps and JSON / CSV / binary writers.

use std::fs;
use std::path::{Path, PathBuf};

use crate::api::ElsevierError;
use crate::models::Entry;

/// Directory layout below the results root
///
/// ```text
/// <root>/search_queries/
/// <root>/object_requests/graphic_renderings/
/// <root>/object_requests/author_manuscripts/
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
}

impl Default for OutputLayout {
    fn default() -> Self {
        Self::new("results")
    }
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn search_queries_dir(&self) -> PathBuf {
        self.root.join("search_queries")
    }

    pub fn object_requests_dir(&self) -> PathBuf {
        self.root.join("object_requests")
    }

    pub fn graphic_renderings_dir(&self) -> PathBuf {
        self.object_requests_dir().join("graphic_renderings")
    }

    pub fn author_manuscripts_dir(&self) -> PathBuf {
        self.object_requests_dir().join("author_manuscripts")
    }
}

/// Local time as `YYYYMMDD_HHMMSS`
pub fn timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Local date as `YYYYMMDD`
pub fn datestamp() -> String {
    chrono::Local::now().format("%Y%m%d").to_string()
}

/// Make a DOI usable as a file-name component (`10.1016/j.x` -> `10.1016.j.x`)
pub fn sanitize_doi(doi: &str) -> String {
    doi.trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' => '.',
            ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// First of `path`, `stem_1.ext`, `stem_2.ext`, ... that does not exist yet
pub fn unique_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path.extension().map(|e| e.to_string_lossy().into_owned());
    let parent = path.parent().unwrap_or_else(|| Path::new(""));

    let mut counter = 1usize;
    loop {
        let name = match &extension {
            Some(ext) => format!("{}_{}.{}", stem, counter, ext),
            None => format!("{}_{}", stem, counter),
        };
        let candidate = parent.join(name);
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

fn ensure_parent(path: &Path) -> Result<(), ElsevierError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Write entries as a JSON array
pub fn write_json(path: &Path, entries: &[Entry]) -> Result<(), ElsevierError> {
    ensure_parent(path)?;
    let content = serde_json::to_string(entries)?;
    fs::write(path, content)?;
    Ok(())
}

/// Read entries back from a JSON array file
pub fn read_entries(path: &Path) -> Result<Vec<Entry>, ElsevierError> {
    let content = fs::read_to_string(path)?;
    let entries: Vec<Entry> = serde_json::from_str(&content)?;
    Ok(entries)
}

/// Write entries as CSV with the first entry's fields as header.
///
/// Every row is laid out by the header; fields a later entry lacks are left
/// empty and fields only later entries have are dropped. Returns `false`
/// without creating a file when there are no entries.
pub fn write_csv(path: &Path, entries: &[Entry]) -> Result<bool, ElsevierError> {
    let Some(first) = entries.first() else {
        return Ok(false);
    };

    ensure_parent(path)?;
    let header: Vec<&str> = first.keys().collect();

    let mut writer = csv::WriterBuilder::new().from_path(path)?;
    writer.write_record(&header)?;
    for entry in entries {
        writer.write_record(header.iter().map(|key| entry.csv_cell(key)))?;
    }
    writer.flush()?;
    Ok(true)
}

/// Write a binary payload, creating parent directories
pub fn write_binary(path: &Path, bytes: &[u8]) -> Result<(), ElsevierError> {
    ensure_parent(path)?;
    fs::write(path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tempfile::tempdir;

    fn sample_entries() -> Vec<Entry> {
        vec![
            Entry::new()
                .with("prism:doi", "10.1/a")
                .with("dc:title", "First, with comma")
                .with("citations", 3),
            Entry::new()
                .with("prism:doi", "10.1/b")
                .with("dc:title", "Second")
                .with("citations", Value::Null),
        ]
    }

    #[test]
    fn test_layout() {
        let layout = OutputLayout::new("out");
        assert_eq!(layout.search_queries_dir(), PathBuf::from("out/search_queries"));
        assert_eq!(
            layout.graphic_renderings_dir(),
            PathBuf::from("out/object_requests/graphic_renderings")
        );
        assert_eq!(
            layout.author_manuscripts_dir(),
            PathBuf::from("out/object_requests/author_manuscripts")
        );
        assert_eq!(OutputLayout::default().root(), Path::new("results"));
    }

    #[test]
    fn test_stamps_have_expected_shape() {
        let ts = timestamp();
        assert_eq!(ts.len(), 15);
        assert_eq!(&ts[8..9], "_");
        assert_eq!(datestamp().len(), 8);
        assert!(datestamp().chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_sanitize_doi() {
        assert_eq!(sanitize_doi("10.1016/j.jad.2020.01.001"), "10.1016.j.jad.2020.01.001");
        assert_eq!(sanitize_doi(" 10.1/a:b "), "10.1.a_b");
    }

    #[test]
    fn test_json_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("entries.json");
        let entries = sample_entries();

        write_json(&path, &entries).unwrap();
        let loaded = read_entries(&path).unwrap();
        assert_eq!(loaded, entries);
    }

    #[test]
    fn test_csv_uses_first_entry_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("entries.csv");
        let mut entries = sample_entries();
        entries.push(Entry::new().with("dc:title", "Third").with("extra", "dropped"));

        assert!(write_csv(&path, &entries).unwrap());

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "prism:doi,dc:title,citations");
        assert_eq!(lines[1], "10.1/a,\"First, with comma\",3");
        assert_eq!(lines[2], "10.1/b,Second,");
        assert_eq!(lines[3], ",Third,");
    }

    #[test]
    fn test_csv_skips_empty_input() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        assert!(!write_csv(&path, &[]).unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn test_unique_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("manuscript.pdf");
        assert_eq!(unique_path(&path), path);

        write_binary(&path, b"%PDF").unwrap();
        let second = unique_path(&path);
        assert_eq!(second, dir.path().join("manuscript_1.pdf"));

        write_binary(&second, b"%PDF").unwrap();
        assert_eq!(unique_path(&path), dir.path().join("manuscript_2.pdf"));
    }

    #[test]
    fn test_json_values_survive() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested.json");
        let entries = vec![Entry::new().with("authors", json!({"author": [{"name": "A"}]}))];
        write_json(&path, &entries).unwrap();
        assert_eq!(read_entries(&path).unwrap(), entries);
    }
}
