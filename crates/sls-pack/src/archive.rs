//! In-memory zip archive construction.

use std::collections::HashSet;
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Component, Path};

use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{ArchiveError, ArchiveResult};
use crate::filter::ExcludeFilter;

/// Highest deflate level.
const COMPRESSION_LEVEL: i64 = 9;

/// A finished zip archive held in memory.
#[derive(Debug, Clone)]
pub struct Archive {
    bytes: Vec<u8>,
    entries: Vec<String>,
    sha256: String,
}

impl Archive {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Entry names in the order they were written.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Hex SHA-256 of the archive bytes.
    pub fn sha256(&self) -> &str {
        &self.sha256
    }
}

/// Build a zip archive from `include` paths, resolved against `source_root`.
///
/// Directories are walked recursively and every discovered file is checked
/// against `exclude`. Explicitly named files are always added. Entry names
/// are relative to `source_root` and use `/` separators.
pub fn build_archive<I: AsRef<str>, E: AsRef<str>>(
    source_root: &Path,
    include: &[I],
    exclude: &[E],
) -> ArchiveResult<Archive> {
    let filter = ExcludeFilter::new(exclude);
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(COMPRESSION_LEVEL));

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let mut entries = Vec::new();
    let mut seen = HashSet::new();

    for include_path in include {
        let include_path = include_path.as_ref();
        let path = source_root.join(include_path);
        let metadata = fs::metadata(&path).map_err(|source| ArchiveError::MissingPath {
            path: path.clone(),
            source,
        })?;
        let base = entry_name(Path::new(include_path))?;

        if metadata.is_dir() {
            debug!(path = %path.display(), "Adding directory");
            for entry in WalkDir::new(&path).follow_links(true).sort_by_file_name() {
                let entry = entry?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let relative = entry.path().strip_prefix(&path).unwrap_or(entry.path());
                let name = join_entry(&base, &entry_name(relative)?);
                if filter.is_excluded(&name) {
                    debug!(entry = %name, "Excluded");
                    continue;
                }
                if seen.insert(name.clone()) {
                    add_file(&mut writer, entry.path(), &name, options)?;
                    entries.push(name);
                }
            }
        } else {
            if base.is_empty() {
                return Err(ArchiveError::InvalidEntry(include_path.to_string()));
            }
            if seen.insert(base.clone()) {
                add_file(&mut writer, &path, &base, options)?;
                entries.push(base);
            }
        }
    }

    let bytes = writer.finish()?.into_inner();
    if bytes.is_empty() {
        return Err(ArchiveError::Empty);
    }
    if entries.is_empty() {
        warn!("Archive contains no files");
    }

    let sha256 = hex::encode(Sha256::digest(&bytes));
    info!(
        entries = entries.len(),
        size_bytes = bytes.len(),
        sha256 = %sha256,
        "Built archive"
    );

    Ok(Archive {
        bytes,
        entries,
        sha256,
    })
}

fn add_file(
    writer: &mut ZipWriter<Cursor<Vec<u8>>>,
    path: &Path,
    name: &str,
    options: SimpleFileOptions,
) -> ArchiveResult<()> {
    let read_err = |source| ArchiveError::Read {
        path: path.to_path_buf(),
        source,
    };
    let content = fs::read(path).map_err(read_err)?;
    let options = with_permissions(options, path).map_err(read_err)?;

    writer.start_file(name, options)?;
    writer.write_all(&content)?;
    debug!(entry = %name, size_bytes = content.len(), "Added file");
    Ok(())
}

#[cfg(unix)]
fn with_permissions(options: SimpleFileOptions, path: &Path) -> std::io::Result<SimpleFileOptions> {
    use std::os::unix::fs::PermissionsExt;
    let mode = fs::metadata(path)?.permissions().mode();
    Ok(options.unix_permissions(mode))
}

#[cfg(not(unix))]
fn with_permissions(options: SimpleFileOptions, _path: &Path) -> std::io::Result<SimpleFileOptions> {
    Ok(options)
}

/// Turn a relative filesystem path into a `/`-separated entry name.
///
/// `.` and root components are dropped; `..` is rejected.
fn entry_name(path: &Path) -> ArchiveResult<String> {
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
            Component::ParentDir => {
                return Err(ArchiveError::InvalidEntry(path.display().to_string()));
            }
        }
    }
    Ok(parts.join("/"))
}

fn join_entry(base: &str, relative: &str) -> String {
    if base.is_empty() {
        relative.to_string()
    } else {
        format!("{base}/{relative}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::io::Read;
    use zip::ZipArchive;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn unpack(archive: &Archive) -> BTreeMap<String, String> {
        let mut zip = ZipArchive::new(Cursor::new(archive.bytes().to_vec())).unwrap();
        let mut files = BTreeMap::new();
        for i in 0..zip.len() {
            let mut file = zip.by_index(i).unwrap();
            let mut content = String::new();
            file.read_to_string(&mut content).unwrap();
            files.insert(file.name().to_string(), content);
        }
        files
    }

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "src/index.js", "exports.handler = () => 'ok';\n");
        write(dir.path(), "src/lib/util.js", "module.exports = {};\n");
        write(dir.path(), "src/index.test.js", "test('x', () => {});\n");
        write(dir.path(), "package.json", "{\"name\":\"api\"}\n");
        write(dir.path(), "README.md", "# api\n");
        dir
    }

    #[test]
    fn round_trip_without_exclusions() {
        let dir = project();
        let none: [&str; 0] = [];
        let archive = build_archive(dir.path(), &["."], &none).unwrap();

        let files = unpack(&archive);
        let expected: BTreeMap<String, String> = [
            ("README.md", "# api\n"),
            ("package.json", "{\"name\":\"api\"}\n"),
            ("src/index.js", "exports.handler = () => 'ok';\n"),
            ("src/index.test.js", "test('x', () => {});\n"),
            ("src/lib/util.js", "module.exports = {};\n"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        assert_eq!(files, expected);
        assert_eq!(archive.entries().len(), 5);
    }

    #[test]
    fn include_directory_keeps_its_name() {
        let dir = project();
        let archive = build_archive(dir.path(), &["./src"], &["**/*.test.js"]).unwrap();
        let names: Vec<_> = unpack(&archive).into_keys().collect();
        assert_eq!(names, vec!["src/index.js", "src/lib/util.js"]);
    }

    #[test]
    fn excluded_files_are_omitted() {
        let dir = project();
        let archive = build_archive(dir.path(), &["."], &["*.md", "src/lib/**"]).unwrap();
        let files = unpack(&archive);
        assert!(!files.contains_key("README.md"));
        assert!(!files.contains_key("src/lib/util.js"));
        assert!(files.contains_key("src/index.js"));
        assert!(files.contains_key("package.json"));
    }

    #[test]
    fn blank_exclude_patterns_keep_everything() {
        let dir = project();
        let archive = build_archive(dir.path(), &["."], &["", "  "]).unwrap();
        assert_eq!(unpack(&archive).len(), 5);
    }

    #[test]
    fn named_files_bypass_the_filter() {
        let dir = project();
        let archive = build_archive(dir.path(), &["README.md", "src"], &["*.md"]).unwrap();
        let files = unpack(&archive);
        assert!(files.contains_key("README.md"));
        assert!(files.contains_key("src/index.js"));
    }

    #[test]
    fn overlapping_includes_are_written_once() {
        let dir = project();
        let none: [&str; 0] = [];
        let archive = build_archive(dir.path(), &["src/index.js", "src"], &none).unwrap();
        let count = archive
            .entries()
            .iter()
            .filter(|e| e.as_str() == "src/index.js")
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn missing_include_path_fails() {
        let dir = project();
        let none: [&str; 0] = [];
        let err = build_archive(dir.path(), &["does-not-exist"], &none).unwrap_err();
        assert!(matches!(err, ArchiveError::MissingPath { .. }));
    }

    #[test]
    fn parent_components_are_rejected() {
        let dir = project();
        let nested = dir.path().join("src");
        let none: [&str; 0] = [];
        let err = build_archive(&nested, &["../package.json"], &none).unwrap_err();
        assert!(matches!(err, ArchiveError::InvalidEntry(_)));
    }

    #[test]
    fn digest_matches_bytes() {
        let dir = project();
        let none: [&str; 0] = [];
        let archive = build_archive(dir.path(), &["package.json"], &none).unwrap();
        assert_eq!(archive.sha256(), hex::encode(Sha256::digest(archive.bytes())));
        assert_eq!(archive.len(), archive.bytes().len());
        assert!(!archive.is_empty());
    }
}
