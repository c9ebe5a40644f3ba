//! Flat-file record storage.
//!
//! Every record file holds one entity per line with fields joined by
//! [`DELIMITER`](crate::models::DELIMITER). Reads are forgiving: an unreadable
//! file is logged and treated as empty. Writes report their failures so that
//! multi-step operations can stop before touching the next file.

mod layout;

use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::Path,
};

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::{
    error::{RentalError, RentalResult},
    models::{Properties, Record},
};

pub use layout::{ContractDir, RecordFile, StorageLayout};

/// Line-oriented access to the record files of a [`StorageLayout`].
#[derive(Debug, Clone)]
pub struct RecordStore {
    layout: StorageLayout,
}

impl RecordStore {
    /// Build a store over the given layout.
    pub fn new(layout: StorageLayout) -> Self {
        Self { layout }
    }

    /// Layout backing this store.
    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    /// Read every record of `file` in file order.
    ///
    /// Returns an empty list when the file cannot be opened.
    pub fn read_all(&self, file: RecordFile) -> Vec<Properties> {
        let path = self.layout.record_path(file);
        match fs::read_to_string(&path) {
            Ok(content) => content
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(Properties::parse_line)
                .collect(),
            Err(err) => {
                warn!(path = %path.display(), "failed to read record file: {err}");
                Vec::new()
            }
        }
    }

    /// Convert every record of `file`, skipping (and logging) the ones that do not fit `R`.
    pub fn read_records<R: Record>(&self, file: RecordFile) -> Vec<R> {
        self.read_all(file)
            .iter()
            .filter_map(|props| match R::from_properties(props) {
                Ok(record) => Some(record),
                Err(err) => {
                    warn!(file = ?file, "skipping stored record: {err}");
                    None
                }
            })
            .collect()
    }

    /// First record with a field exactly equal to `token`.
    pub fn find_by_token(&self, file: RecordFile, token: &str) -> RentalResult<Properties> {
        self.find_first(file, |props| props.contains_token(token))
            .ok_or_else(|| RentalError::not_found(file.record_kind(), token))
    }

    /// First record whose key field (see [`Record::KEY_INDEX`]) equals `key`.
    pub fn find_by_key<R: Record>(&self, file: RecordFile, key: &str) -> RentalResult<Properties> {
        self.find_first(file, |props| has_key::<R>(props, key))
            .ok_or_else(|| RentalError::not_found(R::KIND, key))
    }

    fn find_first(&self, file: RecordFile, matches: impl Fn(&Properties) -> bool) -> Option<Properties> {
        self.read_all(file).into_iter().find(|props| matches(props))
    }

    /// Append `props` as a new line at the end of `file`.
    pub fn append(&self, file: RecordFile, props: &Properties) -> RentalResult<()> {
        if let Some(field) = props.unstorable_field() {
            return Err(RentalError::invalid(
                file.record_kind(),
                format!("field '{}' contains a delimiter or line break", field.escape_debug()),
            ));
        }

        let path = self.layout.record_path(file);
        let needs_newline = fs::read(&path)
            .map(|bytes| !bytes.is_empty() && !bytes.ends_with(b"\n"))
            .unwrap_or(false);

        let mut handle = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|err| RentalError::unavailable(&path, err))?;

        let mut line = String::new();
        if needs_newline {
            line.push('\n');
        }
        line.push_str(&props.to_line());
        line.push('\n');
        handle
            .write_all(line.as_bytes())
            .map_err(|err| RentalError::unavailable(&path, err))?;

        debug!(file = ?file, "appended record");
        Ok(())
    }

    /// Remove the first record containing `token`.
    ///
    /// The remaining lines are staged in a temporary file next to the target
    /// and swapped in with a single rename. Returns `false` when nothing matched.
    pub fn delete_by_token(&self, file: RecordFile, token: &str) -> RentalResult<bool> {
        self.delete_first(file, |props| props.contains_token(token))
    }

    /// Remove the first record whose key field equals `key`.
    pub fn delete_by_key<R: Record>(&self, file: RecordFile, key: &str) -> RentalResult<bool> {
        self.delete_first(file, |props| has_key::<R>(props, key))
    }

    fn delete_first(
        &self,
        file: RecordFile,
        matches: impl Fn(&Properties) -> bool,
    ) -> RentalResult<bool> {
        let path = self.layout.record_path(file);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => {
                warn!(path = %path.display(), "failed to read record file: {err}");
                return Ok(false);
            }
        };

        let mut lines: Vec<&str> = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .collect();
        let Some(index) = lines
            .iter()
            .position(|line| matches(&Properties::parse_line(line)))
        else {
            return Ok(false);
        };
        lines.remove(index);

        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        let mut staged =
            NamedTempFile::new_in(parent).map_err(|err| RentalError::unavailable(parent, err))?;
        for line in &lines {
            writeln!(staged, "{line}").map_err(|err| RentalError::unavailable(staged.path(), err))?;
        }
        staged
            .as_file()
            .sync_all()
            .map_err(|err| RentalError::unavailable(staged.path(), err))?;
        staged
            .persist(&path)
            .map_err(|err| RentalError::unavailable(&path, err.error))?;

        debug!(file = ?file, "deleted record");
        Ok(true)
    }

    /// Stems of the files inside a contract directory, sorted by name.
    pub fn list_file_names(&self, dir: ContractDir) -> Vec<String> {
        list_file_names(&self.layout.contract_dir(dir))
    }

    /// Full name, extension included, of the first file in `dir` whose stem is `stem`.
    pub fn file_name_of(&self, dir: ContractDir, stem: &str) -> Option<String> {
        directory_entries(&self.layout.contract_dir(dir))
            .into_iter()
            .find(|(entry_stem, _)| entry_stem == stem)
            .map(|(_, file_name)| file_name)
    }

    /// Move `file_name` from one contract directory to another.
    pub fn move_file(&self, from: ContractDir, to: ContractDir, file_name: &str) -> RentalResult<()> {
        move_file(
            &self.layout.contract_dir(from),
            &self.layout.contract_dir(to),
            file_name,
        )
    }
}

fn has_key<R: Record>(props: &Properties, key: &str) -> bool {
    props.len() == R::ARITY && props.get(R::KEY_INDEX).map(String::as_str) == Some(key)
}

/// Stems (extension stripped) of the regular files directly inside `directory`.
pub fn list_file_names(directory: &Path) -> Vec<String> {
    directory_entries(directory)
        .into_iter()
        .map(|(stem, _)| stem)
        .collect()
}

// (stem, file name) pairs of the regular files in `directory`, sorted by file name.
fn directory_entries(directory: &Path) -> Vec<(String, String)> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        match entry {
            Ok(entry) if entry.file_type().is_file() => {
                if let Some(stem) = entry.path().file_stem() {
                    entries.push((
                        stem.to_string_lossy().into_owned(),
                        entry.file_name().to_string_lossy().into_owned(),
                    ));
                }
            }
            Ok(_) => {}
            Err(err) => warn!(path = %directory.display(), "failed to list directory: {err}"),
        }
    }
    entries
}

/// Rename `source_dir/file_name` to `dest_dir/file_name`.
///
/// Fails with `NotFound` unless the source is an existing regular file.
pub fn move_file(source_dir: &Path, dest_dir: &Path, file_name: &str) -> RentalResult<()> {
    let source = source_dir.join(file_name);
    if !source.is_file() {
        return Err(RentalError::not_found("file", source.display().to_string()));
    }
    fs::create_dir_all(dest_dir).map_err(|err| RentalError::unavailable(dest_dir, err))?;
    let destination = dest_dir.join(file_name);
    fs::rename(&source, &destination).map_err(|err| RentalError::unavailable(&source, err))?;
    info!(from = %source.display(), to = %destination.display(), "moved file");
    Ok(())
}
