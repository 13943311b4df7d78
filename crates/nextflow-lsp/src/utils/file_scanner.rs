//! File system scanning utilities for LSP
//!
//! Provides functionality for finding the source files a workspace compiles

use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Extensions the compiler frontend picks up.
pub const SOURCE_EXTENSIONS: &[&str] = &["nf", "groovy", "config"];

const MAX_DEPTH: usize = 8;

/// Pipeline work directories and tool caches can hold thousands of files
const SKIPPED_DIRS: &[&str] = &[".git", "work", ".nextflow", "node_modules", "target"];

/// Check if a path names a compilable source file
pub fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry.file_name().to_str().is_some_and(|name| SKIPPED_DIRS.contains(&name))
}

/// Find all source files below `dir`, sorted for stable session contents.
///
/// Symlinks are not followed. Entries that cannot be read are skipped, so an
/// unreadable subdirectory only hides its own files.
pub fn find_source_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(false)
        .max_depth(MAX_DEPTH)
        .into_iter()
        .filter_entry(|entry| !is_skipped_dir(entry))
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && is_source_file(entry.path()))
        .map(DirEntry::into_path)
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn relative_names(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_find_source_files_skips_work_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("modules")).unwrap();
        fs::create_dir_all(root.join("work/ab/cdef")).unwrap();
        fs::write(root.join("main.nf"), "workflow {}").unwrap();
        fs::write(root.join("nextflow.config"), "params {}").unwrap();
        fs::write(root.join("modules/align.nf"), "process ALIGN {}").unwrap();
        fs::write(root.join("work/ab/cdef/stale.nf"), "").unwrap();
        fs::write(root.join("README.md"), "").unwrap();

        let files = find_source_files(root);

        assert_eq!(
            relative_names(root, &files),
            vec!["main.nf", "modules/align.nf", "nextflow.config"]
        );
    }

    #[test]
    fn test_root_named_like_a_skipped_dir_is_scanned() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("work");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("main.nf"), "workflow {}").unwrap();

        assert_eq!(relative_names(&root, &find_source_files(&root)), vec!["main.nf"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_loop_is_not_followed() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("main.nf"), "workflow {\n").unwrap();
        std::os::unix::fs::symlink(root, root.join("loop")).unwrap();
        std::os::unix::fs::symlink(root.join("main.nf"), root.join("alias.nf")).unwrap();

        assert_eq!(relative_names(root, &find_source_files(root)), vec!["main.nf"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_only_hides_its_files() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let locked = root.join("locked");
        fs::create_dir_all(&locked).unwrap();
        fs::write(root.join("main.nf"), "workflow {}").unwrap();
        fs::write(locked.join("hidden.nf"), "").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let readable = fs::read_dir(&locked).is_ok();
        let names = relative_names(root, &find_source_files(root));
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        // privileged users can still list the directory
        if readable {
            assert_eq!(names, vec!["locked/hidden.nf", "main.nf"]);
        } else {
            assert_eq!(names, vec!["main.nf"]);
        }
    }

    #[test]
    fn test_missing_root_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_source_files(&dir.path().join("gone")).is_empty());
    }

    #[test]
    fn test_is_source_file() {
        assert!(is_source_file(Path::new("/a/main.nf")));
        assert!(is_source_file(Path::new("/a/Utils.groovy")));
        assert!(!is_source_file(Path::new("/a/notes.txt")));
        assert!(!is_source_file(Path::new("/a/Makefile")));
    }
}
