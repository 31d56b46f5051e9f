use std::path::{Path, PathBuf};

/// List the files directly inside `dir` whose extension is `ext`
/// (case-insensitive), sorted by name.
pub fn files_with_extension(dir: &Path, ext: &str) -> std::io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(ext));
        if matches && path.is_file() {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}

/// Ensure a directory exists, creating it and any parents if needed.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Turn a Windows-style relative path (`Dir\File.vcxproj`) into a portable one.
pub fn normalize_separators(path: &str) -> String {
    path.trim().replace('\\', "/")
}
