use std::{
    ffi::CString,
    fs, io,
    os::unix::ffi::OsStrExt,
    path::{Path, PathBuf},
};

use super::error::LauncherError;

/// A validated dashboard script together with the directory every later
/// relative path and sub-process is anchored to.
#[derive(Debug, Clone)]
pub struct Target {
    script: PathBuf,
    workdir: PathBuf,
}

impl Target {
    /// Validate the path and enter its containing directory.
    pub fn locate(path: &Path) -> Result<Target, LauncherError> {
        let script = validate(path)?;
        enter_directory(script)
    }

    pub fn script(&self) -> &Path {
        &self.script
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Resolve a path relative to the working directory. Absolute paths are
    /// kept as they are.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.workdir.join(path)
    }
}

/// Check that `path` names an existing regular file and return its absolute
/// form. Nothing on disk is touched.
pub fn validate(path: &Path) -> Result<PathBuf, LauncherError> {
    let missing = || LauncherError::MissingTarget {
        path: path.to_path_buf(),
    };

    if path.as_os_str().is_empty() {
        return Err(missing());
    }

    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => fs::canonicalize(path).map_err(|_| missing()),
        // the file may well exist, we just cannot search the directory holding it
        Err(source) if source.kind() == io::ErrorKind::PermissionDenied => {
            Err(LauncherError::DirectoryAccess {
                path: parent_of(path),
                source,
            })
        }
        _ => Err(missing()),
    }
}

fn parent_of(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if p.as_os_str().is_empty() => PathBuf::from("."),
        Some(p) => p.to_path_buf(),
        None => PathBuf::from("/"),
    }
}

/// Entering a directory takes search (execute) permission, reading it is not needed.
fn check_searchable(dir: &Path) -> io::Result<()> {
    if !fs::metadata(dir)?.is_dir() {
        return Err(io::Error::new(io::ErrorKind::Other, "not a directory"));
    }

    let c_path = CString::new(dir.as_os_str().as_bytes())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    if unsafe { libc::access(c_path.as_ptr(), libc::X_OK) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

pub fn enter_directory(script: PathBuf) -> Result<Target, LauncherError> {
    let workdir = parent_of(&script);

    check_searchable(&workdir).map_err(|source| LauncherError::DirectoryAccess {
        path: workdir.clone(),
        source,
    })?;

    debug!("working directory is {}", workdir.display());
    Ok(Target { script, workdir })
}

#[cfg(test)]
mod test {
    use std::{fs, path::PathBuf};

    use super::{enter_directory, validate, Target};
    use crate::launcher::error::LauncherError;

    #[test]
    fn test_existing_file_is_located() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("dashboard.py");
        fs::write(&script, "import streamlit as st\n").unwrap();

        let target = Target::locate(&script).unwrap();
        assert_eq!(target.workdir(), dir.path().canonicalize().unwrap());
        assert_eq!(target.script(), script.canonicalize().unwrap());
        assert_eq!(
            target.resolve(".venv".as_ref()),
            dir.path().canonicalize().unwrap().join(".venv")
        );
    }

    #[test]
    fn test_missing_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = validate(&dir.path().join("missing.py")).unwrap_err();
        assert!(matches!(err, LauncherError::MissingTarget { .. }));
        assert!(err.to_string().contains("missing.py"));
    }

    #[test]
    fn test_empty_path_is_rejected() {
        let err = validate(&PathBuf::new()).unwrap_err();
        assert!(matches!(err, LauncherError::MissingTarget { .. }));
    }

    #[test]
    fn test_directory_is_not_a_target() {
        let dir = tempfile::tempdir().unwrap();
        let err = validate(dir.path()).unwrap_err();
        assert!(matches!(err, LauncherError::MissingTarget { .. }));
    }

    #[test]
    fn test_search_only_directory_is_enterable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let app = dir.path().join("app");
        fs::create_dir(&app).unwrap();
        let script = app.join("app.py");
        fs::write(&script, "").unwrap();
        fs::set_permissions(&app, fs::Permissions::from_mode(0o111)).unwrap();

        let located = Target::locate(&script);
        fs::set_permissions(&app, fs::Permissions::from_mode(0o755)).unwrap();

        let target = located.unwrap();
        assert_eq!(target.workdir(), app.canonicalize().unwrap());
    }

    #[test]
    fn test_parent_that_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let not_a_dir = dir.path().join("data.csv");
        fs::write(&not_a_dir, "").unwrap();

        let err = enter_directory(not_a_dir.join("app.py")).unwrap_err();
        assert!(matches!(err, LauncherError::DirectoryAccess { .. }));
    }

    #[test]
    fn test_unreachable_directory() {
        let err = enter_directory(PathBuf::from("/nonexistent-dashlaunch-dir/app.py")).unwrap_err();
        assert!(matches!(err, LauncherError::DirectoryAccess { .. }));
        assert_eq!(err.exit_code(), 1);
    }
}
