#![forbid(unsafe_code)]

//! Destination resolution
//!
//! Turns destination names into a rotation of open handles. Names that
//! resolve to the same canonical identity share a single handle but each
//! keeps its own slot in the rotation.

use crate::engine::rotation::RotationSequence;
use crate::error::Error;
use std::collections::HashMap;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Destination name for the process's standard output
pub const STDOUT_TOKEN: &str = "-";

/// Destination name for the process's standard error
pub const STDERR_TOKEN: &str = "+";

/// Symlinks followed before a missing destination is given up on
const MAX_SYMLINK_HOPS: usize = 40;

/// Deduplication key for a destination name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CanonicalIdentity {
    Stdout,
    Stderr,
    /// Absolute path with symlinks resolved and `.`/`..` removed
    File(PathBuf),
}

impl CanonicalIdentity {
    /// Computes the identity of a destination name
    ///
    /// Files that do not exist yet are resolved through their parent
    /// directory, so `out.txt` and `./sub/../out.txt` agree before either
    /// has been created.
    pub fn resolve(name: &str) -> Result<Self, Error> {
        match name {
            STDOUT_TOKEN => Ok(CanonicalIdentity::Stdout),
            STDERR_TOKEN => Ok(CanonicalIdentity::Stderr),
            _ => canonical_path(Path::new(name)).map(CanonicalIdentity::File),
        }
    }

    /// Opens a fresh handle for this identity
    ///
    /// Failures are reported against `name`, the spelling the user gave.
    pub fn open(&self, name: &str, mode: OpenMode) -> Result<File, Error> {
        match self {
            CanonicalIdentity::Stdout => {
                duplicate_stream(&io::stdout()).map_err(|e| Error::open("<stdout>", e))
            }
            CanonicalIdentity::Stderr => {
                duplicate_stream(&io::stderr()).map_err(|e| Error::open("<stderr>", e))
            }
            CanonicalIdentity::File(path) => open_file(path, Path::new(name), mode),
        }
    }
}

impl fmt::Display for CanonicalIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanonicalIdentity::Stdout => f.write_str("<stdout>"),
            CanonicalIdentity::Stderr => f.write_str("<stderr>"),
            CanonicalIdentity::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// How file destinations are opened
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OpenMode {
    /// Truncate existing files
    #[default]
    Overwrite,
    /// Keep existing content and write after it
    Append,
}

impl From<bool> for OpenMode {
    fn from(append: bool) -> Self {
        if append {
            OpenMode::Append
        } else {
            OpenMode::Overwrite
        }
    }
}

/// Opens every destination and builds the rotation over them
///
/// An empty `names` list means standard output alone. Each identity is
/// opened once, on its first appearance; later appearances reuse the handle.
/// The slots keep the order of `names`, and with the rotate-then-write rule
/// the first line goes to the second name.
pub fn resolve<S: AsRef<str>>(
    names: &[S],
    mode: OpenMode,
) -> Result<RotationSequence<File>, Error> {
    let names: Vec<&str> = if names.is_empty() {
        vec![STDOUT_TOKEN]
    } else {
        names.iter().map(AsRef::as_ref).collect()
    };

    let mut registry: HashMap<CanonicalIdentity, usize> = HashMap::new();
    let mut sinks: Vec<(String, File)> = Vec::new();
    let mut slots = Vec::with_capacity(names.len());

    for name in names {
        let identity = CanonicalIdentity::resolve(name)?;
        let index = match registry.get(&identity) {
            Some(&index) => {
                debug!(destination = name, identity = %identity, "reusing open destination");
                index
            }
            None => {
                let file = identity.open(name, mode)?;
                debug!(destination = name, identity = %identity, ?mode, "opened destination");
                sinks.push((identity.to_string(), file));
                registry.insert(identity, sinks.len() - 1);
                sinks.len() - 1
            }
        };
        slots.push(index);
    }

    Ok(RotationSequence::new(sinks, slots))
}

fn canonical_path(path: &Path) -> Result<PathBuf, Error> {
    let mut current = path.to_path_buf();
    for _ in 0..MAX_SYMLINK_HOPS {
        match fs::canonicalize(&current) {
            Ok(resolved) => return Ok(resolved),
            Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(Error::open(path, e)),
            Err(_) => {}
        }

        let not_found = || Error::open(path, io::Error::from(io::ErrorKind::NotFound));
        let file_name = current.file_name().ok_or_else(not_found)?;
        let parent = match current.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let parent = fs::canonicalize(parent).map_err(|e| Error::open(path, e))?;
        let candidate = parent.join(file_name);

        // A dangling symlink names the file that opening it will create
        match fs::read_link(&candidate) {
            Ok(target) => current = parent.join(target),
            Err(_) => return Ok(candidate),
        }
    }

    Err(Error::open(
        path,
        io::Error::other("too many levels of symbolic links"),
    ))
}

fn open_file(path: &Path, name: &Path, mode: OpenMode) -> Result<File, Error> {
    if path.is_dir() {
        return Err(Error::IsADirectory {
            path: name.to_path_buf(),
        });
    }

    let mut options = OpenOptions::new();
    options.create(true);
    match mode {
        OpenMode::Overwrite => options.write(true).truncate(true),
        OpenMode::Append => options.append(true),
    };
    options.open(path).map_err(|e| Error::open(name, e))
}

/// Duplicates a standard stream's descriptor so the copy can be closed alone
#[cfg(unix)]
fn duplicate_stream(stream: &impl std::os::fd::AsFd) -> io::Result<File> {
    Ok(File::from(stream.as_fd().try_clone_to_owned()?))
}

#[cfg(windows)]
fn duplicate_stream(stream: &impl std::os::windows::io::AsHandle) -> io::Result<File> {
    Ok(File::from(stream.as_handle().try_clone_to_owned()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_aliases_resolve_to_fixed_identities() {
        assert_eq!(
            CanonicalIdentity::resolve("-").unwrap(),
            CanonicalIdentity::Stdout
        );
        assert_eq!(
            CanonicalIdentity::resolve("+").unwrap(),
            CanonicalIdentity::Stderr
        );
        assert_ne!(
            CanonicalIdentity::resolve("-").unwrap(),
            CanonicalIdentity::resolve("+").unwrap()
        );
    }

    #[test]
    fn test_identity_of_missing_file_uses_parent() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.txt");

        let identity = CanonicalIdentity::resolve(path.to_str().unwrap()).unwrap();
        let expected = fs::canonicalize(temp_dir.path()).unwrap().join("out.txt");
        assert_eq!(identity, CanonicalIdentity::File(expected));
        assert!(!path.exists(), "resolving must not create the file");
    }

    #[test]
    fn test_different_spellings_collapse() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("sub")).unwrap();
        let plain = temp_dir.path().join("out.txt");
        let dotted = temp_dir.path().join("sub").join("..").join(".").join("out.txt");

        let a = CanonicalIdentity::resolve(plain.to_str().unwrap()).unwrap();
        let b = CanonicalIdentity::resolve(dotted.to_str().unwrap()).unwrap();
        assert_eq!(a, b);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_collapses_to_target() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("target.txt");
        let link = temp_dir.path().join("link.txt");
        fs::write(&target, "").unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let rotation = resolve(
            &[target.to_str().unwrap(), link.to_str().unwrap()],
            OpenMode::Overwrite,
        )
        .unwrap();
        assert_eq!(rotation.len(), 2);
        assert_eq!(rotation.handle_count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_collapses_to_missing_target() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("target.txt");
        let link = temp_dir.path().join("link.txt");
        std::os::unix::fs::symlink("target.txt", &link).unwrap();

        let mut rotation = resolve(
            &[link.to_str().unwrap(), target.to_str().unwrap()],
            OpenMode::Overwrite,
        )
        .unwrap();
        assert_eq!(rotation.handle_count(), 1);

        for line in [b"aaaa\n", b"bbbb\n", b"cccc\n", b"dddd\n"] {
            rotation.write_next(line).unwrap();
        }
        rotation.close().unwrap();
        assert_eq!(
            fs::read_to_string(&target).unwrap(),
            "aaaa\nbbbb\ncccc\ndddd\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_chain_is_followed() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("sub")).unwrap();
        let target = temp_dir.path().join("sub").join("target.txt");
        let middle = temp_dir.path().join("middle.txt");
        let link = temp_dir.path().join("link.txt");
        std::os::unix::fs::symlink("sub/target.txt", &middle).unwrap();
        std::os::unix::fs::symlink(&middle, &link).unwrap();

        let identity = CanonicalIdentity::resolve(link.to_str().unwrap()).unwrap();
        let expected = fs::canonicalize(temp_dir.path().join("sub"))
            .unwrap()
            .join("target.txt");
        assert_eq!(identity, CanonicalIdentity::File(expected));
        assert!(!target.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_loop_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a.txt");
        let b = temp_dir.path().join("b.txt");
        std::os::unix::fs::symlink(&b, &a).unwrap();
        std::os::unix::fs::symlink(&a, &b).unwrap();

        let err = CanonicalIdentity::resolve(a.to_str().unwrap()).unwrap_err();
        assert_eq!(err.paths(), vec![a.as_path()]);
    }

    #[test]
    fn test_open_errors_name_the_destination_as_given() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("sub")).unwrap();
        let spelled = temp_dir.path().join("sub").join("..").join("sub");

        let err = resolve(&[spelled.to_str().unwrap()], OpenMode::Overwrite).unwrap_err();
        assert!(matches!(err, Error::IsADirectory { .. }));
        assert_eq!(err.paths(), vec![spelled.as_path()]);
    }

    #[test]
    fn test_repeated_name_opens_once_and_keeps_slots() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a.txt");
        let b = temp_dir.path().join("b.txt");
        let a = a.to_str().unwrap();
        let b = b.to_str().unwrap();

        let rotation = resolve(&[a, b, a, "-", "-"], OpenMode::Overwrite).unwrap();
        assert_eq!(rotation.len(), 5);
        assert_eq!(rotation.handle_count(), 3);

        let labels = rotation.labels();
        assert_eq!(labels[0], labels[2]);
        assert_eq!(labels[3], "<stdout>");
        assert_eq!(labels[4], "<stdout>");
    }

    #[test]
    fn test_empty_names_default_to_stdout() {
        let names: [&str; 0] = [];
        let rotation = resolve(&names, OpenMode::Overwrite).unwrap();
        assert_eq!(rotation.labels(), vec!["<stdout>"]);
    }

    #[test]
    fn test_overwrite_truncates_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.txt");
        fs::write(&path, "old content\n").unwrap();

        let rotation = resolve(&[path.to_str().unwrap()], OpenMode::Overwrite).unwrap();
        rotation.close().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_append_keeps_existing_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.txt");
        fs::write(&path, "old\n").unwrap();

        let mut rotation = resolve(&[path.to_str().unwrap()], OpenMode::Append).unwrap();
        rotation.write_next(b"new\n").unwrap();
        rotation.close().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "old\nnew\n");
    }

    #[test]
    fn test_directory_destination_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let err = resolve(&[temp_dir.path().to_str().unwrap()], OpenMode::Overwrite).unwrap_err();
        assert!(matches!(err, Error::IsADirectory { .. }));
    }

    #[test]
    fn test_missing_parent_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("out.txt");

        let err = resolve(&[path.to_str().unwrap()], OpenMode::Overwrite).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
        assert_eq!(err.paths(), vec![path.as_path()]);
    }

    #[test]
    fn test_failed_resolution_leaves_earlier_files_created() {
        let temp_dir = TempDir::new().unwrap();
        let good = temp_dir.path().join("good.txt");
        let bad = temp_dir.path().join("missing").join("bad.txt");

        let result = resolve(
            &[good.to_str().unwrap(), bad.to_str().unwrap()],
            OpenMode::Overwrite,
        );
        assert!(result.is_err());
        assert!(good.exists());
    }

    #[test]
    fn test_stdout_duplicate_is_independent() {
        let rotation = resolve(&["-"], OpenMode::Overwrite).unwrap();
        rotation.close().unwrap();

        // The real stream must still be usable after the duplicate is closed
        io::stdout().flush().unwrap();
    }

    #[test]
    #[serial]
    fn test_relative_and_absolute_paths_collapse() {
        let temp_dir = TempDir::new().unwrap();
        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(temp_dir.path()).unwrap();

        let absolute = temp_dir.path().join("out.txt");
        let result = resolve(
            &["out.txt", "./out.txt", absolute.to_str().unwrap()],
            OpenMode::Overwrite,
        );
        std::env::set_current_dir(original).unwrap();

        let rotation = result.unwrap();
        assert_eq!(rotation.len(), 3);
        assert_eq!(rotation.handle_count(), 1);
    }
}
