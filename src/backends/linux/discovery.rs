//! Device node discovery.
//!
//! Nodes are found by listing one directory and keeping the entries whose file
//! name starts with a prefix, e.g. `/dev/input` + `event` (the `event*` glob).
//! Matches are returned sorted by name, the order glob(3) produces.
//!
//! `evdev::enumerate()` is not used here: it only scans `/dev/input` and opens
//! every node itself, while the enumerator opens each path through its own
//! [`NodeOpener`](crate::enumerate::NodeOpener).

use std::io;
use std::path::{Path, PathBuf};

/// List entries of `directory` whose file name starts with `prefix`.
pub fn find_nodes(directory: &Path, prefix: &str) -> io::Result<Vec<PathBuf>> {
    let mut out: Vec<PathBuf> = std::fs::read_dir(directory)?
        .flatten()
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .map(|name| name.starts_with(prefix))
                .unwrap_or(false)
        })
        .map(|entry| entry.path())
        .collect();

    out.sort();
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_matching_nodes_sorted() {
        let dir = std::env::temp_dir().join(format!("evloop-discovery-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        for name in ["event2", "event0", "mouse0", "event1", "js0", "by-event"] {
            std::fs::write(dir.join(name), b"").unwrap();
        }

        let found = find_nodes(&dir, "event").unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, ["event0", "event1", "event2"]);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn empty_prefix_lists_everything() {
        let dir = std::env::temp_dir().join(format!("evloop-discovery-all-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        for name in ["b", "a"] {
            std::fs::write(dir.join(name), b"").unwrap();
        }

        assert_eq!(find_nodes(&dir, "").unwrap(), [dir.join("a"), dir.join("b")]);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_directory_is_an_error() {
        assert!(find_nodes(Path::new("/nonexistent/evloop"), "event").is_err());
    }
}
