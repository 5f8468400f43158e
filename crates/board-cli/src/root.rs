use std::path::{Path, PathBuf};

/// Resolve the board root directory.
///
/// Priority:
/// 1. `--root` flag / `BOARD_ROOT` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `.board/`
/// 3. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_board(&cwd).unwrap_or(cwd)
}

fn find_board(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(board_core::paths::BOARD_DIR).is_dir())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_root_wins() {
        let dir = TempDir::new().unwrap();
        let result = resolve_root(Some(dir.path()));
        assert_eq!(result, dir.path());
    }

    #[test]
    fn finds_board_dir_from_nested_path() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".board")).unwrap();
        let subdir = dir.path().join("src/deep");
        std::fs::create_dir_all(&subdir).unwrap();

        assert_eq!(find_board(&subdir).as_deref(), Some(dir.path()));
    }

    #[test]
    fn no_board_dir_finds_nothing() {
        let dir = TempDir::new().unwrap();
        let subdir = dir.path().join("a/b");
        std::fs::create_dir_all(&subdir).unwrap();
        // An ancestor of the temp dir could itself hold a board; only check
        // that the temp tree contributes none.
        let found = find_board(&subdir);
        assert!(found.map_or(true, |p| !p.starts_with(dir.path())));
    }
}
