// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::path::{Path, PathBuf};

use path_clean::clean;

pub type FindInParent = fn(&Path, &str) -> Option<PathBuf>;

/// Walk up from `path` looking for `filename`
pub fn find_in_parent(path: &Path, filename: &str) -> Option<PathBuf> {
    let mut current = path.to_path_buf();

    loop {
        let file_path = current.join(filename);
        if file_path.exists() {
            return Some(file_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Decide which config file to load.
///
/// Precedence: explicit cli path, then the nearest file named `default_filename` above `cwd`,
/// then the file inside `default_config_dir`.
pub fn resolve_config_path<P: Into<PathBuf>>(
    find_in_parent: FindInParent,
    cwd: P,
    default_config_dir: P,
    default_filename: &str,
    cli_file: Option<P>,
) -> PathBuf {
    let cli_file: Option<PathBuf> = cli_file.map(Into::into);
    let default_config_dir = default_config_dir.into();
    let cwd = cwd.into();

    if let Some(cli_file) = cli_file {
        if cli_file.is_absolute() {
            return cli_file;
        }

        return clean(cwd.join(cli_file));
    }

    if let Some(found) = find_in_parent(&cwd, default_filename) {
        return found;
    }

    clean(default_config_dir.join(default_filename))
}

#[cfg(test)]
mod tests {
    use super::{find_in_parent, resolve_config_path};
    use anyhow::Result;
    use std::path::{Path, PathBuf};

    const NAME: &str = "datefeedback.config.yaml";

    #[test]
    fn test_resolve_cli() -> Result<()> {
        fn not_found(_: &Path, _: &str) -> Option<PathBuf> {
            None
        }
        fn found(_: &Path, _: &str) -> Option<PathBuf> {
            Some(PathBuf::from("/foo/datefeedback.config.yaml"))
        }
        let path = resolve_config_path(
            not_found,
            PathBuf::from("/foo/bar"),
            PathBuf::from("/my/config"),
            NAME,
            None,
        );

        assert_eq!(path, PathBuf::from("/my/config/datefeedback.config.yaml"));

        let path = resolve_config_path(
            found, // cli argument wins
            PathBuf::from("/foo/bar"),
            PathBuf::from("/my/config"),
            NAME,
            Some(PathBuf::from("/my/absolute/conf.yaml")),
        );

        assert_eq!(path, PathBuf::from("/my/absolute/conf.yaml"));

        let path = resolve_config_path(
            found,
            PathBuf::from("/foo/bar"),
            PathBuf::from("/my/config"),
            NAME,
            Some(PathBuf::from("../conf.yaml")),
        );

        assert_eq!(path, PathBuf::from("/foo/conf.yaml"));

        let path = resolve_config_path(
            found,
            PathBuf::from("/foo/bar"),
            PathBuf::from("/my/config"),
            NAME,
            None,
        );

        assert_eq!(path, PathBuf::from("/foo/datefeedback.config.yaml"));
        Ok(())
    }

    #[test]
    fn test_find_in_parent_walks_up() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested)?;
        std::fs::write(dir.path().join(NAME), "chains: []")?;

        assert_eq!(find_in_parent(&nested, NAME), Some(dir.path().join(NAME)));
        assert_eq!(find_in_parent(&nested, "missing.yaml"), None);
        Ok(())
    }
}
