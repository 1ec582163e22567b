/* Copyright © 2024-2025 Adam Train <adam@adamtrain.net>
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 */
use crate::config::config_file::Config;
use anyhow::{anyhow, bail, Error};
use dirs::home_dir;
use std::collections::HashSet;
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

pub struct Filesystem {
	/// Set of file paths that have been inspected.
	/// Used to avoid circular includes.
	included_files: HashSet<PathBuf>,
}

impl Filesystem {
	pub fn new() -> Self {
		Self {
			included_files: HashSet::new(),
		}
	}

	pub fn open(&self, path: &Path) -> Result<File, Error> {
		File::open(path)
			.map_err(|e| anyhow!("Unable to open {}: {}", path.display(), e))
	}

	pub fn declare_file(&mut self, path: &Path) -> Result<(), Error> {
		let key = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
		if !self.included_files.insert(key) {
			bail!("Circular file includes: {}", path.display())
		}
		Ok(())
	}

	/// Resolves the target of an include statement. Relative targets are
	/// taken relative to the directory of the including file.
	pub fn resolve_include(&self, including: &Path, target: &str) -> PathBuf {
		let target = expand_home(target);
		if target.is_absolute() {
			return target;
		}

		match including.parent() {
			Some(dir) => dir.join(target),
			None => target,
		}
	}

	/// Fetches the config from the given path, or default path if none.
	/// The default file is created empty when missing; a custom path must
	/// exist.
	pub fn get_config(
		&self,
		custom_config_path: Option<&String>,
	) -> Result<Config, Error> {
		let config_path = match &custom_config_path {
			None => match home_dir() {
				Some(home) => home.join(".config/ledgerfill/config.toml"),
				None => bail!("Unable to determine home directory"),
			},
			Some(p) => expand_home(p),
		};

		// create empty config file if it doesn't exist
		if !config_path.exists() && custom_config_path.is_none() {
			if let Some(parent) = config_path.parent() {
				fs::create_dir_all(parent)?;
			}
			File::create(config_path.clone())?;
		}

		let content = fs::read_to_string(&config_path).map_err(|e| {
			anyhow!("failed to read config {}: {}", config_path.display(), e)
		})?;
		let config: Config = toml::from_str(&content)
			.map_err(|e| anyhow!("failed to parse config: {}", e))?;

		Ok(config)
	}
}

/// Replaces a leading `~/` with the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
	if let Some(rest) = path.strip_prefix("~/") {
		if let Some(home) = home_dir() {
			return home.join(rest);
		}
	}
	PathBuf::from(path)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn test_declare_file() {
		let mut filesystem = Filesystem::new();
		let path = Path::new("path/to/file");
		assert!(filesystem.declare_file(path).is_ok());
		assert!(filesystem.included_files.contains(path));
		assert!(filesystem.declare_file(path).is_err());
	}

	#[test]
	fn test_resolve_include_relative() {
		let filesystem = Filesystem::new();
		let resolved = filesystem
			.resolve_include(Path::new("books/main.ledger"), "2024.ledger");
		assert_eq!(resolved, PathBuf::from("books/2024.ledger"));
	}

	#[test]
	fn test_resolve_include_absolute() {
		let filesystem = Filesystem::new();
		let resolved = filesystem
			.resolve_include(Path::new("books/main.ledger"), "/tmp/x.ledger");
		assert_eq!(resolved, PathBuf::from("/tmp/x.ledger"));
	}

	#[test]
	fn test_custom_config_must_exist() {
		let filesystem = Filesystem::new();
		let missing = "/definitely/not/here/config.toml".to_string();
		assert!(filesystem.get_config(Some(&missing)).is_err());
	}

	#[test]
	fn test_custom_config_is_parsed() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "currency = \"€\"\nmax_age = 90").unwrap();

		let path = file.path().to_string_lossy().to_string();
		let config = Filesystem::new().get_config(Some(&path)).unwrap();
		assert_eq!(config.currency.as_deref(), Some("€"));
		assert_eq!(config.max_age, Some(90));
	}

	#[test]
	fn test_bad_config_is_rejected() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "max_age = \"forever\"").unwrap();

		let path = file.path().to_string_lossy().to_string();
		assert!(Filesystem::new().get_config(Some(&path)).is_err());
	}
}
