//! Init command implementation

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use lintbridge_core::LintbridgeConfig;
use miette::{IntoDiagnostic, Result};
use tracing::info;

const DEFAULT_CONFIG: &str = r#"{
  // Engine to run: "eslint-legacy", "eslint", "jshint" or "jslint".
  "engine": "jshint",

  // The engine process. File paths and options are appended as JSON arguments
  // and the source of each file is written to its stdin.
  "command": {
    "program": "node",
    "args": []
  },

  "ordering": "completion",
  "fix": true,
  "options": {}
}
"#;

/// Writes the default configuration into the current directory.
pub fn run_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(LintbridgeConfig::CONFIG_FILES[0]);
    write_config(&config_path, DEFAULT_CONFIG, force)?;
    info!("Created {}", config_path.display());
    Ok(())
}

/// Creates `path` without following symlinks. An existing file is only
/// replaced when `force` is set.
fn write_config(path: &Path, contents: &str, force: bool) -> Result<()> {
    loop {
        let err = match open_new(path) {
            Ok(mut file) => return file.write_all(contents.as_bytes()).into_diagnostic(),
            Err(e) => e,
        };

        if err.kind() != io::ErrorKind::AlreadyExists {
            return Err(err).into_diagnostic();
        }
        if !force {
            return Err(miette::miette!(
                "{} already exists. Use --force to overwrite.",
                path.display()
            ));
        }

        // Removing unlinks a symlink itself rather than its target.
        if let Err(e) = fs::remove_file(path)
            && e.kind() != io::ErrorKind::NotFound
        {
            return Err(e).into_diagnostic();
        }
    }
}

fn open_new(path: &Path) -> io::Result<fs::File> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.custom_flags(libc::O_NOFOLLOW);
    }

    options.open(path)
}
