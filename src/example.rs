//! Code for working with the bundled example scenarios
use anyhow::{Context, Result};
use include_dir::{Dir, DirEntry, include_dir};
use std::fs;
use std::path::Path;

/// The directory containing the example scenarios.
const EXAMPLES_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/demos");

/// The name of the scenario file in each example
pub const SCENARIO_FILE_NAME: &str = "scenario.toml";

/// The name of the results directory in each example
pub const RESULTS_DIR_NAME: &str = "results";

/// Get the names of all examples
pub fn get_example_names() -> impl Iterator<Item = &'static str> {
    EXAMPLES_DIR.dirs().map(|dir| {
        dir.path()
            .as_os_str()
            .to_str()
            .expect("Invalid unicode in path")
    })
}

/// A bundled example scenario
pub struct Example(Dir<'static>);

impl Example {
    /// Get the example with the specified name
    pub fn from_name(name: &str) -> Result<Self> {
        let dir = EXAMPLES_DIR
            .get_dir(name)
            .with_context(|| format!("Example '{name}' not found"))?;

        Ok(Self(dir.clone()))
    }

    /// Get the contents of the readme file for this example
    pub fn get_readme(&self) -> Result<&'static str> {
        self.0
            .get_file(self.0.path().join("README.txt"))
            .context("Missing file")?
            .contents_utf8()
            .context("File not UTF-8 encoded")
    }

    /// Extract this example to a specified destination, including subdirectories
    pub fn extract(&self, new_path: &Path) -> Result<()> {
        fs::create_dir(new_path)
            .with_context(|| format!("Could not create directory {}", new_path.display()))?;
        extract_dir(&self.0, self.0.path(), new_path)
    }
}

fn extract_dir(dir: &Dir, root: &Path, dest: &Path) -> Result<()> {
    for entry in dir.entries() {
        let relative_path = entry.path().strip_prefix(root)?;
        let out_path = dest.join(relative_path);
        match entry {
            DirEntry::Dir(subdir) => {
                fs::create_dir_all(&out_path)?;
                extract_dir(subdir, root, dest)?;
            }
            DirEntry::File(file) => fs::write(&out_path, file.contents())?,
        }
    }

    Ok(())
}
