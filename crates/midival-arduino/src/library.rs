//! Staging the MIDI library into a sketchbook and compiling its examples.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::board::Board;
use crate::error::{Error, Result};
use crate::toolchain::{Toolchain, VerifyOutcome};

/// Name of the library directory under `<sketchbook>/libraries`.
pub const LIBRARY_NAME: &str = "MIDI";

const SOURCE_EXTENSIONS: [&str; 3] = ["cpp", "hpp", "h"];

/// Where to find things in a checkout of the library repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryLayout {
    pub root: PathBuf,
}

impl LibraryLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn src_dir(&self) -> PathBuf {
        self.root.join("src")
    }

    pub fn res_dir(&self) -> PathBuf {
        self.root.join("res")
    }
}

/// One sketch installed with the library, at `examples/<name>/<name>.ino`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Example {
    pub name: String,
    pub sketch: PathBuf,
}

impl Example {
    pub fn file_name(&self) -> String {
        format!("{}.ino", self.name)
    }
}

/// One example compiled for one board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileCheck {
    pub example: Example,
    pub board: Board,
    pub outcome: VerifyOutcome,
}

impl fmt::Display for CompileCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.outcome.passed() { "PASSED" } else { "FAILED" };
        write!(f, "{:40} {}", self.example.file_name(), status)
    }
}

/// Every check run, in order. Validation stops at the first failure, which is
/// then the last entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileReport {
    pub checks: Vec<CompileCheck>,
}

impl CompileReport {
    pub fn passed(&self) -> bool {
        self.failure().is_none()
    }

    pub fn failure(&self) -> Option<&CompileCheck> {
        self.checks.iter().find(|c| !c.outcome.passed())
    }
}

/// The files that make up the installed library.
///
/// Both maps go from a path relative to the installed library directory to
/// the file or directory it is copied from.
#[derive(Debug, Clone)]
pub struct ArduinoMidiLibrary {
    layout: LibraryLayout,
    sources: BTreeMap<PathBuf, PathBuf>,
    resources: BTreeMap<PathBuf, PathBuf>,
}

impl ArduinoMidiLibrary {
    /// Collect sources and resources from a repository checkout.
    pub fn scan(layout: LibraryLayout) -> Result<Self> {
        let src_dir = layout.src_dir();
        if !src_dir.is_dir() {
            return Err(Error::MissingResource(src_dir));
        }

        let mut sources = BTreeMap::new();
        for entry in WalkDir::new(&src_dir) {
            let entry = entry?;
            if !entry.file_type().is_file() || !is_source(entry.path()) {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(&src_dir)
                .map_err(|_| Error::MissingResource(entry.path().to_path_buf()))?;
            sources.insert(relative.to_path_buf(), entry.path().to_path_buf());
        }
        debug!("Found {} library source(s) in {}", sources.len(), src_dir.display());

        let res_dir = layout.res_dir();
        let mut resources = BTreeMap::new();
        resources.insert(PathBuf::from("keywords.txt"), res_dir.join("keywords.txt"));
        resources.insert(PathBuf::from("examples"), res_dir.join("examples"));
        for source in resources.values() {
            if !source.exists() {
                return Err(Error::MissingResource(source.clone()));
            }
        }

        Ok(Self {
            layout,
            sources,
            resources,
        })
    }

    pub fn layout(&self) -> &LibraryLayout {
        &self.layout
    }

    pub fn sources(&self) -> &BTreeMap<PathBuf, PathBuf> {
        &self.sources
    }

    pub fn resources(&self) -> &BTreeMap<PathBuf, PathBuf> {
        &self.resources
    }

    pub fn install_dir(toolchain: &Toolchain) -> PathBuf {
        toolchain.library_dir().join(LIBRARY_NAME)
    }

    /// Copy everything into the toolchain's library directory. Files are
    /// overwritten; directory resources replace whatever was there before.
    pub fn install(&self, toolchain: &Toolchain) -> Result<PathBuf> {
        let dest_root = Self::install_dir(toolchain);
        info!("Installing MIDI library to {}", dest_root.display());

        for (relative, source) in self.sources.iter().chain(self.resources.iter()) {
            let dest = dest_root.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            if source.is_dir() {
                if dest.exists() {
                    fs::remove_dir_all(&dest)?;
                }
                copy_tree(source, &dest)?;
            } else {
                fs::copy(source, &dest)?;
            }
            debug!("{} -> {}", source.display(), dest.display());
        }
        Ok(dest_root)
    }

    /// Examples present in the installed library, sorted by name.
    pub fn installed_examples(toolchain: &Toolchain) -> Result<Vec<Example>> {
        let examples_dir = Self::install_dir(toolchain).join("examples");
        let mut examples = Vec::new();
        for entry in WalkDir::new(&examples_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry?;
            if !entry.file_type().is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let sketch = entry.path().join(format!("{}.ino", name));
            examples.push(Example { name, sketch });
        }
        Ok(examples)
    }

    /// Compile every installed example for each board, boards outermost.
    /// Stops at the first failed compilation.
    pub fn validate(toolchain: &Toolchain, boards: &[Board]) -> Result<CompileReport> {
        let examples = Self::installed_examples(toolchain)?;
        let mut report = CompileReport::default();
        for board in boards {
            info!("Validation for Arduino {}", board.name);
            for example in &examples {
                let outcome = toolchain.verify(&example.sketch, board)?;
                let check = CompileCheck {
                    example: example.clone(),
                    board: board.clone(),
                    outcome,
                };
                info!("{}", check);
                report.checks.push(check);
                if !outcome.passed() {
                    return Ok(report);
                }
            }
        }
        Ok(report)
    }
}

fn is_source(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    for entry in WalkDir::new(src) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|_| Error::MissingResource(entry.path().to_path_buf()))?;
        let dest = dst.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest)?;
        } else {
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &dest)?;
        }
    }
    Ok(())
}
