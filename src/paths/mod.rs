//! Filesystem conventions for model sources, compiled mechanism libraries
//! and prediction outputs. Every function takes an explicit root, the process
//! working directory is never read or changed.

use std::{
    fs,
    path::{Path, PathBuf},
};
use log::{debug, warn};
use crate::error::PathError;


/// Directory holding every model, relative to the root
pub const MODELS_DIR: &str = "models";
/// Directory holding every saved prediction, relative to the root
pub const PREDICTIONS_DIR: &str = "model-predictions";
/// Directory of native mechanism sources inside a model directory
pub const MOD_FILES_DIR: &str = "mod_files";
/// Compiled mechanism library inside a model directory
pub const LIBRARY_SUBPATH: [&str; 3] = ["x86_64", ".libs", "libnrnmech.so.0"];

/// Identifies which model's files and prediction paths to resolve
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelDescriptor {
    scale: String,
    name: String,
}

impl ModelDescriptor {
    pub fn new(scale: impl Into<String>, name: impl Into<String>) -> Self {
        ModelDescriptor { scale: scale.into(), name: name.into() }
    }

    /// Modelling scale, for example `"cells"`
    pub fn scale(&self) -> &str {
        &self.scale
    }

    /// Model name, for example `"PC2015Masoli"`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path to the model directory under `root`
    pub fn model_path(&self, root: &Path) -> PathBuf {
        root.join(MODELS_DIR).join(&self.scale).join(&self.name)
    }

    /// Directory names of the prediction output, in order
    pub fn prediction_dir_names(&self) -> [&str; 3] {
        [PREDICTIONS_DIR, self.scale.as_str(), self.name.as_str()]
    }
}

/// Returns the mod-file directory and the compiled library path of a model,
/// regardless of whether the model has been compiled
pub fn resolve_model_library(root: &Path, scale: &str, name: &str) -> (PathBuf, PathBuf) {
    let model_path = ModelDescriptor::new(scale, name).model_path(root);
    let mod_path = model_path.join(MOD_FILES_DIR);
    let lib_path = LIBRARY_SUBPATH.iter()
        .fold(model_path, |path, component| path.join(component));

    (mod_path, lib_path)
}

/// Creates each missing directory along `root/names[0]/names[1]/...` and
/// returns the last one
pub fn ensure_directory_chain<S: AsRef<str>>(root: &Path, names: &[S]) -> Result<PathBuf, PathError> {
    if names.is_empty() {
        return Err(PathError::EmptyDirectoryChain);
    }

    let mut built_path = root.to_path_buf();
    for name in names {
        built_path.push(name.as_ref());

        if !built_path.is_dir() {
            debug!("creating directory {}", built_path.display());
            fs::create_dir(&built_path)
                .map_err(|source| PathError::Filesystem { path: built_path.clone(), source })?;
        }
    }

    Ok(built_path)
}

/// Lists the models available at a given scale, sorted by name
pub fn get_available_models(root: &Path, scale: &str) -> Result<Vec<String>, PathError> {
    let scale_path = root.join(MODELS_DIR).join(scale);
    let entries = fs::read_dir(&scale_path)
        .map_err(|source| PathError::Filesystem { path: scale_path.clone(), source })?;

    let mut models = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| PathError::Filesystem { path: scale_path.clone(), source })?;
        if entry.path().is_dir() {
            models.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    models.sort();

    Ok(models)
}

/// Joins directory names and a file name onto `root` without touching the filesystem
pub fn get_file_path<S: AsRef<str>>(root: &Path, dir_names: &[S], file_name: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    for dir_name in dir_names {
        path.push(dir_name.as_ref());
    }
    path.push(file_name);

    path
}

fn walk_for<F>(dir: &Path, matches: &F) -> Option<PathBuf>
where
    F: Fn(&Path) -> bool,
{
    let mut entries: Vec<PathBuf> = fs::read_dir(dir).ok()?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .collect();
    entries.sort();

    if let Some(found) = entries.iter().find(|path| matches(path)) {
        return Some(found.clone());
    }

    entries.iter()
        .filter(|path| path.is_dir())
        .find_map(|path| walk_for(path, matches))
}

fn has_file_name(path: &Path, name: &str) -> bool {
    path.file_name().map(|file_name| file_name == name).unwrap_or(false)
}

/// Searches `root/model-predictions` for a directory called `model_name`, then
/// searches that directory for `file_name`, returns `None` and logs a warning if
/// either cannot be found
pub fn get_prediction_file(root: &Path, model_name: &str, file_name: &str) -> Option<PathBuf> {
    let predictions = root.join(PREDICTIONS_DIR);

    let model_dir = match walk_for(&predictions, &|path: &Path| path.is_dir() && has_file_name(path, model_name)) {
        Some(dir) => dir,
        None => {
            warn!("There is no directory called {}", model_name);
            return None;
        }
    };

    let file_path = walk_for(&model_dir, &|path: &Path| path.is_file() && has_file_name(path, file_name));
    if file_path.is_none() {
        warn!("There is no file name called {}", file_name);
    }

    file_path
}
