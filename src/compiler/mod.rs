//! Guards compilation of the native mechanism library, the build tool is
//! invoked at most once per missing library and its exit status is only logged.

use std::{
    path::Path,
    process::Command,
};
use log::{info, warn};
use crate::error::CompilerError;


/// Outcome of [`ensure_compiled`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileOutcome {
    /// Library was present, nothing was run
    AlreadyCompiled,
    /// Build tool was invoked, `status` is its exit code if it ran to completion
    BuildAttempted { status: Option<i32> },
}

/// Tool that compiles a directory of mechanism sources into a loadable library
pub trait Toolchain {
    /// Compiles the sources in `mod_path`, returns the exit code of the build
    /// if it could be determined
    fn compile(&self, mod_path: &Path) -> std::io::Result<Option<i32>>;
}

/// The `nrnivmodl` build tool, run with the mod directory name as its argument
/// from the directory containing it
#[derive(Debug, Clone)]
pub struct Nrnivmodl {
    /// Program to run
    pub program: String,
}

impl Default for Nrnivmodl {
    fn default() -> Self {
        Nrnivmodl { program: String::from("nrnivmodl") }
    }
}

impl Nrnivmodl {
    pub fn new(program: impl Into<String>) -> Self {
        Nrnivmodl { program: program.into() }
    }
}

impl Toolchain for Nrnivmodl {
    fn compile(&self, mod_path: &Path) -> std::io::Result<Option<i32>> {
        let mut command = Command::new(&self.program);
        if let Some(dir_name) = mod_path.file_name() {
            command.arg(dir_name);
        }
        if let Some(parent) = mod_path.parent() {
            command.current_dir(parent);
        }

        let status = command.status()?;

        Ok(status.code())
    }
}

/// Compiles the mechanisms in `mod_path` unless `lib_path` already exists,
/// build failures are logged and never returned as errors
pub fn ensure_compiled(mod_path: &Path, lib_path: &Path, toolchain: &dyn Toolchain) -> CompileOutcome {
    if lib_path.is_file() {
        info!("compiled files already exists");
        return CompileOutcome::AlreadyCompiled;
    }

    info!("compiling mechanisms in {}", mod_path.display());
    match toolchain.compile(mod_path) {
        Ok(Some(0)) => CompileOutcome::BuildAttempted { status: Some(0) },
        Ok(status) => {
            warn!("mechanism build in {} exited with status {:?}", mod_path.display(), status);
            CompileOutcome::BuildAttempted { status }
        },
        Err(e) => {
            warn!("could not run mechanism build in {}: {}", mod_path.display(), e);
            CompileOutcome::BuildAttempted { status: None }
        },
    }
}

/// Checks that the compiled library can be loaded, a missing library only
/// fails when `require` is set
pub fn load_mechanisms(lib_path: &Path, require: bool) -> Result<(), CompilerError> {
    if lib_path.is_file() {
        info!("loading mechanisms from {}", lib_path.display());
        return Ok(());
    }

    if require {
        return Err(CompilerError::MechanismLibraryMissing(lib_path.to_path_buf()));
    }

    warn!("mechanism library {} is missing, using built in mechanisms", lib_path.display());

    Ok(())
}
