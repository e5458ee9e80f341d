#[cfg(test)]
mod tests {
    use std::{
        fs,
        io,
        path::{Path, PathBuf},
        sync::{atomic::{AtomicUsize, Ordering}, Arc},
    };
    use tempfile::TempDir;
    use cerebellum_models::{
        compiler::{ensure_compiled, load_mechanisms, CompileOutcome, Nrnivmodl, Toolchain},
        error::CompilerError,
        paths::resolve_model_library,
    };

    /// Counts invocations and optionally produces the library
    struct CountingToolchain {
        calls: Arc<AtomicUsize>,
        lib_path: Option<PathBuf>,
        status: i32,
    }

    impl Toolchain for CountingToolchain {
        fn compile(&self, _mod_path: &Path) -> io::Result<Option<i32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(lib_path) = &self.lib_path {
                fs::create_dir_all(lib_path.parent().unwrap())?;
                fs::write(lib_path, b"")?;
            }

            Ok(Some(self.status))
        }
    }

    #[test]
    pub fn test_compile_is_idempotent() -> Result<(), CompilerError> {
        let root = TempDir::new().unwrap();
        let (mod_path, lib_path) = resolve_model_library(root.path(), "cells", "PC2015Masoli");
        let calls = Arc::new(AtomicUsize::new(0));
        let toolchain = CountingToolchain { calls: calls.clone(), lib_path: Some(lib_path.clone()), status: 0 };

        assert_eq!(
            ensure_compiled(&mod_path, &lib_path, &toolchain),
            CompileOutcome::BuildAttempted { status: Some(0) },
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert_eq!(ensure_compiled(&mod_path, &lib_path, &toolchain), CompileOutcome::AlreadyCompiled);
        assert_eq!(ensure_compiled(&mod_path, &lib_path, &toolchain), CompileOutcome::AlreadyCompiled);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        load_mechanisms(&lib_path, true)
    }

    #[test]
    pub fn test_failed_build_surfaces_at_load() {
        let root = TempDir::new().unwrap();
        let (mod_path, lib_path) = resolve_model_library(root.path(), "cells", "PC2015Masoli");
        let calls = Arc::new(AtomicUsize::new(0));
        let toolchain = CountingToolchain { calls: calls.clone(), lib_path: None, status: 1 };

        assert_eq!(
            ensure_compiled(&mod_path, &lib_path, &toolchain),
            CompileOutcome::BuildAttempted { status: Some(1) },
        );
        // still missing, so the next call tries again
        ensure_compiled(&mod_path, &lib_path, &toolchain);
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        match load_mechanisms(&lib_path, true) {
            Err(CompilerError::MechanismLibraryMissing(path)) => assert_eq!(path, lib_path),
            Ok(()) => panic!("missing library should fail to load"),
        }
        assert!(load_mechanisms(&lib_path, false).is_ok());
    }

    #[test]
    pub fn test_missing_build_tool_is_not_an_error() {
        let root = TempDir::new().unwrap();
        let (mod_path, lib_path) = resolve_model_library(root.path(), "cells", "PC2015Masoli");
        fs::create_dir_all(&mod_path).unwrap();

        let toolchain = Nrnivmodl::new("definitely-not-a-build-tool-on-path");

        assert_eq!(
            ensure_compiled(&mod_path, &lib_path, &toolchain),
            CompileOutcome::BuildAttempted { status: None },
        );
        assert!(!lib_path.exists());
    }
}
