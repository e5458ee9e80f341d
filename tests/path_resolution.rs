#[cfg(test)]
mod tests {
    use std::fs;
    use tempfile::TempDir;
    use cerebellum_models::{
        error::{CerebellumModelsError, PathError},
        paths::{
            ensure_directory_chain, get_available_models, get_file_path,
            get_prediction_file, resolve_model_library, ModelDescriptor,
        },
    };

    #[test]
    pub fn test_library_paths_follow_model_layout() {
        let root = TempDir::new().unwrap();
        let (mod_path, lib_path) = resolve_model_library(root.path(), "cells", "PC2015Masoli");

        let model_path = root.path().join("models").join("cells").join("PC2015Masoli");
        assert_eq!(mod_path, model_path.join("mod_files"));
        assert_eq!(lib_path, model_path.join("x86_64").join(".libs").join("libnrnmech.so.0"));
        assert!(!mod_path.exists());
    }

    #[test]
    pub fn test_directory_chain_is_created() -> Result<(), CerebellumModelsError> {
        let root = TempDir::new().unwrap();
        let descriptor = ModelDescriptor::new("cells", "PC2015Masoli");
        let cwd = std::env::current_dir().unwrap();

        let path = ensure_directory_chain(root.path(), &descriptor.prediction_dir_names())?;

        assert_eq!(path, root.path().join("model-predictions").join("cells").join("PC2015Masoli"));
        assert!(path.is_dir());
        assert_eq!(std::env::current_dir().unwrap(), cwd);

        // existing directories are reused
        let again = ensure_directory_chain(root.path(), &["model-predictions", "cells", "PC2015Masoli"])?;
        assert_eq!(again, path);

        Ok(())
    }

    #[test]
    pub fn test_empty_directory_chain_fails() {
        let root = TempDir::new().unwrap();
        let names: [&str; 0] = [];

        assert!(matches!(
            ensure_directory_chain(root.path(), &names),
            Err(PathError::EmptyDirectoryChain)
        ));
    }

    #[test]
    pub fn test_available_models_are_sorted() -> Result<(), CerebellumModelsError> {
        let root = TempDir::new().unwrap();
        for name in ["PC2015Masoli", "GrC2001DAngelo", "DCN2011Luthman"] {
            fs::create_dir_all(root.path().join("models").join("cells").join(name)).unwrap();
        }
        fs::write(root.path().join("models").join("cells").join("README"), "").unwrap();

        let models = get_available_models(root.path(), "cells")?;
        assert_eq!(models, vec!["DCN2011Luthman", "GrC2001DAngelo", "PC2015Masoli"]);

        assert!(get_available_models(root.path(), "microcircuits").is_err());

        Ok(())
    }

    #[test]
    pub fn test_prediction_file_lookup() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("model-predictions").join("cells").join("PC2015Masoli");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("vm_soma.txt"), "0.0 -65.0\n").unwrap();

        assert_eq!(
            get_prediction_file(root.path(), "PC2015Masoli", "vm_soma.txt"),
            Some(dir.join("vm_soma.txt")),
        );
        assert_eq!(get_prediction_file(root.path(), "PC2015Masoli", "vm_dend.txt"), None);
        assert_eq!(get_prediction_file(root.path(), "GrC2001DAngelo", "vm_soma.txt"), None);

        assert_eq!(
            get_file_path(root.path(), &["model-predictions", "cells", "PC2015Masoli"], "vm_soma.txt"),
            dir.join("vm_soma.txt"),
        );
    }
}
