//! Compile command implementation

use std::sync::Arc;

use super::{env_extensions, modules_requested, Cli, EXIT_ERROR, EXIT_SUCCESS};
use crate::build::{
    resolve_extensions, CompileContext, CompileLogger, RegistrySerializer, BUILTIN_EXTENSIONS,
};
use crate::config::{load_config, merge_cli_overrides, parse_source_list, CliOverrides};

/// Run one compilation with the given arguments, reporting through `logger`.
///
/// Returns the process exit code.
pub fn run_compile(cli: &Cli, logger: Arc<dyn CompileLogger>) -> u8 {
    let mut config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            logger.error_with("Error loading config", &e);
            return EXIT_ERROR;
        }
    };

    let overrides = CliOverrides {
        sources: cli.sources.as_deref().map(parse_source_list),
        output: cli.output.clone(),
        exclude: cli.excluded.clone(),
        extensions: env_extensions(),
        strict: cli.strict.then_some(true),
        serialize_on_failure: cli.serialize_on_failure.then_some(true),
        parallel: cli.no_parallel.then_some(false),
    };
    merge_cli_overrides(&mut config, &overrides);

    if config.compile.sources.is_empty() {
        logger.error("Missing required argument: comma-separated list of source directories");
        return EXIT_ERROR;
    }
    if config.compile.output.is_none() {
        logger.error("Missing required argument: output directory");
        return EXIT_ERROR;
    }

    if modules_requested() {
        logger.warning(
            "A separate modules run is no longer needed; list module sources after \
             component sources in a single run",
        );
    }

    let (extensions, unknown) = resolve_extensions(&config.compile.extensions);
    for name in unknown {
        logger.warning(&format!(
            "Unknown extension '{}' (available: {})",
            name,
            BUILTIN_EXTENSIONS.join(", ")
        ));
    }

    let context = CompileContext::from_config(&config)
        .with_extensions(extensions)
        .with_logger(Arc::clone(&logger));
    logger.debug(&format!("{:?}", context));

    let mut run = RegistrySerializer::new(context);
    match run.execute() {
        Ok(summary) => {
            logger.info(&format!(
                "Compiled {} artifact(s) in {:.2?}",
                summary.artifact_count, summary.duration
            ));
            EXIT_SUCCESS
        }
        Err(e) => {
            match e.cause() {
                Some(cause) => logger.error_with(e.message(), cause),
                None => logger.error(e.message()),
            }
            EXIT_ERROR
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::{LogLevel, MemoryLogger};
    use clap::Parser;
    use serial_test::serial;
    use std::fs::{self, File};
    use std::io::Write;
    use std::path::Path;
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, name: &str) {
        let path = dir.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        File::create(&path).unwrap().write_all(b"<x/>").unwrap();
    }

    fn compile(args: &[&str]) -> (u8, Arc<MemoryLogger>) {
        let mut argv = vec!["bundlec"];
        argv.extend_from_slice(args);
        let cli = Cli::try_parse_from(argv).unwrap();
        let logger = Arc::new(MemoryLogger::new());
        let code = run_compile(&cli, logger.clone());
        (code, logger)
    }

    #[test]
    #[serial]
    fn test_compile_success() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        create_test_file(src.path(), "acme/Card/Card.cmp");

        let (code, logger) = compile(&[
            src.path().to_str().unwrap(),
            out.path().to_str().unwrap(),
        ]);
        assert_eq!(code, EXIT_SUCCESS);
        assert_eq!(logger.count(LogLevel::Error), 0);
        assert!(out.path().join("registries.json").exists());
    }

    #[test]
    #[serial]
    fn test_missing_output_is_an_error() {
        let src = TempDir::new().unwrap();
        let (code, logger) = compile(&[src.path().to_str().unwrap()]);

        assert_eq!(code, EXIT_ERROR);
        assert!(logger.messages(LogLevel::Error)[0].contains("output directory"));
    }

    #[test]
    #[serial]
    fn test_blank_source_list_is_missing() {
        let out = TempDir::new().unwrap();
        let (code, logger) = compile(&[" , ", out.path().to_str().unwrap()]);

        assert_eq!(code, EXIT_ERROR);
        assert!(logger.messages(LogLevel::Error)[0].contains("source directories"));
    }

    #[test]
    #[serial]
    fn test_unknown_extension_warns() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        std::env::set_var(crate::cli::EXTENSIONS_ENV, "modules,nonsense");

        let (code, logger) = compile(&[
            src.path().to_str().unwrap(),
            out.path().to_str().unwrap(),
        ]);
        std::env::remove_var(crate::cli::EXTENSIONS_ENV);

        assert_eq!(code, EXIT_SUCCESS);
        let warnings = logger.messages(LogLevel::Warning);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("'nonsense'"));
    }

    #[test]
    #[serial]
    fn test_failed_run_reports_message() {
        let out = TempDir::new().unwrap();
        let missing = out.path().join("missing");
        let (code, logger) = compile(&[
            missing.to_str().unwrap(),
            out.path().to_str().unwrap(),
        ]);

        assert_eq!(code, EXIT_ERROR);
        let errors = logger.messages(LogLevel::Error);
        assert!(errors.iter().any(|m| m.starts_with("Pre-flight check failed, Invalid source")));
    }

    #[test]
    #[serial]
    fn test_config_file_supplies_inputs() {
        let project = TempDir::new().unwrap();
        create_test_file(project.path(), "src/acme/Card/Card.cmp");
        create_test_file(project.path(), "src/blocked/Hidden/Hidden.cmp");
        fs::write(
            project.path().join("bundlec.toml"),
            "[compile]\nsources = [\"src\"]\noutput = \"build\"\nexclude = [\"blocked\"]\n\n\
             [output]\nfile_name = \"reg.json\"\npretty = false\n",
        )
        .unwrap();
        let config = project.path().join("bundlec.toml");

        let (code, _) = compile(&["--config", config.to_str().unwrap()]);
        assert_eq!(code, EXIT_SUCCESS);

        let json = fs::read_to_string(project.path().join("build/reg.json")).unwrap();
        assert!(json.contains("acme:Card"));
        assert!(!json.contains("blocked"));
    }
}
