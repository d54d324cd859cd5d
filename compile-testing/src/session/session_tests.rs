//! End-to-end session tests against a scripted toolchain.

#[cfg(test)]
mod tests {
    use crate::config::{HarnessConfig, KnownErrorConfig};
    use crate::context::BuildFlags;
    use crate::core::ExitCode;
    use crate::errors::{ConfigurationError, HarnessError};
    use crate::events::{kinds, CollectingEventSink, LoggingEventSink};
    use crate::host::StaticDiscovery;
    use crate::pipeline::StageDescriptor;
    use crate::session::{AnnotationProcessing, Compilation};
    use crate::stages::builtin::{PrimaryCompileStage, SecondaryCompileStage};
    use crate::stages::NoOpStage;
    use crate::testing::fixtures::{primary_source, secondary_source};
    use crate::testing::{
        assert_exit_code, assert_messages_contain, ErroringStage, MockStage, ScriptedResponse,
        ScriptedToolchain,
    };
    use crate::toolchain::Tool;
    use pretty_assertions::assert_eq;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    fn session(work: &Path, toolchain: &Arc<ScriptedToolchain>) -> Compilation {
        session_with(HarnessConfig::new(), work, toolchain)
    }

    fn session_with(
        config: HarnessConfig,
        work: &Path,
        toolchain: &Arc<ScriptedToolchain>,
    ) -> Compilation {
        Compilation::new(config.with_working_dir(work))
            .with_toolchain(toolchain.clone())
            .with_discovery(Arc::new(StaticDiscovery::default()))
    }

    fn record_ids(result: &crate::session::CompilationResult) -> Vec<&str> {
        result.records.iter().map(|r| r.stage_id.as_str()).collect()
    }

    #[test]
    fn test_primary_only_compilation() {
        let work = tempfile::tempdir().unwrap();
        let toolchain = Arc::new(ScriptedToolchain::new().with_response(
            Tool::PrimaryCompiler,
            ScriptedResponse::ok().with_file("classes", "com/example/Foo.class", "cafebabe"),
        ));

        let result = session(work.path(), &toolchain)
            .with_source(primary_source("Foo"))
            .run()
            .unwrap();

        assert_exit_code(&result, ExitCode::Ok);
        assert_eq!(toolchain.tool_sequence(), vec![Tool::PrimaryCompiler]);
        assert_eq!(record_ids(&result), vec!["primary-compile", "secondary-compile"]);
        assert!(result.records[1].skipped);
        assert_eq!(
            result.loader().resolve("com.example.Foo"),
            Some(work.path().join("final-output/com/example/Foo.class"))
        );
    }

    #[test]
    fn test_mixed_sources_compile_in_order() {
        let work = tempfile::tempdir().unwrap();
        let toolchain = Arc::new(
            ScriptedToolchain::new()
                .with_response(
                    Tool::PrimaryCompiler,
                    ScriptedResponse::ok().with_file("classes", "Foo.class", "foo"),
                )
                .with_response(
                    Tool::SecondaryCompiler,
                    ScriptedResponse::ok().with_file("classes", "Bar.class", "bar"),
                ),
        );

        let result = session(work.path(), &toolchain)
            .with_sources(vec![primary_source("Foo"), secondary_source("Bar")])
            .run()
            .unwrap();

        assert_exit_code(&result, ExitCode::Ok);
        assert_eq!(
            toolchain.tool_sequence(),
            vec![Tool::PrimaryCompiler, Tool::SecondaryCompiler]
        );

        let primary = &toolchain.invocations_of(Tool::PrimaryCompiler)[0];
        assert_eq!(primary.sources.len(), 2);

        let secondary = &toolchain.invocations_of(Tool::SecondaryCompiler)[0];
        assert_eq!(secondary.sources.len(), 1);
        assert!(secondary.sources[0].ends_with("Bar.java"));
        let classpath = secondary.arguments.value_of("-classpath").unwrap();
        let primary_classes = work.path().join("primary").join("classes");
        assert!(std::env::split_paths(classpath).any(|p| p == primary_classes));

        let compiled = result.compiled_files().unwrap();
        assert_eq!(
            compiled,
            vec![
                work.path().join("final-output/Bar.class"),
                work.path().join("final-output/Foo.class"),
            ]
        );
    }

    #[test]
    fn test_missing_plugin_is_internal_error_without_invocation() {
        let work = tempfile::tempdir().unwrap();
        let toolchain = Arc::new(ScriptedToolchain::new());

        let result = session(work.path(), &toolchain)
            .with_source(primary_source("Foo"))
            .with_plugin_classpaths(vec![PathBuf::from("/definitely/missing/plugin.jar")])
            .run()
            .unwrap();

        assert_exit_code(&result, ExitCode::InternalError);
        assert_messages_contain(&result, "Plugin /definitely/missing/plugin.jar not found");
        assert!(toolchain.invocations().is_empty());
        assert!(result.records.is_empty());
        assert!(result.output_directory.ends_with("error-placeholder-dir"));
    }

    #[test]
    fn test_failure_stops_pipeline_and_adds_hint() {
        let work = tempfile::tempdir().unwrap();
        let toolchain = Arc::new(ScriptedToolchain::new().with_response(
            Tool::PrimaryCompiler,
            ScriptedResponse::failing(
                ExitCode::ProcessingError,
                "error: Unable to find package java.lang in classpath or bootclasspath\n",
            ),
        ));

        let result = session(work.path(), &toolchain)
            .with_sources(vec![primary_source("Foo"), secondary_source("Bar")])
            .run()
            .unwrap();

        assert_exit_code(&result, ExitCode::ProcessingError);
        assert_messages_contain(&result, "Unable to find package java.lang");
        assert_messages_contain(&result, "warning: ");
        assert_messages_contain(&result, "JDK class library");
        assert_eq!(toolchain.tool_sequence(), vec![Tool::PrimaryCompiler]);
        assert_eq!(record_ids(&result), vec!["primary-compile"]);
    }

    #[test]
    fn test_configured_known_error_hint() {
        let work = tempfile::tempdir().unwrap();
        let toolchain = Arc::new(ScriptedToolchain::new().with_response(
            Tool::PrimaryCompiler,
            ScriptedResponse::failing(ExitCode::RuntimeError, "java.lang.OutOfMemoryError: heap\n"),
        ));
        let config = HarnessConfig::new()
            .with_known_error(KnownErrorConfig::new(r"OutOfMemoryError", "Give the compiler more heap."));

        let result = session_with(config, work.path(), &toolchain)
            .with_source(primary_source("Foo"))
            .run()
            .unwrap();

        assert_exit_code(&result, ExitCode::RuntimeError);
        assert_messages_contain(&result, "warning: Give the compiler more heap.");
    }

    #[test]
    fn test_no_hint_on_success() {
        let work = tempfile::tempdir().unwrap();
        let toolchain = Arc::new(ScriptedToolchain::new().with_response(
            Tool::PrimaryCompiler,
            ScriptedResponse::ok().with_diagnostics("note: Unable to find package java.lang\n"),
        ));

        let result = session(work.path(), &toolchain)
            .with_source(primary_source("Foo"))
            .run()
            .unwrap();

        assert_exit_code(&result, ExitCode::Ok);
        assert!(!result.messages.contains("JDK class library"));
    }

    #[test]
    fn test_invalid_known_error_pattern_is_configuration_error() {
        let work = tempfile::tempdir().unwrap();
        let toolchain = Arc::new(ScriptedToolchain::new());
        let config = HarnessConfig::new().with_known_error(KnownErrorConfig::new("(unclosed", "x"));

        let err = session_with(config, work.path(), &toolchain).run().unwrap_err();

        assert!(matches!(
            err,
            HarnessError::Configuration(ConfigurationError::Invalid(_))
        ));
        assert!(toolchain.invocations().is_empty());
    }

    #[test]
    fn test_feature_registers_stage_once() {
        let work = tempfile::tempdir().unwrap();
        let toolchain = Arc::new(ScriptedToolchain::new());
        let mut compilation = session(work.path(), &toolchain);

        compilation
            .annotation_processing()
            .unwrap()
            .processors
            .push("demo.Processor".to_string());
        let config = compilation.annotation_processing().unwrap();
        assert_eq!(config.processors, vec!["demo.Processor".to_string()]);

        assert_eq!(compilation.stage_ids(), ["annotation-processing".to_string()]);
    }

    #[test]
    fn test_feature_without_processors_skips() {
        let work = tempfile::tempdir().unwrap();
        let toolchain = Arc::new(ScriptedToolchain::new());
        let mut compilation = session(work.path(), &toolchain).with_source(primary_source("Foo"));
        compilation.symbol_processing().unwrap();

        let result = compilation.run().unwrap();

        assert_exit_code(&result, ExitCode::Ok);
        assert_eq!(
            record_ids(&result),
            vec!["symbol-processing", "primary-compile", "secondary-compile"]
        );
        assert!(result.records[0].skipped);
        assert_eq!(toolchain.tool_sequence(), vec![Tool::PrimaryCompiler]);
    }

    #[test]
    fn test_annotation_processing_feeds_primary_compile() {
        let work = tempfile::tempdir().unwrap();
        let toolchain = Arc::new(
            ScriptedToolchain::new()
                .with_response(
                    Tool::AnnotationProcessor,
                    ScriptedResponse::ok().with_file(
                        "generated",
                        "com/example/Generated.kt",
                        "class Generated",
                    ),
                )
                .with_response(
                    Tool::PrimaryCompiler,
                    ScriptedResponse::ok()
                        .with_file("classes", "com/example/Foo.class", "foo")
                        .with_file("classes", "com/example/Generated.class", "gen"),
                ),
        );
        let mut compilation = session(work.path(), &toolchain).with_source(primary_source("Foo"));
        *compilation.annotation_processing().unwrap() =
            AnnotationProcessing::new().with_processor("demo.Processor");

        let result = compilation.run().unwrap();

        assert_exit_code(&result, ExitCode::Ok);
        assert_eq!(
            toolchain.tool_sequence(),
            vec![Tool::AnnotationProcessor, Tool::PrimaryCompiler]
        );
        let primary = &toolchain.invocations_of(Tool::PrimaryCompiler)[0];
        assert!(primary.sources.iter().any(|p| p.ends_with("Generated.kt")));
        assert!(primary.parameters.processors.is_empty());

        assert!(result
            .generated_sources
            .iter()
            .any(|p| p.ends_with("com/example/Generated.kt")));
        let loader = result.loader();
        assert!(loader.contains("com.example.Foo"));
        assert!(loader.contains("com.example.Generated"));
    }

    #[test]
    fn test_cycle_is_reported_before_any_invocation() {
        let work = tempfile::tempdir().unwrap();
        let toolchain = Arc::new(ScriptedToolchain::new());
        let mut compilation = session(work.path(), &toolchain).with_source(primary_source("Foo"));
        compilation
            .register_stage(
                StageDescriptor::new("lint")
                    .run_before(PrimaryCompileStage::ID)
                    .run_after(SecondaryCompileStage::ID),
                Box::new(NoOpStage::new("lint")),
            )
            .unwrap();

        let err = compilation.run().unwrap_err();

        assert!(matches!(
            err,
            HarnessError::Configuration(ConfigurationError::CycleDetected { .. })
        ));
        assert!(toolchain.invocations().is_empty());
    }

    #[test]
    fn test_user_stage_replaces_builtin() {
        let work = tempfile::tempdir().unwrap();
        let toolchain = Arc::new(ScriptedToolchain::new());
        let mut compilation = session(work.path(), &toolchain).with_source(primary_source("Foo"));
        compilation
            .register_stage(
                PrimaryCompileStage::descriptor(),
                Box::new(MockStage::new(PrimaryCompileStage::ID)),
            )
            .unwrap();

        let result = compilation.run().unwrap();

        assert_exit_code(&result, ExitCode::Ok);
        assert!(toolchain.invocations().is_empty());
        assert_eq!(record_ids(&result), vec!["primary-compile", "secondary-compile"]);
    }

    #[test]
    fn test_stage_crash_is_internal_error() {
        let work = tempfile::tempdir().unwrap();
        let toolchain = Arc::new(ScriptedToolchain::new());
        let mut compilation = session(work.path(), &toolchain).with_source(primary_source("Foo"));
        compilation
            .register_stage(
                StageDescriptor::new("boom"),
                Box::new(ErroringStage::new("boom", "disk on fire")),
            )
            .unwrap();

        let result = compilation.run().unwrap();

        assert_exit_code(&result, ExitCode::InternalError);
        assert_messages_contain(&result, "Stage 'boom' failed unexpectedly");
        assert_messages_contain(&result, "disk on fire");
        assert!(toolchain.invocations().is_empty());
        assert_eq!(result.records[0].error.as_deref().map(|e| e.contains("disk on fire")), Some(true));
    }

    #[test]
    fn test_events_reach_the_session_sink() {
        let work = tempfile::tempdir().unwrap();
        let toolchain = Arc::new(ScriptedToolchain::new());
        let sink = Arc::new(CollectingEventSink::new());

        session(work.path(), &toolchain)
            .with_event_sink(sink.clone())
            .with_source(primary_source("Foo"))
            .run()
            .unwrap();

        let types = sink.event_types();
        assert_eq!(types.first().map(String::as_str), Some(kinds::PIPELINE_STARTED));
        assert_eq!(types.last().map(String::as_str), Some(kinds::PIPELINE_COMPLETED));
        assert_eq!(sink.events_of_type(kinds::STAGE_SKIPPED).len(), 1);
    }

    #[test]
    fn test_verbose_flag_records_log_lines() {
        let work = tempfile::tempdir().unwrap();
        let toolchain = Arc::new(ScriptedToolchain::new());
        let flags = BuildFlags {
            verbose: true,
            ..BuildFlags::default()
        };

        let result = session(work.path(), &toolchain)
            .with_flags(flags)
            .with_source(secondary_source("Bar"))
            .run()
            .unwrap();

        assert_exit_code(&result, ExitCode::Ok);
        assert_messages_contain(&result, "logging: No primary-language sources found");
        assert_eq!(toolchain.tool_sequence(), vec![Tool::SecondaryCompiler]);
    }

    #[test]
    fn test_verbose_set_through_flags_mut_records_log_lines() {
        let work = tempfile::tempdir().unwrap();
        let toolchain = Arc::new(ScriptedToolchain::new());

        let mut compilation =
            session(work.path(), &toolchain).with_source(secondary_source("Bar"));
        compilation.flags_mut().verbose = true;
        let result = compilation.run().unwrap();

        assert_exit_code(&result, ExitCode::Ok);
        assert_messages_contain(&result, "logging: No primary-language sources found");
    }

    #[test]
    fn test_verbose_cleared_through_flags_mut_drops_log_lines() {
        let work = tempfile::tempdir().unwrap();
        let toolchain = Arc::new(ScriptedToolchain::new());
        let flags = BuildFlags {
            verbose: true,
            ..BuildFlags::default()
        };

        let mut compilation = session(work.path(), &toolchain)
            .with_flags(flags)
            .with_source(secondary_source("Bar"));
        compilation.flags_mut().verbose = false;
        let result = compilation.run().unwrap();

        assert_exit_code(&result, ExitCode::Ok);
        assert!(!result.messages.contains("logging: "));
    }

    #[test]
    fn test_logging_event_sink_runs_alongside_session() {
        let work = tempfile::tempdir().unwrap();
        let toolchain = Arc::new(ScriptedToolchain::new());

        let result = session(work.path(), &toolchain)
            .with_event_sink(Arc::new(LoggingEventSink::debug()))
            .with_source(primary_source("Foo"))
            .run()
            .unwrap();

        assert_exit_code(&result, ExitCode::Ok);
        assert_eq!(toolchain.tool_sequence(), vec![Tool::PrimaryCompiler]);
    }

    #[test]
    fn test_default_working_dir_is_unique_per_session() {
        let a = Compilation::new(HarnessConfig::new());
        let b = Compilation::new(HarnessConfig::new());
        assert_ne!(a.working_dir(), b.working_dir());
        assert!(a
            .working_dir()
            .to_string_lossy()
            .contains(&format!("compile-testing-{}", a.run_id())));
    }
}
