//! Tests for model decoration.

#[cfg(test)]
mod tests {
    use crate::context::{
        BuildFlags, BuildModel, ClasspathAppended, ModelSpec, PluginOption, PluginsAppended,
        SharedModel, SourcesAppended,
    };
    use crate::core::SourceFile;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;
    use std::sync::Arc;

    #[derive(Debug, Default)]
    struct Marker(u8);

    fn base_model() -> ModelSpec {
        let mut model = ModelSpec::new("/work")
            .with_source(SourceFile::inline("A.kt", "class A"))
            .with_classpaths(vec![PathBuf::from("/lib/a.jar")])
            .with_plugin_classpaths(vec![PathBuf::from("/plugins/p.jar")])
            .with_compiler_plugins(vec!["registrar".to_string()])
            .with_plugin_option(PluginOption::new("p", "mode", "strict"))
            .with_extra_arguments(vec!["-Xfoo".to_string()])
            .with_flags(BuildFlags {
                verbose: true,
                inherit_classpath: true,
                ..BuildFlags::default()
            })
            .with_toolchain_home("/opt/jdk");
        model.extensions_mut().get_or_create(|| Marker(5));
        model
    }

    fn assert_untouched(decorated: &dyn BuildModel, base: &dyn BuildModel) {
        assert_eq!(decorated.working_dir(), base.working_dir());
        assert_eq!(decorated.plugin_classpaths(), base.plugin_classpaths());
        assert_eq!(decorated.plugin_options(), base.plugin_options());
        assert_eq!(decorated.extra_arguments(), base.extra_arguments());
        assert_eq!(decorated.flags(), base.flags());
        assert_eq!(decorated.toolchain_home(), base.toolchain_home());
        assert_eq!(
            decorated.extensions().get::<Marker>().map(|m| m.0),
            Some(5)
        );
    }

    #[test]
    fn test_classpath_decorator_preserves_other_properties() {
        let base: SharedModel = Arc::new(base_model());
        let decorated = ClasspathAppended::new(Arc::clone(&base), vec![PathBuf::from("/out")]);

        assert_eq!(
            decorated.classpaths(),
            vec![PathBuf::from("/lib/a.jar"), PathBuf::from("/out")]
        );
        assert_eq!(decorated.sources(), base.sources());
        assert_eq!(decorated.compiler_plugins(), base.compiler_plugins());
        assert_untouched(&decorated, base.as_ref());
    }

    #[test]
    fn test_sources_decorator_appends_generated() {
        let base: SharedModel = Arc::new(base_model());
        let generated = SourceFile::from_path("/gen/B.java");
        let decorated = SourcesAppended::new(Arc::clone(&base), vec![generated.clone()]);

        assert_eq!(
            decorated.sources(),
            vec![SourceFile::inline("A.kt", "class A"), generated]
        );
        assert_eq!(decorated.classpaths(), base.classpaths());
        assert_untouched(&decorated, base.as_ref());
    }

    #[test]
    fn test_decorators_chain() {
        let base: SharedModel = Arc::new(base_model());
        let first: SharedModel = Arc::new(ClasspathAppended::new(
            Arc::clone(&base),
            vec![PathBuf::from("/classes-1")],
        ));
        let second: SharedModel = Arc::new(PluginsAppended::new(
            Arc::clone(&first),
            vec!["extra".to_string()],
        ));
        let third = ClasspathAppended::new(second, vec![PathBuf::from("/classes-2")]);

        assert_eq!(
            third.classpaths(),
            vec![
                PathBuf::from("/lib/a.jar"),
                PathBuf::from("/classes-1"),
                PathBuf::from("/classes-2"),
            ]
        );
        assert_eq!(
            third.compiler_plugins(),
            vec!["registrar".to_string(), "extra".to_string()]
        );
        assert_untouched(&third, base.as_ref());
    }

    #[test]
    fn test_decorating_leaves_base_unchanged() {
        let base: SharedModel = Arc::new(base_model());
        let _decorated = ClasspathAppended::new(Arc::clone(&base), vec![PathBuf::from("/out")]);
        assert_eq!(base.classpaths(), vec![PathBuf::from("/lib/a.jar")]);
    }

    #[test]
    fn test_messages_are_shared_through_decorators() {
        let base: SharedModel = Arc::new(base_model());
        let decorated = SourcesAppended::new(Arc::clone(&base), Vec::new());
        decorated.messages().warn("shared");
        assert!(base.messages().collect_log().contains("warning: shared"));
    }
}
