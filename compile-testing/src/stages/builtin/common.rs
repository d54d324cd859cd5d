//! Argument and classpath assembly shared by the built-in stages.

use crate::context::BuildModel;
use crate::core::SourceFile;
use crate::host::dependency_regex;
use crate::toolchain::{ArgumentSet, ExecutionEnv};
use crate::utils::list_files;
use anyhow::Context;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// The classpath every invocation sees.
///
/// Model classpath first, then runtime libraries found in the host
/// dependencies, then the whole host set when inheritance is on. Repeated
/// entries keep their first position.
pub fn common_classpaths(model: &dyn BuildModel, env: &ExecutionEnv) -> anyhow::Result<Vec<PathBuf>> {
    let mut paths = model.classpaths();
    let host = env.host_dependencies();

    for prefix in env.runtime_libraries() {
        let pattern = dependency_regex(prefix)
            .with_context(|| format!("invalid runtime library prefix '{prefix}'"))?;
        if let Some(found) = host.find(prefix, &pattern, model.messages()) {
            paths.push(found.to_path_buf());
        }
    }

    if model.flags().inherit_classpath {
        let inherited: Vec<String> = host
            .entries()
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        model
            .messages()
            .log(format!("Inheriting classpaths: {}", inherited.join(", ")));
        paths.extend(host.entries().iter().cloned());
    }

    let mut seen = HashSet::new();
    paths.retain(|p| seen.insert(p.clone()));
    Ok(paths)
}

/// Arguments shared by every tool, writing classes to `output_dir`.
pub fn common_arguments(
    model: &dyn BuildModel,
    env: &ExecutionEnv,
    output_dir: &Path,
) -> anyhow::Result<ArgumentSet> {
    let flags = model.flags();
    let mut args = ArgumentSet::new().option("-d", output_dir.display().to_string());

    let classpaths = common_classpaths(model, env)?;
    if !classpaths.is_empty() {
        let joined = std::env::join_paths(&classpaths).context("classpath entry contains a path separator")?;
        args = args.option("-classpath", joined.to_string_lossy());
    }
    if let Some(home) = model.toolchain_home() {
        args = args.option("-jdk-home", home.display().to_string());
    }

    args = args
        .flag_if(flags.verbose, "-verbose")
        .flag_if(flags.all_warnings_as_errors, "-Werror")
        .flag_if(flags.suppress_warnings, "-nowarn")
        .flag_if(flags.report_performance, "-Xreport-perf");

    for plugin in model.plugin_classpaths() {
        args = args.flag(format!("-Xplugin={}", plugin.display()));
    }
    for option in model.plugin_options() {
        args = args.option("-P", option.to_string());
    }

    Ok(args.extend(model.extra_arguments().iter().cloned()))
}

/// Every file below `dirs`, as on-disk sources.
pub(crate) fn sources_in(dirs: &[&Path]) -> anyhow::Result<Vec<SourceFile>> {
    let mut sources = Vec::new();
    for dir in dirs {
        let files = list_files(dir).with_context(|| format!("listing {}", dir.display()))?;
        sources.extend(files.into_iter().map(SourceFile::from_path));
    }
    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{BuildFlags, ModelSpec, PluginOption};
    use crate::host::StaticDiscovery;
    use crate::testing::fixtures::test_env;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    #[test]
    fn test_classpath_order_and_dedup() {
        let (env, _) = test_env();
        let env = env
            .with_discovery(Arc::new(StaticDiscovery::new(vec![
                PathBuf::from("/host/runtime-1.2.jar"),
                PathBuf::from("/host/other.jar"),
                PathBuf::from("/user/a.jar"),
            ])))
            .with_runtime_libraries(vec!["runtime".to_string()]);
        let model = ModelSpec::new("/work")
            .with_classpaths(vec![PathBuf::from("/user/a.jar")])
            .with_flags(BuildFlags {
                inherit_classpath: true,
                ..BuildFlags::default()
            });

        let paths = common_classpaths(&model, &env).unwrap();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/user/a.jar"),
                PathBuf::from("/host/runtime-1.2.jar"),
                PathBuf::from("/host/other.jar"),
            ]
        );
    }

    #[test]
    fn test_host_is_not_inherited_by_default() {
        let (env, _) = test_env();
        let env = env.with_discovery(Arc::new(StaticDiscovery::new(vec![PathBuf::from("/host/x.jar")])));
        let model = ModelSpec::new("/work");
        assert!(common_classpaths(&model, &env).unwrap().is_empty());
    }

    #[test]
    fn test_arguments() {
        let (env, _) = test_env();
        let model = ModelSpec::new("/work")
            .with_classpaths(vec![PathBuf::from("/a.jar")])
            .with_plugin_classpaths(vec![PathBuf::from("/p.jar")])
            .with_plugin_option(PluginOption::new("demo", "mode", "on"))
            .with_extra_arguments(vec!["-Xextra".to_string()])
            .with_flags(BuildFlags {
                verbose: true,
                suppress_warnings: true,
                ..BuildFlags::default()
            });

        let args = common_arguments(&model, &env, Path::new("/out")).unwrap();
        assert_eq!(
            args.as_slice(),
            &[
                "-d",
                "/out",
                "-classpath",
                "/a.jar",
                "-verbose",
                "-nowarn",
                "-Xplugin=/p.jar",
                "-P",
                "plugin:demo:mode=on",
                "-Xextra",
            ]
        );
    }
}
