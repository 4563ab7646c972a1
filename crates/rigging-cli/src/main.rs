#![forbid(unsafe_code)]

use std::collections::BTreeMap;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rigging_config::{Manifest, ProjectContext, PropertyStore};
use rigging_engine::{Composition, PluginComposer};
use rigging_graph::InMemoryHost;

type CliResult = Result<(), Box<dyn Error>>;

const MANIFEST_FILE: &str = "rigging.toml";

#[derive(Debug, Parser)]
#[command(name = "rigging", about = "Compose documentation, quality, publication, image and release tasks for a project")]
#[command(version)]
struct Cli {
    /// Log composition steps
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compose the project and print the resulting task graph
    Plan {
        #[command(flatten)]
        project: ProjectArgs,
        /// Print the composition as JSON
        #[arg(long)]
        json: bool,
    },
    /// Compose the project and report whether it succeeds
    Check {
        #[command(flatten)]
        project: ProjectArgs,
    },
}

#[derive(Debug, Args)]
struct ProjectArgs {
    /// Path to the project manifest (defaults to ./rigging.toml)
    #[arg(long)]
    manifest: Option<PathBuf>,
    /// Override a project property, e.g. -P nexus.host=nexus.local
    #[arg(short = 'P', value_name = "KEY=VALUE")]
    properties: Vec<String>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Plan { project, json } => cmd_plan(&project, json),
        Command::Check { project } => cmd_check(&project),
    };

    if let Err(msg) = result {
        eprintln!("error: {msg}");
        process::exit(1);
    }
}

/// `RIGGING_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("RIGGING_LOG").unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "rigging_engine={level},rigging_graph={level},warn"
        ))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Load the manifest and apply `-P` overrides.
fn load_context(args: &ProjectArgs) -> Result<ProjectContext, Box<dyn Error>> {
    let path = match &args.manifest {
        Some(p) => p.clone(),
        None => std::env::current_dir()?.join(MANIFEST_FILE),
    };
    context_from(&path, &args.properties)
}

fn context_from(path: &Path, raw_overrides: &[String]) -> Result<ProjectContext, Box<dyn Error>> {
    if !path.exists() {
        return Err(format!("no {MANIFEST_FILE} found at {}", path.display()).into());
    }
    let manifest = Manifest::from_path(path)?;
    let overrides = raw_overrides
        .iter()
        .map(String::as_str)
        .map(PropertyStore::parse_override)
        .collect::<Result<BTreeMap<_, _>, _>>()?;
    Ok(ProjectContext::from_manifest(manifest, overrides)?)
}

fn compose(context: &ProjectContext) -> Result<Composition, Box<dyn Error>> {
    let mut host = InMemoryHost::java_project();
    Ok(PluginComposer::new().compose(context, &mut host)?)
}

fn cmd_plan(args: &ProjectArgs, json: bool) -> CliResult {
    let context = load_context(args)?;
    let composition = compose(&context)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&composition)?);
        return Ok(());
    }

    println!(
        "Composition for `{}` {}",
        composition.project, composition.version
    );
    println!();
    println!("Capabilities:");
    for handle in &composition.handles {
        println!(
            "  {:<16} {}",
            handle.capability.as_str(),
            handle.task_names().join(", ")
        );
    }
    println!();
    println!("Execution order:");
    for (i, task) in composition.graph.order().iter().enumerate() {
        println!("  {:>2}. {task}", i.saturating_add(1));
    }
    println!();
    println!("Edges:");
    for edge in composition.graph.edges() {
        println!("  {edge}");
    }
    Ok(())
}

fn cmd_check(args: &ProjectArgs) -> CliResult {
    let context = load_context(args)?;
    let composition = compose(&context)?;
    eprintln!(
        "    Composed {} capabilities ({} tasks, {} edges) for `{}`",
        composition.handles.len(),
        composition.graph.new_tasks().len(),
        composition.graph.edges().len(),
        composition.project
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"
[project]
name = "cloud-server"
version = "1.0.0-SNAPSHOT"

[properties]
"nexus.host" = "nexus.example.com"
"nexus.port.jar" = "8443"
"nexus.port.image" = "5000"
"nexus.user" = "deployer"
"nexus.password" = "hunter2"
"release.git.remote" = "origin"
"bootstrap.location.cloud-server" = "file:/config/server/"
"#;

    fn write_manifest(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join(MANIFEST_FILE);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn composes_from_manifest() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_manifest(tmp.path(), MANIFEST);
        let context = context_from(&path, &[]).unwrap();
        let composition = compose(&context).unwrap();
        assert_eq!(composition.handles.len(), 5);
        assert_eq!(composition.project, "cloud-server");
    }

    #[test]
    fn override_fills_missing_property() {
        let tmp = tempfile::tempdir().unwrap();
        let content = MANIFEST.replace("\"release.git.remote\" = \"origin\"\n", "");
        let path = write_manifest(tmp.path(), &content);

        let context = context_from(&path, &[]).unwrap();
        let err = compose(&context).unwrap_err();
        assert!(err.to_string().contains("release.git.remote"), "error was: {err}");

        let context = context_from(&path, &["release.git.remote=upstream".to_owned()]).unwrap();
        assert!(compose(&context).is_ok());
    }

    #[test]
    fn malformed_override_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_manifest(tmp.path(), MANIFEST);
        let err = context_from(&path, &["nexus.host".to_owned()]).unwrap_err();
        assert!(err.to_string().contains("expected key=value"), "error was: {err}");
    }

    #[test]
    fn missing_manifest_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let err = context_from(&tmp.path().join(MANIFEST_FILE), &[]).unwrap_err();
        assert!(err.to_string().contains("no rigging.toml found"), "error was: {err}");
    }

    #[test]
    fn cli_parses_property_overrides() {
        let cli = Cli::try_parse_from([
            "rigging",
            "plan",
            "-P",
            "nexus.host=a",
            "-P",
            "nexus.port.jar=1",
            "--json",
        ])
        .unwrap();
        let Command::Plan { project, json } = cli.command else {
            unreachable!("expected plan");
        };
        assert!(json);
        assert_eq!(project.properties, vec!["nexus.host=a", "nexus.port.jar=1"]);
    }
}
