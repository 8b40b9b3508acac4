use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use luna_core::naming::suggest_workspace_file_name_now;
use luna_core::persistence::{
    ensure_workspace_extension, from_workspace_json, load_workspace_file, save_workspace_file,
    to_workspace_json,
};
use luna_core::{Workspace, WorkspaceSession};

#[derive(Parser)]
#[command(name = "luna", about = "Inspect and convert Luna workspace files", version)]
struct Cli {
    /// Write `luna.log` files into this directory.
    #[arg(long, global = true, value_name = "DIR")]
    log_dir: Option<PathBuf>,
    /// Log level used with `--log-dir`.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the core library links and answers.
    Ping,
    /// Create a workspace with one empty notebook.
    New {
        /// Target `.luna` file, or an existing directory to place a suggested name in.
        path: PathBuf,
        /// Title of the first notebook.
        #[arg(long)]
        title: Option<String>,
    },
    /// Print notebooks, recycle bin contents and integrity issues.
    Inspect {
        path: PathBuf,
    },
    /// Decode a workspace file and print its JSON document.
    ExportJson {
        path: PathBuf,
        #[arg(long)]
        pretty: bool,
    },
    /// Encode a JSON document into a `.luna` file.
    ImportJson {
        json: PathBuf,
        path: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(err) = run(cli, &mut out) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    if let Some(dir) = &cli.log_dir {
        let dir = dir
            .to_str()
            .context("log directory must be valid UTF-8")?;
        if let Err(message) = luna_core::init_logging(&cli.log_level, dir) {
            bail!("failed to initialize logging: {message}");
        }
    }

    match cli.command {
        Commands::Ping => {
            writeln!(out, "luna_core ping={}", luna_core::ping())?;
            writeln!(out, "luna_core version={}", luna_core::core_version())?;
        }
        Commands::New { path, title } => {
            let target =
                ensure_workspace_extension(new_workspace_path(&path, title.as_deref()))?;
            let mut session = WorkspaceSession::new();
            match title.as_deref() {
                Some(title) => {
                    session.create_notebook(title);
                }
                None => {
                    session.ensure_default_notebook();
                }
            }
            session
                .save_to(&target)
                .with_context(|| format!("failed to create {}", target.display()))?;
            writeln!(out, "created {}", target.display())?;
        }
        Commands::Inspect { path } => {
            let workspace = load(&path)?;
            print_summary(&workspace, out)?;
        }
        Commands::ExportJson { path, pretty } => {
            let workspace = load(&path)?;
            let json = to_workspace_json(&workspace, pretty)?;
            writeln!(out, "{json}")?;
        }
        Commands::ImportJson { json, path } => {
            let path = ensure_workspace_extension(&path)?;
            let text = fs::read_to_string(&json)
                .with_context(|| format!("failed to read {}", json.display()))?;
            let workspace = from_workspace_json(&text)
                .with_context(|| format!("{} is not a workspace document", json.display()))?;
            let issues = workspace.check_integrity();
            if !issues.is_empty() {
                bail!(
                    "{} has {} integrity issue(s); first: {}",
                    json.display(),
                    issues.len(),
                    issues[0]
                );
            }
            save_workspace_file(&path, &workspace)
                .with_context(|| format!("failed to write {}", path.display()))?;
            writeln!(
                out,
                "wrote {} ({} notebooks, {} cells)",
                path.display(),
                workspace.notebooks.len(),
                workspace.cells.len()
            )?;
        }
    }
    Ok(())
}

fn new_workspace_path(path: &Path, title: Option<&str>) -> PathBuf {
    if path.is_dir() {
        path.join(suggest_workspace_file_name_now(title.unwrap_or_default()))
    } else {
        path.to_path_buf()
    }
}

fn load(path: &Path) -> Result<Workspace> {
    load_workspace_file(path).with_context(|| format!("failed to open {}", path.display()))
}

fn print_summary(workspace: &Workspace, out: &mut impl Write) -> Result<()> {
    writeln!(out, "version: {}", workspace.version)?;
    writeln!(out, "notebooks: {}", workspace.notebooks.len())?;
    for notebook in workspace.ordered_notebooks() {
        writeln!(
            out,
            "  {} \"{}\" active={} binned={}",
            notebook.id,
            notebook.title,
            workspace.active_cell_ids(&notebook.id).len(),
            workspace.soft_deleted_cell_ids(&notebook.id).len()
        )?;
    }
    let bin = &workspace.recycle_bin;
    writeln!(
        out,
        "recycle bin: {} notebooks, {} cells",
        bin.notebook_order.len(),
        bin.cell_order.len()
    )?;
    for notebook_id in &bin.notebook_order {
        if let Some(entry) = bin.notebooks.get(notebook_id) {
            writeln!(
                out,
                "  {} \"{}\" deleted {}",
                notebook_id, entry.title, entry.deleted_at
            )?;
        }
    }
    let issues = workspace.check_integrity();
    if issues.is_empty() {
        writeln!(out, "integrity: ok")?;
    } else {
        writeln!(out, "integrity: {} issue(s)", issues.len())?;
        for issue in issues {
            writeln!(out, "  {issue}")?;
        }
    }
    Ok(())
}
