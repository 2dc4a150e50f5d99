use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use device_client::TemplateVariables;
use panel::{load_options, DeviceAnnotationController, EditField, PanelOptions};
use tracing_subscriber::EnvFilter;

mod render;

#[derive(Parser, Debug)]
#[command(name = "hive-panel", version, about = "Show and edit a hive scale's latest annotation")]
struct Cli {
    /// Panel options file (defaults to ./panel.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    title: Option<String>,
    /// Device service base url (template).
    #[arg(long, global = true)]
    api: Option<String>,
    #[arg(long, global = true)]
    api_key: Option<String>,
    /// Device name (template).
    #[arg(long, global = true)]
    device: Option<String>,
    #[arg(long, global = true)]
    mode: Option<i64>,
    /// Template variable, `name=value`; repeatable.
    #[arg(long = "var", global = true, value_parser = parse_var)]
    vars: Vec<(String, String)>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the device and print the panel.
    Show,
    /// Fetch the device, apply the given fields and save them.
    Edit(EditArgs),
}

#[derive(Args, Debug)]
struct EditArgs {
    #[arg(long)]
    hives: Option<String>,
    #[arg(long)]
    notes: Option<String>,
    #[arg(long)]
    user_description: Option<String>,
    /// Annotation start, `YYYY-MM-DD HH:MM:SS` (UTC). Defaults to now.
    #[arg(long)]
    begin: Option<String>,
}

impl EditArgs {
    fn edits(&self) -> Vec<(EditField, &str)> {
        [
            (EditField::Hives, self.hives.as_deref()),
            (EditField::Description, self.notes.as_deref()),
            (EditField::UserDescription, self.user_description.as_deref()),
            (EditField::Begin, self.begin.as_deref()),
        ]
        .into_iter()
        .filter_map(|(field, raw)| raw.map(|raw| (field, raw)))
        .collect()
    }
}

fn parse_var(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))?;
    let name = name.trim().trim_start_matches('$');
    if name.is_empty() {
        return Err(format!("empty variable name in '{raw}'"));
    }
    Ok((name.to_string(), value.to_string()))
}

fn apply_cli_overrides(options: &mut PanelOptions, cli: &Cli) {
    if let Some(v) = &cli.title {
        options.title = v.clone();
    }
    if let Some(v) = &cli.api {
        options.api = v.clone();
    }
    if let Some(v) = &cli.api_key {
        options.api_key = v.clone();
    }
    if let Some(v) = &cli.device {
        options.device = v.clone();
    }
    if let Some(v) = cli.mode {
        options.mode = if (0..=3).contains(&v) { v } else { 0 };
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut options = load_options(cli.config.as_deref())?;
    apply_cli_overrides(&mut options, &cli);
    let mode = options.mode();
    let variables: TemplateVariables = cli.vars.iter().cloned().collect();

    let mut controller = DeviceAnnotationController::from_options(options, Arc::new(variables));
    controller.refresh().await;

    if let Command::Edit(args) = &cli.command {
        if controller.state().has_device() {
            for (field, _) in args.edits() {
                if !mode.allows(field) {
                    bail!("mode {mode} does not allow editing {field}");
                }
            }

            controller.enter_edit_mode();
            for (field, raw) in args.edits() {
                controller.update_field(field, raw);
            }
            let outcome = controller.save().await;
            tracing::info!(saved = outcome.is_saved(), "edit finished");
        }
    }

    let view = controller.view();
    print!("{}", render::render(&view));

    Ok(if view.error.is_some() || !view.device_loaded {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
