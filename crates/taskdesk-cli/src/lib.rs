pub mod cli;
pub mod config;
pub mod http;
pub mod render;

use std::ffi::OsString;
use std::io::{
  self,
  IsTerminal,
  Write
};

use anyhow::{
  Context,
  anyhow
};
use clap::Parser;
use taskdesk_core::{
  BackendClient,
  Config,
  Deletion,
  EditFields,
  NewTask,
  TaskStateController
};
use tracing::{
  debug,
  info
};

use crate::cli::{
  AddArgs,
  Command,
  EditArgs,
  GlobalCli
};
use crate::http::ReqwestBackend;
use crate::render::TerminalView;

pub type Controller<B> =
  TaskStateController<B, TerminalView>;

pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let cli = GlobalCli::parse_from(raw_args);

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;
  info!(
    command = cli.command.name(),
    "starting taskdesk CLI"
  );

  let cfg = build_config(&cli)?;
  let backend = ReqwestBackend::new(
    cfg.clone()
  )?;
  let color = !cli.no_color
    && io::stdout().is_terminal();
  let view = TerminalView::new(
    color,
    cli.quiet > 0,
    cli.yes
  );
  let controller =
    TaskStateController::new(backend, view);

  let runtime =
    tokio::runtime::Builder::new_current_thread()
      .enable_all()
      .build()
      .context(
        "failed to start async runtime"
      )?;
  runtime.block_on(execute(
    &controller,
    &cli,
    &cfg
  ))
}

fn build_config(
  cli: &GlobalCli
) -> anyhow::Result<Config> {
  let source = config::resolve_config_path(
    cli.config.as_deref()
  );
  let mut cfg = config::load_config(&source)?;

  let api_url = cli.api_url.iter().map(|url| {
    ("api_base_url".to_string(), url.clone())
  });
  cfg.apply_overrides(
    api_url.chain(cli.overrides.iter().map(
      |kv| (kv.key.clone(), kv.value.clone())
    ))
  )?;

  if cfg.api_base_url.trim().is_empty() {
    return Err(anyhow!(
      "no server configured; set \
       api_base_url in the config file, \
       pass --api-url or set \
       TASKDESK_API_URL"
    ));
  }
  debug!(?cfg, "effective config");
  Ok(cfg)
}

fn credentials(
  cli: &GlobalCli
) -> anyhow::Result<(&str, &str)> {
  let username = cli
    .username
    .as_deref()
    .filter(|name| !name.trim().is_empty())
    .ok_or_else(|| {
      anyhow!(
        "missing --username (or \
         TASKDESK_USERNAME)"
      )
    })?;
  let password = cli
    .password
    .as_deref()
    .ok_or_else(|| {
      anyhow!(
        "missing --password (or \
         TASKDESK_PASSWORD)"
      )
    })?;
  Ok((username, password))
}

/// Runs one subcommand against an already
/// built controller.
pub async fn execute<B>(
  controller: &Controller<B>,
  cli: &GlobalCli,
  cfg: &Config
) -> anyhow::Result<()>
where
  B: BackendClient
{
  let (username, password) =
    credentials(cli)?;

  if cli.command == Command::Register {
    controller
      .register(username, password)
      .await?;
    return Ok(());
  }

  controller.login(username, password).await?;

  match &cli.command {
    | Command::Register => {}
    | Command::List(args) => {
      controller
        .set_filter(
          args.scope,
          args.created_by.clone()
        )
        .await?;
      print_list(controller)?;
    }
    | Command::Add(args) => {
      add_task(controller, args, cfg).await?;
    }
    | Command::Edit(args) => {
      edit_task(controller, args).await?;
    }
    | Command::Delete { id } => {
      ensure_listed(controller, *id)?;
      if controller.delete_task(*id).await?
        == Deletion::Declined
      {
        eprintln!("Deletion cancelled");
      }
    }
    | Command::Done { id } => {
      controller
        .toggle_completion(*id, true)
        .await?;
    }
    | Command::Undo { id } => {
      controller
        .toggle_completion(*id, false)
        .await?;
    }
    | Command::Ask { prompt } => {
      let answer = controller
        .ask_assistant(&prompt.join(" "))
        .await?;
      let mut out = io::stdout().lock();
      writeln!(out, "{answer}")?;
    }
  }

  Ok(())
}

fn print_list<B: BackendClient>(
  controller: &Controller<B>
) -> anyhow::Result<()> {
  let view = controller.view();
  let out = io::stdout().lock();
  view.print_task_table(out)?;
  let status = view.status();
  if !status.is_empty() {
    eprintln!("{status}");
  }
  Ok(())
}

fn ensure_listed<B: BackendClient>(
  controller: &Controller<B>,
  task_id: u64
) -> anyhow::Result<()> {
  if controller.task(task_id).is_none() {
    return Err(anyhow!(
      "no task with id {task_id}"
    ));
  }
  Ok(())
}

async fn add_task<B: BackendClient>(
  controller: &Controller<B>,
  args: &AddArgs,
  cfg: &Config
) -> anyhow::Result<()> {
  for tag in &args.tags {
    controller.add_draft_tag(tag)?;
  }
  controller
    .create_task(NewTask {
      title:       args.title.clone(),
      description: args.description.clone(),
      priority:    args
        .priority
        .unwrap_or(cfg.default_priority)
    })
    .await?;
  Ok(())
}

async fn edit_task<B: BackendClient>(
  controller: &Controller<B>,
  args: &EditArgs
) -> anyhow::Result<()> {
  let task =
    controller.task(args.id).ok_or_else(
      || anyhow!("no task with id {}", args.id)
    )?;
  controller.open_edit(&task);

  controller.revise_edit(EditFields {
    title:       args
      .title
      .clone()
      .unwrap_or_else(|| task.title.clone()),
    description: args
      .description
      .clone()
      .unwrap_or_else(|| {
        task.description.clone()
      }),
    priority:    args
      .priority
      .unwrap_or(task.priority)
  })?;
  for tag in &args.add_tags {
    controller.add_edit_tag(tag)?;
  }
  for tag in &args.remove_tags {
    if !controller.remove_edit_tag(tag)? {
      debug!(tag = %tag, "tag was not on the task");
    }
  }

  controller.commit_edit().await?;
  Ok(())
}
