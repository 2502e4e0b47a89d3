//! CLI binary for task-reminder.
//!
//! Reads pending tasks, renders the digest and prints it or sends it over
//! Gotify or encrypted email. Tracing goes to stderr so that stdout carries
//! only the digest in print mode.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use task_reminder::config::{
    EmailSettings, GOTIFY_TOKEN_VAR, GotifySettings, ReminderConfig, SMTP_PASSWORD_VAR,
};
use task_reminder::credentials::{Secret, take_env_secret};
use task_reminder::{Delivery, DeliveryChannel, send_reminder};
use tracing_subscriber::EnvFilter;

/// Sends reminders for tasks from Taskwarrior.
#[derive(Parser)]
#[command(name = "task-reminder", version, about)]
struct Cli {
    /// Increase output (-v for info, -vv for debug).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Custom certification authority certificate (PEM).
    #[arg(long)]
    ca_cert: Option<PathBuf>,

    /// Read tasks from a `task export` JSON file instead of running `task`.
    #[arg(long)]
    tasks_file: Option<PathBuf>,

    /// Path to the Taskwarrior `task` binary.
    #[arg(long)]
    task_command: Option<PathBuf>,

    /// Delivery channel; prints to stdout when omitted.
    #[command(subcommand)]
    command: Option<Command>,
}

/// Available delivery channels.
#[derive(Subcommand)]
enum Command {
    /// Sends notifications over Gotify.
    #[command(
        after_help = "If the Gotify token is missing, it is taken from environment variable GOTIFY_TOKEN"
    )]
    SendGotify(GotifyArgs),

    /// Sends notifications over PGP-encrypted email.
    #[command(
        after_help = "If the SMTP password is missing, it is taken from environment variable SMTP_PASSWORD"
    )]
    SendEmail(EmailArgs),

    /// Prints the digest to standard output.
    Print,
}

#[derive(Args)]
struct GotifyArgs {
    /// Gotify host.
    #[arg(long)]
    gotify_host: Option<String>,

    /// Gotify application token.
    #[arg(long)]
    gotify_token: Option<String>,

    /// Gotify message priority.
    #[arg(long)]
    priority: Option<u8>,
}

impl GotifyArgs {
    fn apply(self, settings: &mut GotifySettings) {
        if let Some(host) = self.gotify_host {
            settings.host = Some(host);
        }
        if let Some(token) = self.gotify_token {
            settings.token = Some(Secret::new(token));
        }
        if let Some(priority) = self.priority {
            settings.priority = Some(priority);
        }
    }
}

#[derive(Args)]
struct EmailArgs {
    /// SMTP hostname.
    #[arg(long)]
    smtp_hostname: Option<String>,

    /// SMTP port (implicit TLS).
    #[arg(long)]
    smtp_port: Option<u16>,

    /// SMTP username.
    #[arg(long)]
    smtp_username: Option<String>,

    /// Email sender address.
    #[arg(long)]
    email_sender: Option<String>,

    /// Email recipient address.
    #[arg(long)]
    email_recipient: Option<String>,

    /// Email subject.
    #[arg(long)]
    subject: Option<String>,
}

impl EmailArgs {
    fn apply(self, settings: &mut EmailSettings) {
        if let Some(hostname) = self.smtp_hostname {
            settings.smtp_hostname = Some(hostname);
        }
        if let Some(port) = self.smtp_port {
            settings.smtp_port = Some(port);
        }
        if let Some(username) = self.smtp_username {
            settings.smtp_username = Some(username);
        }
        if let Some(sender) = self.email_sender {
            settings.sender = Some(sender);
        }
        if let Some(recipient) = self.email_recipient {
            settings.recipient = Some(recipient);
        }
        if let Some(subject) = self.subject {
            settings.subject = Some(subject);
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = ReminderConfig::load(cli.config.as_deref())?;
    if let Some(path) = cli.ca_cert {
        config.ca_cert = Some(path);
    }
    if let Some(path) = cli.tasks_file {
        config.taskwarrior.export_file = Some(path);
    }
    if let Some(path) = cli.task_command {
        config.taskwarrior.command = Some(path);
    }

    // Secrets are taken from the environment here, while the process is
    // still single-threaded.
    let channel = select_channel(cli.command.unwrap_or(Command::Print), &config)?;
    let source = config.task_source()?;
    let notifier = channel.into_notifier()?;
    let now = chrono::Local::now();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to create async runtime")?;
    let delivery = runtime.block_on(send_reminder(source.as_ref(), &now, notifier.as_ref()))?;

    if let Delivery::Sent { channel } = delivery {
        tracing::debug!("done ({channel})");
    }
    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("warn,task_reminder={level}"))),
        )
        .init();
}

fn select_channel(
    command: Command,
    config: &ReminderConfig,
) -> task_reminder::Result<DeliveryChannel> {
    match command {
        Command::Print => Ok(DeliveryChannel::Stdout),
        Command::SendGotify(args) => {
            let mut settings = config.gotify.clone();
            args.apply(&mut settings);
            let resolved = settings.resolve(config.ca_cert.clone(), || {
                tracing::debug!("taking Gotify token from environment variable {GOTIFY_TOKEN_VAR}");
                // SAFETY: called from `main` before the async runtime is built.
                unsafe { take_env_secret(GOTIFY_TOKEN_VAR) }
            })?;
            Ok(DeliveryChannel::Gotify(resolved))
        }
        Command::SendEmail(args) => {
            let mut settings = config.email.clone();
            args.apply(&mut settings);
            let resolved = settings.resolve(config.ca_cert.clone(), || {
                tracing::debug!("taking SMTP password from environment variable {SMTP_PASSWORD_VAR}");
                // SAFETY: called from `main` before the async runtime is built.
                unsafe { take_env_secret(SMTP_PASSWORD_VAR) }
            })?;
            Ok(DeliveryChannel::Email(resolved))
        }
    }
}
