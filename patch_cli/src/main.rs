use clap::{Parser, Subcommand};
use patch_sync::{
    parse_base_url, CollectionManager, ConsoleConfig, FieldEdit, HttpRemote, NoticeKind,
    Notification, NotificationSink, PatchConsole, Settings, Snapshot, TracingSink,
    TransientStatus,
};
use std::io::{BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "patchctl", about = "Manage the tempo patches stored on a metronome")]
struct Args {
    /// Device address (`host`, `host:port` or full URL). Defaults to $METRONOME_URL.
    #[arg(long, global = true)]
    url: Option<String>,

    #[arg(long, global = true, value_name = "SECS")]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the stored patches.
    List,
    /// Append a new patch.
    Add { name: String, tempo: i32 },
    /// Change one field (`name` or `tempo`) of the patch at INDEX.
    Edit {
        index: usize,
        field: String,
        value: String,
    },
    /// Delete the patch at INDEX.
    Rm {
        index: usize,
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },
    /// Move the patch at FROM so it ends up at TO.
    Mv { from: usize, to: usize },
    /// Show settings, or change them when a flag is given.
    Settings {
        #[arg(long)]
        brightness: Option<u8>,
        #[arg(long)]
        live_gig_mode: Option<bool>,
    },
}

/// Every notice goes to the log; the status line keeps the latest one for
/// `notice_duration` so it can be shown once the command settles.
fn notice_sinks(cfg: &ConsoleConfig) -> (Arc<TransientStatus>, Arc<dyn NotificationSink>) {
    let status = Arc::new(TransientStatus::new(cfg.notice_duration));
    let line: Arc<dyn NotificationSink> = status.clone();
    let log: Arc<dyn NotificationSink> = Arc::new(TracingSink);
    let fan_out: Arc<dyn NotificationSink> = Arc::new(vec![log, line]);
    (status, fan_out)
}

fn print_notice(n: &Notification) {
    match n.kind {
        NoticeKind::Success => eprintln!("ok: {}", n.message),
        NoticeKind::Error => eprintln!("error: {}", n.message),
    }
}

/// A failure whose notice was already printed should not be printed again.
fn already_reported(result: &anyhow::Result<()>, notice: Option<&Notification>) -> bool {
    result.is_err() && notice.is_some_and(|n| n.kind == NoticeKind::Error)
}

fn confirm_on_stdin(prompt: &str) -> bool {
    eprint!("{prompt} [y/N] ");
    let _ = std::io::stderr().flush();
    let mut line = String::new();
    if std::io::stdin().lock().read_line(&mut line).is_err() {
        return false;
    }
    matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn config_from(args: &Args) -> anyhow::Result<ConsoleConfig> {
    let mut cfg = ConsoleConfig::from_env();
    if let Some(url) = args.url.as_deref() {
        cfg.base_url =
            parse_base_url(url).map_err(|e| anyhow::anyhow!("invalid --url {url:?}: {e}"))?;
    }
    if let Some(secs) = args.timeout_secs.filter(|s| *s > 0) {
        cfg.http_timeout = Duration::from_secs(secs);
    }
    Ok(cfg)
}

fn print_patches(snapshot: &Snapshot) {
    let view = snapshot.view();
    if view.is_empty() {
        println!("(no patches)");
        return;
    }
    for (i, entry) in view.iter().enumerate() {
        println!("{i:>2}  {:<4}  {:>3} bpm", entry.patch.name, entry.patch.tempo);
    }
}

fn print_settings(s: &Settings) {
    println!("brightness: {}", s.brightness);
    if let Some(live) = s.live_gig_mode {
        println!("live gig mode: {}", if live { "on" } else { "off" });
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    init_tracing();
    let args = Args::parse();

    let cfg = config_from(&args)?;
    tracing::debug!(url = %cfg.base_url, timeout = ?cfg.http_timeout, "connecting");
    let remote = HttpRemote::new(&cfg)?;
    let (status, sink) = notice_sinks(&cfg);
    let manager = CollectionManager::new(remote, sink);
    let console = PatchConsole::spawn(manager, cfg.queue_cap);

    let result = run(&console, args.command).await;
    let notice = status.current();
    if let Some(n) = &notice {
        print_notice(n);
    }
    if already_reported(&result, notice.as_ref()) {
        return Ok(ExitCode::FAILURE);
    }
    result.map(|_| ExitCode::SUCCESS)
}

async fn run(console: &PatchConsole, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Settings {
            brightness,
            live_gig_mode,
        } => settings_command(console, brightness, live_gig_mode).await,
        command => {
            console.load().await?;
            patch_command(console, command).await?;
            print_patches(&console.snapshot().await?);
            Ok(())
        }
    }
}

async fn patch_command(console: &PatchConsole, command: Command) -> anyhow::Result<()> {
    match command {
        Command::List | Command::Settings { .. } => {}
        Command::Add { name, tempo } => console.create(name, tempo).await?,
        Command::Edit {
            index,
            field,
            value,
        } => {
            let edit = FieldEdit::parse(&field, &value)?;
            console.update_field(index, edit).await?;
        }
        Command::Rm { index, yes } => {
            let confirmed = if yes {
                console.delete(index, &|_: &str| true).await?
            } else {
                console.delete(index, &confirm_on_stdin).await?
            };
            if !confirmed {
                eprintln!("cancelled");
            }
        }
        Command::Mv { from, to } => console.reorder(from, to).await?,
    }
    Ok(())
}

async fn settings_command(
    console: &PatchConsole,
    brightness: Option<u8>,
    live_gig_mode: Option<bool>,
) -> anyhow::Result<()> {
    let mut settings = console.load_settings().await?;
    if brightness.is_some() || live_gig_mode.is_some() {
        if let Some(b) = brightness {
            settings.brightness = b;
        }
        if live_gig_mode.is_some() {
            settings.live_gig_mode = live_gig_mode;
        }
        console.save_settings(settings).await?;
    }
    print_settings(&settings);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn status_line_follows_notice_duration() {
        let (status, sink) = notice_sinks(&ConsoleConfig::default());
        sink.notify(Notification::success("Patch created"));
        assert_eq!(status.current(), Some(Notification::success("Patch created")));

        let cfg = ConsoleConfig {
            notice_duration: Duration::ZERO,
            ..ConsoleConfig::default()
        };
        let (status, sink) = notice_sinks(&cfg);
        sink.notify(Notification::error("Error loading patches: offline"));
        assert_eq!(status.current(), None);
    }

    #[test]
    fn notified_failures_are_not_reported_twice() {
        let failed: anyhow::Result<()> = Err(anyhow::anyhow!("Error updating patch"));
        let notice = Notification::error("Error updating patch: connection reset");
        assert!(already_reported(&failed, Some(&notice)));
        assert!(!already_reported(&failed, None));
        assert!(!already_reported(&Ok(()), Some(&notice)));
        assert!(!already_reported(
            &failed,
            Some(&Notification::success("Patch created"))
        ));
    }

    #[test]
    fn parses_edit_and_global_url() {
        let args = Args::try_parse_from(["patchctl", "edit", "1", "tempo", "140", "--url", "10.0.0.7"])
            .unwrap();
        assert_eq!(args.url.as_deref(), Some("10.0.0.7"));
        assert!(matches!(
            args.command,
            Command::Edit { index: 1, ref field, ref value } if field == "tempo" && value == "140"
        ));
    }
}
