use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use weddingwall_core::events::LoggingEventSink;
use weddingwall_core::services::NoOpLightboxHost;
use weddingwall_core::{Collection, SyncStatus};
use weddingwall_lib::commands::{self, KioskCommand, LoginSource};
use weddingwall_lib::{get_log_dir, init_logging, path_provider, AppState};

/// WeddingWall - live wedding photo showcase.
#[derive(Parser)]
#[command(name = "weddingwall", version)]
struct Cli {
    /// Backend base URL for this run (overrides the stored configuration).
    #[arg(long, global = true, env = "WEDDINGWALL_BACKEND_URL")]
    backend_url: Option<String>,

    /// Directory for the cache, configuration and logs.
    #[arg(long, global = true, env = "WEDDINGWALL_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum Target {
    Guest,
    Wall,
    Background,
}

impl From<Target> for Collection {
    fn from(target: Target) -> Self {
        match target {
            Target::Guest => Collection::GuestPhotos,
            Target::Wall => Collection::WallPhotos,
            Target::Background => Collection::BackgroundImages,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Guest kiosk: live galleries, lightbox and background slideshow.
    Guest {
        /// Gallery the lightbox commands act on.
        #[arg(long, value_enum, default_value = "guest")]
        target: Target,
    },
    /// Print a gallery once.
    Gallery {
        #[arg(value_enum, default_value = "guest")]
        target: Target,
        /// Fetch from the backend instead of showing the cache.
        #[arg(long)]
        refresh: bool,
    },
    /// Sign in as the photographer.
    Login {
        /// One-time session id from the identity provider.
        #[arg(long, conflicts_with = "callback", required_unless_present = "callback")]
        session_id: Option<String>,
        /// Full callback URL containing `#session_id=...`.
        #[arg(long)]
        callback: Option<String>,
    },
    /// Show the signed-in photographer.
    Whoami,
    /// Sign out.
    Logout,
    /// Upload a JPEG, PNG or WebP image.
    Upload {
        file: PathBuf,
        /// Photographer notes (live gallery only).
        #[arg(long)]
        notes: Option<String>,
        #[arg(long, value_enum, default_value = "guest")]
        target: Target,
    },
    /// Delete photos by id.
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
        #[arg(long, value_enum, default_value = "guest")]
        target: Target,
    },
    /// List your uploaded photos.
    List,
    /// Site and client settings.
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Append a line to the frontend log.
    Log {
        level: String,
        message: String,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Show the site settings.
    Show,
    /// Change site settings, e.g. `bride_name=Asha email=hi@studio.example`.
    Set {
        #[arg(required = true, value_parser = parse_key_val)]
        fields: Vec<(String, String)>,
    },
    /// Show the local client configuration.
    Config,
    /// Restore the default client configuration.
    Reset,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected field=value, got '{}'", s))?;
    Ok((key.trim().to_string(), value.to_string()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_dir = get_log_dir(path_provider(cli.data_dir.clone()).as_ref());
    let _log_guard = init_logging(&log_dir);

    let state = AppState::new(cli.data_dir, cli.backend_url, Arc::new(LoggingEventSink))
        .context("failed to start")?;

    match cli.command {
        Command::Guest { target } => run_kiosk(&state, target.into()).await?,
        Command::Gallery { target, refresh } => {
            let collection = target.into();
            let gallery = if refresh {
                let (outcome, gallery) = commands::refresh_gallery(&state, collection).await?;
                info!(?outcome, "Refresh finished");
                gallery
            } else {
                commands::get_gallery(&state, collection)?
            };
            println!("{}", commands::format_gallery(&gallery));
        }
        Command::Login {
            session_id,
            callback,
        } => {
            let source = match (session_id, callback) {
                (Some(id), _) => LoginSource::SessionId(id),
                (None, Some(url)) => LoginSource::Callback(url),
                (None, None) => bail!("pass --session-id or --callback"),
            };
            let user = commands::login(&state, source).await?;
            println!("Signed in as {} <{}>", user.name, user.email);
        }
        Command::Whoami => {
            let user = commands::whoami(&state).await?;
            println!("{} <{}> ({})", user.name, user.email, user.user_id);
        }
        Command::Logout => {
            commands::logout(&state).await?;
            println!("Signed out");
        }
        Command::Upload {
            file,
            notes,
            target,
        } => {
            let receipt = commands::upload_photo(&state, &file, target.into(), notes).await?;
            println!("Uploaded {}", receipt.photo_id);
        }
        Command::Delete { ids, target } => {
            let results = commands::delete_photos(&state, &ids, target.into()).await?;
            let mut failed = 0;
            for result in &results {
                match &result.error {
                    None => println!("deleted {}", result.photo_id),
                    Some(e) => {
                        failed += 1;
                        println!("failed  {}: {}", result.photo_id, e);
                    }
                }
            }
            if failed > 0 {
                bail!("{} of {} deletions failed", failed, results.len());
            }
        }
        Command::List => {
            let photos = commands::list_own_photos(&state).await?;
            if photos.is_empty() {
                println!("No photos uploaded yet");
            }
            for photo in &photos {
                println!("{}", commands::format_summary(photo));
            }
        }
        Command::Settings { action } => match action {
            SettingsAction::Show => {
                let settings = commands::get_site_settings(&state).await?;
                println!("{}", serde_json::to_string_pretty(&settings)?);
            }
            SettingsAction::Set { fields } => {
                let settings = commands::update_site_settings(&state, &fields).await?;
                println!("{}", serde_json::to_string_pretty(&settings)?);
            }
            SettingsAction::Config => {
                let config = commands::get_client_config(&state)?;
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
            SettingsAction::Reset => {
                let config = commands::reset_client_config(&state)?;
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
        },
        Command::Log { level, message } => {
            commands::log_frontend(&log_dir, &level, &message, None)?;
        }
    }

    state.core.shutdown();
    Ok(())
}

/// Mount one gallery plus the header slideshow and take lightbox commands
/// from stdin.
async fn run_kiosk(state: &AppState, target: Collection) -> anyhow::Result<()> {
    let view = state.core.mount_gallery(target, Arc::new(NoOpLightboxHost));
    let _slideshow = state.core.start_slideshow();

    let mut updates = view.engine().subscribe();
    println!("{}", commands::format_gallery(&view.state()));
    println!("{}", commands::HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let gallery = updates.borrow_and_update().clone();
                if gallery.sync_status == SyncStatus::Empty {
                    println!("No photos yet");
                } else {
                    println!("{}", commands::format_gallery(&gallery));
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                let command: KioskCommand = match line.parse() {
                    Ok(command) => command,
                    Err(e) => {
                        println!("{}", e);
                        continue;
                    }
                };
                match command {
                    KioskCommand::Quit => break,
                    KioskCommand::Help => println!("{}", commands::HELP),
                    KioskCommand::Show => println!("{}", commands::format_gallery(&view.state())),
                    KioskCommand::Refresh => {
                        let outcome = view.engine().refresh().await;
                        println!("refresh: {:?}", outcome);
                    }
                    other => match commands::apply(&view, &other) {
                        Some(Ok(lightbox)) => {
                            println!("{}", commands::format_lightbox(&lightbox, view.state().len()));
                            if let Some(photo) = view.current_photo() {
                                println!("  {} {}", photo.id, photo.image);
                            }
                        }
                        Some(Err(e)) => warn!("{}", e),
                        None => {}
                    },
                }
            }
        }
    }

    info!("Kiosk stopped");
    Ok(())
}
