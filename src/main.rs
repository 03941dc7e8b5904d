//! BuzzLine terminal client.
//!
//! The presentation layer and "router" around the session core: resolves
//! the stored credential (routing to login when it is absent or
//! rejected), renders the transcript and connection indicator, and
//! forwards typed lines to the session.

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

use buzzline_auth::{CredentialStore, FileStorage, token_from_callback_url};
use buzzline_client::{Session, SessionError};
use buzzline_core::{RenderedMessage, Side};
use buzzline_settings::Settings;

/// BuzzLine realtime chat client.
#[derive(Parser)]
#[command(name = "buzzline", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Store a session credential: the token itself, or the OAuth
    /// callback URL carrying it.
    Login {
        /// Token or callback URL.
        credential: String,
    },
    /// Remove the stored credential.
    Logout,
    /// Show who the stored credential belongs to.
    Whoami,
    /// Join the live chat (the default).
    Chat,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = buzzline_settings::load_settings()?;
    tracing::debug!(host = %settings.backend.host, tls = settings.backend.tls, "settings loaded");
    let store = CredentialStore::new(FileStorage::new(settings.storage.resolved_data_dir()));

    match cli.command.unwrap_or(Command::Chat) {
        Command::Login { credential } => login(&store, &credential),
        Command::Logout => {
            store.clear()?;
            println!("Logged out.");
            Ok(())
        }
        Command::Whoami => {
            whoami(&store);
            Ok(())
        }
        Command::Chat => chat(&settings, &store).await,
    }
}

fn login(store: &CredentialStore<FileStorage>, credential: &str) -> anyhow::Result<()> {
    let token = token_from_callback_url(credential).unwrap_or_else(|| credential.to_string());
    let user = store
        .decode(&token)
        .map_err(|e| anyhow::anyhow!("credential rejected: {e}"))?;
    store.write(&token)?;
    println!("Logged in as {}.", user.name);
    Ok(())
}

fn whoami(store: &CredentialStore<FileStorage>) {
    match store.session_user() {
        Ok(user) => match user.email {
            Some(email) => println!("{} <{email}>", user.name),
            None => println!("{}", user.name),
        },
        Err(e) => println!("No session ({e}). Run `buzzline login <token>`."),
    }
}

async fn chat(settings: &Settings, store: &CredentialStore<FileStorage>) -> anyhow::Result<()> {
    let session = match Session::connect(settings, store).await {
        Ok(session) => session,
        // The router role: no usable credential means the login screen.
        Err(e @ (SessionError::NoCredential | SessionError::InvalidCredential(_))) => {
            println!("No usable session ({e}). Run `buzzline login <token>` first.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!(
        "Joined as {}. Type a message and press enter; ctrl-d leaves.",
        session.user().name
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut updates = session.updates();
    let mut printed = 0;

    loop {
        print_new_entries(&session, &mut printed);
        if session.state().is_terminal() {
            break;
        }
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => session.send(&line),
                None => break,
            },
            _ = updates.changed() => {}
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    session.shutdown();
    // Let the close handshake land so the sign-off notice gets printed.
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    print_new_entries(&session, &mut printed);
    Ok(())
}

fn print_new_entries(session: &Session, printed: &mut usize) {
    let rendered = session.transcript();
    for entry in rendered.iter().skip(*printed) {
        match entry {
            RenderedMessage::System { text } => println!("· {text}"),
            RenderedMessage::Chat {
                text,
                side: Side::Mine,
                ..
            } => println!("        you ▸ {text}"),
            RenderedMessage::Chat {
                sender,
                text,
                side: Side::Theirs,
                ..
            } => println!("{sender} ▸ {text}"),
        }
    }
    *printed = rendered.len();
}
