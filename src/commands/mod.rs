//! Command handlers for the ChitChat CLI
//!
//! Each handler wires the engine components together for one subcommand.
//! Construction is uniform: one keyring-backed token store shared by the
//! API client and the session manager, so stored credentials and request
//! authentication can never disagree.

use std::sync::Arc;
use std::time::Duration;

use anyhow::bail;
use colored::Colorize;
use prettytable::{format, row, Table};

use crate::api::ApiClient;
use crate::auth::{KeyringTokenStore, SessionManager, TokenStore};
use crate::chat_mode;
use crate::config::Config;
use crate::conversation::ConversationSession;
use crate::directory::ConversationDirectory;
use crate::error::Result;
use crate::transport::fake::FakeTransport;
use crate::transport::LiveTransport;
use crate::types::ConversationId;

/// Shared component wiring for every command.
pub struct App {
    pub api: ApiClient,
    pub session: SessionManager,
}

impl App {
    /// Builds the component stack from configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let store: Arc<dyn TokenStore> = Arc::new(KeyringTokenStore::new());
        let api = ApiClient::new(
            config.base_url()?,
            Duration::from_secs(config.server.timeout_secs),
            store.clone(),
        )?;
        let session = SessionManager::new(api.clone(), store);
        Ok(Self { api, session })
    }

    fn directory(&self) -> ConversationDirectory {
        ConversationDirectory::new(self.api.clone(), self.session.clone())
    }
}

/// Prompts for a password when one was not supplied on the command line.
fn resolve_password(password: Option<String>) -> Result<String> {
    match password {
        Some(password) => Ok(password),
        None => {
            let mut editor = rustyline::DefaultEditor::new()?;
            Ok(editor.readline("Password: ")?)
        }
    }
}

/// Handles `chitchat login`.
pub async fn handle_login(app: &App, username: &str, password: Option<String>) -> Result<()> {
    let password = resolve_password(password)?;
    app.session.login(username, &password).await?;
    println!("{}", format!("Logged in as {}", username).green());
    Ok(())
}

/// Handles `chitchat register`. Success does not establish a session; the
/// user logs in separately.
pub async fn handle_register(app: &App, username: &str, password: Option<String>) -> Result<()> {
    let password = resolve_password(password)?;
    app.session.register(username, &password).await?;
    println!(
        "{}",
        format!("Account {} created. Log in with `chitchat login`.", username).green()
    );
    Ok(())
}

/// Handles `chitchat logout`.
pub fn handle_logout(app: &App) {
    app.session.logout();
    println!("Logged out.");
}

/// Handles `chitchat whoami`.
pub fn handle_whoami(app: &App) {
    let session = app.session.current_session();
    if session.is_authenticated {
        println!(
            "Authenticated as user {}",
            session.user_id.unwrap_or_default()
        );
    } else {
        println!("Not logged in.");
    }
}

/// Handles `chitchat chats`: lists conversations and candidate users.
pub async fn handle_chats(app: &App) -> Result<()> {
    let directory = app.directory();
    directory.load().await?;

    let current_user_id = app.session.current_session().user_id;

    let conversations = directory.conversations().await;
    if conversations.is_empty() {
        println!("No conversations yet.");
    } else {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_CLEAN);
        table.set_titles(row!["ID", "WITH", "CREATED"]);
        for conversation in &conversations {
            let peers = conversation
                .peers(current_user_id.unwrap_or_default())
                .iter()
                .map(|p| p.username.clone())
                .collect::<Vec<_>>()
                .join(", ");
            let created = conversation
                .created_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();
            table.add_row(row![conversation.id, peers, created]);
        }
        table.printstd();
    }

    let candidates = directory.candidate_users().await;
    if !candidates.is_empty() {
        let names = candidates
            .iter()
            .filter(|u| Some(u.id) != current_user_id)
            .map(|u| u.username.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        println!("\nStart a new chat with: {}", names.dimmed());
    }
    Ok(())
}

/// Handles `chitchat chat`: opens a conversation (by id or by starting one
/// with a named user) and enters the interactive loop.
pub async fn handle_chat(
    app: &App,
    id: Option<ConversationId>,
    with: Option<String>,
) -> Result<()> {
    let directory = app.directory();
    directory.load().await?;

    let conversation_id = match (id, with) {
        (Some(id), None) => {
            directory.select(id).await;
            if directory.selected().await != Some(id) {
                bail!("Conversation {} is not in your conversation list", id);
            }
            id
        }
        (None, Some(username)) => start_or_reuse(app, &directory, &username).await?,
        _ => bail!("Specify either --id or --with"),
    };

    // No remote live feed is wired in this build; the fake transport
    // satisfies the subscription contract and delivers nothing.
    let transport: Arc<dyn LiveTransport> = Arc::new(FakeTransport::new().0);
    let session = ConversationSession::new(app.api.clone(), transport);
    session.open(conversation_id).await?;

    chat_mode::run(session, app.session.current_session().user_id).await
}

/// Reuses an existing two-party conversation with `username`, or starts a
/// new one.
async fn start_or_reuse(
    app: &App,
    directory: &ConversationDirectory,
    username: &str,
) -> Result<ConversationId> {
    let current_user_id = app.session.current_session().user_id;
    let target = directory
        .candidate_users()
        .await
        .into_iter()
        .find(|u| u.username == username);
    let Some(target) = target else {
        bail!("Unknown user '{}'", username);
    };

    let existing = directory.conversations().await.into_iter().find(|c| {
        c.participants.len() == 2
            && c.participants.iter().any(|p| p.id == target.id)
            && c.participants
                .iter()
                .any(|p| Some(p.id) == current_user_id)
    });
    let conversation_id = match existing {
        Some(conversation) => conversation.id,
        None => directory.start_conversation(target.id).await?.id,
    };
    directory.select(conversation_id).await;
    Ok(conversation_id)
}
