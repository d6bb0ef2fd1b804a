//! Interactive chat loop for one open conversation
//!
//! Presentation glue over [`ConversationSession`]: renders the history
//! snapshot, prints live updates as they arrive, and sends each entered
//! line as a message. Slash commands: `/quit` leaves, `/help` lists them.

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::conversation::{ConversationSession, SessionEvent};
use crate::error::{Result, SessionError};
use crate::types::{Message, UserId};

/// Renders one message line: dim timestamp, colored sender, body.
fn render_message(message: &Message, current_user_id: Option<UserId>) -> String {
    let timestamp = message
        .timestamp
        .format("%H:%M")
        .to_string()
        .dimmed()
        .to_string();
    let sender = if current_user_id == Some(message.sender.id) {
        message.sender.username.green().bold()
    } else {
        message.sender.username.cyan().bold()
    };
    format!("{} {} {}", timestamp, sender, message.content)
}

/// Runs the interactive loop until the user quits or input closes.
///
/// The session must already be open. Live updates are printed from a
/// background task; entered lines are sent as messages, with validation
/// errors shown inline rather than aborting the loop.
pub async fn run(session: ConversationSession, current_user_id: Option<UserId>) -> Result<()> {
    for message in session.messages().await {
        println!("{}", render_message(&message, current_user_id));
    }
    println!(
        "{}",
        "Connected. Type a message, or /quit to leave.".dimmed()
    );

    // Printer task: surfaces merged live messages and ephemeral signals.
    let printer_session = session.clone();
    let printer = tokio::spawn(async move {
        while let Some(event) = printer_session.next_update().await {
            match event {
                SessionEvent::Message(message) => {
                    println!("{}", render_message(&message, current_user_id));
                }
                SessionEvent::Typing(user) => {
                    println!("{}", format!("{} is typing...", user.username).dimmed());
                }
                SessionEvent::Presence(online) => {
                    let names: Vec<&str> =
                        online.iter().map(|u| u.username.as_str()).collect();
                    println!("{}", format!("online: {}", names.join(", ")).dimmed());
                }
            }
        }
    });

    let mut editor = DefaultEditor::new()?;
    loop {
        // rustyline blocks; keep it off the async executor. The editor is
        // moved into the blocking task and handed back with the result.
        let (returned_editor, readline) = tokio::task::spawn_blocking(move || {
            let mut editor = editor;
            let result = editor.readline("> ");
            (editor, result)
        })
        .await?;
        editor = returned_editor;

        match readline {
            Ok(input) => {
                let input = input.trim().to_string();
                match input.as_str() {
                    "" => continue,
                    "/quit" | "/exit" => break,
                    "/help" => {
                        println!("{}", "/quit  leave the conversation".dimmed());
                        println!("{}", "/help  show this help".dimmed());
                        continue;
                    }
                    _ => {}
                }
                match session.send(&input).await {
                    Ok(message) => {
                        println!("{}", render_message(&message, current_user_id));
                    }
                    Err(SessionError::EmptyMessage) => {
                        println!("{}", "Cannot send an empty message".yellow());
                    }
                    Err(SessionError::Unauthorized) => {
                        println!("{}", "Session expired; please log in again".red());
                        break;
                    }
                    Err(e) => {
                        println!("{}", format!("Send failed: {}", e).red());
                    }
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                tracing::warn!("Readline error: {}", e);
                break;
            }
        }
    }

    printer.abort();
    session.close().await;
    Ok(())
}
