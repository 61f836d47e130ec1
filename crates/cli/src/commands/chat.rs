//! Interactive conversation with the skill.
//!
//! # Usage
//!
//! ```bash
//! ag-cli chat --url http://127.0.0.1:3000/webhook --user-id dev-user
//! ```
//!
//! Each line typed is sent as one turn. The session opens with an empty
//! utterance, as the voice platform does, and the loop exits when the skill
//! ends the session or stdin closes.

use alice_grocer_core::AccountStore;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use url::Url;

use crate::client::{CliError, Conversation};

/// Run the chat loop until the skill ends the session.
///
/// # Errors
///
/// Returns an error if a turn fails or the terminal cannot be read.
pub async fn run(url: Url, user_id: &str) -> Result<(), CliError> {
    let mut conversation = Conversation::new(url, user_id, AccountStore::new());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    let greeting = conversation.say("").await?;
    speak(&mut stdout, &greeting.response.text).await?;

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let reply = conversation.say(&line).await?;
        speak(&mut stdout, &reply.response.text).await?;

        if reply.response.end_session {
            tracing::info!("Skill ended the session");
            break;
        }
    }

    Ok(())
}

async fn speak(stdout: &mut tokio::io::Stdout, text: &str) -> Result<(), CliError> {
    stdout.write_all(format!("< {text}\n").as_bytes()).await?;
    stdout.flush().await?;
    Ok(())
}
