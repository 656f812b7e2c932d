//! Line-driven presentation layer.
//!
//! Reads one command per line, forwards it to the controller as an intent
//! and prints every published state change.

use super::dispatch::Session;
use super::render::render_state;
use crate::dispatch::capability::Capability;
use crate::dispatch::controller::Ack;
use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Number(String),
    Send,
    Locate,
    Dismiss,
    ClearError,
    DismissPrompt,
    Grant(Vec<Capability>),
    Revoke(Vec<Capability>),
    State,
    Wait,
    Help,
    Quit,
}

fn parse_capabilities(arg: &str) -> Option<Vec<Capability>> {
    match arg {
        "positioning" | "location" => Some(vec![Capability::Positioning]),
        "messaging" | "sms" => Some(vec![Capability::Messaging]),
        "all" | "" => Some(vec![Capability::Positioning, Capability::Messaging]),
        _ => None,
    }
}

fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    let (word, arg) = line.split_once(' ').unwrap_or((line, ""));
    let arg = arg.trim();
    let command = match word {
        "number" | "n" => Command::Number(arg.to_string()),
        "send" | "s" => Command::Send,
        "locate" | "l" => Command::Locate,
        "dismiss" | "d" => Command::Dismiss,
        "clear-error" => Command::ClearError,
        "dismiss-prompt" => Command::DismissPrompt,
        "grant" => Command::Grant(parse_capabilities(arg)?),
        "revoke" => Command::Revoke(parse_capabilities(arg)?),
        "state" => Command::State,
        "wait" | "w" => Command::Wait,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        _ => return None,
    };
    Some(command)
}

async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, text: &str) -> Result<()> {
    writer.write_all(text.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

fn describe_ack(ack: &Ack) -> Option<String> {
    match ack {
        Ack::Applied | Ack::Started { .. } => None,
        Ack::Ignored => Some(t!("attempt.busy").to_string()),
        Ack::Rejected { message } => Some(format!("✗ {message}")),
    }
}

/// Returns `false` once the session should end.
async fn execute<W: AsyncWrite + Unpin>(
    session: &Session,
    command: Command,
    writer: &mut W,
) -> Result<bool> {
    let handle = &session.handle;
    let ack = match command {
        Command::Number(text) => {
            handle.update_destination(text).await?;
            None
        }
        Command::Send => Some(handle.submit().await?),
        Command::Locate => Some(handle.locate().await?),
        Command::Dismiss => {
            handle.dismiss_result().await?;
            None
        }
        Command::ClearError => {
            handle.dismiss_error().await?;
            None
        }
        Command::DismissPrompt => {
            handle.dismiss_permission_prompt().await?;
            None
        }
        Command::Grant(capabilities) => {
            for capability in capabilities {
                session.capabilities.grant(capability);
            }
            handle.on_capability_grant_event().await?;
            None
        }
        Command::Revoke(capabilities) => {
            for capability in capabilities {
                session.capabilities.revoke(capability);
            }
            handle.on_capability_grant_event().await?;
            None
        }
        Command::State => {
            write_line(writer, &render_state(&handle.snapshot())).await?;
            None
        }
        Command::Wait => {
            let state = handle.settled().await?;
            write_line(writer, &render_state(&state)).await?;
            None
        }
        Command::Help => {
            write_line(writer, &t!("interactive.help")).await?;
            None
        }
        Command::Quit => return Ok(false),
    };

    if let Some(message) = ack.as_ref().and_then(describe_ack) {
        write_line(writer, &message).await?;
    }
    Ok(true)
}

pub async fn run_session<R, W>(session: &Session, reader: R, mut writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut state = session.handle.subscribe();
    state.mark_unchanged();

    write_line(&mut writer, &t!("interactive.banner")).await?;
    write_line(&mut writer, &render_state(&session.handle.snapshot())).await?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_command(&line) {
                    Some(command) => {
                        if !execute(session, command, &mut writer).await? {
                            break;
                        }
                    }
                    None => {
                        let message = t!("interactive.unknown", command = line.trim());
                        write_line(&mut writer, &message).await?;
                    }
                }
            }
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = state.borrow_and_update().clone();
                write_line(&mut writer, &render_state(&snapshot)).await?;
            }
        }
    }
    Ok(())
}
