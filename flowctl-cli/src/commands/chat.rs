//! `flowctl chat` - interactive session against one flow
//!
//! Each line read from stdin is one turn; turns run strictly one after
//! another. Slash commands:
//!
//! ```text
//! /history   print the session so far
//! /clear     forget the session
//! /exit      leave (also /quit or EOF)
//! ```

use std::io::Write;

use anyhow::Result;
use clap::Parser;
use flowctl_core::{
    message_text, ChatSession, FlowError, FlowInvoker, FlowTransport, InvocationRequest,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use super::connection::{build_invoker, ConnectionArgs};
use crate::ui;

#[derive(Parser, Debug)]
pub struct ChatArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Heading printed when the session starts
    #[arg(long, default_value = "Langflow chat")]
    pub title: String,
}

#[derive(Debug, PartialEq, Eq)]
enum ChatCommand<'a> {
    Exit,
    History,
    Clear,
    Empty,
    Message(&'a str),
}

impl<'a> ChatCommand<'a> {
    fn parse(line: &'a str) -> Self {
        match line.trim() {
            "" => ChatCommand::Empty,
            "/exit" | "/quit" => ChatCommand::Exit,
            "/history" => ChatCommand::History,
            "/clear" => ChatCommand::Clear,
            message => ChatCommand::Message(message),
        }
    }
}

pub async fn run_chat(args: ChatArgs) -> Result<()> {
    let settings = args.connection.resolve()?;
    let invoker = build_invoker(&settings)?;
    let template = InvocationRequest::new("")
        .with_output_type(settings.output_type.as_str())
        .with_input_type(settings.input_type.as_str())
        .with_tweaks(settings.tweaks.clone());

    println!("{}", args.title);
    println!("Type /history, /clear or /exit.\n");

    let mut session = ChatSession::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("you> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };

        match ChatCommand::parse(&line) {
            ChatCommand::Exit => break,
            ChatCommand::Empty => continue,
            ChatCommand::History => print_history(&session),
            ChatCommand::Clear => {
                session.clear();
                println!("(history cleared)");
            }
            ChatCommand::Message(message) => {
                match chat_turn(&invoker, &settings.endpoint, &template, &mut session, message).await {
                    Ok(reply) => println!("flow> {}\n", reply),
                    Err(e) => eprintln!("Error: {}\n", e),
                }
            }
        }
    }

    debug!(turns = session.len(), "chat session ended");
    Ok(())
}

/// One user turn: record it, invoke the flow, record the reply.
///
/// On failure the user entry stays in the session and no assistant entry
/// is added.
async fn chat_turn<T: FlowTransport>(
    invoker: &FlowInvoker<T>,
    endpoint: &str,
    template: &InvocationRequest,
    session: &mut ChatSession,
    message: &str,
) -> Result<String, FlowError> {
    session.push_user(message);

    let request = InvocationRequest {
        message: message.to_string(),
        ..template.clone()
    };

    let pb = ui::spinner("Thinking...");
    let result = invoker.invoke(endpoint, &request).await;
    ui::clear(pb);

    let reply = reply_text(&result?);
    session.push_assistant(reply.as_str());
    Ok(reply)
}

/// Message text when present, else the raw JSON
fn reply_text(result: &serde_json::Value) -> String {
    match message_text(result) {
        Some(text) => text.to_string(),
        None => result.to_string(),
    }
}

fn print_history(session: &ChatSession) {
    if session.is_empty() {
        println!("(no messages yet)");
        return;
    }
    for entry in session.entries() {
        println!("[{}] {}", entry.role, entry.content);
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowctl_core::{AuthContext, ChatRole, HttpResponse, MockTransport};

    fn invoker() -> FlowInvoker<MockTransport> {
        let auth = AuthContext::new("https://flows.example.test", "org", "flow-1")
            .with_token(Some("tok".into()));
        FlowInvoker::new(auth, MockTransport::new())
    }

    #[test]
    fn parses_slash_commands() {
        assert_eq!(ChatCommand::parse("/exit"), ChatCommand::Exit);
        assert_eq!(ChatCommand::parse(" /quit "), ChatCommand::Exit);
        assert_eq!(ChatCommand::parse("/history"), ChatCommand::History);
        assert_eq!(ChatCommand::parse("/clear"), ChatCommand::Clear);
        assert_eq!(ChatCommand::parse("   "), ChatCommand::Empty);
        assert_eq!(ChatCommand::parse(" hello "), ChatCommand::Message("hello"));
    }

    #[tokio::test]
    async fn successful_turn_records_both_entries() {
        let inv = invoker();
        inv.transport().add_response(HttpResponse::new(
            200,
            r#"{"outputs":[{"outputs":[{"results":{"message":{"text":"Hi there"}}}]}]}"#,
        ));
        let mut session = ChatSession::new();

        let reply = chat_turn(&inv, "", &InvocationRequest::new(""), &mut session, "hello")
            .await
            .unwrap();

        assert_eq!(reply, "Hi there");
        assert_eq!(session.len(), 2);
        assert_eq!(session.entries()[0].role, ChatRole::User);
        assert_eq!(session.entries()[0].content, "hello");
        assert_eq!(session.entries()[1].role, ChatRole::Assistant);

        let sent = inv.transport().last_request().unwrap();
        assert_eq!(sent.body["input_value"], "hello");
    }

    #[tokio::test]
    async fn failed_turn_keeps_user_entry_only() {
        let inv = invoker();
        inv.transport().add_response(HttpResponse::new(503, "busy"));
        let mut session = ChatSession::new();

        let err = chat_turn(&inv, "", &InvocationRequest::new(""), &mut session, "hello")
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(503));
        assert_eq!(session.len(), 1);
        assert_eq!(session.last().unwrap().role, ChatRole::User);
    }

    #[tokio::test]
    async fn template_carries_types_and_tweaks() {
        let inv = invoker();
        inv.transport().add_response(HttpResponse::new(200, r#"{"ok":true}"#));
        let template = InvocationRequest::new("")
            .with_output_type("text")
            .with_tweaks(flowctl_core::Tweaks::from_json(r#"{"Prompt-1": {"x": 1}}"#).unwrap());
        let mut session = ChatSession::new();

        let reply = chat_turn(&inv, "named", &template, &mut session, "hi").await.unwrap();

        // No message text in the response, so the raw JSON is the reply
        assert_eq!(reply, r#"{"ok":true}"#);
        let sent = inv.transport().last_request().unwrap();
        assert!(sent.url.ends_with("/run/named"));
        assert_eq!(sent.body["output_type"], "text");
        assert_eq!(sent.body["tweaks"]["Prompt-1"]["x"], 1);
    }
}
