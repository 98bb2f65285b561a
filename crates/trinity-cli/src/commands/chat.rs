use crate::backend::AppContext;
use anyhow::Result;
use std::io::Write as _;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use trinity_application::{AgentChat, ProgressTracker, Route, SendOutcome, SkipReason};
use trinity_core::agent::{self, AgentId};
use trinity_core::chat::{Message, MessageRole, format_timestamp};
use trinity_core::pillar::TOTAL_PILLARS;

const REPLY_WAIT: Duration = Duration::from_secs(30);

const HELP: &str = "\
Commands:
  /new            start a new thread
  /threads        list this agent's threads
  /open <id>      continue a thread
  /agent <ID>     switch to PILLAR, COME-UP or CODEX
  /quit           leave
Anything else is sent to the agent.";

pub async fn run(context: AppContext, agent_id: AgentId, thread_id: Option<&str>) -> Result<()> {
    context.require(Route::AgentChat).await?;

    let tracker = ProgressTracker::open(context.session.clone(), context.store.clone()).await?;
    let progress = tracker.progress().await;
    tracker.close().await;

    let chat = AgentChat::open_for(
        context.session.clone(),
        context.store.clone(),
        context.responder.clone(),
        agent_id,
    )
    .await?
    .with_extra_context(format!(
        "The user has completed {} of {TOTAL_PILLARS} pillars ({:.0}%).",
        progress.completed_count(),
        progress.percentage()
    ));

    match thread_id {
        Some(id) => chat.select_thread(id).await?,
        None => {
            chat.start_new_thread().await?;
        }
    }

    print_banner(agent_id);
    print_messages(&chat.view().await.messages);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "/quit" | "/exit" => break,
            "/help" => println!("{HELP}"),
            "/new" => {
                let id = chat.start_new_thread().await?;
                println!("Started thread {id}");
            }
            "/threads" => {
                chat.show_thread_list().await;
                let view = chat.view().await;
                if view.threads.is_empty() {
                    println!("No threads yet.");
                }
                for thread in view.threads {
                    println!(
                        "  {}  {:<44} {}",
                        thread.id,
                        thread.title,
                        format_timestamp(thread.updated_at)
                    );
                }
            }
            command if command.starts_with("/open ") => {
                let id = command.trim_start_matches("/open ").trim();
                chat.select_thread(id).await?;
                print_messages(&chat.view().await.messages);
            }
            command if command.starts_with("/agent ") => {
                match command.trim_start_matches("/agent ").parse::<AgentId>() {
                    Ok(next) => {
                        chat.select_agent(next).await?;
                        chat.start_new_thread().await?;
                        print_banner(next);
                    }
                    Err(err) => println!("{err}"),
                }
            }
            _ => {
                chat.set_input(line.clone()).await;
                send(&chat).await?;
            }
        }
    }

    chat.close().await;
    context.sign_out().await?;
    Ok(())
}

async fn send(chat: &AgentChat) -> Result<()> {
    match chat.submit_input().await? {
        SendOutcome::Completed {
            assistant_message_id,
            ..
        } => {
            let reply = chat.await_message(&assistant_message_id, REPLY_WAIT).await?;
            print_messages(std::slice::from_ref(&reply));
        }
        SendOutcome::Skipped(SkipReason::EmptyText) => {}
        SendOutcome::Skipped(reason) => println!("Not sent: {reason:?}"),
        SendOutcome::Aborted { step, reason } => {
            println!("Message could not be completed at {step}: {reason}");
        }
    }
    Ok(())
}

fn print_banner(agent_id: AgentId) {
    let agent = agent::agent(agent_id);
    println!("{} - {}", agent.name, agent.archetype);
    println!("{}", agent.summary);
    println!("Type /help for commands.\n");
}

fn print_messages(messages: &[Message]) {
    for message in messages {
        let speaker = match message.role {
            MessageRole::User => "you",
            MessageRole::Assistant => "agent",
        };
        println!("[{}] {speaker}: {}", format_timestamp(message.created_at), message.text);
    }
}
