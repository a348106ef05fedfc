//! # Interactive Travel Assistant
//!
//! A terminal chat against a pre-provisioned OpenAI assistant. Replies are
//! printed as they stream in; `Ctrl-C` stops the current reply and keeps
//! whatever arrived so far.
//!
//! ```bash
//! export OPENAI_API_KEY=sk-…            # mandatory
//! export OPENAI_ASSISTANT_ID=asst_…     # mandatory
//! RUST_LOG=tourchat=debug cargo run -p tourchat --example assistant_chat
//! ```
//!
//! Commands: `/new` starts a fresh thread, `/quit` leaves.
//!
//! ---------------------------------------------------------------------------

use std::{
    io::{self, Write},
    time::Duration,
};

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tourchat::{
    TurnDriver, TurnOptions, TurnOutcome, openai::OpenAiAssistantAdapterBuilder,
    terminal::TerminalRenderer,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Logs go to stderr so they never interleave with the reply text.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    // 2. Backend from `OPENAI_API_KEY` / `OPENAI_ASSISTANT_ID`.
    let backend = OpenAiAssistantAdapterBuilder::new_from_env().build()?;

    // 3. The terminal already shows what the user typed.
    let renderer = TerminalRenderer::stdout().with_user_echo(false);
    let options = TurnOptions::default().with_idle_timeout(Duration::from_secs(60));
    let mut driver = TurnDriver::new(backend, renderer).with_options(options);

    let mut session = driver.start_session().await?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("you: ");
        io::stdout().flush().ok();

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();

        match line {
            "" => continue,
            "/quit" => break,
            "/new" => {
                session = driver.start_session().await?;
                println!("(new conversation {})\n", session.conversation_id());
                continue;
            }
            _ => {}
        }
        println!();

        // 4. Stop the reply on Ctrl-C instead of killing the process.
        let cancel = CancellationToken::new();
        let watcher = tokio::spawn({
            let cancel = cancel.clone();
            async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.cancel();
                }
            }
        });

        let outcome = driver.submit_with_cancel(&mut session, line, &cancel).await;
        watcher.abort();

        match outcome {
            Ok(TurnOutcome::Cancelled) => println!("(stopped)\n"),
            Ok(_) => {}
            Err(err) => eprintln!("{err}\n"),
        }
    }

    Ok(())
}
