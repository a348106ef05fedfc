//! # Single Turn – Headless Example
//!
//! Sends one question and inspects the finished transcript instead of
//! drawing it. A closure stands in for a renderer and counts the frames it
//! was handed, which is roughly one per streamed fragment.
//!
//! ```bash
//! export OPENAI_API_KEY=sk-…
//! export OPENAI_ASSISTANT_ID=asst_…
//! cargo run -p tourchat --example assistant_single_turn -- "Plan a 5-day trip"
//! ```

use tourchat::{
    TurnDriver, TurnOutcome, model::OpenAiModel, openai::OpenAiAssistantAdapterBuilder,
    session::ChatSession,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let question = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "What is the weather in Reykjavik in July?".to_owned());

    let backend = OpenAiAssistantAdapterBuilder::new_from_env()
        .with_model(OpenAiModel::Gpt4oMini)
        .build()?;

    let mut frames = 0usize;
    let mut driver = TurnDriver::new(backend, |_: &ChatSession| frames += 1);

    let mut session = driver.start_session().await?;
    let outcome = driver.submit(&mut session, question).await?;
    drop(driver);

    for turn in session.transcript() {
        println!("[{}] {}", turn.role(), turn.content());
    }
    println!("\n{frames} frames rendered");

    match outcome {
        TurnOutcome::Failed(err) => Err(err.into()),
        _ => Ok(()),
    }
}
