//! Audit assistant

use clap::Args;

use obra_assistant::Assistant;
use obra_runtime::{AppConfig, Session};

use crate::error::CliResult;
use crate::prompt::{is_interactive_terminal, read_line};

#[derive(Args, Debug)]
pub struct AskArgs {
    /// Question; starts an interactive conversation when omitted
    pub question: Vec<String>,
}

pub async fn execute(args: AskArgs, config: &AppConfig) -> CliResult<()> {
    let model = config.language_model()?;
    let session = Session::open(config).await?;
    let mut assistant = Assistant::new(model);

    let question = args.question.join(" ");
    if !question.trim().is_empty() {
        if let Some(reply) = assistant.ask(&question, session.snapshot()).await {
            println!("{}", reply.content);
        }
    } else if is_interactive_terminal() {
        if let Some(greeting) = assistant.messages().first() {
            println!("{}\n", greeting.content);
        }
        while let Some(line) = read_line(">")? {
            if let Some(reply) = assistant.ask(&line, session.snapshot()).await {
                println!("\n{}\n", reply.content);
            }
        }
    }

    session.shutdown().await;
    Ok(())
}
