//! `ragents ask` - ask an agent a question.

use std::collections::HashMap;
use std::io::Write;

use serde_json::json;

use crate::cli::args::AskArgs;
use crate::cli::context::CommandContext;
use crate::cli::error::CliResult;
use crate::cli::utils::print_answer;
use crate::observability::Logger;
use crate::orchestration::{Answer, ConsoleHandler, RunDriverConfig, StreamHandler};
use crate::service::{AgentService, AskOptions};

/// Console handler that also keeps the delivered answer for the log.
struct RecordingHandler<W: Write + Send> {
    console: ConsoleHandler<W>,
    delivered: Option<Answer>,
}

impl<W: Write + Send> StreamHandler for RecordingHandler<W> {
    fn on_text_created(&mut self) {
        self.console.on_text_created();
    }

    fn on_tool_call_created(&mut self, kind: &str) {
        self.console.on_tool_call_created(kind);
    }

    fn on_message_done(&mut self, answer: &Answer) {
        self.console.on_message_done(answer);
        self.delivered = Some(answer.clone());
    }
}

/// Resolve the agent, run the question and print the answer.
pub async fn run(ctx: &CommandContext, args: &AskArgs) -> CliResult<()> {
    let registry = ctx.registry()?;
    // Reject unknown agents before requiring credentials.
    registry.resolve(&args.agent)?;

    let service = AgentService::new(
        registry,
        ctx.backend()?,
        RunDriverConfig::from(&ctx.loader.config.polling),
    );
    let question = args.question_text();
    let logger = ctx.logger(args.log_file.as_deref());
    log_question(logger.as_ref(), args, &question);

    let answer = if args.stream {
        let mut handler = RecordingHandler {
            console: ConsoleHandler::stdout(),
            delivered: None,
        };
        service
            .ask_streaming(&args.agent, &question, args.extra.as_deref(), &mut handler)
            .await?;
        handler.delivered.unwrap_or_default()
    } else {
        let options = AskOptions {
            stream: false,
            extra_instructions: args.extra.clone(),
            thread_id: args.thread.clone(),
        };
        let answer = service.ask(&args.agent, &question, &options).await?;
        print_answer(&answer);
        answer
    };

    if let Some(logger) = &logger {
        let logged = if answer.text.starts_with("[ERROR]") {
            let context = HashMap::from([("agent".to_string(), json!(args.agent))]);
            logger.log_error(&answer.text, Some(&context))
        } else {
            logger.log_answer(&args.agent, &answer.text, &answer.citation_lines())
        };
        if let Err(e) = logged {
            tracing::warn!(error = %e, "could not write interaction log");
        }
    }
    Ok(())
}

fn log_question(logger: Option<&Logger>, args: &AskArgs, question: &str) {
    if let Some(logger) = logger {
        if let Err(e) = logger.log_question(&args.agent, question, args.extra.as_deref(), args.stream) {
            tracing::warn!(error = %e, "could not write interaction log");
        }
    }
}
