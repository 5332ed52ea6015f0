use std::io::{self, BufRead, Write};
use std::sync::Arc;

use maitred_agent::oracle::OracleGateway;
use maitred_agent::runtime::{AgentRuntime, ChatRequest};
use maitred_core::budget::BudgetQuotas;
use maitred_core::catalog::Catalog;
use maitred_core::config::{AppConfig, LoadOptions};
use rand::Rng;

use super::CommandResult;

/// Line-oriented REPL against the same runtime the server exposes. One
/// process, one session; `exit` or EOF leaves the conversation.
pub fn run(session: Option<String>) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return CommandResult::failure("chat", "config", error.to_string(), 2),
    };

    let gateway = match OracleGateway::from_config(&config.oracle) {
        Ok(gateway) => gateway,
        Err(error) => return CommandResult::failure("chat", "oracle", error.to_string(), 2),
    };

    let tokio_runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => return CommandResult::failure("chat", "runtime", error.to_string(), 2),
    };

    let agent = AgentRuntime::new(
        Arc::new(Catalog::builtin()),
        gateway,
        BudgetQuotas {
            daily_tokens: config.limits.daily_tokens,
            lifetime_tokens: config.limits.lifetime_tokens,
        },
        config.limits.max_input_words,
    );
    let session_id = session.unwrap_or_else(generated_session_id);

    println!("maitred chat - session {session_id} (type \"exit\" to leave)");

    let stdin = io::stdin();
    loop {
        print!("you> ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }

        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if message == "exit" || message == "quit" {
            break;
        }

        let response = tokio_runtime.block_on(agent.handle(ChatRequest {
            message: message.to_string(),
            session_id: session_id.clone(),
        }));

        println!("maitred> {}", response.reply);
        if let Some(code) = response.order_number {
            println!("maitred> confirmation code: {code}");
            break;
        }
    }

    CommandResult::success("chat", "conversation ended")
}

fn generated_session_id() -> String {
    let mut rng = rand::thread_rng();
    format!("cli-{:06x}", rng.gen_range(0..0x100_0000u32))
}
