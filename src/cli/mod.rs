pub mod commands;

use std::io::{self, Write};
use uuid::Uuid;

use crate::chat::Orchestrator;
use crate::cli::commands::{Commands, SessionAction};
use crate::config::AppConfig;
use crate::db::{get_connection, MessageStore};
use crate::llm::ProviderFactory;

pub async fn run_cli(command: Commands, config_path: String) {
    let config = AppConfig::load(&config_path).expect("Failed to load config");

    match command {
        Commands::Serve => {
            panic!("Serve command should be intercepted by main.rs to boot actix-web");
        }
        Commands::Session { action } => {
            let pool = get_connection(&config.database).expect("DB error");
            let store = MessageStore::new(pool);

            match action {
                SessionAction::List => match store.list_sessions(50, 0) {
                    Ok(sessions) => {
                        if sessions.is_empty() {
                            println!("No sessions found.");
                        } else {
                            println!("{:<38} | {}", "ID", "Created At");
                            println!("{:-<38}-+-{:-<20}", "", "");
                            for s in sessions {
                                println!("{:<38} | {}", s.id.to_string(), s.created_at);
                            }
                        }
                    }
                    Err(e) => eprintln!("Error: {}", e),
                },
                SessionAction::Show { id } => {
                    match store.get_session(id) {
                        Ok(Some(_)) => {}
                        Ok(None) => {
                            eprintln!("Session {} not found.", id);
                            return;
                        }
                        Err(e) => {
                            eprintln!("Error: {}", e);
                            return;
                        }
                    }
                    match store.history(id) {
                        Ok(messages) => {
                            for m in messages {
                                println!("[{}]: {}", m.role.as_str().to_uppercase(), m.content);
                            }
                        }
                        Err(e) => eprintln!("Error: {}", e),
                    }
                }
            }
        }
        Commands::Chat { session } => {
            run_repl(session, config).await;
        }
    }
}

async fn run_repl(session_id: Option<Uuid>, config: AppConfig) {
    let pool = get_connection(&config.database).expect("DB Error");
    let store = MessageStore::new(pool);
    let llm = ProviderFactory::create_default(&config).expect("Failed to init LLM provider");
    let orchestrator = Orchestrator::new(store, llm, &config.chat);

    let mut token = session_id;

    println!("--- CandyChat Terminal ---");
    match token {
        Some(id) => println!("Resuming session: {}", id),
        None => println!("Starting a fresh session."),
    }
    println!("Type /exit to quit.");
    println!("--------------------------");

    loop {
        print!("\nYou> ");
        io::stdout().flush().unwrap();

        let mut input = String::new();
        io::stdin().read_line(&mut input).unwrap();
        let text = input.trim();

        if text.is_empty() {
            continue;
        }
        if text == "/exit" || text == "/quit" {
            break;
        }

        match orchestrator.handle_user_message(token, text).await {
            Ok(reply) => {
                token = Some(reply.session_id);
                println!("Bot> {}", reply.assistant_message.content);
            }
            Err(e) => eprintln!("Error: {}", e),
        }
    }
}
