mod artifact;
mod command;
mod completion;
mod config;
mod lang;
mod respond;
mod segment;
mod telegram;

use std::sync::Arc;
use std::time::Duration;

use teloxide::prelude::*;
use teloxide::types::BotCommand;
use tracing::{error, info, warn};
use tracing_subscriber::prelude::*;

use command::Invocation;
use config::Config;
use telegram::{TelegramClient, TelegramReply};

/// Fixed user-facing error reply. Internal detail stays in the logs.
const ERROR_REPLY: &str = "Üzgünüm, bir hata oluştu.";
const USAGE_HINT: &str = "Lütfen bir soru sorun. Örnek: !sor Hava nasıl?";

struct BotState {
    config: Config,
    completion: completion::Client,
    telegram: Arc<TelegramClient>,
    bot_username: Option<String>,
}

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sorbot.json".to_string());
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let bot = Bot::new(&config.telegram_bot_token);

    // Setup logging
    let log_dir = config.data_dir.join("logs");
    std::fs::create_dir_all(&log_dir).ok();
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("sorbot.log"))
        .expect("Failed to open log file");
    let (non_blocking, _guard) = tracing_appender::non_blocking(log_file);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .init();

    info!("🚀 Starting sorbot...");
    info!("Loaded config from {config_path}");
    info!("Model: {}", config.model);

    let bot_username = match bot.get_me().await {
        Ok(me) => {
            info!("Bot user ID: {}, username: @{}", me.id, me.username());
            Some(me.username().to_string())
        }
        Err(e) => {
            warn!("Failed to get bot info: {e}");
            None
        }
    };

    match bot
        .set_my_commands(vec![BotCommand::new("sor", "AI'ya bir soru sor")])
        .await
    {
        Ok(_) => info!("Registered /sor command"),
        Err(e) => warn!("Failed to register commands: {e}"),
    }

    let completion = completion::Client::new(
        config.completion_api_url.clone(),
        config.completion_api_key.clone(),
        Duration::from_secs(config.request_timeout_secs),
    );
    let telegram = Arc::new(TelegramClient::new(bot.clone()));

    let state = Arc::new(BotState {
        config,
        completion,
        telegram,
        bot_username,
    });

    let handler = dptree::entry().branch(Update::filter_message().endpoint(handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

async fn handle_message(msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let user = match msg.from {
        Some(ref u) => u,
        None => return Ok(()),
    };
    if user.is_bot {
        return Ok(());
    }

    let text = match msg.text() {
        Some(t) => t,
        None => return Ok(()),
    };

    let chat_id = msg.chat.id.0;
    let message_id = msg.id.0 as i64;

    match command::parse(text, state.bot_username.as_deref()) {
        Some(Invocation::Ask(question)) => {
            let username = user.username.as_deref().unwrap_or(&user.first_name);
            info!("Question from {username} ({}): \"{question}\"", user.id);
            answer_question(&state, chat_id, message_id, &question).await;
        }
        Some(Invocation::MissingQuestion) => {
            state
                .telegram
                .send_message(chat_id, USAGE_HINT, Some(message_id))
                .await
                .ok();
        }
        None => {}
    }

    Ok(())
}

/// Forward the question to the AI backend and deliver the formatted reply.
async fn answer_question(state: &BotState, chat_id: i64, message_id: i64, question: &str) {
    state.telegram.send_typing(chat_id).await;

    let reply = TelegramReply {
        client: state.telegram.clone(),
        chat_id,
        reply_to_message_id: Some(message_id),
    };

    let result = match state.completion.chat(&state.config.model, question).await {
        Ok(answer) => respond::deliver(&answer, &state.config.scratch_dir(), &reply)
            .await
            .map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };

    if let Err(e) = result {
        error!("Failed to answer question: {e}");
        state
            .telegram
            .send_message(chat_id, ERROR_REPLY, Some(message_id))
            .await
            .ok();
    }
}
