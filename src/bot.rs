use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::Url;
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use teloxide::utils::command::BotCommands;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::payload::WebAppPayload;
use crate::replies;
use crate::state::RecentData;

type HandlerResult = Result<()>;

#[derive(Debug, Clone, PartialEq, Eq, BotCommands)]
#[command(rename_rule = "lowercase", description = "可用命令：")]
pub enum Command {
    /// 开始使用
    Start,
    /// 显示帮助
    Help,
    /// 打开 Mini App
    App,
    /// 查看最近接收的数据
    Data,
}

/// Shared application state
pub struct AppState {
    config: Config,
    web_app_url: Url,
    recent: RecentData,
}

impl AppState {
    pub fn new(config: Config, web_app_url: Url) -> Self {
        Self {
            config,
            web_app_url,
            recent: RecentData::new(),
        }
    }
}

/// Start the Telegram bot and poll until Ctrl-C.
pub async fn run(state: Arc<AppState>) -> Result<()> {
    let bot = Bot::new(&state.config.telegram.bot_token);

    info!("Starting Telegram bot...");
    info!("  Mini App: {}", state.web_app_url);

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!("Failed to register command list: {}", e);
    }

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .branch(
                    dptree::entry()
                        .filter_command::<Command>()
                        .endpoint(handle_command),
                )
                .branch(
                    dptree::filter(|msg: Message| msg.web_app_data().is_some())
                        .endpoint(handle_web_app_data),
                ),
        )
        .branch(Update::filter_callback_query().endpoint(handle_callback));

    info!("Bot started, press Ctrl-C to stop");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("bot"))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Bot stopped");
    Ok(())
}

async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    state: Arc<AppState>,
) -> HandlerResult {
    debug!("Command {:?} in chat {}", cmd, msg.chat.id);
    let outcome = match cmd {
        Command::Start => start(&bot, &msg, &state).await,
        Command::Help => help(&bot, &msg).await,
        Command::App => open_app(&bot, &msg, &state).await,
        Command::Data => recent_data(&bot, &msg, &state).await,
    };
    recover(&bot, Some(msg.chat.id), "command", outcome).await
}

async fn start(bot: &Bot, msg: &Message, state: &AppState) -> HandlerResult {
    let first_name = msg.from.as_ref().map(|user| user.first_name.as_str());
    bot.send_message(msg.chat.id, replies::start_text(first_name))
        .reply_markup(replies::open_app_keyboard(&state.web_app_url))
        .await?;
    Ok(())
}

async fn help(bot: &Bot, msg: &Message) -> HandlerResult {
    bot.send_message(msg.chat.id, replies::HELP_TEXT).await?;
    Ok(())
}

async fn open_app(bot: &Bot, msg: &Message, state: &AppState) -> HandlerResult {
    bot.send_message(msg.chat.id, replies::OPEN_APP_TEXT)
        .reply_markup(replies::open_app_keyboard(&state.web_app_url))
        .await?;
    Ok(())
}

async fn recent_data(bot: &Bot, msg: &Message, state: &AppState) -> HandlerResult {
    match state.recent.latest(msg.chat.id).await {
        Some(received) => {
            bot.send_message(msg.chat.id, replies::recent_data_text(&received))
                .parse_mode(ParseMode::MarkdownV2)
                .await?;
        }
        None => {
            bot.send_message(msg.chat.id, replies::NO_DATA_TEXT).await?;
        }
    }
    Ok(())
}

async fn handle_web_app_data(bot: Bot, msg: Message, state: Arc<AppState>) -> HandlerResult {
    let outcome = relay_web_app_data(&bot, &msg, &state).await;
    recover(&bot, Some(msg.chat.id), "web_app_data", outcome).await
}

async fn relay_web_app_data(bot: &Bot, msg: &Message, state: &AppState) -> HandlerResult {
    let Some(data) = msg.web_app_data() else {
        return Ok(());
    };

    let payload = WebAppPayload::parse(&data.data)
        .with_context(|| format!("Web app data is not valid JSON: {}", data.data))?;
    info!("Web app data from chat {}: {}", msg.chat.id, payload);

    let reply = payload.reply();
    state.recent.record(msg.chat.id, payload).await;

    let request = bot.send_message(msg.chat.id, reply.text());
    match reply.parse_mode() {
        Some(mode) => request.parse_mode(mode).await?,
        None => request.await?,
    };
    Ok(())
}

async fn handle_callback(bot: Bot, q: CallbackQuery, state: Arc<AppState>) -> HandlerResult {
    let chat_id = q.message.as_ref().map(|m| m.chat().id);
    let outcome = answer_callback(&bot, &q, &state).await;
    recover(&bot, chat_id, "callback_query", outcome).await
}

async fn answer_callback(bot: &Bot, q: &CallbackQuery, state: &AppState) -> HandlerResult {
    bot.answer_callback_query(q.id.clone()).await?;

    if q.data.as_deref() != Some(replies::OPEN_APP_CALLBACK) {
        debug!("Ignoring callback data {:?}", q.data);
        return Ok(());
    }

    if let Some(message) = q.regular_message() {
        bot.edit_message_text(message.chat.id, message.id, replies::OPEN_APP_TEXT)
            .reply_markup(replies::open_app_keyboard(&state.web_app_url))
            .await?;
    }
    Ok(())
}

/// Log a failed handler and, when the update belongs to a chat, apologise there.
async fn recover(
    bot: &Bot,
    chat_id: Option<ChatId>,
    kind: &str,
    outcome: HandlerResult,
) -> HandlerResult {
    let Err(e) = outcome else {
        return Ok(());
    };

    error!("Update ({}) caused error: {:#}", kind, e);

    if let Some(chat_id) = chat_id {
        if let Err(send_err) = bot.send_message(chat_id, replies::APOLOGY_TEXT).await {
            error!("Failed to send apology to chat {}: {}", chat_id, send_err);
        }
    }
    Ok(())
}
