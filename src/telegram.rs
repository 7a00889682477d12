//! Telegram front end for ClipFetch.
//!
//! Owns the request lifecycle: a URL message puts the user into an awaiting-
//! choice state with a two-button inline keyboard, the button press runs the
//! download pipeline, and delivery (or failure) returns the user to idle.
//!
//! Uses the explicit Dispatcher pattern for reliable message polling. Handler
//! errors are logged and swallowed per update; nothing here is fatal to the
//! dispatch loop.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use teloxide::{
    dispatching::{Dispatcher, UpdateFilterExt},
    dptree,
    error_handlers::LoggingErrorHandler,
    prelude::*,
    types::{ChatAction, InlineKeyboardButton, InlineKeyboardMarkup, InputFile},
};

use crate::config::Config;
use crate::error::DownloadError;
use crate::fetcher::{self, Download, Fetcher, MediaKind};
use crate::links;
use crate::pending::PendingChoices;
use crate::replies;
use crate::transcode;

/// Run the bot until the dispatcher stops (ctrl-c or shutdown).
pub async fn run_bot(config: Config) -> Result<()> {
    let bot = Bot::new(config.token.clone());

    tracing::info!("Verifying bot token...");
    let me = bot.get_me().await.context("bot authentication failed")?;
    tracing::info!(
        "Bot authenticated: @{} (ID: {})",
        me.username.as_deref().unwrap_or("unknown"),
        me.id
    );

    // Clear any existing webhook so long polling works.
    if let Err(e) = bot.delete_webhook().await {
        tracing::warn!("Failed to delete webhook: {} (continuing anyway)", e);
    }

    let data = Arc::new(BotData {
        http: reqwest::Client::new(),
        fetcher: Fetcher::new(&config),
        pending: PendingChoices::new(),
        config,
    });

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(message_handler))
        .branch(Update::filter_callback_query().endpoint(callback_handler));

    tracing::info!("Starting dispatcher with long polling...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![data])
        .default_handler(|upd| async move {
            tracing::debug!("Unhandled update: {:?}", upd);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("Error in update handler"))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    tracing::warn!("Dispatcher stopped");
    Ok(())
}

/// Shared state injected into every handler.
struct BotData {
    config: Config,
    http: reqwest::Client,
    fetcher: Fetcher,
    pending: PendingChoices,
}

/// Message handler endpoint for the dispatcher
async fn message_handler(bot: Bot, msg: Message, data: Arc<BotData>) -> ResponseResult<()> {
    if let Err(e) = handle_message(&bot, &msg, &data).await {
        tracing::error!("Error handling message: {:#}", e);
    }
    Ok(())
}

async fn handle_message(bot: &Bot, msg: &Message, data: &BotData) -> Result<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let chat_id = msg.chat.id;

    tracing::info!(
        chat = chat_id.0,
        "received message: {:?}",
        text.chars().take(80).collect::<String>()
    );

    if text.starts_with('/') {
        return handle_command(bot, chat_id, text).await;
    }

    // Group chats only respond when the bot is mentioned by handle.
    let text = if msg.chat.is_group() || msg.chat.is_supergroup() {
        let Some(handle) = data.config.bot_username.as_deref() else {
            return Ok(());
        };
        match replies::strip_mention(text, handle) {
            Some(stripped) => stripped,
            None => return Ok(()),
        }
    } else {
        text.to_string()
    };

    handle_text(bot, msg, data, text.trim()).await
}

async fn handle_command(bot: &Bot, chat_id: ChatId, text: &str) -> Result<()> {
    let cmd = text.split_whitespace().next().unwrap_or(text);
    // Commands in groups arrive as /start@bot_handle.
    let cmd = cmd.split('@').next().unwrap_or(cmd);

    match cmd {
        "/start" => {
            bot.send_message(chat_id, replies::START_TEXT).await?;
        }
        "/help" => {
            bot.send_message(chat_id, replies::HELP_TEXT).await?;
        }
        "/custom" => {
            bot.send_message(chat_id, replies::CUSTOM_TEXT).await?;
        }
        "/introduction" => {
            bot.send_message(chat_id, replies::INTRODUCTION_TEXT).await?;
        }
        _ => {
            tracing::debug!("ignoring unknown command: {}", cmd);
        }
    }

    Ok(())
}

async fn handle_text(bot: &Bot, msg: &Message, data: &BotData, text: &str) -> Result<()> {
    let chat_id = msg.chat.id;

    if links::is_short_status_link(text) || links::is_supported_url(text) {
        let url = if links::is_short_status_link(text) {
            let expanded = links::expand_short_link(&data.http, text).await?;
            tracing::info!("expanded short link to {}", expanded);
            expanded
        } else {
            text.to_string()
        };

        // Short links can resolve to anything; re-check the allow-list.
        if !links::is_supported_url(&url) {
            bot.send_message(chat_id, replies::INVALID_URL_TEXT).await?;
            return Ok(());
        }

        let Some(user) = msg.from.as_ref() else {
            return Ok(());
        };
        data.pending.set(user.id.0, url).await;
        bot.send_message(chat_id, replies::CHOOSE_PROMPT)
            .reply_markup(choice_keyboard())
            .await?;
        return Ok(());
    }

    // URL-shaped but off the allow-list still gets the validation message
    // rather than small talk.
    if text.starts_with("http://") || text.starts_with("https://") {
        tracing::info!("URL pattern did not match: {}", text);
        bot.send_message(chat_id, replies::INVALID_URL_TEXT).await?;
        return Ok(());
    }

    let first_name = msg
        .from
        .as_ref()
        .map(|u| u.first_name.as_str())
        .unwrap_or("there");
    let response = replies::small_talk(text, first_name);
    tracing::info!("Bot: {}", response);
    bot.send_message(chat_id, response).await?;
    Ok(())
}

pub(crate) fn choice_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            MediaKind::Video.label(),
            MediaKind::Video.callback_data(),
        )],
        vec![InlineKeyboardButton::callback(
            MediaKind::Audio.label(),
            MediaKind::Audio.callback_data(),
        )],
    ])
}

/// Callback query handler for the format-choice buttons.
async fn callback_handler(bot: Bot, query: CallbackQuery, data: Arc<BotData>) -> ResponseResult<()> {
    bot.answer_callback_query(&query.id).await?;

    let user_id = query.from.id.0;
    let payload = query.data.clone().unwrap_or_default();
    tracing::info!(user = user_id, data = %payload, "callback query");

    let Some(message) = query.message.as_ref() else {
        tracing::warn!("callback query without originating message");
        return Ok(());
    };
    let chat_id = message.chat().id;
    let message_id = message.id();

    let Some(url) = data.pending.get(user_id).await else {
        bot.edit_message_text(chat_id, message_id, replies::NO_PENDING_TEXT)
            .await?;
        return Ok(());
    };

    let Some(kind) = MediaKind::from_callback_data(&payload) else {
        // The stored URL stays intact so a valid button still works.
        bot.edit_message_text(chat_id, message_id, replies::INVALID_CHOICE_TEXT)
            .await?;
        return Ok(());
    };

    bot.edit_message_text(
        chat_id,
        message_id,
        format!("Processing {} from {}... Please wait.", kind.label(), url),
    )
    .await?;

    let result = process_request(&bot, chat_id, &data, &url, kind).await;

    // The request is finished either way; the user starts over with a new URL.
    data.pending.clear(user_id).await;

    if let Err(error) = result {
        tracing::error!(
            user = user_id,
            detail = error.detail().unwrap_or_default(),
            "request failed: {}",
            error
        );
        bot.send_message(chat_id, error.to_string()).await?;
    }

    Ok(())
}

/// Fetch, optionally transcode, deliver, and clean up the artifacts.
async fn process_request(
    bot: &Bot,
    chat_id: ChatId,
    data: &BotData,
    url: &str,
    kind: MediaKind,
) -> Result<(), DownloadError> {
    let _ = bot.send_chat_action(chat_id, ChatAction::Typing).await;

    let download = data.fetcher.fetch(url, kind).await?;
    let mut compressed: Option<PathBuf> = None;

    let result = async {
        match kind {
            MediaKind::Audio => send_audio_file(bot, chat_id, &download).await,
            MediaKind::Video => {
                let size = tokio::fs::metadata(&download.path).await?.len();
                tracing::info!(bytes = size, "downloaded file size");

                if !transcode::exceeds_ceiling(size) {
                    return send_video_file(bot, chat_id, &download.path, download.title.as_deref())
                        .await;
                }

                if !transcode::wait_for_file(&download.path).await {
                    return Err(DownloadError::MissingArtifact);
                }

                let out = transcode::compress(&download.path, data.config.ffmpeg_path.as_deref())
                    .await?;
                compressed = Some(out.clone());
                send_video_file(bot, chat_id, &out, download.title.as_deref()).await
            }
        }
    }
    .await;

    // No artifact survives the request, success or failure.
    fetcher::remove_artifact(&download.path).await;
    if let Some(path) = compressed {
        fetcher::remove_artifact(&path).await;
    }

    result
}

async fn send_video_file(
    bot: &Bot,
    chat_id: ChatId,
    path: &Path,
    title: Option<&str>,
) -> Result<(), DownloadError> {
    // Read fully into memory; acceptable under the 50 MiB ceiling.
    let bytes = tokio::fs::read(path).await?;
    let name = attachment_name(title, MediaKind::Video);

    bot.send_video(chat_id, InputFile::memory(bytes).file_name(name))
        .caption("Here's your video!")
        .supports_streaming(true)
        .await?;
    Ok(())
}

async fn send_audio_file(bot: &Bot, chat_id: ChatId, download: &Download) -> Result<(), DownloadError> {
    let bytes = tokio::fs::read(&download.path).await?;
    let name = attachment_name(download.title.as_deref(), MediaKind::Audio);

    bot.send_audio(chat_id, InputFile::memory(bytes).file_name(name))
        .caption("Here's your audio!")
        .await?;
    Ok(())
}

/// Delivered filename: metadata title plus kind extension, generic fallback.
pub(crate) fn attachment_name(title: Option<&str>, kind: MediaKind) -> String {
    let base = title
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| kind.default_basename());
    format!("{base}.{}", kind.extension())
}
