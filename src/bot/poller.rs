// src/bot/poller.rs
//! Long-polling update loop

use std::sync::Arc;
use teloxide::dispatching::{Dispatcher, UpdateFilterExt};
use teloxide::dptree;
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::requests::ResponseResult;
use teloxide::types::{Document, Message, Update};
use teloxide::update_listeners::Polling;
use tokio::sync::watch;

use super::documents::handle_document;
use super::{BotContext, CommandTable};
use crate::app_log;
use crate::telegram::TelegramClient;
use crate::types::ChatId;

/// Route one inbound message and send the reply, if any.
pub async fn handle_message(
    ctx: &BotContext,
    commands: &CommandTable,
    chat_id: ChatId,
    text: Option<&str>,
    document: Option<&Document>,
) {
    ctx.store.register(chat_id).await;

    let reply = if let Some(document) = document {
        Some(handle_document(ctx, chat_id, document).await)
    } else if let Some(text) = text {
        commands.dispatch(ctx, chat_id, text).await
    } else {
        None
    };

    if let Some(reply) = reply {
        if let Err(e) = ctx
            .notifier
            .messenger()
            .send_text(chat_id, &reply.text, reply.markdown)
            .await
        {
            app_log!(error, "{}", e);
        }
    }
}

async fn on_message(
    msg: Message,
    ctx: BotContext,
    commands: Arc<CommandTable>,
) -> ResponseResult<()> {
    handle_message(
        &ctx,
        &commands,
        ChatId::from(msg.chat.id),
        msg.text(),
        msg.document(),
    )
    .await;
    Ok(())
}

/// Poll for updates until `shutdown` flips to true. Updates from one chat are
/// handled in order.
pub async fn run_polling(
    ctx: BotContext,
    telegram: TelegramClient,
    commands: CommandTable,
    mut shutdown: watch::Receiver<bool>,
) {
    let handler = Update::filter_message().endpoint(on_message);
    let mut dispatcher = Dispatcher::builder(telegram.bot(), handler)
        .dependencies(dptree::deps![ctx, Arc::new(commands)])
        .default_handler(|_| async {})
        .error_handler(LoggingErrorHandler::with_custom_text("Error handling update"))
        .build();

    let token = dispatcher.shutdown_token();
    tokio::spawn(async move {
        while shutdown.changed().await.is_ok() {
            if *shutdown.borrow() {
                break;
            }
        }
        if let Ok(stopped) = token.shutdown() {
            stopped.await;
        }
    });

    let listener = Polling::builder(telegram.bot())
        .timeout(telegram.poll_timeout())
        .build();

    app_log!(info, "Bot polling started");
    dispatcher
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("Telegram polling error"),
        )
        .await;
    app_log!(info, "Bot polling stopped");
}
