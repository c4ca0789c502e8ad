// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Update routing: `/lots` command, menu buttons and typed lot ids.

use super::render::keyboard;
use super::state::{InputState, InputStates};
use crate::account::LotAccount;
use crate::config::Config;
use crate::controller::{LotController, MenuAction};
use crate::menu::{self, Callback};
use std::sync::Arc;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::{MessageId, ReplyParameters, User, UserId};
use teloxide::utils::command::BotCommands;
use teloxide::RequestError;
use tracing::{debug, info, warn};

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    #[command(description = "lot management")]
    Lots,
}

/// Shared state injected into every handler.
pub struct BotContext {
    pub controller: LotController<dyn LotAccount>,
    pub states: InputStates,
    pub config: Config,
}

impl BotContext {
    fn is_admin(&self, user: Option<&User>) -> bool {
        let allowed = authorized(&self.config, user.map(|u| u.id));
        if !allowed {
            warn!(
                "🚫 Ignoring update from unauthorized user {:?}",
                user.map(|u| u.id)
            );
        }
        allowed
    }
}

/// Updates without a sender are never accepted.
fn authorized(config: &Config, user: Option<UserId>) -> bool {
    user.is_some_and(|id| config.is_admin(id.0))
}

/// Callback data this bot owns; anything else falls through unanswered.
fn route_callback(data: Option<&str>) -> Option<Callback> {
    data.and_then(Callback::parse)
}

/// Leave input mode after a typed lot id, whatever its outcome.
/// Returns the messages to delete: the operator's message and the prompt.
async fn finish_input(
    states: &InputStates,
    chat: ChatId,
    user: UserId,
    typed: MessageId,
) -> Vec<MessageId> {
    let mut stale = vec![typed];
    if let Some(InputState::AddingLot { prompt }) = states.clear(chat, user).await {
        stale.push(prompt);
    }
    stale
}

/// Cancel pressed: leave input mode and drop the prompt carrying the button.
async fn dismiss(
    states: &InputStates,
    chat: ChatId,
    user: UserId,
    menu_message: MessageId,
) -> Vec<MessageId> {
    states.clear(chat, user).await;
    vec![menu_message]
}

/// Register the bot's command list with Telegram.
pub async fn register_commands(bot: &Bot) -> Result<(), RequestError> {
    bot.set_my_commands(Command::bot_commands()).await?;
    info!("📋 Registered /lots command");
    Ok(())
}

pub fn schema() -> UpdateHandler<RequestError> {
    let messages = Update::filter_message()
        .filter(|msg: Message, ctx: Arc<BotContext>| ctx.is_admin(msg.from.as_ref()))
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(command_handler),
        )
        .branch(dptree::filter_async(is_adding_lot).endpoint(lot_input_handler));

    let callbacks = Update::filter_callback_query()
        .filter(|q: CallbackQuery, ctx: Arc<BotContext>| ctx.is_admin(Some(&q.from)))
        .filter_map(|q: CallbackQuery| route_callback(q.data.as_deref()))
        .endpoint(callback_handler);

    dptree::entry().branch(messages).branch(callbacks)
}

async fn command_handler(bot: Bot, msg: Message, cmd: Command) -> Result<(), RequestError> {
    match cmd {
        Command::Lots => {
            let menu = menu::main_menu();
            bot.send_message(msg.chat.id, menu.text.clone())
                .reply_parameters(ReplyParameters::new(msg.id))
                .reply_markup(keyboard(&menu))
                .await?;
        }
    }
    Ok(())
}

async fn is_adding_lot(msg: Message, ctx: Arc<BotContext>) -> bool {
    let (Some(user), Some(_)) = (msg.from.as_ref(), msg.text()) else {
        return false;
    };
    matches!(
        ctx.states.get(msg.chat.id, user.id).await,
        Some(InputState::AddingLot { .. })
    )
}

async fn lot_input_handler(
    bot: Bot,
    msg: Message,
    ctx: Arc<BotContext>,
) -> Result<(), RequestError> {
    let (Some(user), Some(text)) = (msg.from.as_ref(), msg.text()) else {
        return Ok(());
    };

    let reply = ctx.controller.handle_lot_input(text).await;
    let sent = bot.send_message(msg.chat.id, reply).await;

    for stale in finish_input(&ctx.states, msg.chat.id, user.id, msg.id).await {
        delete_quietly(&bot, msg.chat.id, stale).await;
    }
    sent?;
    Ok(())
}

async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    callback: Callback,
    ctx: Arc<BotContext>,
) -> Result<(), RequestError> {
    debug!("Callback {:?} from {}", callback, q.from.id);
    let reply = ctx.controller.handle_callback(&callback).await;

    let mut answer = bot.answer_callback_query(q.id.clone());
    if let Some(notice) = reply.notice {
        answer = answer.text(notice);
    }
    answer.await?;

    let Some(message) = q.message.as_ref() else {
        return Ok(());
    };
    let chat_id = message.chat().id;

    match reply.action {
        MenuAction::Edit(menu) => {
            let edited = bot
                .edit_message_text(chat_id, message.id(), menu.text.clone())
                .reply_markup(keyboard(&menu))
                .await;
            if let Err(e) = edited {
                warn!("Failed to edit menu message: {}", e);
            }
        }
        MenuAction::Prompt(menu) => {
            let sent = bot
                .send_message(chat_id, menu.text.clone())
                .reply_markup(keyboard(&menu))
                .await?;
            ctx.states
                .set(chat_id, q.from.id, InputState::AddingLot { prompt: sent.id })
                .await;
        }
        MenuAction::Dismiss => {
            for stale in dismiss(&ctx.states, chat_id, q.from.id, message.id()).await {
                delete_quietly(&bot, chat_id, stale).await;
            }
        }
        MenuAction::None => {}
    }
    Ok(())
}

async fn delete_quietly(bot: &Bot, chat_id: ChatId, message_id: MessageId) {
    if let Err(e) = bot.delete_message(chat_id, message_id).await {
        debug!("Could not delete message {}: {}", message_id.0, e);
    }
}
