//! Lottery state machine and participation handling.
//!
//! `LotteryService` owns the gate registry and the deletion scheduler and
//! drives every transition through the repository and gateway traits.
//! Transitions run while holding the gate registry lock, which is what keeps
//! gate (de)registration and status changes for a chat consistent.

use std::sync::Arc;

use chrono::Utc;
use teloxide::types::{ChatId, MessageId, UserId};
use tracing::{debug, info, warn};

use crate::bot::gateway::{GatewayError, MessagingGateway};
use crate::database::models::{Lottery, LotteryStatus, NewLottery, Participant, DEFAULT_TITLE};
use crate::database::repository::{LotteryRepository, ParticipantRepository, StoreError};
use crate::lottery::draw::{assign_prizes, pick_winners, resolve_winner_count};
use crate::lottery::error::{LotteryError, LotteryResult};
use crate::lottery::format;
use crate::lottery::gate::{GateKey, GateRegistry, GateTable, ParticipationGate};
use crate::lottery::scheduler::{DeletionScheduler, JOIN_MESSAGE_TTL, NOTICE_TTL, WINNER_ANNOUNCEMENT_TTL};
use crate::lottery::settings::{LotterySetting, ManageAction, SettingError};
use crate::utils::markdown::{bold, escape_markdown};
use crate::utils::validation::validate_lottery_title;

/// `/create` issued in a group chat
#[derive(Debug, Clone)]
pub struct CreateRequest {
    pub chat_id: i64,
    pub chat_title: String,
    pub command_message_id: MessageId,
    pub creator_id: i64,
    pub creator_username: Option<String>,
    pub title: Option<String>,
}

/// A group text message that may be a join attempt
#[derive(Debug, Clone)]
pub struct JoinRequest {
    pub chat_id: i64,
    pub message_id: MessageId,
    pub user_id: i64,
    pub user_name: String,
    pub text: String,
}

#[derive(Debug, Clone)]
pub enum JoinOutcome {
    /// No gate of the chat matched the text
    NoGate,
    /// The gate matched but the chat has no running lottery
    NoRunningLottery,
    /// Same user and name already joined this lottery
    AlreadyJoined,
    Joined {
        lottery: Lottery,
        participants: usize,
        auto_drawn: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrizeClaim {
    pub title: String,
    pub prize: String,
}

pub struct LotteryService<S, G> {
    store: Arc<S>,
    gateway: Arc<G>,
    gates: GateRegistry,
    deletions: DeletionScheduler<G>,
}

impl<S, G> LotteryService<S, G>
where
    S: LotteryRepository + ParticipantRepository,
    G: MessagingGateway,
{
    pub fn new(store: Arc<S>, gateway: Arc<G>) -> Self {
        Self {
            store,
            deletions: DeletionScheduler::new(gateway.clone()),
            gateway,
            gates: GateRegistry::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn gates(&self) -> &GateRegistry {
        &self.gates
    }

    pub fn deletions(&self) -> &DeletionScheduler<G> {
        &self.deletions
    }

    /// Creates a paused lottery for a group and sends the creator the setup
    /// instructions in private.
    pub async fn create(&self, request: CreateRequest) -> LotteryResult<Lottery> {
        let chat = ChatId(request.chat_id);

        if let Some(existing) = self.store.find_active_by_chat(request.chat_id).await? {
            self.point_to_existing(&existing).await;
            return Err(LotteryError::AlreadyActive {
                message_id: existing.status_message(),
            });
        }

        if request.creator_username.as_deref().map_or(true, str::is_empty) {
            return Err(LotteryError::MissingUsername);
        }
        if !self
            .gateway
            .is_chat_admin(chat, UserId(request.creator_id as u64))
            .await?
        {
            return Err(LotteryError::NotGroupAdmin);
        }

        let bot = self.gateway.bot_identity().await?;
        if !self.gateway.is_chat_admin(chat, bot.user_id).await? {
            return Err(LotteryError::BotNotAdmin);
        }

        let title = request
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_TITLE)
            .to_string();
        validate_lottery_title(&title)
            .map_err(|e| SettingError::InvalidText(e.to_string()))?;

        let notice = self
            .gateway
            .send_message(chat, format::created_notice(&bot.username), None)
            .await?;
        self.deletions.schedule(chat, request.command_message_id, JOIN_MESSAGE_TTL);

        let created = self
            .store
            .create_lottery(NewLottery {
                chat_id: request.chat_id,
                message_id: i64::from(notice.0),
                creator_id: request.creator_id,
                title,
            })
            .await;

        let lottery = match created {
            Ok(lottery) => lottery,
            Err(StoreError::Conflict) => {
                // Lost a race against another /create in the same chat
                self.delete_quietly(chat, notice).await;
                let existing = self
                    .store
                    .find_active_by_chat(request.chat_id)
                    .await?
                    .ok_or(LotteryError::NotFound)?;
                return Err(LotteryError::AlreadyActive {
                    message_id: existing.status_message(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        info!("Lottery {} created in chat {} by {}", lottery.id, lottery.chat_id, lottery.creator_id);

        let invite_link = match self.gateway.invite_link(chat).await {
            Ok(link) => link,
            Err(e) => {
                warn!("Could not export invite link for chat {}: {}", chat.0, e);
                None
            }
        };
        let setup = format::setup_message(&lottery, &request.chat_title, invite_link.as_deref());
        if let Err(e) = self
            .gateway
            .send_message(ChatId(request.creator_id), setup, None)
            .await
        {
            warn!("Could not send setup message to user {}: {}", request.creator_id, e);
        }

        Ok(lottery)
    }

    /// The unfinished lottery an operator manages from the private chat.
    pub async fn current_lottery(&self, operator_id: i64) -> LotteryResult<Lottery> {
        self.store
            .find_active_by_creator(operator_id)
            .await?
            .ok_or(LotteryError::NotFound)
    }

    /// Applies a `/set` mutation; only paused lotteries can be changed.
    pub async fn apply_setting(&self, operator_id: i64, setting: &LotterySetting) -> LotteryResult<Lottery> {
        let _gates = self.gates.lock().await;
        let lottery = self.current_lottery(operator_id).await?;
        if lottery.status != LotteryStatus::Paused {
            return Err(LotteryError::NotPaused);
        }

        self.store.apply_setting(lottery.id, setting).await?;
        debug!("Lottery {} {} updated", lottery.id, setting.property());
        self.reload(lottery.id).await
    }

    /// Runs a `/manage` sub-command. Returns `None` once the lottery is gone.
    pub async fn manage(&self, operator_id: i64, action: ManageAction) -> LotteryResult<Option<Lottery>> {
        let mut gates = self.gates.lock().await;
        let lottery = self.current_lottery(operator_id).await?;
        let key = GateKey {
            chat_id: lottery.chat_id,
            operator_id,
        };

        match action {
            ManageAction::Start => {
                if !gates.contains(&key) {
                    let gate = ParticipationGate::new(lottery.id, &lottery.password)
                        .map_err(|e| LotteryError::Integrity(e.to_string()))?;
                    gates.register(key, gate);
                }
                self.start_with(lottery).await.map(Some)
            }
            ManageAction::Pause => {
                gates.deregister(&key);
                self.pause_with(lottery).await.map(Some)
            }
            ManageAction::Cancel => {
                self.cancel_with(&mut gates, lottery).await?;
                Ok(None)
            }
            ManageAction::Draw => self.draw_with(&mut gates, lottery.id).await.map(Some),
        }
    }

    /// Draws a lottery by id. Drawing a finished lottery changes nothing.
    pub async fn draw_lottery(&self, lottery_id: i64) -> LotteryResult<Lottery> {
        let mut gates = self.gates.lock().await;
        self.draw_with(&mut gates, lottery_id).await
    }

    /// Cancels a lottery by id. Returns false when it had already finished.
    pub async fn cancel_lottery(&self, lottery_id: i64) -> LotteryResult<bool> {
        let mut gates = self.gates.lock().await;
        let lottery = self.reload(lottery_id).await?;
        self.cancel_with(&mut gates, lottery).await
    }

    async fn start_with(&self, lottery: Lottery) -> LotteryResult<Lottery> {
        if lottery.status == LotteryStatus::Finished {
            return Ok(lottery);
        }

        self.store.update_status(lottery.id, LotteryStatus::Running).await?;
        let mut lottery = self.reload(lottery.id).await?;
        let participants = self.store.list_participants(lottery.id).await?;

        let text = format::status_announcement(&lottery, &participants);
        let message_id = self.publish_status(&mut lottery, text).await?;
        if let Err(e) = self.gateway.pin_message(lottery.chat(), message_id).await {
            warn!("Could not pin status message of lottery {}: {}", lottery.id, e);
        }

        info!("Lottery {} started", lottery.id);
        Ok(lottery)
    }

    async fn pause_with(&self, lottery: Lottery) -> LotteryResult<Lottery> {
        if lottery.status == LotteryStatus::Finished {
            return Ok(lottery);
        }
        let already_paused = lottery.status == LotteryStatus::Paused;

        self.store.update_status(lottery.id, LotteryStatus::Paused).await?;
        let mut lottery = self.reload(lottery.id).await?;
        let participants = self.store.list_participants(lottery.id).await?;

        let text = format::status_announcement(&lottery, &participants);
        let message_id = self.publish_status(&mut lottery, text).await?;

        if !already_paused {
            let notice = bold("Lottery paused, this message will be deleted in 30 seconds");
            self.send_transient(lottery.chat(), notice, Some(message_id), NOTICE_TTL)
                .await;
            info!("Lottery {} paused", lottery.id);
        }
        Ok(lottery)
    }

    async fn draw_with(&self, gates: &mut GateTable, lottery_id: i64) -> LotteryResult<Lottery> {
        let lottery = self.reload(lottery_id).await?;
        if lottery.status == LotteryStatus::Finished {
            return Ok(lottery);
        }
        let participants = self.store.list_participants(lottery.id).await?;

        let count = resolve_winner_count(&lottery.winner_people, participants.len());
        let winners = {
            let mut rng = rand::thread_rng();
            pick_winners(&participants, count, &mut rng)
        };
        let prizes: Vec<(i64, String)> = assign_prizes(&lottery, winners.clone())
            .into_iter()
            .map(|(winner, prize)| (winner.id, prize))
            .collect();

        self.store.finish_with_prizes(lottery.id, &prizes).await?;
        gates.deregister_chat(lottery.chat_id);

        let mut lottery = self.reload(lottery.id).await?;
        info!(
            "Lottery {} drawn: {} winners out of {} participants",
            lottery.id,
            winners.len(),
            participants.len()
        );

        match self.announce_winners(&mut lottery, &participants, &winners).await {
            Ok(message_id) => {
                self.deletions
                    .schedule(lottery.chat(), message_id, WINNER_ANNOUNCEMENT_TTL);
            }
            Err(e) => warn!("Could not announce winners of lottery {}: {}", lottery.id, e),
        }
        Ok(lottery)
    }

    async fn announce_winners(
        &self,
        lottery: &mut Lottery,
        participants: &[Participant],
        winners: &[Participant],
    ) -> LotteryResult<MessageId> {
        let bot = self.gateway.bot_identity().await?;
        let text = format::winner_announcement(lottery, participants, winners, &bot.username);
        self.publish_status(lottery, text).await
    }

    async fn cancel_with(&self, gates: &mut GateTable, lottery: Lottery) -> LotteryResult<bool> {
        if lottery.status == LotteryStatus::Finished {
            return Ok(false);
        }
        self.store.delete_lottery(lottery.id).await?;
        gates.deregister_chat(lottery.chat_id);
        info!("Lottery {} cancelled", lottery.id);

        let mut lottery = lottery;
        lottery.status = LotteryStatus::Finished;
        let text = format::cancelled_announcement(&lottery);
        let message_id = match self.publish_status(&mut lottery, text).await {
            Ok(message_id) => message_id,
            Err(e) => {
                warn!("Could not announce cancellation of lottery {}: {}", lottery.id, e);
                return Ok(true);
            }
        };
        if let Err(e) = self.gateway.unpin_message(lottery.chat(), message_id).await {
            debug!("Could not unpin status message of lottery {}: {}", lottery.id, e);
        }

        let notice = bold("Lottery cancelled, this message will be deleted in 30 seconds");
        self.send_transient(lottery.chat(), notice, Some(message_id), NOTICE_TTL)
            .await;
        self.deletions.schedule(lottery.chat(), message_id, NOTICE_TTL);
        Ok(true)
    }

    /// Handles a group message: registers the sender when it matches a live
    /// gate and fires the automatic draw once the threshold is reached. The
    /// join message and the reply are cleaned up whatever the outcome.
    pub async fn join(&self, request: JoinRequest) -> LotteryResult<JoinOutcome> {
        if self
            .gates
            .find_match(request.chat_id, &request.text)
            .await
            .is_none()
        {
            return Ok(JoinOutcome::NoGate);
        }

        let chat = ChatId(request.chat_id);
        let mut reply = None;
        let outcome = self.admit(&request, &mut reply).await;

        self.deletions.schedule(chat, request.message_id, JOIN_MESSAGE_TTL);
        if let Some(reply) = reply {
            self.deletions.schedule(chat, reply, JOIN_MESSAGE_TTL);
        }
        outcome
    }

    async fn admit(&self, request: &JoinRequest, reply: &mut Option<MessageId>) -> LotteryResult<JoinOutcome> {
        let chat = ChatId(request.chat_id);

        let Some(mut lottery) = self.store.find_running_by_chat(request.chat_id).await? else {
            *reply = self
                .reply(chat, escape_markdown("Service error, please contact the admin"), request.message_id)
                .await;
            return Ok(JoinOutcome::NoRunningLottery);
        };

        match self
            .store
            .add_participant(lottery.id, request.user_id, &request.user_name)
            .await
        {
            Ok(_) => {}
            Err(StoreError::Conflict) => {
                debug!("User {} already joined lottery {}", request.user_id, lottery.id);
                return Ok(JoinOutcome::AlreadyJoined);
            }
            Err(e) => return Err(e.into()),
        }

        *reply = self
            .reply(
                chat,
                escape_markdown(&format!("{} joined the lottery", request.user_name)),
                request.message_id,
            )
            .await;

        let participants = self.store.list_participants(lottery.id).await?;
        let text = format::status_announcement(&lottery, &participants);
        if let Err(e) = self.publish_status(&mut lottery, text).await {
            warn!("Could not refresh status of lottery {}: {}", lottery.id, e);
        }

        let joined = participants.len();
        if lottery.drawn_people > 0 && joined as i64 >= lottery.drawn_people {
            info!("Lottery {} reached {} participants, drawing", lottery.id, joined);
            let drawn = self.draw_lottery(lottery.id).await?;
            return Ok(JoinOutcome::Joined {
                lottery: drawn,
                participants: joined,
                auto_drawn: true,
            });
        }

        Ok(JoinOutcome::Joined {
            lottery,
            participants: joined,
            auto_drawn: false,
        })
    }

    /// Latest prize won by a user, with the title of its lottery.
    pub async fn claim_prize(&self, user_id: i64) -> LotteryResult<Option<PrizeClaim>> {
        let Some(win) = self.store.find_latest_win(user_id).await? else {
            return Ok(None);
        };
        let lottery = self
            .store
            .find_lottery(win.lottery_id)
            .await?
            .ok_or(LotteryError::NotFound)?;

        Ok(Some(PrizeClaim {
            title: lottery.title,
            prize: win.prize.unwrap_or_default(),
        }))
    }

    /// Removes lotteries that finished longer than `retention` ago.
    pub async fn purge_finished(&self, retention: chrono::Duration) -> LotteryResult<u64> {
        let cutoff = (Utc::now() - retention).to_rfc3339();
        Ok(self.store.purge_finished_before(&cutoff).await?)
    }

    async fn reload(&self, lottery_id: i64) -> LotteryResult<Lottery> {
        self.store
            .find_lottery(lottery_id)
            .await?
            .ok_or(LotteryError::NotFound)
    }

    /// Writes `text` into the lottery's status message. An unchanged message
    /// counts as success; a deleted one is sent again and its id stored.
    async fn publish_status(&self, lottery: &mut Lottery, text: String) -> LotteryResult<MessageId> {
        let chat = lottery.chat();
        match self
            .gateway
            .edit_message(chat, lottery.status_message(), text.clone())
            .await
        {
            Ok(()) | Err(GatewayError::NotModified) => Ok(lottery.status_message()),
            Err(GatewayError::NotFound) => {
                let message_id = self.gateway.send_message(chat, text, None).await?;
                self.store
                    .update_message_id(lottery.id, i64::from(message_id.0))
                    .await?;
                lottery.message_id = i64::from(message_id.0);
                debug!("Status message of lottery {} recreated as {}", lottery.id, message_id.0);
                Ok(message_id)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn point_to_existing(&self, existing: &Lottery) {
        let notice = bold("There is an unfinished lottery");
        let chat = existing.chat();
        let sent = match self
            .gateway
            .send_message(chat, notice.clone(), Some(existing.status_message()))
            .await
        {
            Err(GatewayError::NotFound) => self.gateway.send_message(chat, notice, None).await,
            other => other,
        };
        match sent {
            Ok(message_id) => {
                self.deletions.schedule(chat, message_id, JOIN_MESSAGE_TTL);
            }
            Err(e) => warn!("Could not point chat {} to its lottery: {}", chat.0, e),
        }
    }

    async fn reply(&self, chat: ChatId, text: String, reply_to: MessageId) -> Option<MessageId> {
        match self.gateway.send_message(chat, text, Some(reply_to)).await {
            Ok(message_id) => Some(message_id),
            Err(e) => {
                debug!("Could not reply in chat {}: {}", chat.0, e);
                None
            }
        }
    }

    async fn send_transient(&self, chat: ChatId, text: String, reply_to: Option<MessageId>, ttl: std::time::Duration) {
        match self.gateway.send_message(chat, text, reply_to).await {
            Ok(message_id) => {
                self.deletions.schedule(chat, message_id, ttl);
            }
            Err(e) => warn!("Could not send notice to chat {}: {}", chat.0, e),
        }
    }

    async fn delete_quietly(&self, chat: ChatId, message_id: MessageId) {
        if let Err(e) = self.gateway.delete_message(chat, message_id).await {
            debug!("Could not delete message {} in chat {}: {}", message_id.0, chat.0, e);
        }
    }
}
