#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use lottery_bot::bot::gateway::{BotIdentity, GatewayError, MessagingGateway};
use lottery_bot::database::connection::DatabaseManager;
use lottery_bot::lottery::{CreateRequest, LotteryService};
use teloxide::types::{ChatId, MessageId, UserId};
use tempfile::{tempdir, TempDir};

pub const CHAT_ID: i64 = -1001234567890;
pub const ADMIN_ID: i64 = 42;
pub const BOT_ID: u64 = 999;
pub const BOT_USERNAME: &str = "lottery_test_bot";

#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub text: String,
    pub reply_to: Option<MessageId>,
}

/// In-memory gateway that records every call.
pub struct RecordingGateway {
    next_id: AtomicI32,
    pub sent: Mutex<Vec<SentMessage>>,
    pub edits: Mutex<Vec<(ChatId, MessageId, String)>>,
    pub deleted: Mutex<Vec<(ChatId, MessageId)>>,
    pub pinned: Mutex<Vec<(ChatId, MessageId)>>,
    pub unpinned: Mutex<Vec<(ChatId, MessageId)>>,
    admins: Mutex<HashSet<u64>>,
    missing: Mutex<HashSet<i32>>,
    failing_edits: AtomicBool,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI32::new(100),
            sent: Mutex::new(Vec::new()),
            edits: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
            pinned: Mutex::new(Vec::new()),
            unpinned: Mutex::new(Vec::new()),
            admins: Mutex::new(HashSet::from([BOT_ID])),
            missing: Mutex::new(HashSet::new()),
            failing_edits: AtomicBool::new(false),
        }
    }

    pub fn make_admin(&self, user_id: u64) {
        self.admins.lock().unwrap().insert(user_id);
    }

    pub fn revoke_admin(&self, user_id: u64) {
        self.admins.lock().unwrap().remove(&user_id);
    }

    /// Pretend a message was deleted by someone else.
    pub fn forget(&self, message_id: MessageId) {
        self.missing.lock().unwrap().insert(message_id.0);
    }

    /// Make every edit fail as if Telegram rejected the request.
    pub fn fail_edits(&self, fail: bool) {
        self.failing_edits.store(fail, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, chat_id: i64) -> Vec<SentMessage> {
        self.sent()
            .into_iter()
            .filter(|m| m.chat_id == ChatId(chat_id))
            .collect()
    }

    pub fn edits(&self) -> Vec<(ChatId, MessageId, String)> {
        self.edits.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<(ChatId, MessageId)> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn pinned(&self) -> Vec<(ChatId, MessageId)> {
        self.pinned.lock().unwrap().clone()
    }

    pub fn unpinned(&self) -> Vec<(ChatId, MessageId)> {
        self.unpinned.lock().unwrap().clone()
    }

    fn is_missing(&self, message_id: MessageId) -> bool {
        self.missing.lock().unwrap().contains(&message_id.0)
    }

    /// Current text of a message, following later edits.
    fn current_text(&self, message_id: MessageId) -> Option<String> {
        let edited = self
            .edits
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(_, id, _)| *id == message_id)
            .map(|(_, _, text)| text.clone());
        edited.or_else(|| {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .find(|m| m.message_id == message_id)
                .map(|m| m.text.clone())
        })
    }
}

#[async_trait]
impl MessagingGateway for RecordingGateway {
    async fn send_message(
        &self,
        chat_id: ChatId,
        text: String,
        reply_to: Option<MessageId>,
    ) -> Result<MessageId, GatewayError> {
        let message_id = MessageId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.sent.lock().unwrap().push(SentMessage {
            chat_id,
            message_id,
            text,
            reply_to,
        });
        Ok(message_id)
    }

    async fn edit_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: String,
    ) -> Result<(), GatewayError> {
        if self.failing_edits.load(Ordering::SeqCst) {
            return Err(GatewayError::Api("Bad Request: message can't be edited".to_string()));
        }
        if self.is_missing(message_id) {
            return Err(GatewayError::NotFound);
        }
        if self.current_text(message_id).as_deref() == Some(text.as_str()) {
            return Err(GatewayError::NotModified);
        }
        self.edits.lock().unwrap().push((chat_id, message_id, text));
        Ok(())
    }

    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> Result<(), GatewayError> {
        self.deleted.lock().unwrap().push((chat_id, message_id));
        Ok(())
    }

    async fn pin_message(&self, chat_id: ChatId, message_id: MessageId) -> Result<(), GatewayError> {
        self.pinned.lock().unwrap().push((chat_id, message_id));
        Ok(())
    }

    async fn unpin_message(&self, chat_id: ChatId, message_id: MessageId) -> Result<(), GatewayError> {
        self.unpinned.lock().unwrap().push((chat_id, message_id));
        Ok(())
    }

    async fn is_chat_admin(&self, _chat_id: ChatId, user_id: UserId) -> Result<bool, GatewayError> {
        Ok(self.admins.lock().unwrap().contains(&user_id.0))
    }

    async fn bot_identity(&self) -> Result<BotIdentity, GatewayError> {
        Ok(BotIdentity {
            user_id: UserId(BOT_ID),
            username: BOT_USERNAME.to_string(),
        })
    }

    async fn invite_link(&self, _chat_id: ChatId) -> Result<Option<String>, GatewayError> {
        Ok(Some("https://t.me/+invite".to_string()))
    }
}

pub async fn setup_test_db() -> Result<(DatabaseManager, TempDir)> {
    let temp_dir = tempdir()?;
    let db_path = temp_dir.path().join("test.db");
    let database_url = format!("sqlite:{}", db_path.display());

    let db_manager = DatabaseManager::new(&database_url).await?;
    db_manager.run_migrations().await?;

    Ok((db_manager, temp_dir))
}

pub struct Fixture {
    pub service: Arc<LotteryService<DatabaseManager, RecordingGateway>>,
    pub gateway: Arc<RecordingGateway>,
    pub db: Arc<DatabaseManager>,
    _temp_dir: TempDir,
}

pub async fn fixture() -> Result<Fixture> {
    let (db, temp_dir) = setup_test_db().await?;
    let db = Arc::new(db);
    let gateway = Arc::new(RecordingGateway::new());
    gateway.make_admin(ADMIN_ID as u64);
    let service = Arc::new(LotteryService::new(db.clone(), gateway.clone()));

    Ok(Fixture {
        service,
        gateway,
        db,
        _temp_dir: temp_dir,
    })
}

pub fn create_request(title: Option<&str>) -> CreateRequest {
    CreateRequest {
        chat_id: CHAT_ID,
        chat_title: "Test Group".to_string(),
        command_message_id: MessageId(1),
        creator_id: ADMIN_ID,
        creator_username: Some("admin".to_string()),
        title: title.map(String::from),
    }
}
