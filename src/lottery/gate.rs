use regex::Regex;
use std::collections::HashMap;
use tokio::sync::{Mutex, MutexGuard};

/// Prefix a join message must carry right before the password
pub const JOIN_MARKER: &str = "$$";

/// Gates are scoped to the group chat and the operator who started the lottery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GateKey {
    pub chat_id: i64,
    pub operator_id: i64,
}

/// Listener for join messages of one running lottery.
#[derive(Debug, Clone)]
pub struct ParticipationGate {
    pub lottery_id: i64,
    pattern: Regex,
}

impl ParticipationGate {
    pub fn new(lottery_id: i64, password: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(
            "{}{}",
            regex::escape(JOIN_MARKER),
            regex::escape(password)
        ))?;
        Ok(Self { lottery_id, pattern })
    }

    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// Every live gate, keyed by (chat, operator).
#[derive(Debug, Default)]
pub struct GateTable {
    gates: HashMap<GateKey, ParticipationGate>,
}

impl GateTable {
    /// Registers a gate unless one already exists for the key. Returns true
    /// when a new gate was inserted.
    pub fn register(&mut self, key: GateKey, gate: ParticipationGate) -> bool {
        if self.gates.contains_key(&key) {
            return false;
        }
        self.gates.insert(key, gate);
        true
    }

    pub fn deregister(&mut self, key: &GateKey) -> Option<ParticipationGate> {
        self.gates.remove(key)
    }

    /// Drops every gate of a chat, returning how many were removed.
    pub fn deregister_chat(&mut self, chat_id: i64) -> usize {
        let before = self.gates.len();
        self.gates.retain(|key, _| key.chat_id != chat_id);
        before - self.gates.len()
    }

    pub fn contains(&self, key: &GateKey) -> bool {
        self.gates.contains_key(key)
    }

    /// First gate of `chat_id` whose pattern matches `text`.
    pub fn find_match(&self, chat_id: i64, text: &str) -> Option<&ParticipationGate> {
        self.gates
            .iter()
            .filter(|(key, _)| key.chat_id == chat_id)
            .map(|(_, gate)| gate)
            .find(|gate| gate.matches(text))
    }

    pub fn len(&self) -> usize {
        self.gates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }
}

/// Shared registry of participation gates. The lock is also what serializes
/// lottery transitions, so holding the guard across a transition keeps gate
/// registration and the state change atomic.
#[derive(Debug, Default)]
pub struct GateRegistry {
    table: Mutex<GateTable>,
}

impl GateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self) -> MutexGuard<'_, GateTable> {
        self.table.lock().await
    }

    /// Clone of the gate matching a join attempt, if any.
    pub async fn find_match(&self, chat_id: i64, text: &str) -> Option<ParticipationGate> {
        self.table.lock().await.find_match(chat_id, text).cloned()
    }

    pub async fn len(&self) -> usize {
        self.table.lock().await.len()
    }
}

/// Name a participant is listed under: the username, else the non-empty
/// first/last names joined by a space, else an id-based fallback.
pub fn display_name(
    username: Option<&str>,
    first_name: &str,
    last_name: Option<&str>,
    user_id: i64,
) -> String {
    if let Some(username) = username.filter(|u| !u.trim().is_empty()) {
        return username.to_string();
    }

    let full_name = [Some(first_name), last_name]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if full_name.is_empty() {
        format!("U{user_id:x}")
    } else {
        full_name
    }
}
