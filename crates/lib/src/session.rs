//! # Conversation State & Follow-up Detection
//!
//! Each session keeps a bounded history of turns and the article set that
//! backed the previous answer. A follow-up question ("profundiza en la
//! primera") reuses that stored set instead of searching again, so ordinal
//! references stay stable across turns.
//!
//! Follow-up detection is a declarative rule table (pattern → intent), not
//! control flow: rules are testable on their own and replaceable for other
//! locales without touching the resolution logic.

use crate::types::SearchHit;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub text: String,
}

/// Per-session conversational memory.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Insertion-ordered turns, capped by the store's history cap.
    pub history: Vec<HistoryEntry>,
    /// The scored article set used for the previous answer.
    pub last_context: Vec<SearchHit>,
    last_used: Instant,
}

impl SessionState {
    fn new() -> Self {
        Self {
            history: Vec::new(),
            last_context: Vec::new(),
            last_used: Instant::now(),
        }
    }
}

/// All live sessions, keyed by session id.
///
/// Sessions are created lazily on first update and evicted
/// least-recently-used once the cap is reached, so the map stays bounded
/// however many distinct identities show up over the process lifetime.
pub struct SessionStore {
    sessions: Mutex<HashMap<String, SessionState>>,
    history_cap: usize,
    session_cap: usize,
}

impl SessionStore {
    pub fn new(history_cap: usize, session_cap: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            history_cap,
            session_cap: session_cap.max(1),
        }
    }

    /// Snapshot of a session's stored context; empty for unknown sessions.
    pub fn last_context(&self, session_id: &str) -> Vec<SearchHit> {
        let sessions = self.sessions.lock().expect("session lock poisoned");
        sessions
            .get(session_id)
            .map(|s| s.last_context.clone())
            .unwrap_or_default()
    }

    /// Snapshot of a session's history; empty for unknown sessions.
    pub fn history(&self, session_id: &str) -> Vec<HistoryEntry> {
        let sessions = self.sessions.lock().expect("session lock poisoned");
        sessions
            .get(session_id)
            .map(|s| s.history.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().expect("session lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Records a completed turn: appends the question and answer to the
    /// history (truncating to the cap, oldest first) and replaces the
    /// stored context with the set actually used this turn.
    ///
    /// An empty `used_context` leaves the previous context in place, so a
    /// fruitless search never wipes what a follow-up could still refer to.
    pub fn update(
        &self,
        session_id: &str,
        question: &str,
        answer: &str,
        used_context: Vec<SearchHit>,
    ) {
        let mut sessions = self.sessions.lock().expect("session lock poisoned");

        let session = sessions
            .entry(session_id.to_string())
            .or_insert_with(SessionState::new);
        session.last_used = Instant::now();
        session.history.push(HistoryEntry {
            role: Role::User,
            text: question.to_string(),
        });
        session.history.push(HistoryEntry {
            role: Role::Assistant,
            text: answer.to_string(),
        });
        if session.history.len() > self.history_cap {
            let excess = session.history.len() - self.history_cap;
            session.history.drain(..excess);
        }
        if !used_context.is_empty() {
            session.last_context = used_context;
        }

        if sessions.len() > self.session_cap {
            if let Some(oldest) = sessions
                .iter()
                .min_by_key(|(_, s)| s.last_used)
                .map(|(id, _)| id.clone())
            {
                debug!("Evicting least-recently-used session '{oldest}'");
                sessions.remove(&oldest);
            }
        }
    }
}

/// The follow-up detection rule table.
///
/// A question is a follow-up when any pattern matches its lower-cased
/// text. The default table covers Spanish ordinal references ("sobre la
/// primera", "en la 2"), explicit item mentions ("noticia 3"), deepening
/// cues ("profundiza", "amplía", "más sobre", "cuéntame más") and
/// continuation cues ("qué pasó con", a leading "y la"/"y el").
#[derive(Debug, Clone)]
pub struct FollowUpRules {
    patterns: Vec<Regex>,
}

impl FollowUpRules {
    pub fn new(patterns: &[&str]) -> Result<Self, regex::Error> {
        Ok(Self {
            patterns: patterns
                .iter()
                .map(|p| Regex::new(p))
                .collect::<Result<_, _>>()?,
        })
    }

    pub fn is_follow_up(&self, question: &str) -> bool {
        let question = question.to_lowercase();
        self.patterns.iter().any(|re| re.is_match(&question))
    }
}

impl Default for FollowUpRules {
    fn default() -> Self {
        // Accented and unaccented spellings both occur in real questions.
        Self::new(&[
            r"\b(sobre|en|de) la (\d+|primera|segunda|tercera)\b",
            r"\b(noticia|nota|art[ií]culo)\s+(\d+|uno|dos|tres|primera|segunda|tercera)\b",
            r"\bprofundiza\b",
            r"\bampl[ií]a\b",
            r"\bm[aá]s sobre\b",
            r"\bcu[eé]ntame m[aá]s\b",
            r"\bqu[eé] pas[oó] con\b",
            r"^¿?y (la|el)\b",
        ])
        .expect("built-in follow-up patterns must compile")
    }
}
