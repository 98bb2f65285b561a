//! Agent chat use case.
//!
//! Keeps a live thread list for the active agent and a live message list
//! for the selected thread, and runs the send saga.
//!
//! # Module Structure
//!
//! - `saga`: Send steps, outcomes and the observable phase
//! - `view`: The `ChatView` projection

mod saga;
mod view;

pub use saga::{ChatPhase, SendOutcome, SendStep, SkipReason};
pub use view::{ChatView, ViewMode};

use crate::busy::BusyGuard;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;
use tokio::sync::{RwLock, watch};
use trinity_core::agent::AgentId;
use trinity_core::chat::{Message, MessageRole, Thread, thread_title_for};
use trinity_core::error::{Result, TrinityError};
use trinity_core::session::Session;
use trinity_core::store::{CollectionSubscription, Direction, DocumentStore, Query, Write, paths};
use trinity_interaction::LanguageModelClient;
use view::decode_all;

/// Threads shown per agent.
pub const THREAD_LIST_LIMIT: usize = 20;
/// Messages shown per thread.
pub const MESSAGE_LIMIT: usize = 100;

const AWAIT_POLL_INTERVAL: Duration = Duration::from_millis(20);

fn thread_query(agent_id: AgentId) -> Query {
    Query::new()
        .where_eq("agentId", agent_id)
        .order_by("updatedAt", Direction::Descending)
        .limit(THREAD_LIST_LIMIT)
}

fn message_query() -> Query {
    Query::new()
        .order_by("createdAt", Direction::Ascending)
        .limit(MESSAGE_LIMIT)
}

struct ChatState {
    view: ChatView,
    thread_subscription: Option<CollectionSubscription>,
    message_subscription: Option<CollectionSubscription>,
}

impl ChatState {
    /// Applies pending snapshots. Returns whether anything changed.
    fn apply_pending(&mut self) -> bool {
        let mut changed = false;
        if let Some(snapshot) = self
            .thread_subscription
            .as_mut()
            .and_then(|subscription| subscription.try_next())
        {
            self.view.threads = decode_all(&snapshot);
            self.view.loading_threads = false;
            changed = true;
        }
        if let Some(snapshot) = self
            .message_subscription
            .as_mut()
            .and_then(|subscription| subscription.try_next())
        {
            self.view.messages = decode_all(&snapshot);
            self.view.loading_messages = false;
            changed = true;
        }
        changed
    }

    fn drop_thread_subscription(&mut self) {
        if let Some(subscription) = self.thread_subscription.take() {
            subscription.unsubscribe();
        }
    }

    fn drop_message_subscription(&mut self) {
        if let Some(subscription) = self.message_subscription.take() {
            subscription.unsubscribe();
        }
    }
}

/// Raised `sending` flag plus the phase it publishes.
struct SendingGuard<'a> {
    _busy: BusyGuard<'a>,
    phase: &'a watch::Sender<ChatPhase>,
}

impl SendingGuard<'_> {
    fn enter(&self, step: SendStep) {
        tracing::debug!(%step, "Send step");
        self.phase.send_replace(ChatPhase::Sending(step));
    }
}

impl Drop for SendingGuard<'_> {
    fn drop(&mut self) {
        self.phase.send_replace(ChatPhase::Idle);
    }
}

/// Chat with one of the three agents, scoped to a signed-in user.
///
/// All methods take `&self`; share it behind an `Arc` to send from a
/// background task while the view keeps refreshing.
pub struct AgentChat {
    session: Session,
    store: Arc<dyn DocumentStore>,
    responder: LanguageModelClient,
    extra_context: Option<String>,
    state: RwLock<ChatState>,
    sending: AtomicBool,
    phase: watch::Sender<ChatPhase>,
}

impl AgentChat {
    /// Opens the chat on the default agent.
    pub async fn open(
        session: Session,
        store: Arc<dyn DocumentStore>,
        responder: LanguageModelClient,
    ) -> Result<Self> {
        Self::open_for(session, store, responder, AgentId::default()).await
    }

    /// Opens the chat with `agent_id` active and its thread list subscribed.
    pub async fn open_for(
        session: Session,
        store: Arc<dyn DocumentStore>,
        responder: LanguageModelClient,
        agent_id: AgentId,
    ) -> Result<Self> {
        let chat = Self {
            session,
            store,
            responder,
            extra_context: None,
            state: RwLock::new(ChatState {
                view: ChatView::for_agent(agent_id),
                thread_subscription: None,
                message_subscription: None,
            }),
            sending: AtomicBool::new(false),
            phase: watch::channel(ChatPhase::Idle).0,
        };
        chat.select_agent(agent_id).await?;
        Ok(chat)
    }

    /// Extra context appended to the agent's system prompt on every reply.
    pub fn with_extra_context(mut self, context: impl Into<String>) -> Self {
        self.extra_context = Some(context.into());
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Current projection, after applying pending snapshots.
    pub async fn view(&self) -> ChatView {
        let mut state = self.state.write().await;
        state.apply_pending();
        state.view.clone()
    }

    /// Applies pending snapshots. Returns whether the projection changed.
    pub async fn refresh(&self) -> bool {
        self.state.write().await.apply_pending()
    }

    pub fn phase(&self) -> ChatPhase {
        *self.phase.borrow()
    }

    /// Watches phase transitions.
    pub fn watch_phase(&self) -> watch::Receiver<ChatPhase> {
        self.phase.subscribe()
    }

    pub fn is_sending(&self) -> bool {
        self.phase().is_sending()
    }

    pub async fn set_input(&self, text: impl Into<String>) {
        self.state.write().await.view.input = text.into();
    }

    /// Switches agents.
    ///
    /// Both subscriptions are torn down before the new agent's thread list
    /// is opened; the current thread is cleared and the list is shown.
    pub async fn select_agent(&self, agent_id: AgentId) -> Result<()> {
        let mut state = self.state.write().await;
        state.drop_message_subscription();
        state.drop_thread_subscription();

        let input = std::mem::take(&mut state.view.input);
        state.view = ChatView::for_agent(agent_id);
        state.view.input = input;

        let subscription = self
            .store
            .subscribe_collection(&paths::threads(&self.session), thread_query(agent_id))
            .await?;
        state.thread_subscription = Some(subscription);
        state.apply_pending();

        tracing::info!(agent = %agent_id, "Agent selected");
        Ok(())
    }

    /// Creates an empty thread for the active agent and opens it.
    pub async fn start_new_thread(&self) -> Result<String> {
        let agent_id = self.state.read().await.view.agent_id;
        let thread_id = self
            .store
            .create(&paths::threads(&self.session), Thread::new_write(agent_id))
            .await?;
        tracing::info!(agent = %agent_id, thread_id = %thread_id, "Thread created");

        self.select_thread(&thread_id).await?;
        Ok(thread_id)
    }

    /// Opens a thread, replacing the previous message subscription.
    pub async fn select_thread(&self, thread_id: &str) -> Result<()> {
        if thread_id.trim().is_empty() {
            return Err(TrinityError::validation("Thread id must not be empty"));
        }

        let mut state = self.state.write().await;
        state.drop_message_subscription();
        state.view.current_thread_id = Some(thread_id.to_string());
        state.view.messages.clear();
        state.view.mode = ViewMode::Conversation;
        state.view.loading_messages = true;

        let subscription = self
            .store
            .subscribe_collection(&paths::messages(&self.session, thread_id), message_query())
            .await?;
        state.message_subscription = Some(subscription);
        state.apply_pending();
        Ok(())
    }

    /// Goes back to the thread list. The current thread stays subscribed.
    pub async fn show_thread_list(&self) {
        self.state.write().await.view.mode = ViewMode::ThreadList;
    }

    /// Sends whatever is in the input buffer.
    pub async fn submit_input(&self) -> Result<SendOutcome> {
        let text = self.state.read().await.view.input.clone();
        self.send_message(&text).await
    }

    /// Sends `text` to the active agent in the current thread.
    ///
    /// Writes the user message, touches the thread (titling it on the first
    /// message), asks the model for a reply and writes it. Store failures are
    /// logged and reported as [`SendOutcome::Aborted`] naming the failed step.
    ///
    /// "First message" means the message projection was empty when the send
    /// started. The projection only catches up when the store emits, which
    /// for a polling store can be a full poll interval later. A second send
    /// issued before the first user message shows up retitles the thread; wait
    /// for the reply with [`AgentChat::await_message`] to avoid that.
    ///
    /// # Errors
    ///
    /// `TrinityError::Config` when no model credential is configured. This is
    /// checked before anything is written.
    pub async fn send_message(&self, text: &str) -> Result<SendOutcome> {
        if text.trim().is_empty() {
            return Ok(SendOutcome::Skipped(SkipReason::EmptyText));
        }

        let (agent_id, thread_id, history) = {
            let mut state = self.state.write().await;
            state.apply_pending();
            match state.view.current_thread_id.clone() {
                Some(thread_id) => (state.view.agent_id, thread_id, state.view.messages.clone()),
                None => return Ok(SendOutcome::Skipped(SkipReason::NoThread)),
            }
        };

        let Some(busy) = BusyGuard::try_acquire(&self.sending) else {
            tracing::debug!(thread_id = %thread_id, "Send dropped while another is running");
            return Ok(SendOutcome::Skipped(SkipReason::AlreadySending));
        };
        let guard = SendingGuard {
            _busy: busy,
            phase: &self.phase,
        };

        self.responder.ensure_configured()?;
        self.state.write().await.view.input.clear();

        let messages_path = paths::messages(&self.session, &thread_id);
        let thread_path = paths::thread(&self.session, &thread_id);

        guard.enter(SendStep::WriteUserMessage);
        let user_message_id = match self
            .store
            .create(&messages_path, Message::new_write(MessageRole::User, text))
            .await
        {
            Ok(id) => id,
            Err(err) => return Ok(abort(SendStep::WriteUserMessage, &thread_id, err)),
        };

        guard.enter(SendStep::TouchThread);
        let touch = if history.is_empty() {
            Write::new()
                .set("title", thread_title_for(text))
                .server_timestamp("updatedAt")
        } else {
            Write::new().server_timestamp("updatedAt")
        };
        if let Err(err) = self.store.update(&thread_path, touch).await {
            return Ok(abort(SendStep::TouchThread, &thread_id, err));
        }

        guard.enter(SendStep::GenerateReply);
        let reply = match self
            .responder
            .complete(agent_id, text, &history, self.extra_context.as_deref())
            .await
        {
            Ok(reply) => reply,
            Err(err) => return Ok(abort(SendStep::GenerateReply, &thread_id, err)),
        };

        guard.enter(SendStep::WriteAssistantMessage);
        let assistant_message_id = match self
            .store
            .create(&messages_path, Message::new_write(MessageRole::Assistant, &reply))
            .await
        {
            Ok(id) => id,
            Err(err) => return Ok(abort(SendStep::WriteAssistantMessage, &thread_id, err)),
        };

        tracing::info!(agent = %agent_id, thread_id = %thread_id, "Exchange stored");
        Ok(SendOutcome::Completed {
            user_message_id,
            assistant_message_id,
        })
    }

    /// Waits until a message with `message_id` shows up in the projection.
    pub async fn await_message(&self, message_id: &str, timeout: Duration) -> Result<Message> {
        let wait = async {
            loop {
                {
                    let mut state = self.state.write().await;
                    state.apply_pending();
                    if let Some(message) = state
                        .view
                        .messages
                        .iter()
                        .find(|message| message.id == message_id)
                    {
                        return message.clone();
                    }
                }
                tokio::time::sleep(AWAIT_POLL_INTERVAL).await;
            }
        };
        tokio::time::timeout(timeout, wait)
            .await
            .map_err(|_| TrinityError::not_found("message", message_id))
    }

    /// Ends both subscriptions. The view keeps its last projection.
    pub async fn close(&self) {
        let mut state = self.state.write().await;
        state.drop_message_subscription();
        state.drop_thread_subscription();
        tracing::debug!("Chat subscriptions closed");
    }
}

fn abort(step: SendStep, thread_id: &str, err: TrinityError) -> SendOutcome {
    tracing::error!(%step, thread_id, error = %err, "Send aborted");
    SendOutcome::Aborted {
        step,
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use trinity_infrastructure::InMemoryDocumentStore;
    use trinity_interaction::{GenerateRequest, GenerativeBackend};

    struct EchoBackend;

    #[async_trait]
    impl GenerativeBackend for EchoBackend {
        fn model(&self) -> &str {
            "echo"
        }

        async fn generate(&self, request: &GenerateRequest) -> Result<Option<String>> {
            Ok(request.contents.last().map(|turn| format!("echo: {}", turn.text)))
        }
    }

    async fn open_chat(store: &InMemoryDocumentStore) -> AgentChat {
        AgentChat::open(
            Session::new("u1", "u1@example.com"),
            Arc::new(store.clone()),
            LanguageModelClient::new(Arc::new(EchoBackend)),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_open_defaults_to_pillar_thread_list() {
        let store = InMemoryDocumentStore::new();
        let chat = open_chat(&store).await;

        let view = chat.view().await;
        assert_eq!(view.agent_id, AgentId::Pillar);
        assert_eq!(view.mode, ViewMode::ThreadList);
        assert!(!view.loading_threads);
        assert!(view.threads.is_empty());
        assert_eq!(store.active_listener_count(), 1);
    }

    #[tokio::test]
    async fn test_send_without_thread_is_skipped() {
        let store = InMemoryDocumentStore::new();
        let chat = open_chat(&store).await;

        let outcome = chat.send_message("hello").await.unwrap();
        assert_eq!(outcome, SendOutcome::Skipped(SkipReason::NoThread));
    }

    #[tokio::test]
    async fn test_submit_input_clears_buffer() {
        let store = InMemoryDocumentStore::new();
        let chat = open_chat(&store).await;
        chat.start_new_thread().await.unwrap();

        chat.set_input("What is my first move?").await;
        let outcome = chat.submit_input().await.unwrap();

        assert!(outcome.is_completed());
        assert_eq!(chat.view().await.input, "");
        assert_eq!(chat.phase(), ChatPhase::Idle);
    }

    #[tokio::test]
    async fn test_show_thread_list_keeps_current_thread() {
        let store = InMemoryDocumentStore::new();
        let chat = open_chat(&store).await;
        let thread_id = chat.start_new_thread().await.unwrap();
        assert_eq!(chat.view().await.mode, ViewMode::Conversation);

        chat.show_thread_list().await;
        let view = chat.view().await;
        assert_eq!(view.mode, ViewMode::ThreadList);
        assert_eq!(view.current_thread_id.as_deref(), Some(thread_id.as_str()));
        assert_eq!(view.current_thread().map(|t| t.id.as_str()), Some(thread_id.as_str()));
    }

    #[tokio::test]
    async fn test_close_releases_listeners() {
        let store = InMemoryDocumentStore::new();
        let chat = open_chat(&store).await;
        chat.start_new_thread().await.unwrap();
        assert_eq!(store.active_listener_count(), 2);

        chat.close().await;
        assert_eq!(store.active_listener_count(), 0);
    }
}
