use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info};

use crate::catalog::{Catalog, REFERENCE_DOCUMENT_ID};
use crate::chat::{ChatAssistant, ChatDelays, ChatEvent};
use crate::conference::{ConversationPlayer, PlayerConfig};
use crate::config::SimulationTiming;
use crate::error::ValidationError;
use crate::events::SimEvent;
use crate::models::{ChatMessage, Document, DraftEmail, Notification, SentEmail};
use crate::notifications::{NotificationSequencer, SequencerConfig, SequencerEvent, SequencerMode};
use crate::route::Route;
use crate::store::{send_draft, DemoFlagStore, DraftStore, JsonFileStore, MemoryStore};

pub type BoxedStore<R> = Box<dyn DraftStore<R> + Send>;

/// The stores a session reads and writes
pub struct SessionStores {
    pub documents: BoxedStore<Document>,
    pub drafts: BoxedStore<DraftEmail>,
    pub sent: BoxedStore<SentEmail>,
    pub flags: DemoFlagStore,
}

impl SessionStores {
    /// File-backed stores under `data_dir`
    pub fn open(data_dir: &Path) -> Self {
        Self {
            documents: Box::new(JsonFileStore::<Document>::open(data_dir)),
            drafts: Box::new(JsonFileStore::<DraftEmail>::open(data_dir)),
            sent: Box::new(JsonFileStore::<SentEmail>::open(data_dir)),
            flags: DemoFlagStore::open(data_dir),
        }
    }

    pub fn in_memory(flags: DemoFlagStore) -> Self {
        Self {
            documents: Box::new(MemoryStore::<Document>::new()),
            drafts: Box::new(MemoryStore::<DraftEmail>::new()),
            sent: Box::new(MemoryStore::<SentEmail>::new()),
            flags,
        }
    }
}

/// One participant's simulated workplace: conference, notifications, chat
/// and local documents, driven by a single `tick`.
pub struct ParticipantSession {
    catalog: Catalog,
    timing: SimulationTiming,
    stores: SessionStores,
    player: Option<ConversationPlayer>,
    sequencer: NotificationSequencer,
    chat: ChatAssistant,
    route: Option<Route>,
}

impl ParticipantSession {
    /// The sequencer mode is fixed here from the persisted demo flags
    pub fn new(catalog: Catalog, timing: SimulationTiming, stores: SessionStores) -> Self {
        let chat = ChatAssistant::new(catalog.chat.clone(), ChatDelays::from_timing(&timing));
        Self::with_chat(catalog, timing, stores, chat)
    }

    /// Like `new` with a seeded assistant, for reproducible fallback replies
    pub fn with_seed(catalog: Catalog, timing: SimulationTiming, stores: SessionStores, seed: u64) -> Self {
        let chat = ChatAssistant::with_seed(catalog.chat.clone(), ChatDelays::from_timing(&timing), seed);
        Self::with_chat(catalog, timing, stores, chat)
    }

    fn with_chat(
        catalog: Catalog,
        timing: SimulationTiming,
        stores: SessionStores,
        chat: ChatAssistant,
    ) -> Self {
        let mode = stores.flags.sequencer_mode();
        info!(?mode, "participant session created");
        let sequencer = NotificationSequencer::new(
            SequencerConfig::from_timing(&timing, mode),
            catalog.notification_pool.clone(),
            catalog.demo_sequence.clone(),
        );
        Self {
            catalog,
            timing,
            stores,
            player: None,
            sequencer,
            chat,
            route: None,
        }
    }

    /// Arm the notification timers
    pub fn start(&mut self, now: Duration) {
        self.sequencer.start(now);
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    // ===== Conference =====

    /// Mount the conference view. Mounting again restarts playback.
    pub fn mount_conference(&mut self, now: Duration) -> Vec<SimEvent> {
        if let Some(mut old) = self.player.take() {
            old.teardown();
        }
        let mut player = ConversationPlayer::new(
            self.catalog.script.clone(),
            self.catalog.roster.clone(),
            PlayerConfig::from_timing(&self.timing),
        );
        let events = player.start(now);
        self.player = Some(player);
        events.into_iter().map(SimEvent::Conference).collect()
    }

    pub fn unmount_conference(&mut self) {
        if let Some(mut player) = self.player.take() {
            player.teardown();
        }
    }

    pub fn player(&self) -> Option<&ConversationPlayer> {
        self.player.as_ref()
    }

    // ===== Navigation =====

    pub fn navigate(&mut self, path: &str, now: Duration) -> Vec<SimEvent> {
        let route = Route::parse(path);
        debug!(path = %route.path(), "navigate");
        if let Some(doc_id) = route.document_id() {
            self.stores.flags.record_document_view(doc_id, REFERENCE_DOCUMENT_ID);
        }
        let events = self
            .sequencer
            .on_navigate(route.path(), now)
            .into_iter()
            .map(SimEvent::NotificationRaised)
            .collect();
        self.route = Some(route);
        events
    }

    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    // ===== Notifications =====

    pub fn notifications(&self) -> &NotificationSequencer {
        &self.sequencer
    }

    pub fn notifications_mut(&mut self) -> &mut NotificationSequencer {
        &mut self.sequencer
    }

    /// View the popup's current notification
    pub fn view_notification(&mut self, now: Duration) -> Option<Notification> {
        let viewed = self.sequencer.view(now)?;
        self.remember_demo_view(&viewed);
        Some(viewed)
    }

    pub fn mark_notification_read(&mut self, id: &str, now: Duration) -> Option<Notification> {
        let viewed = self.sequencer.mark_as_read(id, now)?;
        self.remember_demo_view(&viewed);
        Some(viewed)
    }

    fn remember_demo_view(&mut self, viewed: &Notification) {
        if self.sequencer.mode() != (SequencerMode::Demo { step: 1 }) {
            return;
        }
        let is_follow_up = self
            .catalog
            .follow_up_demo()
            .is_some_and(|t| t.title == viewed.title);
        if is_follow_up && !self.stores.flags.flags().show_no_idea_history {
            self.stores.flags.set_show_no_idea_history(true);
        }
    }

    // ===== Chat =====

    pub fn chat(&self) -> &ChatAssistant {
        &self.chat
    }

    pub fn chat_mut(&mut self) -> &mut ChatAssistant {
        &mut self.chat
    }

    /// Send a chat message from the current page
    pub fn submit_chat(&mut self, input: &str, now: Duration) -> Option<ChatMessage> {
        let page = self
            .route
            .as_ref()
            .and_then(|r| r.document_id())
            .map(str::to_string);
        self.chat.open();
        self.chat.submit(input, page.as_deref(), now)
    }

    // ===== Documents & email =====

    /// Look up a document, including the built-in reference document.
    /// A miss is `None`.
    pub fn open_document(&mut self, id: &str) -> Option<Document> {
        let document = if id == self.catalog.reference_document.id {
            Some(self.catalog.reference_document.clone())
        } else {
            self.stores.documents.get(id)
        }?;
        self.stores.flags.record_document_view(id, REFERENCE_DOCUMENT_ID);
        Some(document)
    }

    /// The reference document followed by stored documents
    pub fn list_documents(&self) -> Vec<Document> {
        let mut documents = vec![self.catalog.reference_document.clone()];
        documents.extend(self.stores.documents.list());
        documents
    }

    pub fn documents_mut(&mut self) -> &mut BoxedStore<Document> {
        &mut self.stores.documents
    }

    pub fn drafts(&self) -> &BoxedStore<DraftEmail> {
        &self.stores.drafts
    }

    pub fn drafts_mut(&mut self) -> &mut BoxedStore<DraftEmail> {
        &mut self.stores.drafts
    }

    pub fn sent(&self) -> &BoxedStore<SentEmail> {
        &self.stores.sent
    }

    pub fn send_draft(&mut self, id: &str) -> Result<Option<SentEmail>, ValidationError> {
        send_draft(
            self.stores.drafts.as_mut(),
            self.stores.sent.as_mut(),
            id,
            Utc::now(),
        )
    }

    pub fn demo_flags(&self) -> &DemoFlagStore {
        &self.stores.flags
    }

    pub fn demo_flags_mut(&mut self) -> &mut DemoFlagStore {
        &mut self.stores.flags
    }

    // ===== Driving =====

    /// Advance every component to `now`
    pub fn tick(&mut self, now: Duration) -> Vec<SimEvent> {
        let mut events = Vec::new();

        if let Some(player) = self.player.as_mut() {
            events.extend(player.tick(now).into_iter().map(SimEvent::Conference));
        }

        for event in self.chat.tick(now) {
            match event {
                ChatEvent::BotMessage(message) => events.push(SimEvent::ChatReply(message)),
                ChatEvent::RaiseNotification { template, at } => {
                    let raised = self.sequencer.push(&template, at);
                    events.push(SimEvent::NotificationRaised(raised));
                }
            }
        }

        for event in self.sequencer.tick(now) {
            events.push(match event {
                SequencerEvent::Raised(notification) => SimEvent::NotificationRaised(notification),
                SequencerEvent::PopupHidden => SimEvent::PopupHidden,
            });
        }

        events
    }

    /// Earliest pending timer across all components
    pub fn next_deadline(&self) -> Option<Duration> {
        [
            self.player.as_ref().and_then(|p| p.next_deadline()),
            self.sequencer.next_deadline(),
            self.chat.next_deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Cancel every pending timer
    pub fn teardown(&mut self) {
        if let Some(player) = self.player.as_mut() {
            player.teardown();
        }
        self.sequencer.teardown();
        self.chat.teardown();
        info!("participant session torn down");
    }
}
