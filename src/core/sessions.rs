//! Session collection: the ordered set of open documents and the active one.
//!
//! The collection is never empty. Listeners registered through
//! [`SessionCollection::subscribe`] are told when sessions appear, disappear,
//! become active or change title, which is how the front end keeps its tab bar
//! in sync without polling the dirty flags.

use std::path::Path;

use crate::core::id::SessionId;
use crate::core::session::Session;

/// Change notifications emitted by the collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Created(SessionId),
    Closed(SessionId),
    Activated(SessionId),
    TitleChanged { id: SessionId, title: String },
}

type Listener = Box<dyn FnMut(&SessionEvent)>;

pub struct SessionCollection {
    sessions: Vec<Session>,
    active: usize,
    next_id: usize,
    listeners: Vec<Listener>,
}

impl SessionCollection {
    /// A collection holding one empty session
    pub fn new() -> Self {
        Self {
            sessions: vec![Session::new(SessionId(0))],
            active: 0,
            next_id: 1,
            listeners: Vec::new(),
        }
    }

    /// Register a listener for session events
    pub fn subscribe(&mut self, listener: impl FnMut(&SessionEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn emit(&mut self, event: SessionEvent) {
        tracing::debug!(target: "sessions", ?event, "session_event");
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    fn alloc_id(&mut self) -> SessionId {
        let id = SessionId(self.next_id);
        self.next_id += 1;
        id
    }

    fn push_and_activate(&mut self, session: Session) -> SessionId {
        let id = session.id;
        self.sessions.push(session);
        self.active = self.sessions.len() - 1;
        self.emit(SessionEvent::Created(id));
        self.emit(SessionEvent::Activated(id));
        id
    }

    /// Append a new empty session and make it active
    pub fn create_session(&mut self) -> SessionId {
        let id = self.alloc_id();
        self.push_and_activate(Session::new(id))
    }

    /// Append a clean session bound to `path` and make it active
    pub fn open_session(&mut self, path: impl AsRef<Path>, text: &str) -> SessionId {
        let id = self.alloc_id();
        self.push_and_activate(Session::opened(id, path, text))
    }

    /// Remove the active session.
    ///
    /// The session at the same index (or the new last one) becomes active. Closing
    /// the sole session replaces it with a fresh empty one.
    pub fn close_active(&mut self) {
        let closed = self.sessions.remove(self.active).id;
        if self.sessions.is_empty() {
            let id = self.alloc_id();
            self.sessions.push(Session::new(id));
            self.emit(SessionEvent::Created(id));
        }
        self.active = self.active.min(self.sessions.len() - 1);
        self.emit(SessionEvent::Closed(closed));
        let id = self.active().id;
        self.emit(SessionEvent::Activated(id));
    }

    /// Remove a session that was never named, edited or filled, unless it is
    /// the only one. The active session stays active.
    pub fn discard_untouched(&mut self, id: SessionId) -> bool {
        if self.sessions.len() < 2 {
            return false;
        }
        let Some(index) = self.sessions.iter().position(|s| {
            s.id == id && !s.dirty && s.file_path.is_none() && s.buffer.is_empty()
        }) else {
            return false;
        };
        let active_id = self.active().id;
        self.sessions.remove(index);
        self.active = self
            .sessions
            .iter()
            .position(|s| s.id == active_id)
            .unwrap_or(0);
        self.emit(SessionEvent::Closed(id));
        true
    }

    pub fn select_next(&mut self) {
        if self.sessions.len() < 2 {
            return;
        }
        self.active = (self.active + 1) % self.sessions.len();
        let id = self.active().id;
        self.emit(SessionEvent::Activated(id));
    }

    pub fn select_previous(&mut self) {
        if self.sessions.len() < 2 {
            return;
        }
        self.active = (self.active + self.sessions.len() - 1) % self.sessions.len();
        let id = self.active().id;
        self.emit(SessionEvent::Activated(id));
    }

    /// Activate a session by id. Returns false when the id is unknown.
    pub fn select(&mut self, id: SessionId) -> bool {
        match self.sessions.iter().position(|s| s.id == id) {
            Some(index) => {
                self.active = index;
                self.emit(SessionEvent::Activated(id));
                true
            }
            None => false,
        }
    }

    pub fn active(&self) -> &Session {
        &self.sessions[self.active]
    }

    pub fn active_mut(&mut self) -> &mut Session {
        &mut self.sessions[self.active]
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.sessions.iter()
    }

    pub fn get(&self, id: SessionId) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn any_dirty(&self) -> bool {
        self.sessions.iter().any(|s| s.dirty)
    }

    /// Flag the active session as modified; notifies only on the clean → dirty transition
    pub fn mark_active_dirty(&mut self) {
        let session = self.active_mut();
        if session.dirty {
            return;
        }
        session.dirty = true;
        let (id, title) = (session.id, session.title());
        self.emit(SessionEvent::TitleChanged { id, title });
    }

    /// Record a successful save of the active session to `path`
    pub fn mark_active_saved(&mut self, path: impl AsRef<Path>) {
        let session = self.active_mut();
        session.mark_saved(path);
        let (id, title) = (session.id, session.title());
        self.emit(SessionEvent::TitleChanged { id, title });
    }

    /// Run an edit against the active session, flagging it dirty if the text changed
    pub fn edit_active<R>(&mut self, f: impl FnOnce(&mut Session) -> R) -> R {
        let before = self.active().buffer.version;
        let result = f(self.active_mut());
        if self.active().buffer.version != before {
            self.mark_active_dirty();
        }
        result
    }
}

impl Default for SessionCollection {
    fn default() -> Self {
        Self::new()
    }
}
