//! Session notifications
//!
//! The UI layer learns about selection, placement and status changes here.
//! Handlers register per event kind and return `true` to consume an event,
//! which stops it reaching later handlers of the same kind.

use std::collections::HashMap;

use crate::foundation::collections::ObjectId;

/// Event kind used for handler registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionEventKind {
    /// See [`SessionEvent::SelectionChanged`]
    SelectionChanged,
    /// See [`SessionEvent::PlacementChanged`]
    PlacementChanged,
    /// See [`SessionEvent::PreviewChanged`]
    PreviewChanged,
    /// See [`SessionEvent::StatusChanged`]
    StatusChanged,
    /// See [`SessionEvent::ObjectDeleted`]
    ObjectDeleted,
}

/// Something the UI may want to react to
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The selected object changed
    SelectionChanged(Option<ObjectId>),
    /// The number of placed objects changed
    PlacementChanged {
        /// Placed objects after the change
        placed_count: usize,
    },
    /// A preview appeared or was discarded
    PreviewChanged {
        /// Whether the place/cancel controls should be shown
        visible_controls: bool,
    },
    /// The guidance text changed
    StatusChanged(String),
    /// A placed object was deleted
    ObjectDeleted(ObjectId),
}

impl SessionEvent {
    /// Kind of this event
    pub fn kind(&self) -> SessionEventKind {
        match self {
            Self::SelectionChanged(_) => SessionEventKind::SelectionChanged,
            Self::PlacementChanged { .. } => SessionEventKind::PlacementChanged,
            Self::PreviewChanged { .. } => SessionEventKind::PreviewChanged,
            Self::StatusChanged(_) => SessionEventKind::StatusChanged,
            Self::ObjectDeleted(_) => SessionEventKind::ObjectDeleted,
        }
    }
}

/// Receives session events
pub trait SessionEventHandler {
    /// Handle an event, return true if consumed
    fn on_event(&mut self, event: &SessionEvent) -> bool;
}

/// Queue of pending events with per-kind handlers
#[derive(Default)]
pub struct EventQueue {
    pending: Vec<SessionEvent>,
    handlers: HashMap<SessionEventKind, Vec<Box<dyn SessionEventHandler>>>,
}

impl EventQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for one event kind
    pub fn register_handler(&mut self, kind: SessionEventKind, handler: Box<dyn SessionEventHandler>) {
        self.handlers.entry(kind).or_default().push(handler);
    }

    /// Queue an event for the next dispatch
    pub fn send(&mut self, event: SessionEvent) {
        log::trace!("Queued {event:?}");
        self.pending.push(event);
    }

    /// Deliver pending events to handlers and return them in order
    pub fn dispatch(&mut self) -> Vec<SessionEvent> {
        let pending = std::mem::take(&mut self.pending);
        for event in &pending {
            if let Some(handlers) = self.handlers.get_mut(&event.kind()) {
                for handler in handlers.iter_mut() {
                    if handler.on_event(event) {
                        break;
                    }
                }
            }
        }
        pending
    }

    /// Number of undelivered events
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether no events are waiting
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop undelivered events
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

impl std::fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventQueue")
            .field("pending", &self.pending)
            .field("handler_kinds", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}
