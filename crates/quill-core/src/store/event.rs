use std::collections::VecDeque;

use uuid::Uuid;

use crate::domain::{Comment, Post};
use crate::pagination::Page;

use super::Ticket;

/// Everything that can change the store.
///
/// Fetch outcomes carry the ticket handed out when the fetch began; failures
/// carry the message to show.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    PostsFetched {
        ticket: Ticket,
        author_id: Uuid,
        outcome: Result<Page<Post>, String>,
    },
    PostFetched {
        ticket: Ticket,
        outcome: Result<Option<Post>, String>,
    },
    CommentsFetched {
        ticket: Ticket,
        post_id: Uuid,
        outcome: Result<Vec<Comment>, String>,
    },
    PostCreated(Post),
    PostUpdated(Post),
    PostDeleted(Uuid),
    CommentCreated(Comment),
    CurrentPostCleared,
    CommentsCleared,
}

/// FIFO of pending store events, drained in dispatch order.
#[derive(Debug, Default)]
pub struct EventQueue {
    pending: VecDeque<StoreEvent>,
}

impl EventQueue {
    pub fn push(&mut self, event: StoreEvent) {
        self.pending.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn pop(&mut self) -> Option<StoreEvent> {
        self.pending.pop_front()
    }
}
