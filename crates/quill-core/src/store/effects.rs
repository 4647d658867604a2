//! Fetch effects.
//!
//! Each effect awaits the gateway and folds the outcome into a [`StoreEvent`]
//! stamped with the ticket it was started under. Effects hold no reference to
//! the store, so several may run at once and settle in any order.

use uuid::Uuid;

use crate::domain::AuthorRef;
use crate::pagination::PageRequest;
use crate::ports::BlogGateway;

use super::event::StoreEvent;
use super::slice::Ticket;

pub async fn fetch_posts(
    gateway: &dyn BlogGateway,
    ticket: Ticket,
    author_id: Uuid,
    page: PageRequest,
) -> StoreEvent {
    let outcome = gateway
        .list_posts(author_id, page)
        .await
        .map_err(|e| e.to_string());
    StoreEvent::PostsFetched {
        ticket,
        author_id,
        outcome,
    }
}

pub async fn fetch_post_by_id(gateway: &dyn BlogGateway, ticket: Ticket, id: Uuid) -> StoreEvent {
    let outcome = gateway.find_post_by_id(id).await.map_err(|e| e.to_string());
    StoreEvent::PostFetched { ticket, outcome }
}

pub async fn fetch_post_by_slug(
    gateway: &dyn BlogGateway,
    ticket: Ticket,
    author: &AuthorRef,
    slug: &str,
) -> StoreEvent {
    let outcome = gateway
        .find_post_by_slug(author, slug)
        .await
        .map_err(|e| e.to_string());
    StoreEvent::PostFetched { ticket, outcome }
}

pub async fn fetch_comments(gateway: &dyn BlogGateway, ticket: Ticket, post_id: Uuid) -> StoreEvent {
    let outcome = gateway
        .list_comments(post_id)
        .await
        .map_err(|e| e.to_string());
    StoreEvent::CommentsFetched {
        ticket,
        post_id,
        outcome,
    }
}
