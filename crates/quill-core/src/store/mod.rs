//! Client-side normalized store.
//!
//! A [`Store`] holds three [`Slice`]s: the post list, the current post and the
//! open comment thread. Fetches are split into a ticket (taken when the fetch
//! starts) and an [`effects`] future that resolves to a [`StoreEvent`]; only
//! events carrying the slice's latest ticket settle it.

mod controller;
pub mod effects;
mod event;
mod slice;
mod state;

pub use controller::BlogController;
pub use event::{EventQueue, StoreEvent};
pub use slice::{Slice, SliceStatus, Ticket};
pub use state::{CommentThread, PostList, Store};
