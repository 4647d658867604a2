use uuid::Uuid;

use crate::domain::{Comment, Post};
use crate::pagination::{DEFAULT_PAGE_SIZE, Page, PageLink, page_window, total_pages};

use super::event::{EventQueue, StoreEvent};
use super::slice::Slice;

/// The visible page of an author's posts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostList {
    pub author_id: Option<Uuid>,
    pub items: Vec<Post>,
    pub total_count: u64,
    pub page: u32,
    pub page_size: u32,
}

impl Default for PostList {
    fn default() -> Self {
        Self {
            author_id: None,
            items: Vec::new(),
            total_count: 0,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PostList {
    fn from_page(author_id: Uuid, page: Page<Post>) -> Self {
        Self {
            author_id: Some(author_id),
            items: page.items,
            total_count: page.total_count,
            page: page.page,
            page_size: page.page_size,
        }
    }

    pub fn total_pages(&self) -> u32 {
        total_pages(self.total_count, self.page_size)
    }

    pub fn page_links(&self) -> Vec<PageLink> {
        page_window(self.page, self.total_pages())
    }

    pub fn get(&self, id: Uuid) -> Option<&Post> {
        self.items.iter().find(|p| p.id == id)
    }
}

/// Comments of the post currently open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentThread {
    pub post_id: Option<Uuid>,
    pub items: Vec<Comment>,
}

/// Client-side state: what the pages render from.
///
/// Owned by a single task; every change goes through [`Store::apply`].
#[derive(Debug, Default)]
pub struct Store {
    pub posts: Slice<PostList>,
    pub current_post: Slice<Option<Post>>,
    pub comments: Slice<CommentThread>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event. Returns `false` when the event was a stale fetch
    /// outcome and got discarded.
    pub fn apply(&mut self, event: StoreEvent) -> bool {
        match event {
            StoreEvent::PostsFetched {
                ticket,
                author_id,
                outcome,
            } => match outcome {
                Ok(page) => self
                    .posts
                    .resolve(ticket, PostList::from_page(author_id, page)),
                Err(message) => self.posts.reject(ticket, message),
            },
            StoreEvent::PostFetched { ticket, outcome } => match outcome {
                Ok(post) => self.current_post.resolve(ticket, post),
                Err(message) => self.current_post.reject(ticket, message),
            },
            StoreEvent::CommentsFetched {
                ticket,
                post_id,
                outcome,
            } => match outcome {
                Ok(items) => self.comments.resolve(
                    ticket,
                    CommentThread {
                        post_id: Some(post_id),
                        items,
                    },
                ),
                Err(message) => self.comments.reject(ticket, message),
            },
            StoreEvent::PostCreated(post) => {
                self.posts.mutate(|list| {
                    let same_author = list.author_id.is_none_or(|a| a == post.user_id);
                    if !same_author {
                        return;
                    }
                    list.total_count += 1;
                    if list.page == 1 {
                        list.items.insert(0, post);
                        list.items.truncate(list.page_size as usize);
                    }
                });
                true
            }
            StoreEvent::PostUpdated(post) => {
                self.posts.mutate(|list| {
                    if let Some(slot) = list.items.iter_mut().find(|p| p.id == post.id) {
                        *slot = post.clone();
                    }
                });
                self.current_post.mutate(|current| {
                    if current.as_ref().is_some_and(|c| c.id == post.id) {
                        *current = Some(post);
                    }
                });
                true
            }
            StoreEvent::PostDeleted(id) => {
                self.posts.mutate(|list| {
                    let before = list.items.len();
                    list.items.retain(|p| p.id != id);
                    if list.items.len() < before {
                        list.total_count = list.total_count.saturating_sub(1);
                    }
                });
                self.current_post.mutate(|current| {
                    if current.as_ref().is_some_and(|c| c.id == id) {
                        *current = None;
                    }
                });
                if self.comments.data().post_id == Some(id) {
                    self.comments.reset();
                }
                true
            }
            StoreEvent::CommentCreated(comment) => {
                self.comments.mutate(|thread| {
                    if thread.post_id == Some(comment.post_id) {
                        thread.items.insert(0, comment);
                    }
                });
                true
            }
            StoreEvent::CurrentPostCleared => {
                self.current_post.reset();
                true
            }
            StoreEvent::CommentsCleared => {
                self.comments.reset();
                true
            }
        }
    }

    /// Apply every queued event in order; returns how many took effect.
    pub fn drain(&mut self, queue: &mut EventQueue) -> usize {
        let mut applied = 0;
        while let Some(event) = queue.pop() {
            if self.apply(event) {
                applied += 1;
            }
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewPost;
    use crate::pagination::PageRequest;
    use crate::store::SliceStatus;

    fn post(user_id: Uuid, title: &str) -> Post {
        Post::new(
            user_id,
            NewPost {
                title: title.into(),
                content: format!("<p>{title}</p>"),
                ..Default::default()
            },
            title.to_lowercase(),
        )
    }

    fn loaded_store(author: Uuid, posts: Vec<Post>, total: u64) -> Store {
        let mut store = Store::new();
        let ticket = store.posts.begin();
        store.apply(StoreEvent::PostsFetched {
            ticket,
            author_id: author,
            outcome: Ok(Page::new(posts, total, PageRequest::new(1, 5).unwrap())),
        });
        store
    }

    #[test]
    fn test_update_keeps_list_and_detail_in_sync() {
        let author = Uuid::new_v4();
        let original = post(author, "Draft");
        let mut store = loaded_store(author, vec![original.clone()], 1);

        let ticket = store.current_post.begin();
        store.apply(StoreEvent::PostFetched {
            ticket,
            outcome: Ok(Some(original.clone())),
        });

        let mut edited = original.clone();
        edited.title = "Final".into();
        edited.content = "<p>Final body</p>".into();
        store.apply(StoreEvent::PostUpdated(edited.clone()));

        assert_eq!(store.posts.data().get(original.id), Some(&edited));
        assert_eq!(store.current_post.data().as_ref(), Some(&edited));
    }

    #[test]
    fn test_create_prepends_and_respects_page_size() {
        let author = Uuid::new_v4();
        let existing: Vec<Post> = (0..5).map(|i| post(author, &format!("p{i}"))).collect();
        let mut store = loaded_store(author, existing, 12);

        let fresh = post(author, "fresh");
        store.apply(StoreEvent::PostCreated(fresh.clone()));

        let list = store.posts.data();
        assert_eq!(list.items.len(), 5);
        assert_eq!(list.items[0], fresh);
        assert_eq!(list.total_count, 13);
    }

    #[test]
    fn test_create_for_other_author_is_ignored() {
        let author = Uuid::new_v4();
        let mut store = loaded_store(author, vec![], 0);
        store.apply(StoreEvent::PostCreated(post(Uuid::new_v4(), "elsewhere")));
        assert!(store.posts.data().items.is_empty());
        assert_eq!(store.posts.data().total_count, 0);
    }

    #[test]
    fn test_delete_removes_everywhere() {
        let author = Uuid::new_v4();
        let doomed = post(author, "doomed");
        let mut store = loaded_store(author, vec![doomed.clone(), post(author, "kept")], 2);

        let ticket = store.current_post.begin();
        store.apply(StoreEvent::PostFetched {
            ticket,
            outcome: Ok(Some(doomed.clone())),
        });
        let ticket = store.comments.begin();
        store.apply(StoreEvent::CommentsFetched {
            ticket,
            post_id: doomed.id,
            outcome: Ok(vec![]),
        });

        store.apply(StoreEvent::PostDeleted(doomed.id));

        assert!(store.posts.data().get(doomed.id).is_none());
        assert_eq!(store.posts.data().total_count, 1);
        assert!(store.current_post.data().is_none());
        assert_eq!(store.comments.status(), SliceStatus::Idle);
    }

    #[test]
    fn test_failed_refetch_keeps_previous_page() {
        let author = Uuid::new_v4();
        let mut store = loaded_store(author, vec![post(author, "one")], 1);

        let ticket = store.posts.begin();
        store.apply(StoreEvent::PostsFetched {
            ticket,
            author_id: author,
            outcome: Err("network down".into()),
        });

        assert_eq!(store.posts.status(), SliceStatus::Failed);
        assert_eq!(store.posts.error(), Some("network down"));
        assert_eq!(store.posts.data().items.len(), 1);
    }

    #[test]
    fn test_drain_skips_stale_outcomes() {
        let author = Uuid::new_v4();
        let mut store = Store::new();
        let mut queue = EventQueue::default();

        let stale = store.posts.begin();
        let fresh = store.posts.begin();
        queue.push(StoreEvent::PostsFetched {
            ticket: fresh,
            author_id: author,
            outcome: Ok(Page::new(vec![post(author, "new")], 1, PageRequest::first())),
        });
        queue.push(StoreEvent::PostsFetched {
            ticket: stale,
            author_id: author,
            outcome: Ok(Page::new(vec![], 0, PageRequest::first())),
        });

        assert_eq!(store.drain(&mut queue), 1);
        assert!(queue.is_empty());
        assert_eq!(store.posts.data().items.len(), 1);
    }
}
