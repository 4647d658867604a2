//! Plain-text rendering of store state.

use quill_core::domain::{Comment, Post};
use quill_core::pagination::PageLink;
use quill_core::store::PostList;
use quill_core::validation::html_text;

const EXCERPT_CHARS: usize = 80;

/// `text` cut to `max` characters, with an ellipsis when shortened.
pub fn excerpt(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// `1 [2] 3 … 9`, empty for a single page.
pub fn pagination_bar(list: &PostList) -> String {
    list.page_links()
        .into_iter()
        .map(|link| match link {
            PageLink::Page(n) if n == list.page => format!("[{n}]"),
            PageLink::Page(n) => n.to_string(),
            PageLink::Gap => "…".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn summary(list: &PostList) -> String {
    if list.total_count == 0 {
        return "No posts yet.".to_string();
    }
    format!(
        "Showing {} of {} posts (page {} of {})",
        list.items.len(),
        list.total_count,
        list.page,
        list.total_pages()
    )
}

pub fn post_line(post: &Post) -> String {
    format!(
        "{}  {}  {}\n    {}",
        post.id,
        post.created_at.format("%Y-%m-%d"),
        post.title,
        excerpt(&html_text(&post.content), EXCERPT_CHARS)
    )
}

pub fn post_list(list: &PostList) -> String {
    let mut out: Vec<String> = list.items.iter().map(post_line).collect();
    out.push(String::new());
    out.push(summary(list));
    let bar = pagination_bar(list);
    if !bar.is_empty() {
        out.push(bar);
    }
    out.join("\n")
}

pub fn post_detail(post: &Post) -> String {
    let mut out = vec![
        post.title.clone(),
        "=".repeat(post.title.chars().count()),
        format!("{} · /{}", post.created_at.format("%B %-d, %Y"), post.slug),
    ];
    if let Some(cover) = &post.image_url {
        out.push(format!("Cover: {cover}"));
    }
    out.push(String::new());
    out.push(html_text(&post.content));
    out.join("\n")
}

pub fn comment_block(comment: &Comment) -> String {
    let mut out = format!(
        "({}) {} · {}\n    {}",
        comment.initial(),
        comment.author_name,
        comment.created_at.format("%Y-%m-%d %H:%M"),
        comment.content
    );
    if let Some(image) = &comment.image_url {
        out.push_str(&format!("\n    [image] {image}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use quill_core::domain::NewPost;
    use uuid::Uuid;

    use super::*;

    fn list(count: usize, total_count: u64, page: u32) -> PostList {
        let author = Uuid::new_v4();
        let items = (0..count)
            .map(|i| {
                Post::new(
                    author,
                    NewPost {
                        title: format!("Post {i}"),
                        content: "<p>Hello <b>there</b></p>".to_string(),
                        ..Default::default()
                    },
                    format!("post-{i}"),
                )
            })
            .collect();
        PostList {
            author_id: Some(author),
            items,
            total_count,
            page,
            page_size: 5,
        }
    }

    #[test]
    fn test_first_of_three_pages() {
        let list = list(5, 12, 1);
        assert_eq!(pagination_bar(&list), "[1] 2 3");
        assert_eq!(summary(&list), "Showing 5 of 12 posts (page 1 of 3)");
    }

    #[test]
    fn test_gaps_in_long_lists() {
        let list = list(5, 45, 5);
        assert_eq!(pagination_bar(&list), "1 … 4 [5] 6 … 9");
    }

    #[test]
    fn test_single_page_has_no_bar() {
        let rendered = post_list(&list(2, 2, 1));
        assert!(rendered.ends_with("Showing 2 of 2 posts (page 1 of 1)"));
        assert!(rendered.contains("Hello there"));
    }

    #[test]
    fn test_excerpt_shortens_long_text() {
        assert_eq!(excerpt("short", 10), "short");
        assert_eq!(excerpt("abcdefghijk", 5), "abcd…");
    }
}
