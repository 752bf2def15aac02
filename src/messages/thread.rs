// src/messages/thread.rs
//
// Threaded rendering of a message and its replies. Replies to a
// message are messages filed against the `Blogs` table keyed by the
// parent's index, so the reply tree is a self-referencing walk over a
// flat table. Children always carry a larger index than their parent,
// so the recursion cannot cycle.

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::{Database, DbError};
use crate::models::BlogRecord;
use crate::utils::{split_datetime, DateDisplay};

/// Indentation applied per reply level, in em units, matching the
/// page styling the listings were written for.
pub const INDENT_EM_PER_LEVEL: u32 = 6;

/// One message in a rendered thread, in display order.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RenderedPost {
    pub index: i64,
    pub username: String,
    pub subject: String,
    pub text: String,
    pub depth: u32,
    /// Left margin for this post, `(depth + 1) * 6` em.
    pub margin_em: u32,
    pub posted: DateDisplay,
}

/// Where the renderer fetches replies from. The API serves threads
/// straight from the database; tests substitute an in-memory tree.
pub trait ReplySource: Sync {
    fn replies_to(&self, index: i64) -> BoxFuture<'_, Result<Vec<BlogRecord>, DbError>>;
}

impl ReplySource for Database {
    fn replies_to(&self, index: i64) -> BoxFuture<'_, Result<Vec<BlogRecord>, DbError>> {
        Box::pin(async move { self.get_blogs_for("Blogs", index, false).await })
    }
}

fn render_one(blog: &BlogRecord, depth: u32) -> RenderedPost {
    let subject = if blog.subject.is_empty() {
        "*not supplied*".to_string()
    } else {
        blog.subject.clone()
    };
    RenderedPost {
        index: blog.index,
        username: blog.username.clone(),
        subject,
        text: blog.text.clone(),
        depth,
        margin_em: (depth + 1) * INDENT_EM_PER_LEVEL,
        posted: split_datetime(blog.datetime),
    }
}

fn render_into<'a, R: ReplySource>(
    repo: &'a R,
    node: BlogRecord,
    depth: u32,
    posts: &'a mut Vec<RenderedPost>,
) -> BoxFuture<'a, Result<(), DbError>> {
    Box::pin(async move {
        posts.push(render_one(&node, depth));
        let children = repo.replies_to(node.index).await?;
        for child in children {
            render_into(repo, child, depth + 1, posts).await?;
        }
        Ok(())
    })
}

/// Render a message and all of its replies, depth-first, each child
/// in retrieval order under its parent.
pub async fn render_thread<R: ReplySource>(
    repo: &R,
    root: BlogRecord,
) -> Result<Vec<RenderedPost>, DbError> {
    let mut posts = Vec::new();
    render_into(repo, root, 0, &mut posts).await?;
    Ok(posts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;

    struct InMemoryReplies {
        children: HashMap<i64, Vec<BlogRecord>>,
    }

    impl ReplySource for InMemoryReplies {
        fn replies_to(&self, index: i64) -> BoxFuture<'_, Result<Vec<BlogRecord>, DbError>> {
            let replies = self.children.get(&index).cloned().unwrap_or_default();
            Box::pin(async move { Ok(replies) })
        }
    }

    fn blog(index: i64, parent: i64, subject: &str) -> BlogRecord {
        BlogRecord {
            index,
            table_name: "Blogs".to_string(),
            keyvalue: parent,
            username: "margaret".to_string(),
            subject: subject.to_string(),
            text: format!("body of {}", index),
            datetime: Utc::now(),
        }
    }

    fn tree() -> (BlogRecord, InMemoryReplies) {
        // 1
        // ├── 2
        // │   └── 4
        // └── 3
        let root = blog(1, 0, "root");
        let mut children = HashMap::new();
        children.insert(1, vec![blog(2, 1, "first reply"), blog(3, 1, "second reply")]);
        children.insert(2, vec![blog(4, 2, "nested reply")]);
        (root, InMemoryReplies { children })
    }

    #[tokio::test]
    async fn renders_depth_first_in_retrieval_order() {
        let (root, repo) = tree();
        let posts = render_thread(&repo, root).await.unwrap();
        let order: Vec<i64> = posts.iter().map(|p| p.index).collect();
        assert_eq!(order, vec![1, 2, 4, 3]);
    }

    #[tokio::test]
    async fn each_level_indents_six_more_em() {
        let (root, repo) = tree();
        let posts = render_thread(&repo, root).await.unwrap();
        let by_index: HashMap<i64, &RenderedPost> =
            posts.iter().map(|p| (p.index, p)).collect();
        assert_eq!(by_index[&1].margin_em, 6);
        assert_eq!(by_index[&2].margin_em, 12);
        assert_eq!(by_index[&4].margin_em, 18);
        assert_eq!(by_index[&3].margin_em, 12);
        assert_eq!(by_index[&4].depth, 2);
    }

    #[tokio::test]
    async fn missing_subject_gets_a_placeholder() {
        let (mut root, repo) = tree();
        root.subject = String::new();
        let posts = render_thread(&repo, root).await.unwrap();
        assert_eq!(posts[0].subject, "*not supplied*");
    }

    #[tokio::test]
    async fn leaf_message_renders_alone() {
        let repo = InMemoryReplies {
            children: HashMap::new(),
        };
        let posts = render_thread(&repo, blog(9, 0, "loner")).await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].depth, 0);
    }
}
