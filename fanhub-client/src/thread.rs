use std::collections::HashMap;

use crate::{
    api::{CommentId, Reply},
    KeyedList,
};

/// Deepest indentation level; replies below it are shown flattened at this level
pub const MAX_REPLY_DEPTH: usize = 3;

/// Display depth of the children of a reply shown at `depth`
pub fn child_depth(depth: usize, max_depth: usize) -> usize {
    std::cmp::min(depth + 1, max_depth)
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReplyNode {
    pub reply: Reply,
    pub children: Vec<ReplyNode>,
}

/// Replies of one root comment arranged by parent
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ThreadTree {
    pub roots: Vec<ReplyNode>,

    /// Loaded replies whose parent is not loaded (yet)
    pub orphans: Vec<Reply>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ThreadRow<'a> {
    pub reply: &'a Reply,
    pub depth: usize,
}

impl ThreadTree {
    /// Duplicate identifiers keep their first occurrence; sibling order is input order
    pub fn build(root: &CommentId, replies: impl IntoIterator<Item = Reply>) -> ThreadTree {
        let replies: KeyedList<Reply> = replies.into_iter().collect();
        let mut by_parent: HashMap<Option<CommentId>, Vec<Reply>> = HashMap::new();
        for r in replies.to_vec() {
            by_parent.entry(r.parent_id.clone()).or_default().push(r);
        }

        let roots = take_children(root, &mut by_parent);
        let mut orphans = Vec::new();
        for r in replies.iter() {
            let unreachable = by_parent
                .get(&r.parent_id)
                .map(|siblings| siblings.iter().any(|s| s.id == r.id))
                .unwrap_or(false);
            if unreachable {
                orphans.push(r.clone());
            }
        }
        if !orphans.is_empty() {
            tracing::debug!(num = orphans.len(), %root, "replies waiting for their parent");
        }
        ThreadTree { roots, orphans }
    }

    pub fn len(&self) -> usize {
        self.rows(usize::MAX).len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Pre-order rows; descendants deeper than `max_depth` become siblings at `max_depth`
    pub fn rows(&self, max_depth: usize) -> Vec<ThreadRow<'_>> {
        let mut res = Vec::new();
        let mut stack = self
            .roots
            .iter()
            .rev()
            .map(|n| (n, 0))
            .collect::<Vec<_>>();
        while let Some((node, depth)) = stack.pop() {
            res.push(ThreadRow {
                reply: &node.reply,
                depth: std::cmp::min(depth, max_depth),
            });
            let below = child_depth(depth, max_depth);
            stack.extend(node.children.iter().rev().map(|c| (c, below)));
        }
        res
    }
}

/// Detaches the subtree under `parent`, iteratively so deep threads cannot overflow
fn take_children(
    parent: &CommentId,
    by_parent: &mut HashMap<Option<CommentId>, Vec<Reply>>,
) -> Vec<ReplyNode> {
    struct Frame {
        node: ReplyNode,
        pending: std::vec::IntoIter<Reply>,
    }

    let mut roots = Vec::new();
    let mut top = by_parent
        .remove(&Some(parent.clone()))
        .unwrap_or_default()
        .into_iter();
    let mut stack: Vec<Frame> = Vec::new();
    loop {
        let next = match stack.last_mut() {
            Some(frame) => frame.pending.next(),
            None => top.next(),
        };
        match next {
            Some(reply) => {
                let pending = by_parent
                    .remove(&Some(reply.id.clone()))
                    .unwrap_or_default()
                    .into_iter();
                stack.push(Frame {
                    node: ReplyNode {
                        reply,
                        children: Vec::new(),
                    },
                    pending,
                });
            }
            None => match stack.pop() {
                Some(done) => match stack.last_mut() {
                    Some(up) => up.node.children.push(done.node),
                    None => roots.push(done.node),
                },
                None => return roots,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{UserId, UserRef};

    fn reply(id: &str, parent: &str) -> Reply {
        Reply {
            id: CommentId::from(id),
            author: UserRef {
                id: UserId::from("u"),
                username: String::from("user"),
                profile_picture: None,
            },
            content: format!("content of {id}"),
            created_at: chrono::Utc::now(),
            likes: 0,
            liked_by_current_user: false,
            parent_id: Some(CommentId::from(parent)),
            reply_count: 0,
            mentions: Vec::new(),
        }
    }

    fn ids(rows: &[ThreadRow]) -> Vec<(String, usize)> {
        rows.iter()
            .map(|r| (r.reply.id.0.clone(), r.depth))
            .collect()
    }

    fn chain() -> ThreadTree {
        // root <- a <- b <- c <- d, and root <- e
        ThreadTree::build(
            &CommentId::from("root"),
            vec![
                reply("a", "root"),
                reply("b", "a"),
                reply("c", "b"),
                reply("d", "c"),
                reply("e", "root"),
            ],
        )
    }

    #[test]
    fn nests_by_parent() {
        let t = chain();
        assert_eq!(t.roots.len(), 2);
        assert_eq!(t.roots[0].children[0].reply.id, CommentId::from("b"));
        assert!(t.orphans.is_empty());
        assert_eq!(t.len(), 5);
    }

    #[test]
    fn rows_flatten_below_cutoff() {
        let t = chain();
        assert_eq!(
            ids(&t.rows(2)),
            vec![
                (String::from("a"), 0),
                (String::from("b"), 1),
                (String::from("c"), 2),
                (String::from("d"), 2),
                (String::from("e"), 0),
            ],
        );
        assert_eq!(ids(&t.rows(MAX_REPLY_DEPTH))[3], (String::from("d"), 3));
    }

    #[test]
    fn missing_parent_makes_orphans() {
        let t = ThreadTree::build(
            &CommentId::from("root"),
            vec![reply("a", "root"), reply("x", "not-loaded"), reply("y", "x")],
        );
        assert_eq!(t.roots.len(), 1);
        let orphans = t.orphans.iter().map(|r| r.id.0.clone()).collect::<Vec<_>>();
        assert_eq!(orphans, vec![String::from("x"), String::from("y")]);
    }

    #[test]
    fn duplicates_are_dropped() {
        let t = ThreadTree::build(
            &CommentId::from("root"),
            vec![reply("a", "root"), reply("a", "root")],
        );
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn child_depth_is_clamped() {
        assert_eq!(child_depth(0, 3), 1);
        assert_eq!(child_depth(2, 3), 3);
        assert_eq!(child_depth(3, 3), 3);
    }
}
