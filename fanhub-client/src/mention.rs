use std::collections::HashMap;

use regex::Regex;

use crate::api::{Mention, UserRef};

lazy_static::lazy_static! {
    static ref MENTION: Regex = Regex::new(r"@\w+").expect("compiling mention pattern");
}

/// One displayable piece of a comment
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Segment {
    Text(String),

    /// A resolved `@username`, rendered as a link to the user's profile
    Link { user: UserRef, text: String },

    /// A well-formed `@username` with no mention record: styled, not clickable
    Inert(String),
}

impl Segment {
    /// The characters this segment displays
    pub fn text(&self) -> &str {
        match self {
            Segment::Text(t) | Segment::Inert(t) => t,
            Segment::Link { text, .. } => text,
        }
    }
}

/// Mention records indexed by username; later records win on collision
pub fn mention_map(mentions: &[Mention]) -> HashMap<&str, &UserRef> {
    mentions
        .iter()
        .map(|m| (&m.user.username as &str, &m.user))
        .collect()
}

pub fn render(content: &str, mentions: &[Mention]) -> Vec<Segment> {
    let map = mention_map(mentions);
    let mut res = Vec::new();
    let mut last = 0;
    for m in MENTION.find_iter(content) {
        if m.start() > last {
            res.push(Segment::Text(content[last..m.start()].to_string()));
        }
        let token = m.as_str();
        let username = &token[1..];
        res.push(match map.get(username) {
            Some(user) => Segment::Link {
                user: (*user).clone(),
                text: token.to_string(),
            },
            None => Segment::Inert(token.to_string()),
        });
        last = m.end();
    }
    if last < content.len() {
        res.push(Segment::Text(content[last..].to_string()));
    }
    res
}

/// Usernames mentioned in `content`, deduplicated, in order of first appearance
pub fn mentioned_usernames(content: &str) -> Vec<String> {
    let mut res: Vec<String> = Vec::new();
    for m in MENTION.find_iter(content) {
        let name = &m.as_str()[1..];
        if !res.iter().any(|n| n == name) {
            res.push(name.to_string());
        }
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::UserId;

    fn mention(id: &str, username: &str) -> Mention {
        Mention {
            user: UserRef {
                id: UserId::from(id),
                username: String::from(username),
                profile_picture: None,
            },
        }
    }

    fn text(s: &str) -> Segment {
        Segment::Text(String::from(s))
    }

    #[test]
    fn resolved_and_unresolved_mentions() {
        let alice = mention("1", "alice");
        assert_eq!(
            render("Hi @alice and @bob!", &[alice.clone()]),
            vec![
                text("Hi "),
                Segment::Link {
                    user: alice.user,
                    text: String::from("@alice"),
                },
                text(" and "),
                Segment::Inert(String::from("@bob")),
                text("!"),
            ],
        );
    }

    #[test]
    fn plain_text_stays_whole() {
        assert_eq!(render("no mentions here", &[]), vec![text("no mentions here")]);
        assert_eq!(render("", &[]), vec![]);
        assert_eq!(render("mail me at @", &[]), vec![text("mail me at @")]);
    }

    #[test]
    fn markup_is_not_interpreted() {
        assert_eq!(
            render("<b>@eve</b>", &[]),
            vec![
                text("<b>"),
                Segment::Inert(String::from("@eve")),
                text("</b>"),
            ],
        );
    }

    #[test]
    fn last_mention_record_wins() {
        let first = mention("1", "carol");
        let second = mention("2", "carol");
        match &render("@carol", &[first, second])[..] {
            [Segment::Link { user, .. }] => assert_eq!(user.id, UserId::from("2")),
            other => panic!("unexpected segments {other:?}"),
        }
    }

    #[test]
    fn adjacent_mentions() {
        let segs = render("@a@b", &[mention("1", "b")]);
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[0], Segment::Inert(String::from("@a")));
        assert!(matches!(&segs[1], Segment::Link { text, .. } if text == "@b"));
    }

    #[test]
    fn usernames_in_first_appearance_order() {
        assert_eq!(
            mentioned_usernames("@bob, @alice: ping @bob again"),
            vec![String::from("bob"), String::from("alice")],
        );
    }

    #[test]
    fn segments_concatenate_to_content() {
        bolero::check!()
            .with_type::<String>()
            .cloned()
            .for_each(|content: String| {
                let rebuilt = render(&content, &[mention("1", "alice")])
                    .iter()
                    .map(|s| s.text())
                    .collect::<String>();
                assert_eq!(rebuilt, content);
            })
    }
}
