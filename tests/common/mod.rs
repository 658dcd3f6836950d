//! Destination types and result-set documents shared by integration tests.

#![allow(dead_code)]

use rowmapper::{MemoryCursor, Record, Schema};
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blog {
    pub id: i64,
    pub title: String,
    pub owner: Option<Author>,
    pub posts: Vec<Post>,
}

impl Record for Blog {
    fn schema() -> Schema<Self> {
        Schema::<Self>::new()
            .property("Id", |b| &b.id, |b| &mut b.id)
            .property("Title", |b| &b.title, |b| &mut b.title)
            .one("Owner", |b| &mut b.owner)
            .many("Posts", |b| &mut b.posts)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Author {
    pub id: i64,
    pub name: String,
}

impl Record for Author {
    fn schema() -> Schema<Self> {
        Schema::<Self>::new()
            .property("Id", |a| &a.id, |a| &mut a.id)
            .property("Name", |a| &a.name, |a| &mut a.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Post {
    pub id: i64,
    pub body: String,
    pub comments: Option<Vec<Comment>>,
}

impl Record for Post {
    fn schema() -> Schema<Self> {
        Schema::<Self>::new()
            .property("Id", |p| &p.id, |p| &mut p.id)
            .property("Body", |p| &p.body, |p| &mut p.body)
            .many("Comments", |p| &mut p.comments)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Comment {
    pub id: Uuid,
    pub text: String,
}

impl Record for Comment {
    fn schema() -> Schema<Self> {
        Schema::<Self>::new()
            .property("Id", |c| &c.id, |c| &mut c.id)
            .property("Text", |c| &c.text, |c| &mut c.text)
    }
}

pub const C1: &str = "6f1c6bde-8f5a-4d39-9c1e-3c5a1b0f0001";
pub const C2: &str = "6f1c6bde-8f5a-4d39-9c1e-3c5a1b0f0002";
pub const C3: &str = "6f1c6bde-8f5a-4d39-9c1e-3c5a1b0f0003";

pub fn uuid(value: &str) -> Uuid {
    Uuid::parse_str(value).unwrap()
}

/// Blogs joined to their owner, posts and comments, aliased by prefix.
///
/// Blog 1 has posts 10 (two comments) and 11 (none); blog 2 has no owner
/// and post 20 with one comment. The last row repeats the first.
pub const BLOG_JOIN: &str = r#"{
    "result_sets": [{
        "columns": [
            { "name": "Id", "type": "i64" },
            { "name": "Title", "type": "str" },
            { "name": "OwnerId", "type": "i64" },
            { "name": "OwnerName", "type": "str" },
            { "name": "PostId", "type": "i64" },
            { "name": "PostBody", "type": "str" },
            { "name": "CommentId", "type": "uuid" },
            { "name": "CommentText", "type": "str" }
        ],
        "rows": [
            [1, "Rust", 7, "Ann", 10, "Intro", "6f1c6bde-8f5a-4d39-9c1e-3c5a1b0f0001", "nice"],
            [1, "Rust", 7, "Ann", 10, "Intro", "6f1c6bde-8f5a-4d39-9c1e-3c5a1b0f0002", "more"],
            [1, "Rust", 7, "Ann", 11, "Traits", null, null],
            [2, "Go", null, null, 20, "Channels", "6f1c6bde-8f5a-4d39-9c1e-3c5a1b0f0003", "ok"],
            [1, "Rust", 7, "Ann", 10, "Intro", "6f1c6bde-8f5a-4d39-9c1e-3c5a1b0f0001", "nice"]
        ]
    }]
}"#;

/// The same join without aliases: the post's columns repeat the blog's names.
pub const UNALIASED_JOIN: &str = r#"{
    "result_sets": [{
        "columns": [
            { "name": "Id", "type": "i64" },
            { "name": "Title", "type": "str" },
            { "name": "Id", "type": "i64" },
            { "name": "Body", "type": "str" }
        ],
        "rows": [
            [1, "Rust", 10, "Intro"],
            [1, "Rust", 11, "Traits"],
            [2, "Go", 20, "Channels"]
        ]
    }]
}"#;

pub fn cursor(document: &str) -> MemoryCursor {
    MemoryCursor::from_json_str(document).unwrap()
}
