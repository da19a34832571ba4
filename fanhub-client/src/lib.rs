pub mod cache;
pub use cache::{Collections, MutationResult, Recommendations, UserDirectory};

pub mod forms;

mod http;
pub use http::HttpApi;

mod keyed;
pub use keyed::{Keyed, KeyedList};

pub mod mention;

mod reply_list;
pub use reply_list::{can_delete, PageRequest, Parent, ReplyList, REPLIES_PER_PAGE};

mod route;
pub use route::{Outcome, Route};

mod session;
pub use session::{MemoryStore, Session, Store, Theme};

pub mod thread;
pub use thread::{ThreadTree, MAX_REPLY_DEPTH};

pub mod api {
    pub use fanhub_api::*;
}

pub mod prelude {
    pub use crate::api::Api;
}
