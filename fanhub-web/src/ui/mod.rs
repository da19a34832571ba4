mod app;
pub use app::{App, AppProps};

mod collection_picker;
pub use collection_picker::CollectionPicker;

mod error_page;
pub use error_page::ErrorPage;

mod flat_thread;
pub use flat_thread::FlatThread;

mod login;
pub use login::Login;

mod mention_text;
pub use mention_text::MentionText;

mod new_story;
pub use new_story::NewStoryForm;

mod password;
pub use password::{ForgotPassword, ResetPassword};

mod profile;
pub use profile::Profile;

mod recommendation_picker;
pub use recommendation_picker::RecommendationPicker;

mod reply_composer;
pub use reply_composer::ReplyComposer;

mod reply_item;
pub use reply_item::ReplyItem;

mod reply_list;
pub use reply_list::ReplyListView;

mod signup;
pub use signup::Signup;

mod story;
pub use story::StoryPage;

/// Reads the value of the `<input>` an event fired on
pub fn input_value(e: web_sys::Event) -> String {
    use yew::prelude::TargetCast;
    let input: web_sys::HtmlInputElement = e.target_unchecked_into();
    input.value()
}

/// Inline error or notice shown under a form
pub fn feedback(error: Option<&str>, notice: Option<&str>) -> yew::Html {
    yew::html! {<>
        { for error.map(|e| yew::html! { <div class="alert alert-danger mt-3">{ e }</div> }) }
        { for notice.map(|n| yew::html! { <div class="alert alert-info mt-3">{ n }</div> }) }
    </>}
}
