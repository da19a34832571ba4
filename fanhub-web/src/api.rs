use std::{ops::Deref, rc::Rc};

use fanhub_client::HttpApi;

const DEFAULT_HOST: &str = "http://localhost:5000";

/// Shared handle on the API client, compared by identity in component props
#[derive(Clone, Debug)]
pub struct ApiHandle(Rc<HttpApi>);

impl ApiHandle {
    pub fn connect() -> anyhow::Result<ApiHandle> {
        let host = option_env!("FANHUB_API_URL").unwrap_or(DEFAULT_HOST);
        Ok(ApiHandle(Rc::new(HttpApi::new(host)?)))
    }
}

impl Deref for ApiHandle {
    type Target = HttpApi;

    fn deref(&self) -> &HttpApi {
        &self.0
    }
}

impl PartialEq for ApiHandle {
    fn eq(&self, other: &ApiHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
