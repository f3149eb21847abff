use std::{
    error::Error,
    future::Future,
};

mod policy_store;
pub use policy_store::{DefaultPolicyPlatform, PolicyPlatform};

pub trait PlatformUrl {
    fn url(&self) -> &str;
}

pub struct ConnectorOption {
    pub url: String,
    pub auto_create_db: bool,
}

impl ConnectorOption {
    pub fn auto_create_db(mut self, val: bool) -> Self {
        self.auto_create_db = val;
        self
    }
}

impl From<String> for ConnectorOption {
    fn from(url: String) -> Self {
        Self {
            url,
            auto_create_db: false,
        }
    }
}

impl From<&str> for ConnectorOption {
    fn from(url: &str) -> Self {
        url.to_string().into()
    }
}

pub trait PlatformConnector {
    fn policy(
        opts: ConnectorOption,
    ) -> impl Future<Output = Result<
        impl PolicyPlatform + 'static,
        Box<dyn Error + Send + Sync + 'static>,
    >> + Send;
}
