use crate::config::Config;
use crate::pages::PageSessions;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pages: Arc<PageSessions>,
}

impl AppState {
    pub fn new(config: Config, pages: PageSessions) -> Self {
        Self {
            config: Arc::new(config),
            pages: Arc::new(pages),
        }
    }
}
