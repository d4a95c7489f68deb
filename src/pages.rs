use crate::client::DaybreakApi;
use crate::controller::{SummaryController, Today};
use crate::errors::ClientError;
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

struct OpenPage {
    controller: Arc<SummaryController>,
    last_seen: Instant,
}

/// Open dashboard pages. Each page keeps its own range, chart mode and
/// summaries; pages not touched within the idle timeout are dropped.
pub struct PageSessions {
    api: Arc<dyn DaybreakApi>,
    refetch_on_change: bool,
    idle_timeout: Duration,
    today: Today,
    pages: Mutex<HashMap<Uuid, OpenPage>>,
}

impl PageSessions {
    pub fn new(api: Arc<dyn DaybreakApi>, refetch_on_change: bool, idle_timeout: Duration, today: Today) -> Self {
        Self {
            api,
            refetch_on_change,
            idle_timeout,
            today,
            pages: Mutex::new(HashMap::new()),
        }
    }

    /// Starts a page on today's default range and loads its first summaries.
    pub async fn open(&self) -> Arc<SummaryController> {
        let controller = Arc::new(SummaryController::new(
            Arc::clone(&self.api),
            self.refetch_on_change,
            Arc::clone(&self.today),
        ));
        {
            let mut pages = self.pages.lock().await;
            self.evict_idle(&mut pages);
            pages.insert(
                controller.id(),
                OpenPage {
                    controller: Arc::clone(&controller),
                    last_seen: Instant::now(),
                },
            );
            debug!("opened page {} ({} open)", controller.id(), pages.len());
        }

        let outcome = controller.initialize().await;
        debug!("page {} initial load: {outcome:?}", controller.id());
        controller
    }

    /// The controller of `page`, or a freshly opened page when the id is
    /// missing, unknown or expired.
    pub async fn resume(&self, page: Option<Uuid>) -> Arc<SummaryController> {
        if let Some(id) = page {
            let mut pages = self.pages.lock().await;
            self.evict_idle(&mut pages);
            if let Some(open) = pages.get_mut(&id) {
                open.last_seen = Instant::now();
                return Arc::clone(&open.controller);
            }
            debug!("page {id} is not open, starting a new one");
        }
        self.open().await
    }

    pub async fn open_count(&self) -> usize {
        self.pages.lock().await.len()
    }

    pub async fn detail(&self, report_date_time: NaiveDateTime) -> Result<serde_json::Value, ClientError> {
        self.api.detail(report_date_time).await
    }

    fn evict_idle(&self, pages: &mut HashMap<Uuid, OpenPage>) {
        let now = Instant::now();
        let before = pages.len();
        pages.retain(|_, open| now.duration_since(open.last_seen) < self.idle_timeout);
        let dropped = before - pages.len();
        if dropped > 0 {
            info!("closed {dropped} idle daybreak pages");
        }
    }
}
