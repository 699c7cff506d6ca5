use std::sync::Arc;

use crate::services::fund_overlap::FundCatalog;
use crate::services::index_service::IndexService;
use crate::services::market_history::MarketHistoryService;

#[derive(Clone)]
pub struct AppState {
    pub index: Arc<IndexService>,
    pub history: Arc<MarketHistoryService>,
    pub funds: Arc<FundCatalog>,
    pub risk_free_rate: f64,
}
