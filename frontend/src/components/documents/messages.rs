use common::model::document::{Document, DocumentPage};
use common::model::query::InsightResponse;
use common::model::stats::Stats;

use crate::api::InsightKind;

pub enum Msg {
    Load(u32),
    Loaded(DocumentPage),
    StatsLoaded(Stats),
    Delete(i64),
    Deleted(i64),
    Open(i64),
    Opened(Document),
    Close,
    SetDescription(String),
    SetTags(String),
    SaveMetadata,
    Saved(Document),
    RequestInsight(InsightKind),
    InsightLoaded(InsightResponse),
    Failed(String),
}
