//! State of the documents page: the current listing page, totals, and the
//! document opened in the detail sheet with its editable metadata.

use common::model::document::{Document, DocumentPage};
use common::model::query::InsightResponse;
use common::model::stats::Stats;
use yew::NodeRef;

pub const PER_PAGE: u32 = 10;

pub struct DocumentsComponent {
    pub listing: Option<DocumentPage>,
    pub current_page: u32,
    pub stats: Option<Stats>,
    pub loading: bool,

    /// Document shown in the detail sheet, fetched with its full text.
    pub selected: Option<Document>,
    /// Form values of the metadata editor. Tags are comma separated.
    pub edit_description: String,
    pub edit_tags: String,
    pub saving: bool,

    pub insight: Option<InsightResponse>,
    pub insight_loading: bool,

    pub sheet_ref: NodeRef,
}

impl DocumentsComponent {
    pub fn new() -> Self {
        Self {
            listing: None,
            current_page: 1,
            stats: None,
            loading: false,
            selected: None,
            edit_description: String::new(),
            edit_tags: String::new(),
            saving: false,
            insight: None,
            insight_loading: false,
            sheet_ref: NodeRef::default(),
        }
    }

    pub fn select(&mut self, document: Document) {
        self.edit_description = document.description.clone().unwrap_or_default();
        self.edit_tags = document.tags.join(", ");
        self.insight = None;
        self.selected = Some(document);
    }

    pub fn has_next_page(&self) -> bool {
        self.listing
            .as_ref()
            .map_or(false, |l| l.page < l.pages)
    }
}
