//! Update function of the documents page.
//!
//! Requests run in `spawn_local` and report back through messages; any
//! failure ends up in `Msg::Failed`, which shows a toast and clears the busy
//! flags.

use common::requests::MetadataUpdate;
use yew::platform::spawn_local;
use yew::prelude::*;

use crate::api;
use crate::components::sheet::{close_sheet, open_sheet};
use crate::helpers::{confirm, show_toast, split_tags};

use super::messages::Msg;
use super::state::{DocumentsComponent, PER_PAGE};

pub fn update(component: &mut DocumentsComponent, ctx: &Context<DocumentsComponent>, msg: Msg) -> bool {
    match msg {
        Msg::Load(page) => {
            component.loading = true;
            let link = ctx.link().clone();
            spawn_local(async move {
                match api::list_documents(page, PER_PAGE).await {
                    Ok(listing) => link.send_message(Msg::Loaded(listing)),
                    Err(e) => link.send_message(Msg::Failed(e)),
                }
                if let Ok(stats) = api::stats().await {
                    link.send_message(Msg::StatsLoaded(stats));
                }
            });
            true
        }
        Msg::Loaded(listing) => {
            component.loading = false;
            component.current_page = listing.page;
            component.listing = Some(listing);
            true
        }
        Msg::StatsLoaded(stats) => {
            component.stats = Some(stats);
            true
        }
        Msg::Delete(id) => {
            let name = component
                .listing
                .as_ref()
                .and_then(|l| l.documents.iter().find(|d| d.id == id))
                .map(|d| d.original_filename.clone())
                .unwrap_or_else(|| format!("document {}", id));
            if !confirm(&format!("Delete {}? This cannot be undone.", name)) {
                return false;
            }

            let api_key = ctx.props().api_key.to_string();
            let link = ctx.link().clone();
            spawn_local(async move {
                match api::delete_document(id, &api_key).await {
                    Ok(_) => link.send_message(Msg::Deleted(id)),
                    Err(e) => link.send_message(Msg::Failed(e)),
                }
            });
            false
        }
        Msg::Deleted(id) => {
            show_toast("Document deleted.");
            if component.selected.as_ref().map(|d| d.id) == Some(id) {
                ctx.link().send_message(Msg::Close);
            }
            let on_last_item = component
                .listing
                .as_ref()
                .map_or(false, |l| l.documents.len() == 1 && l.page > 1);
            let page = if on_last_item {
                component.current_page - 1
            } else {
                component.current_page
            };
            ctx.link().send_message(Msg::Load(page));
            false
        }
        Msg::Open(id) => {
            let link = ctx.link().clone();
            spawn_local(async move {
                match api::get_document(id).await {
                    Ok(response) => link.send_message(Msg::Opened(response.document)),
                    Err(e) => link.send_message(Msg::Failed(e)),
                }
            });
            false
        }
        Msg::Opened(document) => {
            component.select(document);
            open_sheet(&component.sheet_ref);
            true
        }
        Msg::Close => {
            close_sheet(&component.sheet_ref);
            component.selected = None;
            component.insight = None;
            true
        }
        Msg::SetDescription(value) => {
            component.edit_description = value;
            false
        }
        Msg::SetTags(value) => {
            component.edit_tags = value;
            false
        }
        Msg::SaveMetadata => {
            let Some(id) = component.selected.as_ref().map(|d| d.id) else {
                return false;
            };
            let update = MetadataUpdate {
                description: Some(component.edit_description.clone()),
                tags: Some(split_tags(&component.edit_tags)),
            };
            component.saving = true;

            let api_key = ctx.props().api_key.to_string();
            let link = ctx.link().clone();
            spawn_local(async move {
                match api::update_metadata(id, &update, &api_key).await {
                    Ok(response) => link.send_message(Msg::Saved(response.document)),
                    Err(e) => link.send_message(Msg::Failed(e)),
                }
            });
            true
        }
        Msg::Saved(document) => {
            component.saving = false;
            show_toast("Metadata saved.");
            component.select(document);
            ctx.link().send_message(Msg::Load(component.current_page));
            true
        }
        Msg::RequestInsight(kind) => {
            let Some(id) = component.selected.as_ref().map(|d| d.id) else {
                return false;
            };
            component.insight_loading = true;

            let api_key = ctx.props().api_key.to_string();
            let link = ctx.link().clone();
            spawn_local(async move {
                match api::insight(id, kind, &api_key).await {
                    Ok(insight) => link.send_message(Msg::InsightLoaded(insight)),
                    Err(e) => link.send_message(Msg::Failed(e)),
                }
            });
            true
        }
        Msg::InsightLoaded(insight) => {
            component.insight_loading = false;
            if let Some(error) = &insight.error {
                show_toast(error);
            }
            component.insight = Some(insight);
            true
        }
        Msg::Failed(message) => {
            component.loading = false;
            component.saving = false;
            component.insight_loading = false;
            show_toast(&message);
            true
        }
    }
}
