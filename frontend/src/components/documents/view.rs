use common::model::document::{Document, ExtractionStatus};
use web_sys::{HtmlInputElement, HtmlTextAreaElement};
use yew::html::Scope;
use yew::prelude::*;

use crate::api::InsightKind;
use crate::components::sheet::Sheet;
use crate::helpers::{format_count, format_date, format_size, render_markdown};

use super::messages::Msg;
use super::state::DocumentsComponent;

pub fn view(component: &DocumentsComponent, ctx: &Context<DocumentsComponent>) -> Html {
    let link = ctx.link();

    html! {
        <section class="documents">
            { build_stats(component) }
            { build_table(component, link) }
            { build_pagination(component, link) }
            <Sheet
                node_ref={component.sheet_ref.clone()}
                title={component.selected.as_ref().map(|d| d.original_filename.clone()).unwrap_or_default()}
                on_close={link.callback(|_| Msg::Close)}
            >
                { component.selected.as_ref().map(|d| build_details(component, d, link)).unwrap_or_default() }
            </Sheet>
        </section>
    }
}

fn build_stats(component: &DocumentsComponent) -> Html {
    let Some(stats) = &component.stats else {
        return html! {};
    };
    html! {
        <div class="stats-bar">
            <span>{ format!("{} documents", format_count(stats.total_documents)) }</span>
            <span>{ format!("{} pages", format_count(stats.total_pages)) }</span>
            <span>{ format!("{:.2} MB stored", stats.total_size_mb) }</span>
        </div>
    }
}

fn build_table(component: &DocumentsComponent, link: &Scope<DocumentsComponent>) -> Html {
    let documents = component
        .listing
        .as_ref()
        .map(|l| l.documents.as_slice())
        .unwrap_or_default();

    if documents.is_empty() {
        let text = if component.loading {
            "Loading…"
        } else {
            "No documents yet. Upload a PDF to get started."
        };
        return html! { <p class="empty">{ text }</p> };
    }

    html! {
        <table class="documents-table">
            <thead>
                <tr>
                    <th>{"File"}</th>
                    <th>{"Size"}</th>
                    <th>{"Pages"}</th>
                    <th>{"Uploaded"}</th>
                    <th>{"Tags"}</th>
                    <th></th>
                </tr>
            </thead>
            <tbody>
                { for documents.iter().map(|d| build_row(d, link)) }
            </tbody>
        </table>
    }
}

fn build_row(document: &Document, link: &Scope<DocumentsComponent>) -> Html {
    let id = document.id;
    html! {
        <tr>
            <td>
                <div class="file-name">{ document.original_filename.clone() }</div>
                <div class="preview">{ document.content.clone() }</div>
                { extraction_note(document.extraction_status) }
            </td>
            <td>{ format_size(document.file_size) }</td>
            <td>{ document.page_count.to_string() }</td>
            <td>{ format_date(&document.created_at).to_string() }</td>
            <td>{ for document.tags.iter().map(|t| html! { <span class="tag">{ t.clone() }</span> }) }</td>
            <td class="actions">
                <button onclick={link.callback(move |_| Msg::Open(id))}>{"Details"}</button>
                <a href={format!("/api/documents/{}/file", id)} target="_blank">{"PDF"}</a>
                <button class="danger" onclick={link.callback(move |_| Msg::Delete(id))}>{"Delete"}</button>
            </td>
        </tr>
    }
}

fn extraction_note(status: ExtractionStatus) -> Html {
    match status {
        ExtractionStatus::Ok => html! {},
        ExtractionStatus::Empty => html! { <div class="note">{"No text layer found"}</div> },
        ExtractionStatus::Failed => html! { <div class="note warn">{"Text could not be extracted"}</div> },
    }
}

fn build_pagination(component: &DocumentsComponent, link: &Scope<DocumentsComponent>) -> Html {
    let Some(listing) = &component.listing else {
        return html! {};
    };
    if listing.pages <= 1 {
        return html! {};
    }
    let page = component.current_page;

    html! {
        <div class="pagination">
            <button disabled={page <= 1} onclick={link.callback(move |_| Msg::Load(page - 1))}>{"Previous"}</button>
            <span>{ format!("Page {} of {}", listing.page, listing.pages) }</span>
            <button disabled={!component.has_next_page()} onclick={link.callback(move |_| Msg::Load(page + 1))}>{"Next"}</button>
        </div>
    }
}

fn build_details(
    component: &DocumentsComponent,
    document: &Document,
    link: &Scope<DocumentsComponent>,
) -> Html {
    html! {
        <div class="details">
            <p class="meta">
                { format!("{} · {} pages · uploaded {} · MD5 {}",
                    format_size(document.file_size),
                    document.page_count,
                    format_date(&document.created_at),
                    document.checksum) }
            </p>

            <form class="metadata" onsubmit={link.callback(|e: SubmitEvent| { e.prevent_default(); Msg::SaveMetadata })}>
                <label>{"Description"}</label>
                <textarea
                    rows="3"
                    value={component.edit_description.clone()}
                    oninput={link.callback(|e: InputEvent| {
                        let input: HtmlTextAreaElement = e.target_unchecked_into();
                        Msg::SetDescription(input.value())
                    })}
                />
                <label>{"Tags (comma separated)"}</label>
                <input
                    type="text"
                    value={component.edit_tags.clone()}
                    oninput={link.callback(|e: InputEvent| {
                        let input: HtmlInputElement = e.target_unchecked_into();
                        Msg::SetTags(input.value())
                    })}
                />
                <button type="submit" disabled={component.saving}>{"Save"}</button>
            </form>

            <div class="insights">
                <button
                    disabled={component.insight_loading}
                    onclick={link.callback(|_| Msg::RequestInsight(InsightKind::Summary))}
                >{"Summarize"}</button>
                <button
                    disabled={component.insight_loading}
                    onclick={link.callback(|_| Msg::RequestInsight(InsightKind::Keywords))}
                >{"Keywords"}</button>
                { build_insight(component) }
            </div>

            <h3>{"Extracted text"}</h3>
            <pre class="content">{ document.content.clone() }</pre>
        </div>
    }
}

fn build_insight(component: &DocumentsComponent) -> Html {
    if component.insight_loading {
        return html! { <p class="note">{"Asking the AI…"}</p> };
    }
    let Some(insight) = &component.insight else {
        return html! {};
    };

    let summary = insight.summary.as_deref().map(|s| {
        Html::from_html_unchecked(AttrValue::from(render_markdown(s)))
    });
    html! {
        <div class="insight">
            { summary.unwrap_or_default() }
            {
                for insight.keywords.iter().flatten().map(|k| html! { <span class="tag">{ k.clone() }</span> })
            }
        </div>
    }
}
