//! Query page: ask a question about every stored document or a single one.
//!
//! The backend answers with 200 even when the AI could not help, so the
//! status badge and the fallback text come from `QueryResponse.status`.

use common::model::document::Document;
use common::model::query::{AnswerStatus, QueryResponse};
use common::requests::QueryRequest;
use web_sys::{HtmlSelectElement, HtmlTextAreaElement};
use yew::platform::spawn_local;
use yew::prelude::*;

use crate::api;
use crate::helpers::{render_markdown, show_toast, status_label};

const MIN_QUESTION_CHARS: usize = 3;
const DOCUMENT_CHOICES: u32 = 100;

pub enum Msg {
    DocumentsLoaded(Vec<Document>),
    SetQuestion(String),
    SelectDocument(Option<i64>),
    Ask,
    Answered(QueryResponse),
    Failed(String),
}

pub struct QueryComponent {
    documents: Vec<Document>,
    question: String,
    document_id: Option<i64>,
    asking: bool,
    response: Option<QueryResponse>,
}

impl Component for QueryComponent {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let link = ctx.link().clone();
        spawn_local(async move {
            match api::list_documents(1, DOCUMENT_CHOICES).await {
                Ok(listing) => link.send_message(Msg::DocumentsLoaded(listing.documents)),
                Err(e) => link.send_message(Msg::Failed(e)),
            }
        });

        Self {
            documents: Vec::new(),
            question: String::new(),
            document_id: None,
            asking: false,
            response: None,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::DocumentsLoaded(documents) => {
                self.documents = documents;
                true
            }
            Msg::SetQuestion(question) => {
                self.question = question;
                false
            }
            Msg::SelectDocument(id) => {
                self.document_id = id;
                false
            }
            Msg::Ask => {
                let question = self.question.trim().to_string();
                if question.chars().count() < MIN_QUESTION_CHARS {
                    show_toast("Please enter a longer question.");
                    return false;
                }
                self.asking = true;

                let request = QueryRequest {
                    query: question,
                    document_id: self.document_id,
                };
                let link = ctx.link().clone();
                spawn_local(async move {
                    match api::ask(&request).await {
                        Ok(response) => link.send_message(Msg::Answered(response)),
                        Err(e) => link.send_message(Msg::Failed(e)),
                    }
                });
                true
            }
            Msg::Answered(response) => {
                self.asking = false;
                self.response = Some(response);
                true
            }
            Msg::Failed(message) => {
                self.asking = false;
                show_toast(&message);
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();

        html! {
            <section class="query">
                <form onsubmit={link.callback(|e: SubmitEvent| { e.prevent_default(); Msg::Ask })}>
                    <label>{"Search in"}</label>
                    <select onchange={link.callback(|e: Event| {
                        let select: HtmlSelectElement = e.target_unchecked_into();
                        Msg::SelectDocument(select.value().parse().ok())
                    })}>
                        <option value="" selected={self.document_id.is_none()}>{"All documents"}</option>
                        { for self.documents.iter().map(|d| html! {
                            <option value={d.id.to_string()} selected={self.document_id == Some(d.id)}>
                                { d.original_filename.clone() }
                            </option>
                        }) }
                    </select>
                    <label>{"Question"}</label>
                    <textarea
                        rows="4"
                        placeholder="What would you like to know?"
                        value={self.question.clone()}
                        oninput={link.callback(|e: InputEvent| {
                            let input: HtmlTextAreaElement = e.target_unchecked_into();
                            Msg::SetQuestion(input.value())
                        })}
                    />
                    <button type="submit" disabled={self.asking}>
                        { if self.asking { "Thinking…" } else { "Ask" } }
                    </button>
                </form>
                { self.view_response() }
            </section>
        }
    }
}

impl QueryComponent {
    fn view_response(&self) -> Html {
        let Some(response) = &self.response else {
            return html! {};
        };
        let badge_class = if response.status == AnswerStatus::Answered { "ok" } else { "warn" };
        let answer = Html::from_html_unchecked(AttrValue::from(render_markdown(&response.answer)));

        html! {
            <div class="answer">
                <div class="answer-header">
                    <span class={classes!("badge", badge_class)}>{ status_label(response.status) }</span>
                    if let Some(model) = &response.model_used {
                        <span class="note">{ model.clone() }</span>
                    }
                </div>
                <div class="answer-body">{ answer }</div>
                if let Some(fallback) = &response.fallback {
                    <pre class="fallback">{ fallback.clone() }</pre>
                }
                <p class="note">
                    { format!("Searched {} document(s). {}", response.documents_searched, response.context_info) }
                </p>
                <ul class="sources">
                    { for response.document_info.iter().map(|d| html! {
                        <li><a href={format!("/api/documents/{}/file", d.id)} target="_blank">{ d.original_filename.clone() }</a></li>
                    }) }
                </ul>
            </div>
        }
    }
}
