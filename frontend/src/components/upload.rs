//! Upload page: PDF picker with optional description and tags.
//!
//! After a successful upload the stored document is shown, and when the
//! backend scheduled an enrichment job its status is polled until it
//! finishes.

use common::jobs::JobStatus;
use common::model::document::UploadResponse;
use gloo_timers::future::TimeoutFuture;
use web_sys::{FormData, HtmlInputElement, HtmlTextAreaElement};
use yew::platform::spawn_local;
use yew::prelude::*;

use crate::api;
use crate::helpers::{format_size, show_toast};

const JOB_POLL_MS: u32 = 1500;
const JOB_POLL_ATTEMPTS: u32 = 40;

pub enum Msg {
    SetDescription(String),
    SetTags(String),
    Submit,
    Uploaded(UploadResponse),
    Failed(String),
    JobUpdated(JobStatus),
}

#[derive(Properties, PartialEq, Clone)]
pub struct UploadProps {
    #[prop_or_default]
    pub api_key: AttrValue,
}

pub struct UploadComponent {
    file_ref: NodeRef,
    description: String,
    tags: String,
    uploading: bool,
    result: Option<UploadResponse>,
    job: Option<JobStatus>,
}

impl Component for UploadComponent {
    type Message = Msg;
    type Properties = UploadProps;

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            file_ref: NodeRef::default(),
            description: String::new(),
            tags: String::new(),
            uploading: false,
            result: None,
            job: None,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::SetDescription(value) => {
                self.description = value;
                false
            }
            Msg::SetTags(value) => {
                self.tags = value;
                false
            }
            Msg::Submit => {
                let Some(file) = self
                    .file_ref
                    .cast::<HtmlInputElement>()
                    .and_then(|input| input.files())
                    .and_then(|files| files.get(0))
                else {
                    show_toast("Choose a PDF file first.");
                    return false;
                };
                if !file.name().to_lowercase().ends_with(".pdf") {
                    show_toast("Only PDF files can be uploaded.");
                    return false;
                }

                let Some(form) = build_form(&file, &self.description, &self.tags) else {
                    show_toast("Could not prepare the upload.");
                    return false;
                };

                self.uploading = true;
                self.result = None;
                self.job = None;

                let api_key = ctx.props().api_key.to_string();
                let link = ctx.link().clone();
                spawn_local(async move {
                    match api::upload(form, &api_key).await {
                        Ok(response) => link.send_message(Msg::Uploaded(response)),
                        Err(e) => link.send_message(Msg::Failed(e)),
                    }
                });
                true
            }
            Msg::Uploaded(response) => {
                self.uploading = false;
                show_toast(&response.message);

                if let Some(job_id) = response.enrichment_job_id.clone() {
                    self.job = Some(JobStatus::Pending);
                    let link = ctx.link().clone();
                    spawn_local(async move {
                        for _ in 0..JOB_POLL_ATTEMPTS {
                            TimeoutFuture::new(JOB_POLL_MS).await;
                            match api::job(&job_id).await {
                                Ok(status) => {
                                    let finished = status.is_finished();
                                    link.send_message(Msg::JobUpdated(status));
                                    if finished {
                                        break;
                                    }
                                }
                                Err(e) => {
                                    gloo_console::warn!(format!("Polling job {} failed: {}", job_id, e));
                                    break;
                                }
                            }
                        }
                    });
                }

                self.description.clear();
                self.tags.clear();
                if let Some(input) = self.file_ref.cast::<HtmlInputElement>() {
                    input.set_value("");
                }
                self.result = Some(response);
                true
            }
            Msg::Failed(message) => {
                self.uploading = false;
                show_toast(&message);
                true
            }
            Msg::JobUpdated(status) => {
                self.job = Some(status);
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();

        html! {
            <section class="upload">
                <form onsubmit={link.callback(|e: SubmitEvent| { e.prevent_default(); Msg::Submit })}>
                    <label>{"PDF file"}</label>
                    <input type="file" accept=".pdf,application/pdf" ref={self.file_ref.clone()} />
                    <label>{"Description (optional)"}</label>
                    <textarea
                        rows="3"
                        value={self.description.clone()}
                        oninput={link.callback(|e: InputEvent| {
                            let input: HtmlTextAreaElement = e.target_unchecked_into();
                            Msg::SetDescription(input.value())
                        })}
                    />
                    <label>{"Tags (comma separated)"}</label>
                    <input
                        type="text"
                        value={self.tags.clone()}
                        oninput={link.callback(|e: InputEvent| {
                            let input: HtmlInputElement = e.target_unchecked_into();
                            Msg::SetTags(input.value())
                        })}
                    />
                    <button type="submit" disabled={self.uploading}>
                        { if self.uploading { "Uploading…" } else { "Upload" } }
                    </button>
                </form>
                { self.view_result() }
            </section>
        }
    }
}

impl UploadComponent {
    fn view_result(&self) -> Html {
        let Some(result) = &self.result else {
            return html! {};
        };
        let document = &result.document;

        html! {
            <div class="upload-result">
                <h3>{ document.original_filename.clone() }</h3>
                <p class="meta">
                    { format!("{} · {} pages · extraction {}",
                        format_size(document.file_size),
                        document.page_count,
                        document.extraction_status.as_str()) }
                </p>
                { self.view_job() }
            </div>
        }
    }

    fn view_job(&self) -> Html {
        let text = match &self.job {
            None => return html! {},
            Some(JobStatus::Pending) => "Generating summary and keywords…".to_string(),
            Some(JobStatus::InProgress(step)) => format!("Generating summary and keywords ({}/2)…", step),
            Some(JobStatus::Completed(message)) => message.clone(),
            Some(JobStatus::Failed(message)) => format!("Enrichment failed: {}", message),
        };
        html! { <p class="note">{ text }</p> }
    }
}

fn build_form(file: &web_sys::File, description: &str, tags: &str) -> Option<FormData> {
    let form = FormData::new().ok()?;
    form.append_with_blob_and_filename("file", file, &file.name()).ok()?;
    if !description.trim().is_empty() {
        form.append_with_str("description", description).ok()?;
    }
    if !tags.trim().is_empty() {
        form.append_with_str("tags", tags).ok()?;
    }
    Some(form)
}
