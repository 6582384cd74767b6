//! Application shell: header with navigation, AI status and API key field,
//! and the page selected by the current path (`/`, `/upload`, `/query`).
//!
//! Navigation uses the History API so the backend's `index.html` fallback can
//! serve any of the three paths on reload.

use common::model::stats::Health;
use wasm_bindgen::JsValue;
use web_sys::HtmlInputElement;
use yew::platform::spawn_local;
use yew::prelude::*;

use crate::api;
use crate::components::documents::DocumentsComponent;
use crate::components::query::QueryComponent;
use crate::components::upload::UploadComponent;
use crate::helpers::{load_api_key, store_api_key};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Page {
    Documents,
    Upload,
    Query,
}

impl Page {
    pub fn from_path(path: &str) -> Self {
        match path.trim_end_matches('/') {
            "/upload" => Page::Upload,
            "/query" => Page::Query,
            _ => Page::Documents,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Page::Documents => "/",
            Page::Upload => "/upload",
            Page::Query => "/query",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Page::Documents => "Documents",
            Page::Upload => "Upload",
            Page::Query => "Ask",
        }
    }
}

pub enum Msg {
    Navigate(Page),
    SetApiKey(String),
    HealthLoaded(Health),
}

pub struct App {
    page: Page,
    api_key: String,
    health: Option<Health>,
}

impl Component for App {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let path = web_sys::window()
            .and_then(|w| w.location().pathname().ok())
            .unwrap_or_default();

        let link = ctx.link().clone();
        spawn_local(async move {
            if let Ok(health) = api::health().await {
                link.send_message(Msg::HealthLoaded(health));
            }
        });

        Self {
            page: Page::from_path(&path),
            api_key: load_api_key(),
            health: None,
        }
    }

    fn update(&mut self, _ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Navigate(page) => {
                if page == self.page {
                    return false;
                }
                if let Some(history) = web_sys::window().and_then(|w| w.history().ok()) {
                    history
                        .push_state_with_url(&JsValue::NULL, "", Some(page.path()))
                        .ok();
                }
                self.page = page;
                true
            }
            Msg::SetApiKey(key) => {
                let key = key.trim().to_string();
                store_api_key(&key);
                self.api_key = key;
                true
            }
            Msg::HealthLoaded(health) => {
                self.health = Some(health);
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let api_key = AttrValue::from(self.api_key.clone());

        html! {
            <div class="app">
                <header class="app-header">
                    <h1>{"PDF Query"}</h1>
                    <nav class="tab-bar">
                        { for [Page::Documents, Page::Upload, Page::Query].into_iter().map(|page| html! {
                            <button
                                class={classes!("tab-btn", (page == self.page).then_some("active"))}
                                onclick={link.callback(move |_| Msg::Navigate(page))}
                            >
                                { page.label() }
                            </button>
                        }) }
                    </nav>
                    { self.view_ai_badge() }
                    <input
                        class="api-key"
                        type="password"
                        placeholder="API key"
                        value={self.api_key.clone()}
                        onchange={link.callback(|e: Event| {
                            let input: HtmlInputElement = e.target_unchecked_into();
                            Msg::SetApiKey(input.value())
                        })}
                    />
                </header>
                <main>
                    {
                        match self.page {
                            Page::Documents => html! { <DocumentsComponent api_key={api_key} /> },
                            Page::Upload => html! { <UploadComponent api_key={api_key} /> },
                            Page::Query => html! { <QueryComponent /> },
                        }
                    }
                </main>
            </div>
        }
    }
}

impl App {
    fn view_ai_badge(&self) -> Html {
        match &self.health {
            Some(health) if health.ai_available => html! {
                <span class="badge ok" title="AI provider configured">
                    { format!("AI: {}", health.provider.clone().unwrap_or_default()) }
                </span>
            },
            Some(_) => html! {
                <span class="badge warn" title="No AI credential configured">{"AI unavailable"}</span>
            },
            None => html! {},
        }
    }
}
