//! Small utilities shared by the pages: toasts, formatting, markdown rendering
//! and the locally remembered API key.

use common::model::query::AnswerStatus;
use num_format::{Locale, ToFormattedString};
use pulldown_cmark::{html, Event, Parser};
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

const API_KEY_STORAGE: &str = "pdfquery_api_key";

/// Displays a temporary notification at the bottom of the screen. The toast
/// removes itself after three seconds.
pub fn show_toast(message: &str) {
    if let Some(window) = web_sys::window() {
        if let Some(document) = window.document() {
            if let (Ok(toast), Some(body)) = (document.create_element("div"), document.body()) {
                toast.set_text_content(Some(message));
                toast.set_class_name("toast");
                let html_toast: HtmlElement = toast.unchecked_into();

                if body.append_child(&html_toast).is_ok() {
                    wasm_bindgen_futures::spawn_local(async move {
                        gloo_timers::future::TimeoutFuture::new(3000).await;
                        if let Some(parent) = html_toast.parent_node() {
                            parent.remove_child(&html_toast).ok();
                        }
                    });
                }
            }
        }
    }
}

/// Asks the user to confirm a destructive action. Anything but an explicit
/// "OK" counts as no.
pub fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}

pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;

    let value = bytes as f64;
    if value < KB {
        format!("{} B", bytes)
    } else if value < MB {
        format!("{:.1} KB", value / KB)
    } else {
        format!("{:.1} MB", value / MB)
    }
}

pub fn format_count(count: u64) -> String {
    count.to_formatted_string(&Locale::en)
}

/// The date part of an RFC 3339 timestamp.
pub fn format_date(timestamp: &str) -> &str {
    timestamp.split('T').next().unwrap_or(timestamp)
}

/// Turns a failed response into a message: the backend's `error` field when
/// the body carries one.
pub fn error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| format!("Request failed with status {}", status))
}

pub fn status_label(status: AnswerStatus) -> &'static str {
    match status {
        AnswerStatus::Answered => "Answered",
        AnswerStatus::Unavailable => "AI unavailable",
        AnswerStatus::Degraded => "AI error",
        AnswerStatus::NoContent => "No readable text",
        AnswerStatus::NoDocuments => "No documents",
    }
}

/// Renders model output as HTML. Raw HTML in the source is shown as text.
pub fn render_markdown(source: &str) -> String {
    let parser = Parser::new(source).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });
    let mut output = String::new();
    html::push_html(&mut output, parser);
    output
}

pub fn split_tags(raw: &str) -> Vec<String> {
    common::model::document::split_tags(raw)
}

pub fn load_api_key() -> String {
    local_storage()
        .and_then(|s| s.get_item(API_KEY_STORAGE).ok().flatten())
        .unwrap_or_default()
}

pub fn store_api_key(key: &str) {
    if let Some(storage) = local_storage() {
        if key.is_empty() {
            storage.remove_item(API_KEY_STORAGE).ok();
        } else {
            storage.set_item(API_KEY_STORAGE, key).ok();
        }
    }
}

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_are_human_readable() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn counts_get_separators() {
        assert_eq!(format_count(1234567), "1,234,567");
        assert_eq!(format_count(12), "12");
    }

    #[test]
    fn dates_drop_the_time() {
        assert_eq!(format_date("2024-03-01T10:20:30.000Z"), "2024-03-01");
        assert_eq!(format_date("yesterday"), "yesterday");
    }

    #[test]
    fn backend_error_text_is_preferred() {
        assert_eq!(
            error_message(400, r#"{"error":"Empty file not allowed"}"#),
            "Empty file not allowed"
        );
        assert_eq!(error_message(502, "<html>"), "Request failed with status 502");
    }

    #[test]
    fn markdown_does_not_pass_raw_html() {
        let html = render_markdown("**Revenue** grew <script>alert(1)</script>");
        assert!(html.contains("<strong>Revenue</strong>"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
