//! Small utilities shared by the pages.
//!
//! - **User feedback**: `show_toast` for transient success/failure notices.
//! - **Rendering**: section descriptions are authored in markdown.
//! - **Formatting**: currency and percentage display.
//! - **Files**: reading an uploaded signature image into a data URL.
//! - **Navigation**: the leave-page prompt for unsaved template edits.

use base64::{engine::general_purpose, Engine as _};
use gloo_file::{futures::read_as_bytes, Blob};
use num_format::{Locale, ToFormattedString};
use pulldown_cmark::{html, Parser};
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{BeforeUnloadEvent, HtmlElement, HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement};
use yew::prelude::*;

/// Displays a temporary notification at the bottom of the screen.
///
/// Used after every request that changes server state, and for every
/// request failure. The toast removes itself after a few seconds.
pub fn show_toast(message: &str) {
    if let Some(window) = web_sys::window() {
        if let Some(document) = window.document() {
            if let (Ok(toast), Some(body)) = (document.create_element("div"), document.body()) {
                toast.set_text_content(Some(message));
                let html_toast: HtmlElement = toast.unchecked_into();
                html_toast.set_class_name("toast");
                let style = html_toast.style();
                style.set_property("position", "fixed").ok();
                style.set_property("bottom", "20px").ok();
                style.set_property("left", "50%").ok();
                style.set_property("transform", "translateX(-50%)").ok();
                style.set_property("background", "rgba(0, 0, 0, 0.8)").ok();
                style.set_property("color", "#fff").ok();
                style.set_property("padding", "10px 20px").ok();
                style.set_property("border-radius", "4px").ok();
                style.set_property("z-index", "10000").ok();
                style.set_property("font-family", "Arial, sans-serif").ok();

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

/// Renders admin-authored markdown (section descriptions, help text).
pub fn markdown(text: &str) -> Html {
    let mut output = String::new();
    html::push_html(&mut output, Parser::new(text));
    Html::from_html_unchecked(AttrValue::from(output))
}

/// `1234567.5` → `$1,234,567.50`
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let sign = if amount < 0.0 { "-" } else { "" };
    format!(
        "{sign}${}.{:02}",
        (cents / 100).to_formatted_string(&Locale::en),
        cents % 100
    )
}

/// `99.999` → `100%`, `33.3` → `33.3%`
pub fn format_percentage(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}%")
    } else {
        format!("{rounded}%")
    }
}

pub fn input_value(e: &InputEvent) -> String {
    e.target_unchecked_into::<HtmlInputElement>().value()
}

pub fn input_checked(e: &Event) -> bool {
    e.target_unchecked_into::<HtmlInputElement>().checked()
}

pub fn textarea_value(e: &InputEvent) -> String {
    e.target_unchecked_into::<HtmlTextAreaElement>().value()
}

pub fn select_value(e: &Event) -> String {
    e.target_unchecked_into::<HtmlSelectElement>().value()
}

/// First file picked in a file input, if any.
pub fn selected_file(e: &Event) -> Option<web_sys::File> {
    e.target_unchecked_into::<HtmlInputElement>()
        .files()
        .and_then(|files| files.get(0))
}

/// Reads an uploaded image into a `data:` URL, the same shape a drawn
/// signature is stored in.
pub async fn read_as_data_url(file: web_sys::File) -> Option<String> {
    let mime = file.type_();
    let mime = if mime.is_empty() { "image/png".to_string() } else { mime };
    let blob = Blob::from(file);
    let bytes = read_as_bytes(&blob).await.ok()?;
    Some(format!(
        "data:{mime};base64,{}",
        general_purpose::STANDARD.encode(&bytes)
    ))
}

/// Shared "there are unsaved edits" flag, read by [`UnsavedGuard`].
#[derive(Clone, Default)]
pub struct UnsavedFlag(Rc<Cell<bool>>);

impl UnsavedFlag {
    pub fn set(&self, dirty: bool) {
        self.0.set(dirty);
    }

    pub fn is_set(&self) -> bool {
        self.0.get()
    }

    /// Text handed to the browser's leave-page prompt, while edits are pending.
    pub fn leave_prompt(&self) -> Option<&'static str> {
        self.is_set().then_some("You have unsaved changes to this template.")
    }
}

/// `beforeunload` listener that makes the browser confirm leaving while
/// the flag is set. Removed again on drop.
pub struct UnsavedGuard {
    listener: Closure<dyn FnMut(BeforeUnloadEvent)>,
}

impl UnsavedGuard {
    pub fn install(flag: UnsavedFlag) -> Option<Self> {
        let window = web_sys::window()?;
        let listener = Closure::<dyn FnMut(BeforeUnloadEvent)>::new(move |event: BeforeUnloadEvent| {
            if let Some(prompt) = flag.leave_prompt() {
                event.prevent_default();
                event.set_return_value(prompt);
            }
        });
        window
            .add_event_listener_with_callback("beforeunload", listener.as_ref().unchecked_ref())
            .ok()?;
        Some(Self { listener })
    }
}

impl Drop for UnsavedGuard {
    fn drop(&mut self) {
        if let Some(window) = web_sys::window() {
            let _ = window.remove_event_listener_with_callback(
                "beforeunload",
                self.listener.as_ref().unchecked_ref(),
            );
        }
    }
}
