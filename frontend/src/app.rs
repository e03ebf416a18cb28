//! Top-level page selection.
//!
//! The host serves the same bundle for every path, so the page is picked
//! from `window.location.pathname`:
//! - `/apply/{token}`: prospect application wizard
//! - `/pdf-forms/{id}`: the same wizard over a bare PDF form
//! - `/testing`: testing utilities
//! - anything else: template administration

use crate::components::templates::TemplatesPage;
use crate::components::testing::TestingPage;
use crate::components::wizard::{WizardPage, WizardSource};
use yew::{html, Component, Context, Html};

#[derive(Debug, Clone, PartialEq)]
pub enum Page {
    Templates,
    Wizard(String),
    PdfForm(i64),
    Testing,
}

impl Page {
    pub fn from_path(path: &str) -> Self {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            ["apply", token] => Page::Wizard(token.to_string()),
            ["pdf-forms", id] => id.parse().map(Page::PdfForm).unwrap_or(Page::Templates),
            ["testing"] => Page::Testing,
            _ => Page::Templates,
        }
    }
}

pub struct App {
    page: Page,
}

impl Component for App {
    type Message = ();
    type Properties = ();

    fn create(_ctx: &Context<Self>) -> Self {
        let path = web_sys::window()
            .and_then(|w| w.location().pathname().ok())
            .unwrap_or_default();
        Self {
            page: Page::from_path(&path),
        }
    }

    fn view(&self, _ctx: &Context<Self>) -> Html {
        html! {
            <div class="app-root">
                {
                    match &self.page {
                        Page::Templates => html! { <TemplatesPage /> },
                        Page::Wizard(token) => html! {
                            <WizardPage source={WizardSource::Prospect(token.clone())} />
                        },
                        Page::PdfForm(id) => html! {
                            <WizardPage source={WizardSource::PdfForm(*id)} />
                        },
                        Page::Testing => html! { <TestingPage /> },
                    }
                }
            </div>
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Page;

    #[test]
    fn picks_page_from_path() {
        assert_eq!(Page::from_path("/apply/tok-123"), Page::Wizard("tok-123".into()));
        assert_eq!(Page::from_path("/pdf-forms/42"), Page::PdfForm(42));
        assert_eq!(Page::from_path("/pdf-forms/abc"), Page::Templates);
        assert_eq!(Page::from_path("/testing/"), Page::Testing);
        assert_eq!(Page::from_path("/"), Page::Templates);
        assert_eq!(Page::from_path("/admin/templates"), Page::Templates);
    }
}
