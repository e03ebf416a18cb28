//! Step-by-step form filling, for prospects opened from a tokenized link
//! and for bare PDF forms.
//!
//! One section per step. Answers are restored from the server on load and
//! saved back as the user goes; submitting a prospect application posts the
//! owners with their signatures and then the whole form.

use yew::prelude::*;

mod fields;
mod messages;
mod state;
mod update;
mod view;

pub use messages::Msg;
pub use state::{WizardPage, WizardSource};

#[derive(Properties, PartialEq)]
pub struct WizardProps {
    pub source: WizardSource,
}

impl Component for WizardPage {
    type Message = Msg;
    type Properties = WizardProps;

    fn create(_ctx: &Context<Self>) -> Self {
        WizardPage::new()
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        update::update(self, ctx, msg)
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        view::view(self, ctx)
    }

    fn rendered(&mut self, ctx: &Context<Self>, first_render: bool) {
        if first_render && !self.loaded {
            self.loaded = true;
            ctx.link().send_message(Msg::Load);
        }
    }
}
