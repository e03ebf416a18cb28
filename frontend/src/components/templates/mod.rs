//! Template administration: list, create, edit, duplicate, (de)activate and
//! delete acquirer application templates.
//!
//! Layout follows the usual component split: `state` holds the page and
//! editor structs, `update` the message handling, `view` and `field_editor`
//! the rendering, and `helpers` the pure editing operations.

use yew::prelude::*;

use crate::helpers::UnsavedGuard;

mod field_editor;
mod helpers;
mod messages;
mod state;
mod update;
mod view;

pub use messages::Msg;
pub use state::TemplatesPage;

impl Component for TemplatesPage {
    type Message = Msg;
    type Properties = ();

    fn create(_ctx: &Context<Self>) -> Self {
        TemplatesPage::new()
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
            self.leave_guard = UnsavedGuard::install(self.unsaved.clone());
            ctx.link().send_message(Msg::Load);
        }
    }
}
