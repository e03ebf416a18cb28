//! Internal testing utilities: environment info, data reset, schema
//! comparison and sync, lookup-data export/import, test alerts and the
//! manual QA checklist.

use yew::prelude::*;

mod messages;
mod state;
mod storage;
mod update;
mod view;

pub use messages::Msg;
pub use state::TestingPage;

impl Component for TestingPage {
    type Message = Msg;
    type Properties = ();

    fn create(_ctx: &Context<Self>) -> Self {
        TestingPage::new(storage::load_checklist())
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
