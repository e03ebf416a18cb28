use yew::{html, Callback, Component, Context, Html, MouseEvent, Properties};

/// Full-screen overlay used for confirmations and result viewers.
///
/// Visibility is driven entirely by the `open` prop; the owner keeps the
/// flag in its state and flips it in `update`.
pub struct YwMaterialTopSheet;

#[derive(Properties, PartialEq)]
pub struct Props {
    pub open: bool,
    #[prop_or_default]
    pub title: String,
    pub on_close: Callback<()>,
    #[prop_or_default]
    pub children: Html,
}

impl Component for YwMaterialTopSheet {
    type Message = ();
    type Properties = Props;

    fn create(_ctx: &Context<Self>) -> Self {
        Self
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let props = ctx.props();
        if !props.open {
            return html! {};
        }
        let on_close = props.on_close.reform(|_: MouseEvent| ());

        html! {
            <div class="top-sheet show" style="position:fixed;top:0;left:0;width:100vw;height:100vh;background:rgba(0,0,0,0.6);z-index:9999;display:flex;align-items:flex-start;justify-content:center;">
                <div class="top-sheet-panel" style="margin-top:48px;background:#fff;border-radius:6px;min-width:420px;max-width:80vw;max-height:80vh;overflow:auto;padding:20px;position:relative;">
                    <button
                        class="top-sheet-close"
                        onclick={on_close}
                        style="position:absolute;top:12px;right:12px;padding:0.25rem 0.75rem;font-size:1.25rem;background:#fff;border:none;cursor:pointer;"
                    >
                        { "✕" }
                    </button>
                    if !props.title.is_empty() {
                        <h3 style="margin-top:0;">{ props.title.clone() }</h3>
                    }
                    { props.children.clone() }
                </div>
            </div>
        }
    }
}
