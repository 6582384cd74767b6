use yew::{html, Callback, Component, Context, Html, MouseEvent, NodeRef, Properties};

/// A panel that slides down from the top of the page. Visibility is toggled
/// with `open_sheet` / `close_sheet` on the `node_ref` passed in.
pub struct Sheet;

#[derive(Properties, PartialEq)]
pub struct Props {
    #[prop_or_default]
    pub children: Html,
    pub node_ref: NodeRef,
    pub title: String,
    pub on_close: Callback<()>,
}

impl Component for Sheet {
    type Message = ();
    type Properties = Props;

    fn create(_ctx: &Context<Self>) -> Self {
        Self
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let props = ctx.props();
        let on_close = props.on_close.reform(|_: MouseEvent| ());

        html! {
            <div class="top-sheet" ref={props.node_ref.clone()}>
                <div class="top-sheet-header">
                    <h2>{ props.title.clone() }</h2>
                    <button class="icon-btn" title="Close" onclick={on_close}>{"✕"}</button>
                </div>
                <div class="top-sheet-body">
                    { props.children.clone() }
                </div>
            </div>
        }
    }
}

pub fn open_sheet(sheet_ref: &NodeRef) {
    if let Some(sheet) = sheet_ref.cast::<web_sys::HtmlElement>() {
        sheet.class_list().add_1("show").ok();
    }
}

pub fn close_sheet(sheet_ref: &NodeRef) {
    if let Some(sheet) = sheet_ref.cast::<web_sys::HtmlElement>() {
        sheet.class_list().remove_1("show").ok();
    }
}
