//! Documents page: paginated listing with totals, a detail sheet per
//! document (full text, metadata editor, AI summary and keywords) and delete.

use yew::prelude::*;

mod messages;
mod state;
mod update;
mod view;

pub use messages::Msg;
pub use state::DocumentsComponent;

#[derive(Properties, PartialEq, Clone)]
pub struct DocumentsProps {
    /// Sent as `X-API-Key` on requests that change data. Empty means none.
    #[prop_or_default]
    pub api_key: AttrValue,
}

impl Component for DocumentsComponent {
    type Message = Msg;
    type Properties = DocumentsProps;

    fn create(ctx: &Context<Self>) -> Self {
        ctx.link().send_message(Msg::Load(1));
        DocumentsComponent::new()
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        update::update(self, ctx, msg)
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        view::view(self, ctx)
    }
}
