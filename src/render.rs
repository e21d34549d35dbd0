use crate::api::ProfileApi;
use crate::cards::{Card, CardKind, CardProps, all_cards};
use crate::controller::{PageView, ProfileController};
use crate::error::ProfileError;
use crate::profile::{Connections, ProfileRecord};
use handlebars::Handlebars;
use log::debug;
use serde_json::json;
use std::collections::HashMap;

const PAGE_TEMPLATE: &str = "page";
const PERMISSIONS_PARTIAL: &str = "permissions";

/// Handlebars registry holding the page layout and every card template
pub struct Renderer {
    registry: Handlebars<'static>,
}

impl Renderer {
    pub fn new(cards: &[Box<dyn Card>]) -> Result<Self, ProfileError> {
        let mut registry = Handlebars::new();
        registry.register_template_string(PAGE_TEMPLATE, include_str!("templates/page.hbs"))?;
        registry.register_partial(
            PERMISSIONS_PARTIAL,
            include_str!("templates/permissions.hbs"),
        )?;
        for card in cards {
            let (name, source) = card.template();
            registry.register_template_string(name, source)?;
        }
        Ok(Renderer { registry })
    }

    pub fn render_card(&self, card: &dyn Card, props: &CardProps) -> Result<String, ProfileError> {
        let (name, _) = card.template();
        Ok(self.registry.render(name, &card.context(props))?)
    }

    pub fn render_page(&self, context: &serde_json::Value) -> Result<String, ProfileError> {
        Ok(self.registry.render(PAGE_TEMPLATE, context)?)
    }
}

// Inputs of the last render, kept to decide which cards changed.
struct LastRender {
    record: ProfileRecord,
    connections: Connections,
    edit_mode: bool,
    is_profile_owner: bool,
    active_course_id: Option<u32>,
}

/// Profile page composed from the cards
///
/// Card HTML is cached between renders; a card is rendered again only when
/// its slice of the record changed or edit mode flipped.
pub struct ProfilePage {
    renderer: Renderer,
    cards: Vec<Box<dyn Card>>,
    cache: HashMap<CardKind, String>,
    last: Option<LastRender>,
    rendered: Vec<CardKind>,
}

impl ProfilePage {
    pub fn new() -> Result<Self, ProfileError> {
        let cards = all_cards();
        let renderer = Renderer::new(&cards)?;
        Ok(ProfilePage {
            renderer,
            cards,
            cache: HashMap::new(),
            last: None,
            rendered: Vec::new(),
        })
    }

    /// Cards that were actually re-rendered by the last call to `render`
    pub fn last_rendered(&self) -> &[CardKind] {
        &self.rendered
    }

    /// Drop cached card HTML, forcing a full render next time
    pub fn invalidate(&mut self) {
        self.cache.clear();
        self.last = None;
    }

    pub fn render<A: ProfileApi>(
        &mut self,
        controller: &ProfileController<A>,
    ) -> Result<String, ProfileError> {
        self.rendered.clear();

        let record = match (controller.view(), controller.record()) {
            (PageView::Ready, Some(record)) => record,
            (view, _) => {
                self.invalidate();
                return self.renderer.render_page(&json!({ "view": view }));
            }
        };

        let props = CardProps {
            record,
            connections: controller.connections(),
            edit_mode: controller.is_editing(),
            is_profile_owner: controller.is_profile_owner(),
            active_course_id: controller.active_course_id(),
        };

        let mut sections = Vec::with_capacity(self.cards.len());
        for card in &self.cards {
            let stale = match &self.last {
                None => true,
                Some(last) => {
                    let prev = CardProps {
                        record: &last.record,
                        connections: &last.connections,
                        edit_mode: last.edit_mode,
                        is_profile_owner: last.is_profile_owner,
                        active_course_id: last.active_course_id,
                    };
                    prev.edit_mode != props.edit_mode || card.slice_changed(&prev, &props)
                }
            };

            if stale || !self.cache.contains_key(&card.kind()) {
                let html = if card.is_visible(&props) {
                    self.renderer.render_card(card.as_ref(), &props)?
                } else {
                    String::new()
                };
                self.cache.insert(card.kind(), html);
                self.rendered.push(card.kind());
            }

            if let Some(html) = self.cache.get(&card.kind()) {
                if !html.is_empty() {
                    sections.push(html.clone());
                }
            }
        }
        debug!("Re-rendered {} of {} cards", self.rendered.len(), self.cards.len());

        self.last = Some(LastRender {
            record: record.clone(),
            connections: props.connections.clone(),
            edit_mode: props.edit_mode,
            is_profile_owner: props.is_profile_owner,
            active_course_id: props.active_course_id,
        });

        let notice = controller.notice();
        self.renderer.render_page(&json!({
            "view": PageView::Ready,
            "github_id": record.github_id(),
            "editing": props.edit_mode,
            "is_profile_owner": props.is_profile_owner,
            "save_visible": controller.is_save_visible(),
            "notice": notice.map(|n| n.message()),
            "notice_is_error": notice.is_some_and(|n| n.is_error()),
            "sections": sections,
        }))
    }
}
