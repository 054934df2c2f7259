//! Scene machine.
//!
//! One transition function for the whole conversation:
//! `(current scene, event, guards(session)) -> (next scene, effects)`.
//!
//! Global commands (restart, back, refresh, home) are handled before the
//! current scene sees the event. Everything else is dispatched on the
//! `(scene, event)` pair, with free-form input routed by the session's
//! pending-input sub-state. Forward moves must follow an edge declared in
//! the scene graph; entering a scene evaluates its guards and redirects to
//! the first failing guard's recovery scene.
//!
//! The machine is pure. It mutates the session it is given and describes
//! I/O as [`SceneEffect`]s for the caller to run.

use super::directive::{Notice, RenderDirective, Transition, TransitionKind};
use super::effect::{OrderDraft, SceneEffect};
use super::event::{CatalogLookup, ConversationEvent, MenuItem, SettingsItem};
use super::graph;
use super::guards;
use super::Scene;
use crate::domain::cart::MAX_ITEM_QUANTITY;
use crate::domain::catalog::{BranchSnapshot, CategorySnapshot, ProductSnapshot};
use crate::domain::foundation::{Language, StateMachine};
use crate::domain::session::{
    normalize_phone, DeliveryAddress, DeliveryType, OrderTime, PendingInput, ProductQuantities,
    Session,
};

/// Default bound on the visited-scenes stack.
pub const DEFAULT_HISTORY_DEPTH: usize = 10;

/// Longest display name accepted.
pub const MAX_NAME_CHARS: usize = 64;

/// Guard redirects followed before giving up and restarting onboarding.
const MAX_REDIRECTS: usize = 4;

/// Drives sessions through the scene graph.
#[derive(Debug, Clone)]
pub struct SceneMachine {
    default_language: Language,
    max_history_depth: usize,
}

impl Default for SceneMachine {
    fn default() -> Self {
        Self::new(Language::default(), DEFAULT_HISTORY_DEPTH)
    }
}

/// How the visited-scenes stack changes on arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Navigation {
    Push,
    Pop,
    Reset,
    Keep,
}

/// Where a scene handler wants to go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    /// Follow a declared edge.
    Go(Scene),
    /// Return to an interrupted destination if there is one, else `Go`.
    Advance(Scene),
    Stay,
    Ignore,
}

/// A scene handler's decision.
#[derive(Debug)]
struct Step {
    outcome: Outcome,
    notice: Option<Notice>,
    effects: Vec<SceneEffect>,
}

impl Step {
    fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            notice: None,
            effects: Vec::new(),
        }
    }

    fn go(scene: Scene) -> Self {
        Self::new(Outcome::Go(scene))
    }

    fn advance(scene: Scene) -> Self {
        Self::new(Outcome::Advance(scene))
    }

    fn stay() -> Self {
        Self::new(Outcome::Stay)
    }

    fn reject(notice: Notice) -> Self {
        Self::stay().with_notice(notice)
    }

    fn ignore() -> Self {
        Self::new(Outcome::Ignore)
    }

    fn with_notice(mut self, notice: Notice) -> Self {
        self.notice = Some(notice);
        self
    }

    fn with_effect(mut self, effect: SceneEffect) -> Self {
        self.effects.push(effect);
        self
    }
}

impl SceneMachine {
    pub fn new(default_language: Language, max_history_depth: usize) -> Self {
        Self {
            default_language,
            max_history_depth: max_history_depth.max(1),
        }
    }

    /// Handles one event against the session.
    ///
    /// Never fails: events that do not apply leave the session untouched and
    /// re-render the current scene.
    pub fn handle_event(
        &self,
        session: &mut Session,
        event: &ConversationEvent,
        lookup: &CatalogLookup,
    ) -> Transition {
        let from = session.current_scene();

        match event {
            ConversationEvent::Restart => {
                session.reset(self.default_language);
                return self.arrive(
                    session,
                    from,
                    Scene::LanguageSelect,
                    TransitionKind::Restart,
                    Navigation::Reset,
                    Step::stay(),
                );
            }
            ConversationEvent::Back => {
                return match graph::back_target(&session.scene) {
                    Some(target) => self.arrive(
                        session,
                        from,
                        target,
                        TransitionKind::Back,
                        Navigation::Pop,
                        Step::stay(),
                    ),
                    None => self.ignored(session, from),
                };
            }
            ConversationEvent::Refresh => {
                return self.arrive(
                    session,
                    from,
                    from,
                    TransitionKind::Reenter,
                    Navigation::Keep,
                    Step::stay(),
                );
            }
            ConversationEvent::Home => {
                return self.arrive(
                    session,
                    from,
                    Scene::MainMenu,
                    TransitionKind::Forward,
                    Navigation::Reset,
                    Step::stay(),
                );
            }
            _ => {}
        }

        let pending = session
            .scene
            .pending
            .filter(|input| input.is_owned_by(from));

        let step = match (pending, event) {
            (
                Some(input),
                ConversationEvent::Text { .. }
                | ConversationEvent::Contact { .. }
                | ConversationEvent::Location { .. },
            ) => self.on_input(session, from, input, event),
            _ => self.on_event(session, from, event, lookup),
        };

        self.conclude(session, from, step)
    }

    /// Enters `scene` directly, bypassing edge validation.
    ///
    /// Used to render a session's first scene and by callers that need to
    /// place a session somewhere explicitly. Guards still apply.
    pub fn enter(&self, session: &mut Session, scene: Scene) -> Transition {
        let from = session.current_scene();
        self.arrive(
            session,
            from,
            scene,
            TransitionKind::Forward,
            Navigation::Push,
            Step::stay(),
        )
    }

    /// Directive for the session's current scene, without changing anything.
    pub fn render(&self, session: &Session, notice: Option<Notice>) -> RenderDirective {
        let scene = session.current_scene();
        let node = graph::node(scene);
        RenderDirective {
            scene,
            breadcrumbs: if node.shows_breadcrumbs {
                graph::breadcrumbs(scene)
            } else {
                Vec::new()
            },
            prompt: session.scene.pending,
            can_go_back: graph::back_target(&session.scene).is_some(),
            notice,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Arrival
    // ─────────────────────────────────────────────────────────────────────────

    fn conclude(&self, session: &mut Session, from: Scene, step: Step) -> Transition {
        match step.outcome {
            Outcome::Go(target) => self.forward(session, from, target, step),
            Outcome::Advance(natural) => match session.scene.resume.take() {
                Some(resume) if resume != from => self.arrive(
                    session,
                    from,
                    resume,
                    TransitionKind::Resume,
                    Navigation::Push,
                    step,
                ),
                _ => self.forward(session, from, natural, step),
            },
            Outcome::Stay => Transition {
                from,
                to: from,
                kind: TransitionKind::Stay,
                directive: self.render(session, step.notice),
                effects: step.effects,
            },
            Outcome::Ignore => self.ignored(session, from),
        }
    }

    fn forward(&self, session: &mut Session, from: Scene, target: Scene, step: Step) -> Transition {
        if from.transition_to(target).is_err() {
            return self.ignored(session, from);
        }
        self.arrive(
            session,
            from,
            target,
            TransitionKind::Forward,
            Navigation::Push,
            step,
        )
    }

    fn ignored(&self, session: &Session, from: Scene) -> Transition {
        Transition {
            from,
            to: from,
            kind: TransitionKind::Ignored,
            directive: self.render(session, None),
            effects: Vec::new(),
        }
    }

    fn arrive(
        &self,
        session: &mut Session,
        from: Scene,
        requested: Scene,
        kind: TransitionKind,
        navigation: Navigation,
        step: Step,
    ) -> Transition {
        let requested = graph::resolve_entry(requested);
        let (target, kind) = self.apply_guards(session, requested, kind);

        match kind {
            TransitionKind::Redirect(_) => session.scene.resume = Some(requested),
            TransitionKind::Forward | TransitionKind::Back | TransitionKind::Restart => {
                session.scene.resume = None
            }
            _ => {}
        }

        let state = &mut session.scene;
        let current = state.current;
        match navigation {
            Navigation::Push if target != current => {
                state.history.push(current);
                let overflow = state.history.len().saturating_sub(self.max_history_depth);
                state.history.drain(..overflow);
            }
            Navigation::Pop => {
                if let Some(position) = state.history.iter().rposition(|scene| *scene == target) {
                    state.history.truncate(position);
                }
            }
            Navigation::Reset => state.history.clear(),
            Navigation::Push | Navigation::Keep => {}
        }
        if target != current {
            state.previous = Some(current);
            state.current = target;
        }
        state.pending = graph::node(target).awaits;

        let mut effects = step.effects;
        effects.extend(self.on_enter(session, target));

        let notice = match kind {
            TransitionKind::Redirect(guard) => Some(Notice::GuardFailed(guard)),
            _ => step.notice,
        };

        Transition {
            from,
            to: target,
            kind,
            directive: self.render(session, notice),
            effects,
        }
    }

    fn apply_guards(
        &self,
        session: &Session,
        requested: Scene,
        kind: TransitionKind,
    ) -> (Scene, TransitionKind) {
        let mut target = requested;
        let mut kind = kind;
        for _ in 0..MAX_REDIRECTS {
            match guards::first_failing(graph::node(target).guards, session) {
                None => return (target, kind),
                Some(guard) => {
                    target = graph::resolve_entry(guard.recovery());
                    kind = TransitionKind::Redirect(guard);
                }
            }
        }
        (Scene::LanguageSelect, kind)
    }

    /// Idempotent entry work for `scene`.
    fn on_enter(&self, session: &mut Session, scene: Scene) -> Vec<SceneEffect> {
        match scene {
            Scene::Pickup | Scene::ChangeBranch => session
                .selected_city
                .map(|city_id| SceneEffect::LoadBranches { city_id })
                .into_iter()
                .collect(),
            Scene::Categories => session
                .selected_city
                .map(|city_id| SceneEffect::LoadCategories { city_id })
                .into_iter()
                .collect(),
            Scene::Products => session
                .selection
                .category
                .as_ref()
                .map(|category| SceneEffect::LoadProducts {
                    category_id: category.id,
                })
                .into_iter()
                .collect(),
            Scene::Feedback => {
                session.feedback_draft = None;
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Scene handlers
    // ─────────────────────────────────────────────────────────────────────────

    fn on_event(
        &self,
        session: &mut Session,
        scene: Scene,
        event: &ConversationEvent,
        lookup: &CatalogLookup,
    ) -> Step {
        use super::event::ConversationEvent as E;

        match (scene, event) {
            (Scene::LanguageSelect, E::ChooseLanguage { language }) => {
                session.language = *language;
                if session.is_authenticated() {
                    Step::go(Scene::MainMenu)
                } else {
                    Step::go(Scene::Registration)
                }
            }
            (Scene::Welcome, E::Continue) | (Scene::OrderPlaced, E::Continue) => {
                Step::go(Scene::MainMenu)
            }
            (Scene::MainMenu, E::OpenMenu { item }) => Step::go(match item {
                MenuItem::Order => Scene::OrderFlow,
                MenuItem::Settings => Scene::Settings,
                MenuItem::OrderHistory => Scene::OrderHistory,
                MenuItem::Feedback => Scene::Feedback,
            }),

            // Settings
            (Scene::Settings, E::OpenSetting { item }) => Step::go(match item {
                SettingsItem::Language => Scene::ChangeLanguage,
                SettingsItem::Name => Scene::ChangeName,
                SettingsItem::Phone => Scene::ChangePhone,
                SettingsItem::City => Scene::ChangeCity,
                SettingsItem::Branch => Scene::ChangeBranch,
                SettingsItem::About => Scene::About,
            }),
            (Scene::ChangeLanguage, E::ChooseLanguage { language }) => {
                session.language = *language;
                Step::go(Scene::Settings)
            }
            (Scene::ChangeCity, E::ChooseCity { .. }) => match &lookup.city {
                Some(city) => {
                    session.select_city(city.id);
                    Step::advance(Scene::Settings)
                }
                None => Step::reject(Notice::UnknownItem),
            },
            (Scene::ChangeBranch, E::ChooseBranch { .. }) => match choose_branch(session, lookup) {
                Ok(()) => Step::go(Scene::Settings),
                Err(notice) => Step::reject(notice),
            },

            // Ordering
            (Scene::ChooseDeliveryType, E::ChooseDeliveryType { delivery_type }) => {
                session.delivery_type = Some(*delivery_type);
                Step::go(match delivery_type {
                    DeliveryType::Pickup => Scene::Pickup,
                    DeliveryType::Delivery => Scene::Delivery,
                })
            }
            (Scene::Pickup, E::ChooseBranch { .. }) => match choose_branch(session, lookup) {
                Ok(()) => {
                    session.delivery_type = Some(DeliveryType::Pickup);
                    Step::advance(Scene::Categories)
                }
                Err(notice) => Step::reject(notice),
            },
            (Scene::Categories, E::ChooseCategory { .. }) => match &lookup.category {
                Some(category) => {
                    let selection = &mut session.selection;
                    if selection.category.as_ref().map(|c| c.id) != Some(category.id) {
                        selection.product = None;
                        selection.cached_products = None;
                    }
                    selection.category = Some(CategorySnapshot::from(category));
                    selection.touch();
                    Step::go(Scene::Products)
                }
                None => Step::reject(Notice::UnknownItem),
            },
            (Scene::Products, E::ChooseProduct { .. }) => self.choose_product(session, lookup),
            (Scene::Products, E::SetProductQuantity { product_id, quantity }) => {
                if *quantity == 0 || *quantity > MAX_ITEM_QUANTITY {
                    return Step::reject(Notice::InvalidQuantity);
                }
                session.selection.quantities.set(*product_id, *quantity);
                session.selection.touch();
                Step::stay()
            }
            (Scene::Products, E::AddToCart) => self.add_to_cart(session),
            (Scene::Categories, E::OpenCart) | (Scene::Products, E::OpenCart) => {
                Step::go(Scene::Cart)
            }
            (Scene::Products, E::ContinueShopping) | (Scene::Cart, E::ContinueShopping) => {
                Step::go(Scene::Categories)
            }

            // Cart
            (Scene::Cart, E::ChangeCartQuantity { product_id, quantity }) => {
                match session.cart.set_quantity(*product_id, *quantity) {
                    Ok(true) => Step::reject(Notice::CartUpdated),
                    Ok(false) => Step::reject(Notice::UnknownItem),
                    Err(_) => Step::reject(Notice::InvalidQuantity),
                }
            }
            (Scene::Cart, E::RemoveFromCart { product_id }) => {
                if session.cart.remove_item(*product_id) {
                    Step::reject(Notice::CartUpdated)
                } else {
                    Step::reject(Notice::UnknownItem)
                }
            }
            (Scene::Cart, E::ClearCart) => {
                session.cart.clear();
                Step::reject(Notice::CartCleared)
            }
            (Scene::Cart, E::Checkout) => Step::go(Scene::Checkout),

            // Checkout
            (Scene::TimeSelect, E::ChooseTime { time }) => {
                session.checkout.order_time = Some(*time);
                Step::go(Scene::PaymentSelect)
            }
            (Scene::PaymentSelect, E::ChoosePayment { method }) => {
                session.checkout.payment = Some(*method);
                Step::go(Scene::PhoneConfirm)
            }
            (Scene::PhoneConfirm, E::ConfirmPhone) => {
                if session.phone.as_deref().is_some_and(|phone| !phone.is_empty()) {
                    Step::go(Scene::CutleryChoice)
                } else {
                    Step::reject(Notice::InvalidPhone)
                }
            }
            (Scene::CutleryChoice, E::ChooseCutlery { cutlery }) => {
                session.checkout.cutlery = Some(*cutlery);
                Step::go(Scene::OrderConfirm)
            }
            (Scene::OrderConfirm, E::ConfirmOrder) => match OrderDraft::from_session(session) {
                Some(order) => {
                    session.cart.clear();
                    session.clear_checkout();
                    session.selection.quantities = ProductQuantities::new();
                    Step::go(Scene::OrderPlaced).with_effect(SceneEffect::PlaceOrder { order })
                }
                None => Step::ignore(),
            },
            (Scene::OrderConfirm, E::CancelOrder) => {
                session.clear_checkout();
                Step::go(Scene::MainMenu).with_notice(Notice::OrderCancelled)
            }

            (Scene::Review, E::Rate { rating }) => rate(session, *rating),

            _ => Step::ignore(),
        }
    }

    fn on_input(
        &self,
        session: &mut Session,
        scene: Scene,
        input: PendingInput,
        event: &ConversationEvent,
    ) -> Step {
        use super::event::ConversationEvent as E;

        match (input, event) {
            (PendingInput::Phone, E::Text { text }) => accept_phone(session, scene, text),
            (PendingInput::Phone, E::Contact { phone, first_name }) => {
                if session.name.is_none() {
                    session.name = first_name
                        .as_deref()
                        .map(str::trim)
                        .filter(|name| !name.is_empty())
                        .map(str::to_string);
                }
                accept_phone(session, scene, phone)
            }
            (PendingInput::Name, E::Text { text }) => {
                let name = text.trim();
                if name.is_empty() || name.chars().count() > MAX_NAME_CHARS {
                    return Step::reject(Notice::InvalidName);
                }
                session.name = Some(name.to_string());
                Step::go(Scene::Settings)
            }
            (PendingInput::DeliveryAddress, E::Text { text }) => {
                let address = text.trim();
                if address.is_empty() {
                    return Step::reject(Notice::InvalidAddress);
                }
                set_delivery_address(
                    session,
                    DeliveryAddress::Text {
                        address: address.to_string(),
                    },
                )
            }
            (PendingInput::DeliveryAddress, E::Location { point }) => {
                set_delivery_address(session, DeliveryAddress::Location { point: *point })
            }
            (PendingInput::OrderTime, E::Text { text }) => match text.parse::<OrderTime>() {
                Ok(time) => {
                    session.checkout.order_time = Some(time);
                    Step::go(Scene::PaymentSelect)
                }
                Err(_) => Step::reject(Notice::InvalidTime),
            },
            (PendingInput::CutleryChoice, E::Text { text }) => match parse_yes_no(text) {
                Some(cutlery) => {
                    session.checkout.cutlery = Some(cutlery);
                    Step::go(Scene::OrderConfirm)
                }
                None => Step::ignore(),
            },
            (PendingInput::FeedbackText, E::Text { text }) => {
                let text = text.trim();
                if text.is_empty() {
                    return Step::ignore();
                }
                session.feedback_draft = Some(text.to_string());
                Step::go(Scene::Review)
            }
            (PendingInput::ReviewRating, E::Text { text }) => match text.trim().parse::<u8>() {
                Ok(rating) => rate(session, rating),
                Err(_) => Step::reject(Notice::InvalidRating),
            },
            _ => Step::ignore(),
        }
    }

    fn choose_product(&self, session: &mut Session, lookup: &CatalogLookup) -> Step {
        let Some(product) = &lookup.product else {
            return Step::reject(Notice::UnknownItem);
        };
        let selection = &mut session.selection;
        let in_category = selection
            .category
            .as_ref()
            .is_some_and(|category| category.id == product.category_id);
        if !in_category {
            return Step::reject(Notice::UnknownItem);
        }

        selection.product = Some(ProductSnapshot::from(product));
        selection.touch();
        Step::stay()
    }

    fn add_to_cart(&self, session: &mut Session) -> Step {
        let Some(product) = session.selection.product.clone() else {
            return Step::reject(Notice::UnknownItem);
        };
        let quantity = session.selection.quantities.get(product.id).unwrap_or(1);

        if session.cart.add_item(&product.demoted(), quantity).is_err() {
            return Step::reject(Notice::InvalidQuantity);
        }
        session.selection.quantities.remove(product.id);
        session.selection.touch();
        Step::reject(Notice::AddedToCart)
    }
}

fn accept_phone(session: &mut Session, scene: Scene, raw: &str) -> Step {
    let phone = match normalize_phone(raw) {
        Ok(phone) => phone,
        Err(_) => return Step::reject(Notice::InvalidPhone),
    };
    session.phone = Some(phone);

    match scene {
        Scene::Registration => {
            session.registered = true;
            Step::advance(Scene::Welcome)
        }
        Scene::ChangePhone => Step::go(Scene::Settings),
        Scene::PhoneConfirm => Step::go(Scene::CutleryChoice),
        _ => Step::ignore(),
    }
}

fn choose_branch(session: &mut Session, lookup: &CatalogLookup) -> Result<(), Notice> {
    let branch = lookup.branch.as_ref().ok_or(Notice::UnknownItem)?;
    if session.selected_city != Some(branch.city_id) {
        return Err(Notice::UnknownItem);
    }
    if !branch.is_open {
        return Err(Notice::BranchClosed);
    }

    session.selected_branch = Some(branch.id);
    session.selection.branch = Some(BranchSnapshot::from(branch));
    session.selection.touch();
    Ok(())
}

fn set_delivery_address(session: &mut Session, address: DeliveryAddress) -> Step {
    session.checkout.address = Some(address);
    session.delivery_type = Some(DeliveryType::Delivery);
    Step::advance(Scene::Categories)
}

fn rate(session: &mut Session, rating: u8) -> Step {
    if !(1..=5).contains(&rating) {
        return Step::reject(Notice::InvalidRating);
    }
    let text = session.feedback_draft.take().unwrap_or_default();
    Step::go(Scene::MainMenu)
        .with_notice(Notice::FeedbackThanks)
        .with_effect(SceneEffect::SendFeedback { text, rating })
}

fn parse_yes_no(text: &str) -> Option<bool> {
    match text.trim().to_lowercase().as_str() {
        "yes" | "y" | "da" | "ha" | "да" | "ҳа" => Some(true),
        "no" | "n" | "net" | "yo'q" | "нет" | "йўқ" => Some(false),
        _ => None,
    }
}
