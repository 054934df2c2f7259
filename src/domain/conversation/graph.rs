//! Static scene graph.
//!
//! One node per scene: its parent in the navigation tree, whether Back is
//! offered, the input it waits for, the guards that protect it and the
//! forward edges the machine may follow from it. The table is indexed by
//! [`Scene`] discriminant.

use super::guards::Guard;
use super::Scene;
use crate::domain::session::{PendingInput, SceneState};

/// Where Back leads when it should not simply go to the parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackTarget {
    /// A fixed scene.
    Scene(Scene),
    /// The scene the user came from.
    Origin,
}

/// Declaration of a single scene.
#[derive(Debug, Clone, Copy)]
pub struct SceneNode {
    pub scene: Scene,
    pub parent: Option<Scene>,
    pub allows_back: bool,
    pub shows_breadcrumbs: bool,
    pub custom_back_target: Option<BackTarget>,
    /// Set on group nodes: the child entered in their place.
    pub entry: Option<Scene>,
    pub awaits: Option<PendingInput>,
    pub guards: &'static [Guard],
    pub next: &'static [Scene],
}

impl SceneNode {
    const fn new(scene: Scene, parent: Option<Scene>) -> Self {
        Self {
            scene,
            parent,
            allows_back: parent.is_some(),
            shows_breadcrumbs: false,
            custom_back_target: None,
            entry: None,
            awaits: None,
            guards: &[],
            next: &[],
        }
    }

    const fn child_of(scene: Scene, parent: Scene) -> Self {
        Self::new(scene, Some(parent))
    }

    const fn root(scene: Scene) -> Self {
        Self::new(scene, None)
    }

    const fn group(mut self, entry: Scene) -> Self {
        self.entry = Some(entry);
        self
    }

    const fn crumbs(mut self) -> Self {
        self.shows_breadcrumbs = true;
        self
    }

    const fn no_back(mut self) -> Self {
        self.allows_back = false;
        self
    }

    const fn back_to(mut self, target: BackTarget) -> Self {
        self.custom_back_target = Some(target);
        self.allows_back = true;
        self
    }

    const fn awaits(mut self, input: PendingInput) -> Self {
        self.awaits = Some(input);
        self
    }

    const fn guarded(mut self, guards: &'static [Guard]) -> Self {
        self.guards = guards;
        self
    }

    const fn to(mut self, next: &'static [Scene]) -> Self {
        self.next = next;
        self
    }
}

const BROWSING: &[Guard] = &[
    Guard::Authenticated,
    Guard::CitySelected,
    Guard::DeliveryTypeChosen,
    Guard::PickupBranchSelected,
    Guard::DeliveryAddressProvided,
];

const BROWSING_CATEGORY: &[Guard] = &[
    Guard::Authenticated,
    Guard::CitySelected,
    Guard::DeliveryTypeChosen,
    Guard::PickupBranchSelected,
    Guard::DeliveryAddressProvided,
    Guard::CategorySelected,
];

const CHECKOUT_ENTRY: &[Guard] = &[
    Guard::Authenticated,
    Guard::CitySelected,
    Guard::DeliveryTypeChosen,
    Guard::PickupBranchSelected,
    Guard::DeliveryAddressProvided,
    Guard::CartNonEmpty,
];

static NODES: [SceneNode; 28] = [
    // Onboarding
    SceneNode::root(Scene::LanguageSelect).to(&[Scene::Registration, Scene::MainMenu]),
    SceneNode::root(Scene::Registration)
        .back_to(BackTarget::Origin)
        .awaits(PendingInput::Phone)
        .to(&[Scene::Welcome]),
    SceneNode::root(Scene::Welcome)
        .guarded(&[Guard::Authenticated])
        .to(&[Scene::MainMenu]),
    SceneNode::root(Scene::MainMenu)
        .guarded(&[Guard::Authenticated])
        .to(&[
            Scene::OrderFlow,
            Scene::Settings,
            Scene::OrderHistory,
            Scene::Feedback,
        ]),
    // Settings
    SceneNode::child_of(Scene::Settings, Scene::MainMenu)
        .crumbs()
        .guarded(&[Guard::Authenticated])
        .to(&[
            Scene::ChangeLanguage,
            Scene::ChangeName,
            Scene::ChangePhone,
            Scene::ChangeCity,
            Scene::ChangeBranch,
            Scene::About,
        ]),
    SceneNode::child_of(Scene::ChangeLanguage, Scene::Settings)
        .crumbs()
        .to(&[Scene::Settings]),
    SceneNode::child_of(Scene::ChangeName, Scene::Settings)
        .crumbs()
        .awaits(PendingInput::Name)
        .guarded(&[Guard::Authenticated])
        .to(&[Scene::Settings]),
    SceneNode::child_of(Scene::ChangePhone, Scene::Settings)
        .crumbs()
        .awaits(PendingInput::Phone)
        .guarded(&[Guard::Authenticated])
        .to(&[Scene::Settings]),
    SceneNode::child_of(Scene::ChangeCity, Scene::Settings)
        .crumbs()
        .back_to(BackTarget::Origin)
        .to(&[Scene::Settings]),
    SceneNode::child_of(Scene::ChangeBranch, Scene::Settings)
        .crumbs()
        .guarded(&[Guard::Authenticated, Guard::CitySelected])
        .to(&[Scene::Settings]),
    SceneNode::child_of(Scene::About, Scene::Settings).crumbs(),
    // Ordering
    SceneNode::child_of(Scene::OrderFlow, Scene::MainMenu).group(Scene::ChooseDeliveryType),
    SceneNode::child_of(Scene::ChooseDeliveryType, Scene::OrderFlow)
        .crumbs()
        .guarded(&[Guard::Authenticated, Guard::CitySelected])
        .to(&[Scene::Pickup, Scene::Delivery]),
    SceneNode::child_of(Scene::Pickup, Scene::ChooseDeliveryType)
        .crumbs()
        .guarded(&[Guard::Authenticated, Guard::CitySelected])
        .to(&[Scene::Categories]),
    SceneNode::child_of(Scene::Delivery, Scene::ChooseDeliveryType)
        .crumbs()
        .awaits(PendingInput::DeliveryAddress)
        .guarded(&[Guard::Authenticated, Guard::CitySelected])
        .to(&[Scene::Categories]),
    SceneNode::child_of(Scene::Categories, Scene::ChooseDeliveryType)
        .crumbs()
        .guarded(BROWSING)
        .to(&[Scene::Products, Scene::Cart]),
    SceneNode::child_of(Scene::Products, Scene::Categories)
        .crumbs()
        .guarded(BROWSING_CATEGORY)
        .to(&[Scene::Products, Scene::Cart, Scene::Categories]),
    SceneNode::child_of(Scene::Cart, Scene::Categories)
        .crumbs()
        .back_to(BackTarget::Origin)
        .guarded(&[Guard::Authenticated])
        .to(&[Scene::Checkout, Scene::Categories]),
    // Checkout
    SceneNode::child_of(Scene::Checkout, Scene::Cart).group(Scene::TimeSelect),
    SceneNode::child_of(Scene::TimeSelect, Scene::Checkout)
        .crumbs()
        .awaits(PendingInput::OrderTime)
        .guarded(CHECKOUT_ENTRY)
        .to(&[Scene::PaymentSelect]),
    SceneNode::child_of(Scene::PaymentSelect, Scene::TimeSelect)
        .crumbs()
        .guarded(&[Guard::CartNonEmpty])
        .to(&[Scene::PhoneConfirm]),
    SceneNode::child_of(Scene::PhoneConfirm, Scene::PaymentSelect)
        .crumbs()
        .awaits(PendingInput::Phone)
        .guarded(&[Guard::CartNonEmpty])
        .to(&[Scene::CutleryChoice]),
    SceneNode::child_of(Scene::CutleryChoice, Scene::PhoneConfirm)
        .crumbs()
        .awaits(PendingInput::CutleryChoice)
        .guarded(&[Guard::CartNonEmpty])
        .to(&[Scene::OrderConfirm]),
    SceneNode::child_of(Scene::OrderConfirm, Scene::CutleryChoice)
        .crumbs()
        .guarded(&[Guard::Authenticated, Guard::CartNonEmpty, Guard::CheckoutComplete])
        .to(&[Scene::OrderPlaced, Scene::MainMenu]),
    SceneNode::child_of(Scene::OrderPlaced, Scene::MainMenu)
        .no_back()
        .to(&[Scene::MainMenu]),
    // Account
    SceneNode::child_of(Scene::OrderHistory, Scene::MainMenu)
        .crumbs()
        .guarded(&[Guard::Authenticated]),
    SceneNode::child_of(Scene::Feedback, Scene::MainMenu)
        .awaits(PendingInput::FeedbackText)
        .guarded(&[Guard::Authenticated])
        .to(&[Scene::Review]),
    SceneNode::child_of(Scene::Review, Scene::Feedback)
        .awaits(PendingInput::ReviewRating)
        .guarded(&[Guard::Authenticated])
        .to(&[Scene::MainMenu]),
];

/// Returns the declaration of `scene`.
pub fn node(scene: Scene) -> &'static SceneNode {
    &NODES[scene.index()]
}

/// Resolves group nodes to the child they forward to.
pub fn resolve_entry(mut scene: Scene) -> Scene {
    while let Some(entry) = node(scene).entry {
        scene = entry;
    }
    scene
}

/// Path from the navigation root down to `scene`, group nodes excluded.
pub fn breadcrumbs(scene: Scene) -> Vec<Scene> {
    let mut path = Vec::new();
    let mut cursor = Some(scene);
    while let Some(current) = cursor {
        if !current.is_group() {
            path.push(current);
        }
        cursor = node(current).parent;
    }
    path.reverse();
    path
}

/// Where Back leads from the current position, if anywhere.
///
/// A custom target wins over the parent. `Origin` uses the most recent
/// history entry that differs from the current scene and falls back to the
/// parent. Group nodes are never a target: their own parent is used.
pub fn back_target(state: &SceneState) -> Option<Scene> {
    let current = node(state.current);
    if !current.allows_back {
        return None;
    }

    let target = match current.custom_back_target {
        Some(BackTarget::Scene(scene)) => Some(scene),
        Some(BackTarget::Origin) => state
            .history
            .iter()
            .rev()
            .copied()
            .find(|scene| *scene != state.current)
            .or(current.parent),
        None => current.parent,
    }?;

    Some(skip_groups(target))
}

fn skip_groups(mut scene: Scene) -> Scene {
    while node(scene).entry.is_some() {
        match node(scene).parent {
            Some(parent) => scene = parent,
            None => break,
        }
    }
    scene
}
