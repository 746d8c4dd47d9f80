use serde::{Deserialize, Serialize};

// ============================================================================
// LAYER SNAPSHOT MODEL
// ============================================================================

/// One named, independently toggleable visibility unit.
///
/// `id` is unique within a snapshot and never mutated; the set of ids is
/// fixed for the lifetime of one fetched snapshot (there are no add/remove
/// operations anywhere in the app).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    pub id: String,
    pub name: String,
    pub visible: bool,
}

/// Phase of the one-shot snapshot fetch.
///
/// `Loading` is the initial state. Exactly one transition ever fires:
/// `Loading → Loaded` on a successful resolution or `Loading → Failed` when
/// the source reports an error. Both end states are terminal — there is no
/// retry or re-fetch path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Loaded,
    /// Fetch rejected; carries the rendered error text. The layer list stays
    /// empty, which the panel renders distinctly from a loaded-but-empty
    /// snapshot.
    Failed(String),
}

// ============================================================================
// PLAN STATE — the layer panel controller
// ============================================================================

/// Owner of the current layer sequence and the load phase.
///
/// Fields are private on purpose: every mutation goes through the methods
/// below, and each mutating method rebuilds the sequence as a fresh
/// collection instead of flipping a flag in place. Observers (the panel, the
/// status bar) read the accessors once per frame; nothing is cached.
pub struct PlanState {
    layers: Vec<Layer>,
    load: LoadState,
}

impl PlanState {
    /// Empty list, `Loading` phase. The caller is expected to issue the
    /// single fetch right after construction.
    pub fn new() -> Self {
        Self {
            layers: Vec::new(),
            load: LoadState::Loading,
        }
    }

    // ---- fetch resolution ----------------------------------------------

    /// Replace the list wholesale with the fetched snapshot. Called once,
    /// when the source resolves.
    pub fn finish_load(&mut self, layers: Vec<Layer>) {
        self.layers = layers;
        self.load = LoadState::Loaded;
    }

    /// Record a failed fetch. The list stays empty.
    pub fn fail_load(&mut self, message: String) {
        self.layers = Vec::new();
        self.load = LoadState::Failed(message);
    }

    // ---- mutations (each builds a new sequence) --------------------------

    /// Negate the `visible` flag of the layer whose id matches. Order is
    /// preserved and no other field of any layer is touched. An id with no
    /// match is a silent no-op — the UI never offers controls for ids
    /// outside the current list.
    pub fn toggle_layer(&mut self, id: &str) {
        self.layers = self
            .layers
            .iter()
            .map(|layer| {
                let mut layer = layer.clone();
                if layer.id == id {
                    layer.visible = !layer.visible;
                }
                layer
            })
            .collect();
    }

    /// Set every layer's `visible` flag to the given value, order and ids
    /// unchanged. Calling with the value already held by all layers is a
    /// legal no-op.
    pub fn set_all_visibility(&mut self, visible: bool) {
        self.layers = self
            .layers
            .iter()
            .map(|layer| Layer {
                visible,
                ..layer.clone()
            })
            .collect();
    }

    // ---- accessors --------------------------------------------------------

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.load, LoadState::Loading)
    }

    /// Error text of a failed fetch, `None` otherwise.
    pub fn load_error(&self) -> Option<&str> {
        match &self.load {
            LoadState::Failed(message) => Some(message),
            _ => None,
        }
    }

    // ---- derived predicates (recomputed per query, never stored) ----------

    /// True only for a non-empty list with every layer visible. Gates the
    /// "Show All" button (disabled when showing would change nothing).
    pub fn all_visible(&self) -> bool {
        !self.layers.is_empty() && self.layers.iter().all(|layer| layer.visible)
    }

    /// True when no layer is visible; vacuously true for an empty list.
    /// Gates the "Hide All" button.
    pub fn none_visible(&self) -> bool {
        self.layers.iter().all(|layer| !layer.visible)
    }

    /// Number of currently visible layers, for the footer and status bar.
    pub fn visible_count(&self) -> usize {
        self.layers.iter().filter(|layer| layer.visible).count()
    }
}

impl Default for PlanState {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn layer(id: &str, name: &str, visible: bool) -> Layer {
        Layer {
            id: id.to_string(),
            name: name.to_string(),
            visible,
        }
    }

    fn loaded_fixture() -> PlanState {
        let mut plan = PlanState::new();
        plan.finish_load(vec![
            layer("1", "Walls", true),
            layer("2", "Doors", true),
            layer("3", "Furniture", false),
            layer("4", "Electrical", true),
        ]);
        plan
    }

    #[test]
    fn starts_loading_with_empty_list() {
        let plan = PlanState::new();
        assert!(plan.is_loading());
        assert!(plan.layers().is_empty());
        assert!(plan.load_error().is_none());
    }

    #[test]
    fn finish_load_replaces_list_and_clears_loading() {
        let plan = loaded_fixture();
        assert!(!plan.is_loading());
        assert_eq!(
            plan.layers(),
            &[
                layer("1", "Walls", true),
                layer("2", "Doors", true),
                layer("3", "Furniture", false),
                layer("4", "Electrical", true),
            ]
        );
    }

    #[test]
    fn fail_load_is_distinct_from_loaded_but_empty() {
        let mut failed = PlanState::new();
        failed.fail_load("source unavailable".to_string());
        assert!(!failed.is_loading());
        assert!(failed.layers().is_empty());
        assert_eq!(failed.load_error(), Some("source unavailable"));

        let mut empty = PlanState::new();
        empty.finish_load(Vec::new());
        assert!(!empty.is_loading());
        assert!(empty.layers().is_empty());
        assert!(empty.load_error().is_none());
    }

    #[test]
    fn toggle_flips_exactly_the_matching_layer() {
        let mut plan = loaded_fixture();
        plan.toggle_layer("3");
        assert_eq!(
            plan.layers(),
            &[
                layer("1", "Walls", true),
                layer("2", "Doors", true),
                layer("3", "Furniture", true),
                layer("4", "Electrical", true),
            ]
        );
    }

    #[test]
    fn toggle_twice_restores_the_original_sequence() {
        let mut plan = loaded_fixture();
        let before = plan.layers().to_vec();
        plan.toggle_layer("2");
        plan.toggle_layer("2");
        assert_eq!(plan.layers(), before.as_slice());
    }

    #[test]
    fn toggle_with_unknown_id_changes_nothing() {
        let mut plan = loaded_fixture();
        let before = plan.layers().to_vec();
        plan.toggle_layer("99");
        assert_eq!(plan.layers(), before.as_slice());
    }

    #[test]
    fn toggle_preserves_order_and_ids() {
        let mut plan = loaded_fixture();
        plan.toggle_layer("1");
        plan.toggle_layer("4");
        let ids: Vec<&str> = plan.layers().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn show_all_makes_all_visible() {
        let mut plan = loaded_fixture();
        plan.set_all_visibility(true);
        assert!(plan.all_visible());
        assert!(!plan.none_visible());
        assert_eq!(plan.visible_count(), 4);
    }

    #[test]
    fn hide_all_makes_none_visible() {
        let mut plan = loaded_fixture();
        plan.set_all_visibility(false);
        assert!(plan.none_visible());
        assert!(!plan.all_visible());
        assert_eq!(plan.visible_count(), 0);
    }

    #[test]
    fn set_all_with_held_value_is_a_structural_noop() {
        let mut plan = loaded_fixture();
        plan.set_all_visibility(true);
        let before = plan.layers().to_vec();
        plan.set_all_visibility(true);
        assert_eq!(plan.layers(), before.as_slice());
    }

    #[test]
    fn empty_list_predicate_boundary() {
        let mut plan = PlanState::new();
        plan.finish_load(Vec::new());
        assert!(!plan.all_visible());
        assert!(plan.none_visible());
        assert_eq!(plan.visible_count(), 0);
    }

    #[test]
    fn partially_hidden_list_enables_both_bulk_actions() {
        let plan = loaded_fixture();
        assert!(!plan.all_visible());
        assert!(!plan.none_visible());
        assert_eq!(plan.visible_count(), 3);
    }
}
