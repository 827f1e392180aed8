//! The fixed wizard step sequence and its cursor state machine.
//!
//! Eight steps, linear progression with free backtracking: `next` advances
//! one step at a time, `prev` walks back, and `jump_to` may revisit any
//! already-reached step but never skips ahead. Per-step completeness is
//! advisory -- [`StepId::is_ready`] feeds the UI but never blocks `next`.

use serde::{Deserialize, Serialize};

use crate::selection::{Category, SelectionModel};

/// Identifier of one wizard screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepId {
    Setting,
    Purpose,
    Area,
    Statements,
    Skills,
    Teaching,
    Assessment,
    Plan,
}

/// One step in the fixed sequence.
#[derive(Debug, Clone, Copy)]
pub struct WizardStep {
    pub id: StepId,
    pub label: &'static str,
    pub icon: &'static str,
}

/// The fixed, ordered step sequence.
pub const STEPS: [WizardStep; 8] = [
    WizardStep { id: StepId::Setting, label: "Setting", icon: "📍" },
    WizardStep { id: StepId::Purpose, label: "Purpose", icon: "🎯" },
    WizardStep { id: StepId::Area, label: "Area", icon: "📖" },
    WizardStep { id: StepId::Statements, label: "What Matters", icon: "💡" },
    WizardStep { id: StepId::Skills, label: "Skills", icon: "🔗" },
    WizardStep { id: StepId::Teaching, label: "Teaching Method", icon: "🏗️" },
    WizardStep { id: StepId::Assessment, label: "Assessment", icon: "📋" },
    WizardStep { id: StepId::Plan, label: "Lesson Plan", icon: "✨" },
];

impl StepId {
    /// The pickable category this step edits, if any.
    pub fn category(self) -> Option<Category> {
        match self {
            StepId::Setting | StepId::Plan => None,
            StepId::Purpose => Some(Category::Purposes),
            StepId::Area => Some(Category::Areas),
            StepId::Statements => Some(Category::Statements),
            StepId::Skills => Some(Category::Skills),
            StepId::Teaching => Some(Category::TeachingMethods),
            StepId::Assessment => Some(Category::AssessmentMethods),
        }
    }

    /// Advisory prerequisite check, shown in the UI but not enforced on
    /// navigation: advancing past an incomplete step is an explicit policy
    /// choice of this design.
    pub fn is_ready(self, selection: &SelectionModel) -> bool {
        match self {
            StepId::Statements => !selection.selected(Category::Areas).is_empty(),
            _ => true,
        }
    }
}

/// Bounded cursor over the step sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WizardCursor {
    pos: usize,
}

impl WizardCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current 0-indexed position, always within `[0, STEPS.len() - 1]`.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// The step at the current position.
    pub fn step(&self) -> &'static WizardStep {
        &STEPS[self.pos]
    }

    /// True on the terminal step, which triggers document generation
    /// rather than cursor advance.
    pub fn is_terminal(&self) -> bool {
        self.pos == STEPS.len() - 1
    }

    /// Advance one step. Returns whether the cursor moved.
    pub fn next(&mut self) -> bool {
        if self.pos < STEPS.len() - 1 {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Walk back one step. Returns whether the cursor moved.
    pub fn prev(&mut self) -> bool {
        if self.pos > 0 {
            self.pos -= 1;
            true
        } else {
            false
        }
    }

    /// Revisit a completed-or-current step. Jumping strictly ahead of the
    /// cursor is rejected silently. Returns whether the cursor moved.
    pub fn jump_to(&mut self, k: usize) -> bool {
        if k <= self.pos {
            let moved = k != self.pos;
            self.pos = k;
            moved
        } else {
            false
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    #[test]
    fn sequence_has_eight_steps_in_order() {
        assert_eq!(STEPS.len(), 8);
        assert_eq!(STEPS[0].id, StepId::Setting);
        assert_eq!(STEPS[7].id, StepId::Plan);
    }

    #[test]
    fn next_advances_until_terminal() {
        let mut cursor = WizardCursor::new();
        for i in 1..STEPS.len() {
            assert!(cursor.next());
            assert_eq!(cursor.pos(), i);
        }
        assert!(cursor.is_terminal());
        assert!(!cursor.next(), "terminal step must not advance");
        assert_eq!(cursor.pos(), STEPS.len() - 1);
    }

    #[test]
    fn prev_walks_back_and_stops_at_zero() {
        let mut cursor = WizardCursor::new();
        cursor.next();
        cursor.next();
        assert!(cursor.prev());
        assert!(cursor.prev());
        assert_eq!(cursor.pos(), 0);
        assert!(!cursor.prev());
    }

    #[test]
    fn prev_then_next_round_trips_from_interior_step() {
        for start in 1..STEPS.len() - 1 {
            let mut cursor = WizardCursor::new();
            while cursor.pos() < start {
                cursor.next();
            }
            cursor.prev();
            cursor.next();
            assert_eq!(cursor.pos(), start);
        }
    }

    #[test]
    fn jump_ahead_is_a_silent_no_op() {
        let mut cursor = WizardCursor::new();
        cursor.next();
        cursor.next();
        assert!(!cursor.jump_to(5));
        assert_eq!(cursor.pos(), 2);
    }

    #[test]
    fn jump_back_is_allowed() {
        let mut cursor = WizardCursor::new();
        cursor.next();
        cursor.next();
        cursor.next();
        assert!(cursor.jump_to(1));
        assert_eq!(cursor.pos(), 1);
        // Jumping to the current position is allowed but does not move.
        assert!(!cursor.jump_to(1));
        assert_eq!(cursor.pos(), 1);
    }

    #[test]
    fn statements_step_readiness_tracks_area_selection() {
        let catalog = Catalog::get();
        let mut sel = SelectionModel::new();
        assert!(!StepId::Statements.is_ready(&sel));
        sel.toggle(catalog, Category::Areas, "maths").unwrap();
        assert!(StepId::Statements.is_ready(&sel));
    }

    #[test]
    fn advance_is_unconditional_even_when_step_not_ready() {
        // Explicit policy: per-step completeness is advisory only.
        let sel = SelectionModel::new();
        let mut cursor = WizardCursor::new();
        while cursor.pos() < 3 {
            cursor.next();
        }
        assert_eq!(cursor.step().id, StepId::Statements);
        assert!(!StepId::Statements.is_ready(&sel));
        assert!(cursor.next());
    }

    #[test]
    fn step_categories() {
        assert_eq!(StepId::Setting.category(), None);
        assert_eq!(StepId::Plan.category(), None);
        assert_eq!(StepId::Area.category(), Some(Category::Areas));
    }
}
