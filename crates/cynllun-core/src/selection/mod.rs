//! The per-session record of what the user has picked.
//!
//! One insertion-ordered, duplicate-free bucket of catalog identifiers per
//! pickable category, plus the free-form learning-context form. Buckets hold
//! identifiers only; items are resolved through the [`Catalog`] at render
//! time.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Catalog;

/// The pickable categories, one wizard step each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Purposes,
    Areas,
    Statements,
    Skills,
    TeachingMethods,
    AssessmentMethods,
}

impl Category {
    /// All categories in wizard order.
    pub const ALL: [Category; 6] = [
        Category::Purposes,
        Category::Areas,
        Category::Statements,
        Category::Skills,
        Category::TeachingMethods,
        Category::AssessmentMethods,
    ];
}

/// Errors from selection mutations.
#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("unknown identifier {id:?} for category {category:?}")]
    UnknownIdentifier { category: Category, id: String },
}

/// Lesson duration choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Duration {
    Single,
    Double,
    #[serde(rename = "halfday")]
    HalfDay,
    #[serde(rename = "fullday")]
    FullDay,
    Week,
    Term,
}

impl Duration {
    pub const ALL: [Duration; 6] = [
        Duration::Single,
        Duration::Double,
        Duration::HalfDay,
        Duration::FullDay,
        Duration::Week,
        Duration::Term,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Duration::Single => "Single lesson (1 hour)",
            Duration::Double => "Double lesson (2 hours)",
            Duration::HalfDay => "Half day",
            Duration::FullDay => "Full day",
            Duration::Week => "Week-long project",
            Duration::Term => "Half-term / Term project",
        }
    }

    /// Display label for an optional duration, `"Not specified"` when unset.
    pub fn label_opt(value: Option<Duration>) -> &'static str {
        value.map(Duration::label).unwrap_or("Not specified")
    }
}

/// The learning-context form: a form, not a picklist. Fully mutable
/// throughout the wizard, with no selected/unselected concept.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingInfo {
    pub topic: String,
    pub progression_step: Option<u8>,
    pub duration: Option<Duration>,
    pub context: String,
}

/// The mutable accumulator of the user's choices.
///
/// Created empty at wizard start, mutated only by toggles and the setting
/// form, reset wholesale -- never partially destroyed.
#[derive(Debug, Clone, Default)]
pub struct SelectionModel {
    purposes: Vec<String>,
    areas: Vec<String>,
    statements: Vec<String>,
    skills: Vec<String>,
    teaching_methods: Vec<String>,
    assessment_methods: Vec<String>,
    pub setting: SettingInfo,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// The selected identifiers for one category, in selection order.
    pub fn selected(&self, category: Category) -> &[String] {
        match category {
            Category::Purposes => &self.purposes,
            Category::Areas => &self.areas,
            Category::Statements => &self.statements,
            Category::Skills => &self.skills,
            Category::TeachingMethods => &self.teaching_methods,
            Category::AssessmentMethods => &self.assessment_methods,
        }
    }

    pub fn is_selected(&self, category: Category, id: &str) -> bool {
        self.selected(category).iter().any(|s| s == id)
    }

    /// Toggle membership of `id` in `category`: remove if present, append
    /// otherwise.
    ///
    /// Fails with [`SelectionError::UnknownIdentifier`] if `id` does not
    /// resolve in the catalog. Removing an area cascade-removes every
    /// selected statement whose owning area is no longer selected.
    pub fn toggle(
        &mut self,
        catalog: &Catalog,
        category: Category,
        id: &str,
    ) -> Result<(), SelectionError> {
        if !resolves(catalog, category, id) {
            return Err(SelectionError::UnknownIdentifier {
                category,
                id: id.to_string(),
            });
        }

        let bucket = self.bucket_mut(category);
        if let Some(pos) = bucket.iter().position(|s| s == id) {
            bucket.remove(pos);
        } else {
            bucket.push(id.to_string());
        }

        if category == Category::Areas {
            self.cascade_statements(catalog);
        }
        Ok(())
    }

    /// Empty one bucket.
    pub fn clear(&mut self, category: Category) {
        self.bucket_mut(category).clear();
    }

    /// Wholesale reset to the initial empty state.
    pub fn reset(&mut self) {
        *self = SelectionModel::new();
    }

    /// True when nothing at all has been picked and the form is untouched.
    pub fn is_empty(&self) -> bool {
        Category::ALL.iter().all(|c| self.selected(*c).is_empty())
            && self.setting.topic.is_empty()
            && self.setting.progression_step.is_none()
            && self.setting.duration.is_none()
            && self.setting.context.is_empty()
    }

    fn bucket_mut(&mut self, category: Category) -> &mut Vec<String> {
        match category {
            Category::Purposes => &mut self.purposes,
            Category::Areas => &mut self.areas,
            Category::Statements => &mut self.statements,
            Category::Skills => &mut self.skills,
            Category::TeachingMethods => &mut self.teaching_methods,
            Category::AssessmentMethods => &mut self.assessment_methods,
        }
    }

    /// Drop selected statements whose owning area is no longer selected.
    ///
    /// Statements are scoped to areas, so the dependency is enforced here at
    /// mutation time rather than by cross-validation at read time.
    fn cascade_statements(&mut self, catalog: &Catalog) {
        let areas = self.areas.clone();
        self.statements.retain(|sid| {
            catalog
                .statement(sid)
                .is_some_and(|(area, _)| areas.iter().any(|a| *a == area.id))
        });
    }
}

fn resolves(catalog: &Catalog, category: Category, id: &str) -> bool {
    match category {
        Category::Purposes => catalog.purpose(id).is_some(),
        Category::Areas => catalog.area(id).is_some(),
        Category::Statements => catalog.statement(id).is_some(),
        Category::Skills => catalog.skill(id).is_some(),
        Category::TeachingMethods => catalog.teaching_method(id).is_some(),
        Category::AssessmentMethods => catalog.assessment_method(id).is_some(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
