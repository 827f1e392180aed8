//! The Curriculum for Wales reference catalog.
//!
//! A fixed, read-only dataset of pickable items: the Four Purposes, the six
//! Areas of Learning and Experience with their nested Statements of What
//! Matters, cross-curricular and wider skills, teaching methods, assessment
//! methods, and the five progression steps. The data is defined in
//! `curriculum.json` and embedded in the binary at compile time.
//!
//! Items reference each other through `good_with` identifier lists. These are
//! weak references: always resolved through the catalog lookup methods at
//! render time, never copied into selection state.

use std::sync::LazyLock;

use serde::Deserialize;

/// One of the Four Purposes of the curriculum.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purpose {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub color: String,
    pub icon: String,
    pub characteristics: Vec<String>,
}

/// An Area of Learning and Experience, owning its Statements of What Matters.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Area {
    pub id: String,
    pub title: String,
    pub color: String,
    pub icon: String,
    pub disciplines: String,
    pub introduction: String,
    pub statements: Vec<Statement>,
}

/// A Statement of What Matters, nested one level under its owning [`Area`].
///
/// Statement identifiers are globally unique even though storage is nested;
/// [`Catalog::statement`] searches across all areas.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statement {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub description: String,
    #[serde(default)]
    pub good_with: Vec<String>,
}

/// A cross-curricular or wider skill.
///
/// Wider skills carry no color, elements or cross-references; the optional
/// fields default to empty.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub color: Option<String>,
    pub icon: String,
    pub description: String,
    #[serde(default)]
    pub elements: Vec<String>,
    #[serde(default)]
    pub good_with: Vec<String>,
}

/// A teaching method adapted from the SCAFFOLD framework.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeachingMethod {
    pub id: String,
    pub title: String,
    pub abbrev: String,
    pub color: String,
    pub icon: String,
    pub description: String,
    pub steps: Vec<String>,
    pub welsh_context: String,
    #[serde(default)]
    pub good_with: Vec<String>,
    #[serde(default)]
    pub good_with_methods: Vec<String>,
}

/// An assessment method.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentMethod {
    pub id: String,
    pub title: String,
    pub color: String,
    pub icon: String,
    pub description: String,
    pub approach: String,
    pub welsh_context: String,
    #[serde(default)]
    pub good_with: Vec<String>,
}

/// A broad age-related progression step.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionStep {
    pub step: u8,
    pub ages: String,
    pub description: String,
}

impl ProgressionStep {
    /// Full display label, e.g. `Step 3: Upper Primary (ages 8–11)`.
    pub fn label(&self) -> String {
        format!("Step {}: {} (ages {})", self.step, self.description, self.ages)
    }
}

/// The complete reference catalog. Immutable for the process lifetime.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub purposes: Vec<Purpose>,
    pub areas: Vec<Area>,
    pub cross_curricular_skills: Vec<Skill>,
    pub wider_skills: Vec<Skill>,
    pub teaching_methods: Vec<TeachingMethod>,
    pub assessment_methods: Vec<AssessmentMethod>,
    pub assessment_principles: Vec<String>,
    pub progression_steps: Vec<ProgressionStep>,
}

/// The embedded curriculum data.
static CURRICULUM_JSON: &str = include_str!("curriculum.json");

static CATALOG: LazyLock<Catalog> = LazyLock::new(|| {
    serde_json::from_str(CURRICULUM_JSON).expect("embedded curriculum.json is invalid")
});

impl Catalog {
    /// The built-in catalog, parsed once from the embedded data.
    ///
    /// # Panics
    ///
    /// Panics if the embedded JSON is malformed. This is a compile-time
    /// invariant -- if the binary was built, the data is valid.
    pub fn get() -> &'static Catalog {
        &CATALOG
    }

    /// Look up a purpose by id.
    pub fn purpose(&self, id: &str) -> Option<&Purpose> {
        self.purposes.iter().find(|p| p.id == id)
    }

    /// Look up an area by id.
    pub fn area(&self, id: &str) -> Option<&Area> {
        self.areas.iter().find(|a| a.id == id)
    }

    /// Look up a statement by bare id, searching across all areas.
    ///
    /// Returns the owning area alongside the statement. The search is over
    /// the global identifier space: it succeeds regardless of which areas
    /// are currently selected.
    pub fn statement(&self, id: &str) -> Option<(&Area, &Statement)> {
        for area in &self.areas {
            if let Some(s) = area.statements.iter().find(|s| s.id == id) {
                return Some((area, s));
            }
        }
        None
    }

    /// Look up a skill by id, cross-curricular skills first, then wider.
    pub fn skill(&self, id: &str) -> Option<&Skill> {
        self.cross_curricular_skills
            .iter()
            .find(|s| s.id == id)
            .or_else(|| self.wider_skills.iter().find(|s| s.id == id))
    }

    /// Look up a teaching method by id.
    pub fn teaching_method(&self, id: &str) -> Option<&TeachingMethod> {
        self.teaching_methods.iter().find(|m| m.id == id)
    }

    /// Look up an assessment method by id.
    pub fn assessment_method(&self, id: &str) -> Option<&AssessmentMethod> {
        self.assessment_methods.iter().find(|m| m.id == id)
    }

    /// Look up a progression step by number.
    pub fn progression_step(&self, step: u8) -> Option<&ProgressionStep> {
        self.progression_steps.iter().find(|p| p.step == step)
    }

    /// Resolve a `good_with` reference to a display label and color.
    ///
    /// References may point at purposes, statements, teaching methods or
    /// skills; unresolvable ids yield `None` and are skipped by callers.
    pub fn cross_reference(&self, id: &str) -> Option<(String, String)> {
        if let Some(p) = self.purpose(id) {
            return Some((format!("{} {}", p.icon, p.title), p.color.clone()));
        }
        if let Some((area, s)) = self.statement(id) {
            return Some((s.title.clone(), area.color.clone()));
        }
        if let Some(m) = self.teaching_method(id) {
            return Some((format!("{} {}", m.icon, m.title), m.color.clone()));
        }
        if let Some(sk) = self.skill(id) {
            let color = sk.color.clone().unwrap_or_else(|| "#5D6D7E".to_string());
            return Some((format!("{} {}", sk.icon, sk.title), color));
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
