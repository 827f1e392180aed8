//! Projections of the selection model into displayable views.
//!
//! All functions here are pure and total: given a well-formed selection
//! model they never fail, resolving every identifier through the catalog at
//! build time. Nothing is cached -- views are re-derived on every call.

use serde::Serialize;

use crate::catalog::Catalog;
use crate::selection::{Category, Duration, SelectionModel};

/// One colored chip in the compact selection summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chip {
    pub label: String,
    pub color: String,
}

/// One card within a document section.
#[derive(Debug, Clone, Serialize)]
pub struct PlanCard {
    pub title: String,
    pub body: Vec<String>,
    pub color: String,
}

/// One titled section of the plan document.
#[derive(Debug, Clone, Serialize)]
pub struct Section {
    pub title: String,
    pub cards: Vec<PlanCard>,
}

/// The derived plan document. Recomputed from selection + catalog on
/// demand; never stored authoritatively.
#[derive(Debug, Clone, Serialize)]
pub struct PlanDocument {
    pub title: String,
    pub sections: Vec<Section>,
}

/// Compact chip summary: one chip per selected Purpose then per selected
/// Area, in catalog declaration order regardless of selection order.
pub fn chip_summary(selection: &SelectionModel, catalog: &Catalog) -> Vec<Chip> {
    let mut chips = Vec::new();
    for p in &catalog.purposes {
        if selection.is_selected(Category::Purposes, &p.id) {
            chips.push(Chip {
                label: format!("{} {}", p.icon, p.title),
                color: p.color.clone(),
            });
        }
    }
    for a in &catalog.areas {
        if selection.is_selected(Category::Areas, &a.id) {
            chips.push(Chip {
                label: format!("{} {}", a.icon, a.title),
                color: a.color.clone(),
            });
        }
    }
    chips
}

/// Build the full sectioned document.
///
/// The learning-context section is always present (missing topic renders a
/// placeholder, never an error); category sections are omitted entirely
/// when their selection set is empty; items render in selection order.
pub fn full_summary(selection: &SelectionModel, catalog: &Catalog) -> PlanDocument {
    let mut sections = Vec::new();

    let setting = &selection.setting;
    let topic = if setting.topic.is_empty() {
        "Topic not specified".to_string()
    } else {
        setting.topic.clone()
    };
    let mut context_body = vec![
        format!(
            "Progression Step: {}",
            setting
                .progression_step
                .and_then(|n| catalog.progression_step(n))
                .map(|p| p.label())
                .unwrap_or_else(|| "Not specified".to_string())
        ),
        format!("Duration: {}", Duration::label_opt(setting.duration)),
    ];
    if !setting.context.is_empty() {
        context_body.push(format!("Context: {}", setting.context));
    }
    sections.push(Section {
        title: "📍 Learning Context".to_string(),
        cards: vec![PlanCard {
            title: topic,
            body: context_body,
            color: "#1e8449".to_string(),
        }],
    });

    let purposes: Vec<PlanCard> = selection
        .selected(Category::Purposes)
        .iter()
        .filter_map(|id| catalog.purpose(id))
        .map(|p| PlanCard {
            title: format!("{} {}", p.icon, p.title),
            body: vec![
                p.subtitle.clone(),
                format!(
                    "Key characteristics: {}",
                    p.characteristics.iter().take(3).cloned().collect::<Vec<_>>().join(" · ")
                ),
            ],
            color: p.color.clone(),
        })
        .collect();
    push_section(&mut sections, "🎯 Four Purposes", purposes);

    let areas: Vec<PlanCard> = selection
        .selected(Category::Areas)
        .iter()
        .filter_map(|id| catalog.area(id))
        .map(|a| PlanCard {
            title: format!("{} {}", a.icon, a.title),
            body: vec![a.disciplines.clone()],
            color: a.color.clone(),
        })
        .collect();
    push_section(&mut sections, "📖 Areas of Learning & Experience", areas);

    // Statement lookup is over the global id space: a statement stays in the
    // document even if its owning area was deselected after it was picked.
    let statements: Vec<PlanCard> = selection
        .selected(Category::Statements)
        .iter()
        .filter_map(|id| catalog.statement(id))
        .map(|(area, s)| PlanCard {
            title: s.title.clone(),
            body: vec![s.summary.clone(), truncate(&s.description, 200)],
            color: area.color.clone(),
        })
        .collect();
    push_section(&mut sections, "💡 Statements of What Matters", statements);

    let skills: Vec<PlanCard> = selection
        .selected(Category::Skills)
        .iter()
        .filter_map(|id| catalog.skill(id))
        .map(|sk| PlanCard {
            title: format!("{} {}", sk.icon, sk.title),
            body: vec![sk.description.clone()],
            color: sk.color.clone().unwrap_or_else(|| "#5D6D7E".to_string()),
        })
        .collect();
    push_section(&mut sections, "🔗 Cross-Curricular & Wider Skills", skills);

    let teaching: Vec<PlanCard> = selection
        .selected(Category::TeachingMethods)
        .iter()
        .filter_map(|id| catalog.teaching_method(id))
        .map(|m| {
            let mut body = vec![m.description.clone(), "Steps:".to_string()];
            body.extend(
                m.steps
                    .iter()
                    .enumerate()
                    .map(|(i, s)| format!("  {}. {s}", i + 1)),
            );
            body.push(format!("Welsh context: {}", m.welsh_context));
            PlanCard {
                title: format!("{} {} ({})", m.icon, m.title, m.abbrev),
                body,
                color: m.color.clone(),
            }
        })
        .collect();
    push_section(&mut sections, "🏗️ Teaching Methods", teaching);

    let assessment: Vec<PlanCard> = selection
        .selected(Category::AssessmentMethods)
        .iter()
        .filter_map(|id| catalog.assessment_method(id))
        .map(|m| PlanCard {
            title: format!("{} {}", m.icon, m.title),
            body: vec![
                m.description.clone(),
                format!("Approach: {}", m.approach),
                format!("Welsh context: {}", m.welsh_context),
            ],
            color: m.color.clone(),
        })
        .collect();
    push_section(&mut sections, "📋 Assessment Methods", assessment);

    sections.push(Section {
        title: "📐 Assessment Principles".to_string(),
        cards: catalog
            .assessment_principles
            .iter()
            .map(|p| PlanCard {
                title: p.clone(),
                body: Vec::new(),
                color: "#1e8449".to_string(),
            })
            .collect(),
    });

    PlanDocument {
        title: "Curriculum Planning Card — Lesson Plan".to_string(),
        sections,
    }
}

/// Build the plain-text context payload for the generation gateway.
///
/// Labelled lines for the setting, then one block per non-empty category of
/// `- title: summary` lines. This is the exact request contract: field
/// order and the empty-category omission rule match [`full_summary`].
pub fn plain_text_context(selection: &SelectionModel, catalog: &Catalog) -> String {
    let setting = &selection.setting;
    let mut out = String::new();

    let topic = if setting.topic.is_empty() {
        "Not specified"
    } else {
        setting.topic.as_str()
    };
    out.push_str(&format!("TOPIC: {topic}\n"));
    out.push_str(&format!(
        "PROGRESSION STEP: {}\n",
        setting
            .progression_step
            .map(|n| format!("Step {n}"))
            .unwrap_or_else(|| "Not specified".to_string())
    ));
    out.push_str(&format!("DURATION: {}\n", Duration::label_opt(setting.duration)));
    if !setting.context.is_empty() {
        out.push_str(&format!("CONTEXT: {}\n", setting.context));
    }

    push_block(
        &mut out,
        "FOUR PURPOSES",
        selection
            .selected(Category::Purposes)
            .iter()
            .filter_map(|id| catalog.purpose(id))
            .map(|p| (p.title.clone(), p.subtitle.clone())),
    );
    push_block(
        &mut out,
        "AREAS OF LEARNING",
        selection
            .selected(Category::Areas)
            .iter()
            .filter_map(|id| catalog.area(id))
            .map(|a| (a.title.clone(), a.disciplines.clone())),
    );
    push_block(
        &mut out,
        "STATEMENTS OF WHAT MATTERS",
        selection
            .selected(Category::Statements)
            .iter()
            .filter_map(|id| catalog.statement(id))
            .map(|(_, s)| (s.title.clone(), s.summary.clone())),
    );
    push_block(
        &mut out,
        "CROSS-CURRICULAR SKILLS",
        selection
            .selected(Category::Skills)
            .iter()
            .filter_map(|id| catalog.skill(id))
            .map(|sk| (sk.title.clone(), sk.description.clone())),
    );
    push_block(
        &mut out,
        "TEACHING METHODS",
        selection
            .selected(Category::TeachingMethods)
            .iter()
            .filter_map(|id| catalog.teaching_method(id))
            .map(|m| (m.title.clone(), m.description.clone())),
    );
    push_block(
        &mut out,
        "ASSESSMENT METHODS",
        selection
            .selected(Category::AssessmentMethods)
            .iter()
            .filter_map(|id| catalog.assessment_method(id))
            .map(|m| (m.title.clone(), m.description.clone())),
    );

    out
}

impl PlanDocument {
    /// Render the document as printable plain text, appending the cached
    /// enhancement blob (if any) under its own banner.
    pub fn to_text(&self, enhancement: Option<&str>) -> String {
        let mut out = String::new();
        out.push_str(&self.title);
        out.push_str("\nCurriculum for Wales 2022\n");
        for section in &self.sections {
            out.push('\n');
            out.push_str(&section.title);
            out.push('\n');
            for card in &section.cards {
                out.push_str(&format!("  {}\n", card.title));
                for line in &card.body {
                    out.push_str(&format!("    {line}\n"));
                }
            }
        }
        if let Some(text) = enhancement {
            out.push_str("\n========================================\n");
            out.push_str("AI-GENERATED ACTIVITY IDEAS\n");
            out.push_str("========================================\n\n");
            out.push_str(text);
            out.push('\n');
        }
        out
    }
}

fn push_section(sections: &mut Vec<Section>, title: &str, cards: Vec<PlanCard>) {
    if !cards.is_empty() {
        sections.push(Section {
            title: title.to_string(),
            cards,
        });
    }
}

fn push_block(
    out: &mut String,
    label: &str,
    items: impl Iterator<Item = (String, String)>,
) {
    let lines: Vec<String> = items.map(|(title, summary)| format!("- {title}: {summary}")).collect();
    if lines.is_empty() {
        return;
    }
    out.push_str(&format!("\n{label}:\n"));
    for line in &lines {
        out.push_str(line);
        out.push('\n');
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{cut}…")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> &'static Catalog {
        Catalog::get()
    }

    fn sample_selection() -> SelectionModel {
        let mut sel = SelectionModel::new();
        let cat = catalog();
        sel.setting.topic = "Local river ecosystems".to_string();
        sel.setting.progression_step = Some(3);
        sel.setting.duration = Some(Duration::Single);
        sel.toggle(cat, Category::Purposes, "ethical").unwrap();
        sel.toggle(cat, Category::Areas, "science-tech").unwrap();
        sel.toggle(cat, Category::Statements, "st-swm3").unwrap();
        sel.toggle(cat, Category::TeachingMethods, "tm-laboratory").unwrap();
        sel
    }

    #[test]
    fn chips_follow_catalog_order_not_selection_order() {
        let cat = catalog();
        let mut sel = SelectionModel::new();
        // Select in reverse catalog order.
        sel.toggle(cat, Category::Purposes, "healthy").unwrap();
        sel.toggle(cat, Category::Purposes, "ambitious").unwrap();
        sel.toggle(cat, Category::Areas, "maths").unwrap();
        sel.toggle(cat, Category::Areas, "expressive-arts").unwrap();

        let chips = chip_summary(&sel, cat);
        let labels: Vec<&str> = chips
            .iter()
            .map(|c| c.label.as_str())
            .map(|l| l.split_once(' ').map(|(_, rest)| rest).unwrap_or(l))
            .collect();
        assert_eq!(
            labels,
            [
                "Ambitious, Capable Learners",
                "Healthy, Confident Individuals",
                "Expressive Arts",
                "Mathematics & Numeracy",
            ]
        );
    }

    #[test]
    fn empty_categories_are_omitted_from_document() {
        let doc = full_summary(&sample_selection(), catalog());
        let titles: Vec<&str> = doc.sections.iter().map(|s| s.title.as_str()).collect();
        assert!(titles.contains(&"🎯 Four Purposes"));
        assert!(!titles.iter().any(|t| t.contains("Skills")), "no skills selected");
        assert!(!titles.iter().any(|t| t.contains("Assessment Methods")));
        // Context and principles are always present.
        assert!(titles.contains(&"📍 Learning Context"));
        assert!(titles.contains(&"📐 Assessment Principles"));
    }

    #[test]
    fn empty_topic_renders_placeholder() {
        let sel = SelectionModel::new();
        let doc = full_summary(&sel, catalog());
        assert_eq!(doc.sections[0].cards[0].title, "Topic not specified");
    }

    #[test]
    fn statement_survives_area_deselection() {
        let cat = catalog();
        let mut sel = sample_selection();
        sel.toggle(cat, Category::Areas, "humanities").unwrap();
        sel.toggle(cat, Category::Statements, "hu-swm3").unwrap();
        sel.toggle(cat, Category::Areas, "science-tech").unwrap();

        // st-swm3 was cascade-removed; hu-swm3 remains and still resolves.
        let doc = full_summary(&sel, cat);
        let stmts = doc
            .sections
            .iter()
            .find(|s| s.title.contains("What Matters"))
            .expect("statements section present");
        assert_eq!(stmts.cards.len(), 1);
        assert_eq!(stmts.cards[0].title, "Our Natural World");
    }

    #[test]
    fn plain_text_context_shape() {
        let ctx = plain_text_context(&sample_selection(), catalog());
        assert!(ctx.starts_with("TOPIC: Local river ecosystems\n"));
        assert!(ctx.contains("PROGRESSION STEP: Step 3\n"));
        assert!(ctx.contains("DURATION: Single lesson (1 hour)\n"));
        assert!(ctx.contains("\nFOUR PURPOSES:\n- Ethical, Informed Citizens:"));
        assert!(ctx.contains("\nTEACHING METHODS:\n- Laboratory Learning:"));
        // Empty categories omit header and body.
        assert!(!ctx.contains("CROSS-CURRICULAR SKILLS:"));
        assert!(!ctx.contains("ASSESSMENT METHODS:"));
        // Optional context line omitted when blank.
        assert!(!ctx.contains("CONTEXT:"));
    }

    #[test]
    fn plain_text_context_is_deterministic() {
        let sel = sample_selection();
        let a = plain_text_context(&sel, catalog());
        let b = plain_text_context(&sel, catalog());
        assert_eq!(a, b);
    }

    #[test]
    fn empty_selection_still_renders_setting_lines() {
        let ctx = plain_text_context(&SelectionModel::new(), catalog());
        assert_eq!(
            ctx,
            "TOPIC: Not specified\nPROGRESSION STEP: Not specified\nDURATION: Not specified\n"
        );
    }

    #[test]
    fn to_text_appends_enhancement_banner() {
        let doc = full_summary(&sample_selection(), catalog());
        let text = doc.to_text(Some("1. Pond Dipping\nExplore the stream."));
        assert!(text.contains("AI-GENERATED ACTIVITY IDEAS"));
        assert!(text.ends_with("Explore the stream.\n"));
        let plain = doc.to_text(None);
        assert!(!plain.contains("AI-GENERATED"));
    }

    #[test]
    fn truncate_is_char_safe() {
        let long = "ä".repeat(300);
        let t = super::truncate(&long, 200);
        assert_eq!(t.chars().count(), 201, "200 chars plus ellipsis");
    }
}
