//! `cynllun catalog` -- explore the curriculum reference data.

use anyhow::Result;

use cynllun_core::catalog::Catalog;

/// Print the catalog, optionally filtered to one group.
pub fn run_catalog(filter: Option<&str>) -> Result<()> {
    let catalog = Catalog::get();
    match filter.unwrap_or("all") {
        "all" => {
            print_purposes(catalog);
            println!();
            print_areas(catalog, true);
            println!();
            print_skills(catalog);
            println!();
            print_teaching(catalog);
            println!();
            print_assessment(catalog);
        }
        "purposes" => print_purposes(catalog),
        "areas" => print_areas(catalog, false),
        "statements" => print_areas(catalog, true),
        "skills" => print_skills(catalog),
        "teaching" => print_teaching(catalog),
        "assessment" => print_assessment(catalog),
        other => anyhow::bail!(
            "unknown catalog filter {other:?} (expected purposes, areas, statements, skills, teaching, or assessment)"
        ),
    }
    Ok(())
}

fn print_purposes(catalog: &Catalog) {
    println!("Four Purposes");
    for p in &catalog.purposes {
        println!("  {} {} — {}", p.icon, p.title, p.subtitle);
    }
}

fn print_areas(catalog: &Catalog, with_statements: bool) {
    println!("Areas of Learning & Experience");
    for area in &catalog.areas {
        println!("  {} {} — {}", area.icon, area.title, area.disciplines);
        if with_statements {
            for s in &area.statements {
                println!("    {} — {}", s.title, s.summary);
            }
        }
    }
}

fn print_skills(catalog: &Catalog) {
    println!("Cross-Curricular Skills");
    for s in &catalog.cross_curricular_skills {
        println!("  {} {} — {}", s.icon, s.title, s.description);
    }
    println!("Wider Skills");
    for s in &catalog.wider_skills {
        println!("  {} {} — {}", s.icon, s.title, s.description);
    }
}

fn print_teaching(catalog: &Catalog) {
    println!("Teaching Methods");
    for m in &catalog.teaching_methods {
        println!("  {} {} ({}) — {}", m.icon, m.title, m.abbrev, m.description);
    }
}

fn print_assessment(catalog: &Catalog) {
    println!("Assessment Methods");
    for m in &catalog.assessment_methods {
        println!("  {} {} — {}", m.icon, m.title, m.description);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
