//! `cynllun rubric` -- single-shot analytic rubric generation.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};

use cynllun_core::catalog::Catalog;
use cynllun_core::gateway::{GenerationGateway, RubricRequest, StatementDetail};
use cynllun_core::parse::{format_prose, parse_rubric};

/// Inputs collected from the command line.
#[derive(Debug, Default)]
pub struct RubricArgs {
    pub area: Option<String>,
    pub step: Option<u8>,
    pub statements: Vec<String>,
    pub outcomes: Option<String>,
    pub task: Option<String>,
    pub upload: Option<PathBuf>,
}

/// Resolve CLI arguments into a gateway request.
///
/// Statement ids are looked up in the global identifier space; an unknown
/// id is an input error, not a silent skip.
pub fn build_request(catalog: &Catalog, args: &RubricArgs) -> Result<RubricRequest> {
    let area = match &args.area {
        Some(id) => Some(
            catalog
                .area(id)
                .map(|a| a.title.clone())
                .with_context(|| format!("unknown area {id:?} (see `cynllun catalog areas`)"))?,
        ),
        None => None,
    };

    let progression_step = match args.step {
        Some(n) => Some(
            catalog
                .progression_step(n)
                .map(|p| p.label())
                .with_context(|| format!("unknown progression step {n} (expected 1-5)"))?,
        ),
        None => None,
    };

    let mut selected_statements = Vec::with_capacity(args.statements.len());
    for id in &args.statements {
        let (owner, stmt) = catalog.statement(id).with_context(|| {
            format!("unknown statement {id:?} (see `cynllun catalog statements`)")
        })?;
        selected_statements.push(StatementDetail {
            title: stmt.title.clone(),
            summary: stmt.summary.clone(),
            description: stmt.description.clone(),
            area: owner.title.clone(),
        });
    }

    let uploaded_text = match &args.upload {
        Some(path) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?,
        ),
        None => None,
    };

    let request = RubricRequest {
        area,
        progression_step,
        selected_statements,
        custom_outcomes: args.outcomes.clone(),
        task_description: args.task.clone(),
        uploaded_text,
    };

    if request.is_unanchored() {
        bail!("please provide an area, outcomes, or task description");
    }
    Ok(request)
}

/// Execute the rubric command: build the request, call the gateway, render
/// a table when the response is structured and prose when it is not.
pub async fn run_rubric(gateway: Arc<dyn GenerationGateway>, args: RubricArgs) -> Result<()> {
    let catalog = Catalog::get();
    let request = build_request(catalog, &args)?;

    let response = gateway
        .generate_rubric(&request)
        .await
        .context("rubric generation failed -- try again")?;

    match parse_rubric(&response) {
        Some(rubric) => {
            println!("{}", rubric.title);
            println!("{}", "=".repeat(rubric.title.chars().count()));
            for criterion in &rubric.criteria {
                println!();
                match &criterion.statement {
                    Some(swm) => println!("{} (↳ {swm})", criterion.name),
                    None => println!("{}", criterion.name),
                }
                for level in &rubric.levels {
                    println!("  {level}: {}", criterion.descriptor(level));
                }
            }
        }
        None => {
            // Response was not structured JSON: show it as prose.
            println!("{}", format_prose(&response));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
