//! `buildstate simulate` -- drive concurrent tutoring sessions against a
//! fresh registry.
//!
//! Each session runs as its own tokio task and plays the orchestrator:
//! create a build, stream chunks with progress and partial content, then
//! close it with one terminal call. Afterwards the registry is summarized
//! and drained with a zero-age sweep.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{TimeDelta, Utc};
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;
use serde_json::{json, Map, Value};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use buildstate_core::maintenance::SweepTask;
use buildstate_core::BuildRegistry;
use buildstate_types::build::{BuildKind, BuildStatus, BuildUpdate, NewBuild};
use buildstate_types::config::RegistryConfig;
use buildstate_types::content::{
    ContentPatch, DiagramPatch, FlashcardsPatch, GenericPatch, MindMapPatch, QuizPatch,
};
use buildstate_types::stats::RegistryStats;

const KINDS: [BuildKind; 6] = [
    BuildKind::MindMap,
    BuildKind::Quiz,
    BuildKind::Flashcards,
    BuildKind::Diagram,
    BuildKind::Timeline,
    BuildKind::Summary,
];

/// Shape of one simulation run.
#[derive(Debug, Clone, Copy)]
pub struct SimulationPlan {
    pub sessions: usize,
    pub builds: usize,
    pub chunks: usize,
}

/// Outcome of a simulation run.
#[derive(Debug)]
pub struct SimulationReport {
    pub stats: RegistryStats,
    pub swept: usize,
}

/// Partial content after `step + 1` streamed items of a `kind` build.
fn patch_for(kind: &BuildKind, title: &str, step: usize) -> ContentPatch {
    let items = |label: &str| -> Vec<Value> {
        (0..=step)
            .map(|i| json!({ "id": format!("{label}-{i}") }))
            .collect()
    };

    match kind {
        BuildKind::MindMap => ContentPatch::MindMap(MindMapPatch {
            central_topic: (step == 0).then(|| title.to_string()),
            nodes: Some(items("node")),
        }),
        BuildKind::Quiz => ContentPatch::Quiz(QuizPatch {
            questions: Some(items("question")),
        }),
        BuildKind::Flashcards => ContentPatch::Flashcards(FlashcardsPatch {
            cards: Some(items("card")),
        }),
        BuildKind::Diagram => {
            let edges: Vec<String> = (0..=step).map(|i| format!("N{i}-->N{}", i + 1)).collect();
            ContentPatch::Diagram(DiagramPatch {
                diagram_type: None,
                mermaid_code: Some(format!("graph TD; {}", edges.join("; "))),
            })
        }
        _ => {
            let mut fields = Map::new();
            fields.insert("sections".to_string(), Value::Array(items("section")));
            ContentPatch::Generic(GenericPatch { fields })
        }
    }
}

/// Play one tutoring session's orchestrator against the registry.
async fn run_session(registry: BuildRegistry, session: usize, plan: SimulationPlan) {
    let session_id = format!("session-{session}");
    let persona_id = format!("persona-{}", session % 3);

    for build in 0..plan.builds {
        let kind = KINDS[(session + build) % KINDS.len()].clone();
        let id = Uuid::now_v7().to_string();
        let title = format!("{kind} #{build}");

        registry.create(NewBuild::new(&id, kind.clone(), &session_id, &persona_id, &title));

        for step in 0..plan.chunks {
            let progress = ((step + 1) * 100 / plan.chunks.max(1)) as i64;
            let update = BuildUpdate::progress(progress)
                .with_chunk(format!("chunk-{step}"))
                .with_content(patch_for(&kind, &title, step));
            if registry.update(&id, update).is_none() {
                tracing::warn!(build_id = %id, "build vanished mid-stream");
                break;
            }
            tokio::task::yield_now().await;
        }

        match build % 5 {
            3 => registry.fail(&id, "model stream interrupted"),
            4 => registry.cancel(&id),
            _ => registry.complete(&id, None),
        };
    }
}

/// Run `plan` against a fresh registry, with the maintenance task running
/// alongside when enabled in `config`.
pub async fn run_simulation(
    plan: SimulationPlan,
    config: &RegistryConfig,
) -> Result<SimulationReport> {
    let registry = BuildRegistry::new();
    let cancel = CancellationToken::new();

    let sweeper = config
        .sweep
        .enabled
        .then(|| SweepTask::from_config(registry.clone(), &config.sweep).spawn(cancel.clone()));

    let handles: Vec<_> = (0..plan.sessions)
        .map(|session| tokio::spawn(run_session(registry.clone(), session, plan)))
        .collect();

    for handle in handles {
        handle.await.context("simulated session panicked")?;
    }

    cancel.cancel();
    if let Some(sweeper) = sweeper {
        sweeper.await.context("sweep task panicked")?;
    }

    // Every build is terminal by now; a zero-age sweep measured from just
    // ahead of the clock drains all of them.
    let stats = registry.stats();
    let swept = registry.sweep_as_of(Utc::now() + TimeDelta::seconds(1), Duration::ZERO);
    tracing::info!(total = stats.total_entries, swept, "simulation finished");

    Ok(SimulationReport { stats, swept })
}

fn status_color(status: BuildStatus) -> Color {
    match status {
        BuildStatus::Initializing => Color::Yellow,
        BuildStatus::Building => Color::Blue,
        BuildStatus::Completed => Color::Green,
        BuildStatus::Error => Color::Red,
        BuildStatus::Cancelled => Color::DarkGrey,
    }
}

/// Run the simulation and print its report.
///
/// # Examples
///
/// ```bash
/// buildstate simulate --sessions 8 --builds 10
/// buildstate simulate --json
/// ```
pub async fn simulate(plan: SimulationPlan, config: &RegistryConfig, json: bool) -> Result<()> {
    let report = run_simulation(plan, config).await?;

    if json {
        let output = json!({
            "stats": report.stats,
            "swept": report.swept,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Status").fg(Color::White),
        Cell::new("Builds").fg(Color::White),
    ]);
    for (status, count) in &report.stats.by_status {
        table.add_row(vec![
            Cell::new(status.to_string()).fg(status_color(*status)),
            Cell::new(count.to_string()).fg(Color::White),
        ]);
    }

    let mut kinds = Table::new();
    kinds.load_preset(presets::UTF8_FULL_CONDENSED);
    kinds.set_content_arrangement(ContentArrangement::Dynamic);
    kinds.set_header(vec![
        Cell::new("Kind").fg(Color::White),
        Cell::new("Builds").fg(Color::White),
    ]);
    for (kind, count) in &report.stats.by_kind {
        kinds.add_row(vec![
            Cell::new(kind.to_string()).fg(Color::Cyan),
            Cell::new(count.to_string()).fg(Color::White),
        ]);
    }

    println!();
    println!(
        "  Simulated {} session{} x {} build{}",
        style(plan.sessions).bold(),
        if plan.sessions == 1 { "" } else { "s" },
        style(plan.builds).bold(),
        if plan.builds == 1 { "" } else { "s" },
    );
    println!();
    println!("{table}");
    println!();
    println!("{kinds}");
    println!();
    println!(
        "  {} builds across {} sessions, {} evicted by sweep",
        style(report.stats.total_entries).bold(),
        style(report.stats.distinct_sessions).bold(),
        style(report.swept).green().bold(),
    );
    println!();

    Ok(())
}
