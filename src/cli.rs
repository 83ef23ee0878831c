use crate::app::dto::TreeRequest;
use crate::app::engine::TraceEngine;
use anyhow::Result;
use serde::Serialize;
use std::path::Path;

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn display_summary(engine: &TraceEngine, json: bool) -> Result<()> {
    let health = engine.health();
    let summary = engine.summary();
    if json {
        return print_json(&serde_json::json!({
            "health": health,
            "summary": summary,
        }));
    }

    println!("Call Graph Summary:");
    println!("  Source: {}", health.source);
    println!("  Classes: {}", summary.classes);
    println!("  Methods: {}", summary.methods);
    println!("  Nodes: {}", health.node_count);
    println!("  Edges: {}", health.edge_count);
    println!("  Entry points: {}", health.entry_point_count);
    println!(
        "  Calls: {} resolved, {} heuristic, {} skipped",
        summary.resolved_calls, summary.heuristic_calls, summary.skipped_calls
    );
    println!(
        "  Skipped: {} files, {} classes",
        summary.skipped_files, summary.skipped_classes
    );
    println!(
        "  Dispatch: {} interface calls, {} edges added, {} misses",
        summary.dispatch.interface_calls, summary.dispatch.expanded_edges, summary.dispatch.misses
    );
    Ok(())
}

pub fn display_entry_points(engine: &TraceEngine, json: bool) -> Result<()> {
    let result = engine.entry_points();
    if json {
        return print_json(&result);
    }

    println!("Found {} entry point(s):", result.count);
    println!("{}", "=".repeat(80));
    for (i, entry) in result.entry_points.iter().enumerate() {
        println!("{}. [{}] {}", i + 1, entry.descriptor(), entry.signature);
        println!("   {}", entry.file_path);
    }
    Ok(())
}

pub fn display_call_tree(
    engine: &TraceEngine,
    signature: &str,
    max_depth: Option<usize>,
    json: bool,
) -> Result<()> {
    let result = engine.tree(TreeRequest {
        signature: signature.to_string(),
        max_depth,
    })?;
    if json {
        return print_json(&result);
    }
    print!("{}", result.rendered);
    Ok(())
}

pub fn display_all_call_trees(engine: &TraceEngine, max_depth: Option<usize>, json: bool) -> Result<()> {
    let result = engine.trees(max_depth)?;
    if json {
        return print_json(&result);
    }
    for tree in &result.trees {
        print!("{}", tree.rendered);
        println!();
    }
    Ok(())
}

pub fn display_cycles(engine: &TraceEngine, json: bool) -> Result<()> {
    let result = engine.cycles();
    if json {
        return print_json(&result);
    }

    if result.cycles.is_empty() {
        println!("No circular references found.");
        return Ok(());
    }
    println!("Found {} circular reference(s):", result.count);
    for (i, cycle) in result.cycles.iter().enumerate() {
        println!("{}. {}", i + 1, cycle.join(" -> "));
    }
    Ok(())
}

pub fn display_relations(engine: &TraceEngine, json: bool) -> Result<()> {
    let result = engine.relations();
    if json {
        return print_json(&result);
    }
    for edge in &result.relations {
        println!("{} -> {}", edge.caller, edge.callee);
    }
    Ok(())
}

pub fn write_snapshot(engine: &TraceEngine, out: &Path, max_depth: Option<usize>) -> Result<()> {
    let snapshot = engine.save_snapshot(out, max_depth)?;
    println!(
        "Snapshot written to {} ({} trees, max depth {})",
        out.display(),
        snapshot.trees.len(),
        snapshot.max_depth
    );
    Ok(())
}
