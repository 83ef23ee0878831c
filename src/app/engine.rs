use crate::adapters::classifier::classifier_for;
use crate::adapters::facts::JsonFactProvider;
use crate::adapters::fs::snapshot_store;
use crate::app::dto::*;
use crate::config::AnalysisConfig;
use crate::domain::analysis::CallGraphAnalysis;
use crate::domain::builder::{BuildOptions, BuildSummary, GraphBuilder};
use crate::domain::snapshot::GraphSnapshot;
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;

/// Where the current analysis came from, so `reload` can repeat it.
#[derive(Debug, Clone)]
enum Source {
    Facts(PathBuf),
    Snapshot(PathBuf),
    Prebuilt,
}

#[derive(Clone)]
pub struct TraceEngine {
    inner: Arc<RwLock<EngineData>>,
}

struct EngineData {
    source: Source,
    config: AnalysisConfig,
    analysis: Arc<CallGraphAnalysis>,
}

impl TraceEngine {
    /// Construct an engine from an already-built analysis.
    pub fn from_analysis(analysis: CallGraphAnalysis, config: AnalysisConfig) -> Self {
        Self::with_source(Source::Prebuilt, config, analysis)
    }

    /// Build the call graph from a JSON facts file.
    pub fn load_facts(path: &Path, config: AnalysisConfig) -> Result<Self> {
        let analysis = build_from_facts(path, &config)?;
        Ok(Self::with_source(
            Source::Facts(path.to_path_buf()),
            config,
            analysis,
        ))
    }

    /// Restore the call graph from a snapshot file instead of facts.
    pub fn load_snapshot(path: &Path, config: AnalysisConfig) -> Result<Self> {
        let analysis = restore_from_file(path)?;
        Ok(Self::with_source(
            Source::Snapshot(path.to_path_buf()),
            config,
            analysis,
        ))
    }

    fn with_source(source: Source, config: AnalysisConfig, analysis: CallGraphAnalysis) -> Self {
        Self {
            inner: Arc::new(RwLock::new(EngineData {
                source,
                config,
                analysis: Arc::new(analysis),
            })),
        }
    }

    /// Current analysis. Queries run against this handle without holding the lock.
    pub fn analysis(&self) -> Arc<CallGraphAnalysis> {
        let data = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        data.analysis.clone()
    }

    pub fn config(&self) -> AnalysisConfig {
        let data = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        data.config.clone()
    }

    /// Rebuild from the original source and swap the analysis in.
    pub fn reload(&self) -> Result<HealthResponse> {
        let (source, config) = {
            let data = self.inner.read().unwrap_or_else(PoisonError::into_inner);
            (data.source.clone(), data.config.clone())
        };
        let analysis = match &source {
            Source::Facts(path) => build_from_facts(path, &config)?,
            Source::Snapshot(path) => restore_from_file(path)?,
            Source::Prebuilt => return Ok(self.health()),
        };

        {
            let mut data = self.inner.write().unwrap_or_else(PoisonError::into_inner);
            data.analysis = Arc::new(analysis);
        }
        info!("call graph reloaded");
        Ok(self.health())
    }

    pub fn health(&self) -> HealthResponse {
        let data = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let (source, source_kind) = match &data.source {
            Source::Facts(path) => (path.to_string_lossy().to_string(), SourceKind::Facts),
            Source::Snapshot(path) => (path.to_string_lossy().to_string(), SourceKind::Snapshot),
            Source::Prebuilt => (String::new(), SourceKind::Prebuilt),
        };
        HealthResponse {
            source,
            source_kind,
            node_count: data.analysis.graph().node_count(),
            edge_count: data.analysis.graph().edge_count(),
            entry_point_count: data.analysis.entry_points().len(),
        }
    }

    pub fn summary(&self) -> BuildSummary {
        self.analysis().summary().clone()
    }

    pub fn entry_points(&self) -> EntryPointsResponse {
        let analysis = self.analysis();
        EntryPointsResponse {
            count: analysis.entry_points().len(),
            entry_points: analysis.entry_points().to_vec(),
        }
    }

    pub fn tree(&self, req: TreeRequest) -> Result<TreeResponse> {
        let max_depth = req.max_depth.unwrap_or(self.config().max_depth);
        let tree = self
            .analysis()
            .get_call_tree_for(req.signature.trim(), max_depth)?;
        Ok(TreeResponse::from_tree(tree, max_depth))
    }

    pub fn trees(&self, max_depth: Option<usize>) -> Result<TreesResponse> {
        let max_depth = max_depth.unwrap_or(self.config().max_depth);
        let trees = self
            .analysis()
            .get_all_call_trees(max_depth)?
            .into_iter()
            .map(|t| TreeResponse::from_tree(t, max_depth))
            .collect();
        Ok(TreesResponse { max_depth, trees })
    }

    pub fn cycles(&self) -> CyclesResponse {
        let cycles = self.analysis().detect_circular_references();
        CyclesResponse {
            count: cycles.len(),
            cycles,
        }
    }

    pub fn relations(&self) -> RelationsResponse {
        let relations = self.analysis().get_call_relations();
        RelationsResponse {
            count: relations.len(),
            relations,
        }
    }

    pub fn snapshot(&self, max_depth: Option<usize>) -> Result<GraphSnapshot> {
        let max_depth = max_depth.unwrap_or(self.config().max_depth);
        Ok(self.analysis().save_snapshot(max_depth)?)
    }

    pub fn save_snapshot(&self, path: &Path, max_depth: Option<usize>) -> Result<GraphSnapshot> {
        let snapshot = self.snapshot(max_depth)?;
        snapshot_store::write_snapshot(path, &snapshot)?;
        info!(path = %path.display(), trees = snapshot.trees.len(), "snapshot written");
        Ok(snapshot)
    }
}

fn build_from_facts(path: &Path, config: &AnalysisConfig) -> Result<CallGraphAnalysis> {
    config.validate()?;
    let provider = JsonFactProvider::open(path)?;
    let collected = GraphBuilder::collect_facts(&provider).context("Failed to collect facts")?;
    let classifier = classifier_for(config.classifier);
    let builder = GraphBuilder::with_options(BuildOptions {
        keep_interface_entry_points: config.include_interface_entry_points,
    });
    Ok(builder.build_collected(collected, classifier.as_deref()))
}

fn restore_from_file(path: &Path) -> Result<CallGraphAnalysis> {
    let snapshot = snapshot_store::read_snapshot(path)?;
    CallGraphAnalysis::restore_from_snapshot(&snapshot)
        .with_context(|| format!("Failed to restore snapshot: {}", path.display()))
}
