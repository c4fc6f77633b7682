use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info};

use crate::primitives::trie::BitTrieTree;
use crate::storage::{BuildOptions, GraphBuilder, KillVector, SubsumptionGraph, TraversalStrategy};
use crate::types::{DsgError, Result};

use super::ingest::{for_each_kill_vector, IngestCounts, KillVectorParser};

/// Suffix appended to the input path when no output path is given.
pub const DEFAULT_OUTPUT_SUFFIX: &str = "_graph.dat";

/// Error type for the generate pipeline.
#[derive(Error, Debug)]
pub enum CliError {
    /// Generic error message.
    #[error("{0}")]
    Message(String),
    /// IO error from file operations.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Graph construction or persistence error.
    #[error(transparent)]
    Graph(#[from] DsgError),
}

/// Wall-clock time spent in each build phase.
#[derive(Clone, Copy, Debug, Default)]
pub struct PhaseTimings {
    /// Parsing, deduplication and vertex creation.
    pub classify: Duration,
    /// Hierarchy sort.
    pub sort: Duration,
    /// Dominance search and linking.
    pub link: Duration,
    /// Builder close.
    pub close: Duration,
}

impl PhaseTimings {
    /// Sum of all phases.
    pub fn total(&self) -> Duration {
        self.classify + self.sort + self.link + self.close
    }
}

/// Result of a build together with the figures gathered along the way.
#[derive(Debug)]
pub struct BuildOutcome {
    /// The finished graph.
    pub graph: SubsumptionGraph,
    /// Units read, one per parsed line.
    pub units: u64,
    /// Units killed by at least one test.
    pub killed: u64,
    /// Dominance tests performed while linking.
    pub comparisons: u64,
    /// Line counts from ingestion; zero when built from vectors directly.
    pub ingest: IngestCounts,
    /// Per-phase durations.
    pub timings: PhaseTimings,
}

/// Groups kill-vectors into clusters while a build is in its input phase.
///
/// Repeated vectors are recognised through a bit trie and attached to the
/// vertex created for their first occurrence.
struct Classifier {
    builder: GraphBuilder,
    trie: BitTrieTree,
    units: u64,
    killed: u64,
}

impl Classifier {
    fn open() -> Result<Self> {
        let mut builder = GraphBuilder::new();
        builder.open()?;
        Ok(Self {
            builder,
            trie: BitTrieTree::new(),
            units: 0,
            killed: 0,
        })
    }

    fn classify(&mut self, kill_vector: KillVector) -> Result<()> {
        self.units += 1;
        if kill_vector.is_killed() {
            self.killed += 1;
        }
        let node = self.trie.insert(kill_vector.vector());
        match self.trie.node(node).data() {
            Some(vertex) => self.builder.add_index(kill_vector.unit(), vertex),
            None => {
                let vertex = self.builder.add_node(&kill_vector)?;
                self.trie.attach(node, vertex);
                Ok(())
            }
        }
    }

    fn finish(
        self,
        strategy: TraversalStrategy,
        classify: Duration,
        ingest: IngestCounts,
    ) -> Result<BuildOutcome> {
        let Classifier {
            mut builder,
            trie,
            units,
            killed,
        } = self;
        debug!(units, trie_nodes = trie.node_count(), "pipeline.classified");
        drop(trie);

        let started = Instant::now();
        builder.sort_nodes()?;
        let sort = started.elapsed();

        let started = Instant::now();
        builder.link_nodes(strategy)?;
        let link = started.elapsed();

        let started = Instant::now();
        builder.close()?;
        let close = started.elapsed();

        let comparisons = builder.comparisons();
        let graph = builder.finish()?;
        Ok(BuildOutcome {
            graph,
            units,
            killed,
            comparisons,
            ingest,
            timings: PhaseTimings {
                classify,
                sort,
                link,
                close,
            },
        })
    }
}

/// Runs the four build phases over result lines read from `src`.
pub fn build_from_reader<R: BufRead>(src: R, opts: &BuildOptions) -> Result<BuildOutcome> {
    opts.validate()?;
    let parser = KillVectorParser::new(opts.test_count, opts.bias);
    let started = Instant::now();
    let mut classifier = Classifier::open()?;
    let ingest = for_each_kill_vector(src, &parser, |kv| classifier.classify(kv))?;
    let classify = started.elapsed();
    classifier.finish(opts.strategy, classify, ingest)
}

/// Runs the build phases over already parsed kill-vectors.
pub fn build_from_kill_vectors<I>(vectors: I, strategy: TraversalStrategy) -> Result<BuildOutcome>
where
    I: IntoIterator<Item = KillVector>,
{
    let started = Instant::now();
    let mut classifier = Classifier::open()?;
    for kv in vectors {
        classifier.classify(kv)?;
    }
    let classify = started.elapsed();
    classifier.finish(strategy, classify, IngestCounts::default())
}

/// Configuration for one `generate` run.
#[derive(Clone, Debug)]
pub struct GenerateConfig {
    /// Result file to read.
    pub input: PathBuf,
    /// Graph file to write; derived from `input` when absent.
    pub output: Option<PathBuf>,
    /// Suffix used to derive the output path.
    pub output_suffix: String,
    /// Build settings.
    pub options: BuildOptions,
}

impl GenerateConfig {
    /// Creates a configuration with default build options.
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: None,
            output_suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
            options: BuildOptions::default(),
        }
    }

    /// Output path actually used.
    pub fn output_path(&self) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None => default_output_path(&self.input, &self.output_suffix),
        }
    }
}

/// Appends `suffix` to the full input path, extension included.
pub fn default_output_path(input: &Path, suffix: &str) -> PathBuf {
    let mut raw = input.as_os_str().to_os_string();
    raw.push(suffix);
    PathBuf::from(raw)
}

/// Summary of a finished `generate` run.
#[derive(Debug)]
pub struct GenerateSummary {
    /// Path the graph was written to.
    pub output: PathBuf,
    /// Build results.
    pub outcome: BuildOutcome,
    /// Time spent writing the graph file.
    pub write: Duration,
}

/// Builds the graph for `cfg.input` and writes it to the output path.
pub fn generate(cfg: &GenerateConfig) -> std::result::Result<GenerateSummary, CliError> {
    if !cfg.input.is_file() {
        return Err(CliError::Message(format!(
            "input {} does not exist or is not a file",
            cfg.input.display()
        )));
    }
    let output = cfg.output_path();
    if output == cfg.input {
        return Err(CliError::Message(
            "output path must differ from the input path".into(),
        ));
    }
    let reader = BufReader::new(File::open(&cfg.input)?);
    let outcome = build_from_reader(reader, &cfg.options)?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let started = Instant::now();
    outcome.graph.save(&output)?;
    let write = started.elapsed();
    info!(
        input = %cfg.input.display(),
        output = %output.display(),
        units = outcome.units,
        clusters = outcome.graph.graph.len(),
        "pipeline.generate.complete"
    );
    Ok(GenerateSummary {
        output,
        outcome,
        write,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{UnitId, VertexId};

    #[test]
    fn reader_build_merges_repeated_vectors() {
        let input = "1 [2]: t1 t3\n2 [1]: t1\n3 [2]: t1 t3\n\n4 [0]:\n";
        let opts = BuildOptions::new().test_count(3).bias(1);
        let outcome = build_from_reader(input.as_bytes(), &opts).unwrap();
        let built = &outcome.graph;
        assert_eq!(outcome.units, 4);
        assert_eq!(outcome.killed, 3);
        assert_eq!(outcome.ingest.skipped, 1);
        assert_eq!(built.graph.len(), 3);
        assert_eq!(built.index.vertex_of_unit(UnitId(3)), Some(VertexId(0)));
        assert_eq!(built.index.units_of(VertexId(0)).unwrap(), &[UnitId(1), UnitId(3)]);
        assert_eq!(built.graph.edge_count(), 2);
    }

    #[test]
    fn invalid_options_are_rejected_before_reading() {
        let opts = BuildOptions::new().test_count(0);
        assert!(matches!(
            build_from_reader("1 [0]:".as_bytes(), &opts),
            Err(DsgError::InvalidArgument(_))
        ));
    }

    #[test]
    fn duplicate_unit_ids_abort_the_build() {
        let input = "1 [1]: t0\n1 [1]: t1\n";
        let opts = BuildOptions::new().test_count(2);
        assert!(matches!(
            build_from_reader(input.as_bytes(), &opts),
            Err(DsgError::DuplicateUnit(UnitId(1)))
        ));
    }

    #[test]
    fn output_path_appends_suffix() {
        let cfg = GenerateConfig::new("data/run.txt");
        assert_eq!(cfg.output_path(), PathBuf::from("data/run.txt_graph.dat"));
        let mut cfg = cfg;
        cfg.output = Some(PathBuf::from("out.bin"));
        assert_eq!(cfg.output_path(), PathBuf::from("out.bin"));
    }
}
