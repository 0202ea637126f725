//! Command dispatch

use std::io;
use std::ops::Range;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::{
    AnimationScheduler, BatchOutcome, LogEntry, ProgressSink, TriggerState, COMPLETION_MESSAGE,
    NO_DATA_MESSAGE, PROCESSING_HEADER,
};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::render::TreeDisplay;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, Settings};
use crate::domain::{leaf_class, route, NodeKind};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::FrameClock;

/// Options of the `run` command.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub batches: Option<usize>,
    pub show_tree: bool,
    pub tooltips: bool,
}

pub async fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Run {
            batches,
            batch_size,
            instant,
            show_tree,
            tooltips,
        }) => {
            let settings = load_settings(cli, *batch_size)?;
            let options = RunOptions {
                batches: *batches,
                show_tree: *show_tree,
                tooltips: *tooltips,
            };
            let container = ServiceContainer::new(settings);
            if *instant {
                drive(container.instant_scheduler()?, options).await
            } else {
                drive(container.realtime_scheduler()?, options).await
            }
        }
        Some(Commands::Tree { edges }) => cmd_tree(load_settings(cli, None)?, *edges),
        Some(Commands::Classify { number }) => cmd_classify(load_settings(cli, None)?, *number),
        Some(Commands::Config { command }) => cmd_config(cli, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Cli::command()
            .print_help()
            .map_err(|e| CliError::io("print help", e)),
    }
}

/// Layered settings plus command-line overrides.
fn load_settings(cli: &Cli, batch_size: Option<usize>) -> CliResult<Settings> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(tree) = &cli.tree {
        settings.tree_path = tree.clone();
    }
    if let Some(records) = &cli.records {
        settings.records_path = records.clone();
    }
    if let Some(width) = cli.width {
        settings.viewport_width = width;
    }
    if let Some(n) = batch_size {
        settings.batch_size = n;
    }
    settings.validate()?;
    debug!("settings: {:?}", settings);
    Ok(settings)
}

/// Prints progress as points settle.
#[derive(Debug, Default)]
struct ConsoleSink {
    settled: usize,
    correct: usize,
}

impl ProgressSink for ConsoleSink {
    fn batch_started(&mut self, range: &Range<usize>, first: bool) {
        if first {
            output::header(PROCESSING_HEADER);
        }
        debug!("batch: records {}..={}", range.start + 1, range.end);
    }

    fn point_settled(&mut self, entry: &LogEntry) {
        self.settled += 1;
        if entry.is_correct() {
            self.correct += 1;
            output::hit(&entry.line());
        } else {
            output::miss(&entry.line());
        }
    }

    fn batch_finished(&mut self, trigger: &TriggerState, complete: bool) {
        if complete {
            output::info(COMPLETION_MESSAGE);
        } else {
            output::action("Next", trigger);
        }
    }
}

#[instrument(skip(scheduler))]
async fn drive<C: FrameClock>(
    mut scheduler: AnimationScheduler<C>,
    options: RunOptions,
) -> CliResult<()> {
    output::info(&scheduler.prompt());
    let mut sink = ConsoleSink::default();
    let mut batches = 0;

    loop {
        if options.batches.is_some_and(|limit| batches >= limit) {
            break;
        }
        match scheduler.run_next_batch(&mut sink).await? {
            BatchOutcome::Completed { complete, .. } => {
                batches += 1;
                if complete {
                    break;
                }
            }
            BatchOutcome::NoData => {
                output::warning(NO_DATA_MESSAGE);
                break;
            }
            BatchOutcome::AllDone | BatchOutcome::Busy => break,
        }
    }

    if sink.settled > 0 {
        output::action(
            "Accuracy",
            &format!("{}/{} correct", sink.correct, sink.settled),
        );
    }

    let session = scheduler.session();
    if options.show_tree {
        output::info(&session.tree().to_display_tree());
    }
    if options.tooltips {
        for point in session.points() {
            let record = &session.records()[point.record_index];
            output::header(&format!("Point {}", point.record_index + 1));
            for line in point.tooltip(record).lines() {
                output::detail(line);
            }
        }
    }
    Ok(())
}

fn cmd_tree(settings: Settings, edges: bool) -> CliResult<()> {
    let container = ServiceContainer::new(settings);
    let session = container.document_loader().load_session(&container.settings)?;
    let tree = session.tree();

    output::header(&format!(
        "{} nodes, depth {}, {} leaves",
        tree.len(),
        tree.depth(),
        tree.leaves().len()
    ));
    output::info(&tree.to_display_tree());

    if edges {
        output::header("Edges");
        for edge in session.edges() {
            let label = |id| {
                tree.get_node(id)
                    .map(|n| n.data.display_label())
                    .unwrap_or_default()
            };
            output::detail(&format!(
                "{} -> {}: length {:.1}, angle {:.1}°",
                label(edge.parent),
                label(edge.child),
                edge.length,
                edge.angle_degrees
            ));
        }
    }
    Ok(())
}

fn cmd_classify(settings: Settings, number: usize) -> CliResult<()> {
    let container = ServiceContainer::new(settings);
    let session = container.document_loader().load_session(&container.settings)?;
    let total = session.total();
    if number == 0 || number > total {
        return Err(CliError::InvalidArgs(format!(
            "record number must be between 1 and {total}"
        )));
    }

    let tree = session.tree();
    let record = &session.records()[number - 1];
    let (leaf, path) = route(tree, record)?;
    let predicted = leaf_class(tree, leaf)?;

    output::header(&format!("Point {number}: {}", record.identity));
    for pair in path.windows(2) {
        let (Some(node), Some(next)) = (tree.get_node(pair[0]), tree.get_node(pair[1])) else {
            continue;
        };
        if let NodeKind::Split { feature, threshold } = &node.data.kind {
            let value = record.feature(feature).unwrap_or(f64::NAN);
            let side = if node.left() == Some(pair[1]) { "left" } else { "right" };
            output::detail(&format!(
                "{} ({feature} = {value}, threshold {threshold}) -> {side}: {}",
                node.data.display_label(),
                next.data.display_label()
            ));
        }
    }
    output::action(
        "Result",
        &format!("Predicted {predicted}, Actual {}", record.ground_truth),
    );
    Ok(())
}

fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli, None)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => match global_config_path() {
            Some(path) => output::info(&path.display()),
            None => output::warning("no home directory; global config disabled"),
        },
    }
    Ok(())
}
