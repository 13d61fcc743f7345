//! CEGAR refinement controller
//!
//! Drives one run: analyze an iteration, classify it, and either stop or
//! expand one abstracted unit and analyze again. Every phase races the run
//! watchdog; whatever has been persisted when it fires stays persisted.
//!
//! Stopwatches: `run`, `run:initialization`, `run:finalization`,
//! `iteration-<i>`, `iteration-<i>:{instrumentation,symbolic-execution,
//! classification,refinement}`.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use equiv_storage::{IterationRecord, PartitionRecord, ResultStore, RunRecord};

use crate::config::EquivConfig;
use crate::errors::{EquivError, Result};
use crate::features::classification::{
    classify_iteration, classify_run, classify_verdict, IterationFlags, ResultsBlock, ResultsFile,
};
use crate::features::oracle::{EquivalenceOracle, ExploredPartition, PartitionVerdict};
use crate::features::refinement::domain::{
    after_iteration, CandidateSelector, CegarState, Instrumentation, StopReason,
    SymbolicPathSource, Watchdog,
};
use crate::features::solver::Cancellation;
use crate::shared::timing::Stopwatches;
use crate::Classification;

/// What to analyze
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub benchmark: String,
    /// Program under analysis; a missing file ends the run as `BASE_TOOL_MISSING`
    pub input_file: Option<PathBuf>,
}

impl RunRequest {
    pub fn new(benchmark: impl Into<String>) -> Self {
        Self {
            benchmark: benchmark.into(),
            input_file: None,
        }
    }

    pub fn with_input(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_file = Some(path.into());
        self
    }
}

/// Records written by a finished run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub run: RunRecord,
    pub iterations: Vec<IterationRecord>,
    pub stop_reason: StopReason,
    /// Units expanded, in order
    pub refined: Vec<String>,
}

impl RunOutcome {
    pub fn classification(&self) -> Classification {
        self.run.result.unwrap_or(Classification::Missing)
    }
}

struct RunContext {
    benchmark: String,
    tool: String,
    watches: Stopwatches,
    results: ResultsFile,
    watchdog: Watchdog,
}

struct AnalyzedIteration {
    record: IterationRecord,
    /// UIF names occurring in partitions without a definitive classification
    inconclusive: BTreeSet<String>,
    timed_out: bool,
}

/// Outcome of a single phase raced against the watchdog
enum Raced<T> {
    Done(T),
    Expired,
}

pub struct CegarController {
    config: EquivConfig,
    oracle: EquivalenceOracle,
    store: Arc<dyn ResultStore>,
}

impl CegarController {
    pub fn new(config: EquivConfig, oracle: EquivalenceOracle, store: Arc<dyn ResultStore>) -> Self {
        Self {
            config,
            oracle,
            store,
        }
    }

    pub fn config(&self) -> &EquivConfig {
        &self.config
    }

    /// Run one benchmark to completion, the watchdog, or a storage failure.
    ///
    /// Analysis failures end up in the records; only storage and
    /// results-file failures are returned as errors.
    pub async fn run(
        &self,
        request: &RunRequest,
        instrumentation: &mut dyn Instrumentation,
        source: &mut dyn SymbolicPathSource,
    ) -> Result<RunOutcome> {
        let tool = self.config.tool_label();
        let mut ctx = RunContext {
            benchmark: request.benchmark.clone(),
            tool: tool.clone(),
            watches: Stopwatches::new(),
            results: ResultsFile::for_run(&self.config.run.artifacts_dir, &request.benchmark, &tool),
            watchdog: Watchdog::new(self.config.run.timeout()),
        };
        ctx.watches.start("run");
        ctx.watches.start("run:initialization");

        info!(
            benchmark = %ctx.benchmark,
            tool = %ctx.tool,
            heuristic = %self.config.refinement.heuristic,
            timeout_secs = self.config.run.timeout_secs,
            "Run started"
        );

        self.store.delete_run(&ctx.benchmark, &ctx.tool).await?;
        ctx.results.reset()?;

        let can_iterate = self.config.run.tool.can_iterate();
        let mut run = RunRecord::started(&ctx.benchmark, &ctx.tool);
        run.can_iterate = Some(can_iterate);
        self.store.upsert_run(&run).await?;

        if let Some(input) = request.input_file.as_ref().filter(|p| !p.exists()) {
            ctx.watches.stop("run:initialization");
            warn!(benchmark = %ctx.benchmark, input = %input.display(), "Input does not exist");
            run.result = Some(Classification::BaseToolMissing);
            run.errors = Some(format!("Error: '{}' does not exist.", input.display()));
            return self
                .finish(ctx, run, Vec::new(), Vec::new(), StopReason::BaseToolMissing)
                .await;
        }
        ctx.watches.stop("run:initialization");

        let selector = CandidateSelector::new(self.config.refinement.heuristic);
        let mut refined: BTreeSet<String> = BTreeSet::new();
        let mut refined_order = Vec::new();
        let mut iterations = Vec::new();
        let mut state = CegarState::Analyzing;
        let mut iteration = 0u32;

        let stop_reason = loop {
            iteration += 1;
            debug!(iteration, %state, "Analyzing iteration");

            let analyzed = self
                .analyze_iteration(&mut ctx, iteration, instrumentation, source)
                .await?;
            let classification = analyzed.record.result.unwrap_or(Classification::Unknown);
            info!(
                iteration,
                classification = %classification,
                partitions = analyzed.record.partition_count.unwrap_or(0),
                "Iteration classified"
            );
            iterations.push(analyzed.record);

            if analyzed.timed_out {
                break StopReason::TimedOut;
            }
            match after_iteration(classification, can_iterate) {
                Ok(next) => state = next,
                Err(reason) => break reason,
            }

            debug!(iteration, %state, "Selecting refinement candidate");
            let phase = format!("iteration-{}:refinement", iteration);
            ctx.watches.start(&phase);
            let summary = source.abstraction_summary();
            let Some(unit) = selector
                .select(&summary, &refined, &analyzed.inconclusive)
                .cloned()
            else {
                ctx.watches.stop(&phase);
                info!(iteration, abstracted = summary.shared_count(), "Nothing left to refine");
                break StopReason::NothingLeftToRefine;
            };

            info!(
                iteration,
                unit = %unit.name,
                heuristic = %selector.heuristic(),
                "Refining {}",
                unit.name
            );
            let expanded = race(&ctx.watchdog, instrumentation.expand(&unit)).await;
            ctx.watches.stop(&phase);

            match expanded {
                Raced::Expired => {
                    report_expiry(&ctx, iteration);
                    break StopReason::TimedOut;
                }
                Raced::Done(Err(e)) => {
                    warn!(iteration, unit = %unit.name, error = %e, "Refinement failed");
                    break StopReason::RefinementFailed(e.to_string());
                }
                Raced::Done(Ok(())) => {}
            }
            refined.insert(unit.name.clone());
            refined_order.push(unit.name);
            state = CegarState::Analyzing;
        };

        let classification = match &stop_reason {
            StopReason::TimedOut => Classification::Timeout,
            StopReason::RefinementFailed(_) => Classification::Error,
            _ => classify_run(
                &iterations
                    .iter()
                    .filter_map(|it| it.result)
                    .collect::<Vec<_>>(),
            ),
        };
        run.result = Some(classification);
        run.errors = run_errors(&ctx, &stop_reason, &iterations);

        self.finish(ctx, run, iterations, refined_order, stop_reason)
            .await
    }

    async fn finish(
        &self,
        mut ctx: RunContext,
        mut run: RunRecord,
        iterations: Vec<IterationRecord>,
        refined: Vec<String>,
        stop_reason: StopReason,
    ) -> Result<RunOutcome> {
        ctx.watches.start("run:finalization");

        let any = |flag: fn(&IterationRecord) -> Option<bool>| {
            iterations.iter().any(|it| flag(it) == Some(true))
        };
        run.has_timed_out =
            Some(stop_reason == StopReason::TimedOut || any(|it| it.has_timed_out));
        run.is_depth_limited = Some(any(|it| it.is_depth_limited));
        run.has_uif = Some(any(|it| it.has_uif));
        run.iteration_count = Some(iterations.len() as u32);

        ctx.watches.stop("run:finalization");
        run.runtime = Some(ctx.watches.stop("run").as_secs_f64());
        self.store.upsert_run(&run).await?;

        ctx.watches.stop_all();
        for record in ctx.watches.time_records(&ctx.benchmark, &ctx.tool) {
            self.store.upsert_time(&record).await?;
        }

        info!(
            benchmark = %ctx.benchmark,
            tool = %ctx.tool,
            classification = %run.result.unwrap_or(Classification::Missing),
            iterations = iterations.len(),
            reason = %stop_reason,
            runtime_secs = run.runtime.unwrap_or_default(),
            "Run finished"
        );

        Ok(RunOutcome {
            run,
            iterations,
            stop_reason,
            refined,
        })
    }

    async fn analyze_iteration(
        &self,
        ctx: &mut RunContext,
        iteration: u32,
        instrumentation: &mut dyn Instrumentation,
        source: &mut dyn SymbolicPathSource,
    ) -> Result<AnalyzedIteration> {
        let topic = format!("iteration-{}", iteration);
        ctx.watches.start(&topic);

        let mut record = IterationRecord::started(&ctx.benchmark, &ctx.tool, iteration);
        self.store.upsert_iteration(&record).await?;

        let mut errors: Vec<String> = Vec::new();
        let mut timed_out = false;
        let mut block = ResultsBlock::new(Classification::Unknown);

        // Instrumentation
        let phase = format!("{}:instrumentation", topic);
        ctx.watches.start(&phase);
        match race(&ctx.watchdog, instrumentation.prepare(iteration)).await {
            Raced::Expired => timed_out = true,
            Raced::Done(Err(e)) => errors.push(format!("instrumentation failed: {}", e)),
            Raced::Done(Ok(())) => {}
        }
        block = block.with_timing("instrumentation", ctx.watches.stop(&phase));

        // Symbolic execution
        let mut explored = Vec::new();
        if !timed_out && errors.is_empty() {
            let phase = format!("{}:symbolic-execution", topic);
            ctx.watches.start(&phase);
            match self.explore(ctx, iteration, source, &mut explored).await {
                Ok(Raced::Done(())) => {}
                Ok(Raced::Expired) => timed_out = true,
                Err(e) => {
                    warn!(iteration, error = %e, "Symbolic execution failed");
                    errors.push(format!("symbolic execution failed: {}", e));
                }
            }
            block = block.with_timing("symbolic-execution", ctx.watches.stop(&phase));
        }

        // Classification
        let phase = format!("{}:classification", topic);
        ctx.watches.start(&phase);
        let mut classes = Vec::with_capacity(explored.len());
        let mut partition_errors = Vec::new();
        let mut inconclusive = BTreeSet::new();
        let mut has_uif = false;
        let mut depth_limited = false;

        let batch_size = self.config.solver.parallelism.max(1);
        for batch in explored.chunks(batch_size) {
            if timed_out || ctx.watchdog.is_expired() {
                timed_out = true;
                break;
            }
            let owned = batch.to_vec();
            let oracle = self.oracle.clone();
            let cancel = Cancellation::new();
            let task = {
                let cancel = cancel.clone();
                tokio::task::spawn_blocking(move || {
                    oracle.check_all_until(iteration, &owned, &cancel)
                })
            };

            let verdicts = match race(&ctx.watchdog, task).await {
                Raced::Expired => {
                    // the detached batch stops at its next solver poll
                    cancel.cancel();
                    timed_out = true;
                    break;
                }
                Raced::Done(Err(e)) => {
                    errors.push(format!("partition check aborted: {}", e));
                    break;
                }
                Raced::Done(Ok(verdicts)) => verdicts,
            };

            for (partition, verdict) in batch.iter().zip(verdicts) {
                let (classification, error) = match classify_verdict(&verdict) {
                    Ok(c) => (c, verdict.error.clone()),
                    Err(e) => (Classification::Error, Some(e.to_string())),
                };
                debug!(iteration, partition = verdict.index, %classification, "Partition classified");

                let partition_record =
                    classified_record(ctx, iteration, &verdict, classification, error.clone());
                self.store.upsert_partition(&partition_record).await?;

                if let Some(error) = error {
                    partition_errors.push(format!("P{}: {}", verdict.index, error));
                }
                if !matches!(
                    classification,
                    Classification::Eq | Classification::Neq | Classification::Unreachable
                ) {
                    inconclusive.extend(partition.uif_names());
                }
                has_uif |= verdict.has_uif();
                depth_limited |= verdict.depth_limited;
                classes.push(classification);
            }
        }
        block = block.with_timing("classification", ctx.watches.stop(&phase));

        if timed_out {
            report_expiry(ctx, iteration);
        }

        let flags = IterationFlags {
            is_error: !errors.is_empty(),
            is_timeout: timed_out,
        };
        let classification = classify_iteration(classes, flags);

        if timed_out {
            errors.push(format!("timed out after {} s", ctx.watchdog.limit().as_secs()));
        }
        if classification == Classification::Error {
            errors.extend(partition_errors);
        }

        record.result = Some(classification);
        record.has_timed_out = Some(timed_out);
        record.is_depth_limited = Some(depth_limited);
        record.has_uif = Some(has_uif);
        record.partition_count = Some(explored.len() as u32);
        record.errors = (!errors.is_empty()).then(|| errors.join("\n"));
        record.runtime = Some(ctx.watches.stop(&topic).as_secs_f64());
        self.store.upsert_iteration(&record).await?;

        block.classification = classification;
        if let Some(first) = errors.first() {
            block = block.with_reason(first.clone());
        }
        ctx.results.append(&block)?;

        Ok(AnalyzedIteration {
            record,
            inconclusive,
            timed_out,
        })
    }

    /// Pull partitions until the source is exhausted or the watchdog fires
    async fn explore(
        &self,
        ctx: &RunContext,
        iteration: u32,
        source: &mut dyn SymbolicPathSource,
        explored: &mut Vec<ExploredPartition>,
    ) -> Result<Raced<()>> {
        match race(&ctx.watchdog, source.start(iteration)).await {
            Raced::Expired => return Ok(Raced::Expired),
            Raced::Done(started) => started?,
        }

        loop {
            let next = match race(&ctx.watchdog, source.next_partition()).await {
                Raced::Expired => return Ok(Raced::Expired),
                Raced::Done(next) => next?,
            };
            let Some(partition) = next else {
                return Ok(Raced::Done(()));
            };
            if let Some(last) = explored.last() {
                if partition.index <= last.index {
                    return Err(EquivError::analysis(format!(
                        "partition {} explored after partition {}",
                        partition.index, last.index
                    )));
                }
            }

            self.store
                .upsert_partition(&PartitionRecord::index_only(
                    &ctx.benchmark,
                    &ctx.tool,
                    iteration,
                    partition.index,
                ))
                .await?;
            explored.push(partition);
        }
    }
}

async fn race<F: std::future::Future>(watchdog: &Watchdog, work: F) -> Raced<F::Output> {
    tokio::select! {
        biased;
        _ = watchdog.expired() => Raced::Expired,
        out = work => Raced::Done(out),
    }
}

fn report_expiry(ctx: &RunContext, iteration: u32) {
    if ctx.watchdog.fire() {
        warn!(
            benchmark = %ctx.benchmark,
            tool = %ctx.tool,
            iteration,
            "Watchdog expired after {} s",
            ctx.watchdog.limit().as_secs()
        );
    }
}

fn classified_record(
    ctx: &RunContext,
    iteration: u32,
    verdict: &PartitionVerdict,
    classification: Classification,
    errors: Option<String>,
) -> PartitionRecord {
    let mut record = PartitionRecord::index_only(&ctx.benchmark, &ctx.tool, iteration, verdict.index);
    record.result = Some(classification);
    record.pc_status = verdict.pc_status;
    record.neq_status = verdict.neq_status;
    record.eq_status = verdict.eq_status;
    record.has_uif_pc = Some(verdict.has_uif_pc);
    record.has_uif_v1 = Some(verdict.has_uif_v1);
    record.has_uif_v2 = Some(verdict.has_uif_v2);
    record.has_timed_out = Some(false);
    record.is_depth_limited = Some(verdict.depth_limited);
    record.constraint_count = Some(verdict.constraint_count);
    record.runtime = Some(verdict.runtime.as_secs_f64());
    record.errors = errors;
    record
}

fn run_errors(
    ctx: &RunContext,
    stop_reason: &StopReason,
    iterations: &[IterationRecord],
) -> Option<String> {
    match stop_reason {
        StopReason::TimedOut => iterations
            .last()
            .and_then(|it| it.errors.clone())
            .filter(|e| e.contains("timed out"))
            .or_else(|| Some(format!("timed out after {} s", ctx.watchdog.limit().as_secs()))),
        StopReason::RefinementFailed(e) => Some(e.clone()),
        _ => iterations.last().and_then(|it| it.errors.clone()),
    }
}
