//! Expression, partition and trace builders

use std::future::pending;

use async_trait::async_trait;

use equiv_core::features::constraint_model::{Expression, Operator, Sort};
use equiv_core::features::oracle::{ExploredPartition, ResultValue};
use equiv_core::features::refinement::{
    AbstractedUnit, AbstractionSummary, Instrumentation, SymbolicPathSource, Trace,
    TraceIteration, TraceSource,
};
use equiv_core::Result;

pub fn x() -> Expression {
    Expression::int_var("x")
}

pub fn gt(left: Expression, right: Expression) -> Expression {
    Expression::binary(Operator::Gt, left, right)
}

/// `name(x)` over integers
pub fn uf(name: &str) -> Expression {
    Expression::uif(name, Sort::Int, vec![x()])
}

pub fn partition(
    index: u32,
    pc: Expression,
    v1: impl Into<ResultValue>,
    v2: impl Into<ResultValue>,
) -> ExploredPartition {
    ExploredPartition::new(index, pc, v1, v2)
}

/// `x > 0`, both versions return `x`
pub fn equal_partition(index: u32) -> ExploredPartition {
    partition(index, gt(x(), Expression::int(0)), x(), x())
}

/// `name(x) > 0`, V1 = `name(x)`, V2 = `x`
pub fn abstracted_partition(index: u32, name: &str) -> ExploredPartition {
    partition(index, gt(uf(name), Expression::int(0)), uf(name), x())
}

#[derive(Debug, Default)]
pub struct TraceBuilder {
    trace: Trace,
}

impl TraceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iteration(
        mut self,
        expanded: &[&str],
        summary: Vec<AbstractedUnit>,
        partitions: Vec<ExploredPartition>,
    ) -> Self {
        self.trace.iterations.push(TraceIteration {
            expanded: expanded.iter().map(|s| s.to_string()).collect(),
            summary: AbstractionSummary::new(summary),
            partitions,
        });
        self
    }

    pub fn build(self) -> TraceSource {
        TraceSource::new(self.trace)
    }
}

/// Yields its partitions, then never completes
pub struct StallingSource {
    partitions: Vec<ExploredPartition>,
}

impl StallingSource {
    pub fn new(partitions: Vec<ExploredPartition>) -> Self {
        let mut partitions = partitions;
        partitions.reverse();
        Self { partitions }
    }
}

#[async_trait]
impl SymbolicPathSource for StallingSource {
    async fn start(&mut self, _iteration: u32) -> Result<()> {
        Ok(())
    }

    async fn next_partition(&mut self) -> Result<Option<ExploredPartition>> {
        match self.partitions.pop() {
            Some(p) => Ok(Some(p)),
            None => pending().await,
        }
    }

    fn abstraction_summary(&self) -> AbstractionSummary {
        AbstractionSummary::default()
    }
}

/// Accepts every expansion without doing anything
#[derive(Debug, Default)]
pub struct NoopInstrumentation {
    pub expanded: Vec<String>,
}

#[async_trait]
impl Instrumentation for NoopInstrumentation {
    async fn expand(&mut self, unit: &AbstractedUnit) -> Result<()> {
        self.expanded.push(unit.name.clone());
        Ok(())
    }
}
