//! Explored partitions as delivered by a symbolic path source

use serde::{Deserialize, Serialize};

use crate::features::constraint_model::{Constant, Expression};

/// Result of one version on one path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResultValue {
    Concrete { value: Constant },
    Symbolic { expr: Expression },
    /// The version raised an error instead of returning
    Raised { error: String },
}

impl ResultValue {
    pub fn concrete(value: Constant) -> Self {
        Self::Concrete { value }
    }

    pub fn symbolic(expr: Expression) -> Self {
        Self::Symbolic { expr }
    }

    pub fn raised(error: impl Into<String>) -> Self {
        Self::Raised {
            error: error.into(),
        }
    }

    /// Expression form; `None` for raised errors
    pub fn to_expression(&self) -> Option<Expression> {
        match self {
            Self::Concrete { value } => Some(Expression::Constant {
                value: value.clone(),
            }),
            Self::Symbolic { expr } => Some(expr.clone()),
            Self::Raised { .. } => None,
        }
    }

    pub fn raised_error(&self) -> Option<&str> {
        match self {
            Self::Raised { error } => Some(error),
            _ => None,
        }
    }

    pub fn contains_uif(&self) -> bool {
        match self {
            Self::Symbolic { expr } => expr.contains_uif(),
            _ => false,
        }
    }
}

impl From<Expression> for ResultValue {
    fn from(expr: Expression) -> Self {
        match expr {
            Expression::Constant { value } => Self::Concrete { value },
            other => Self::Symbolic { expr: other },
        }
    }
}

/// One explored path with both versions' results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExploredPartition {
    /// Monotonically increasing within one iteration, starting at 1
    pub index: u32,
    pub pc: Expression,
    pub v1: ResultValue,
    pub v2: ResultValue,
    /// Exploration stopped at the depth bound on this path
    #[serde(default)]
    pub depth_limited: bool,
}

impl ExploredPartition {
    pub fn new(index: u32, pc: Expression, v1: impl Into<ResultValue>, v2: impl Into<ResultValue>) -> Self {
        Self {
            index,
            pc,
            v1: v1.into(),
            v2: v2.into(),
            depth_limited: false,
        }
    }

    pub fn depth_limited(mut self) -> Self {
        self.depth_limited = true;
        self
    }

    /// Names of the uninterpreted functions applied anywhere on this path
    pub fn uif_names(&self) -> Vec<String> {
        let mut names = std::collections::BTreeSet::new();
        names.extend(self.pc.uif_names());
        for value in [&self.v1, &self.v2] {
            if let ResultValue::Symbolic { expr } = value {
                names.extend(expr.uif_names());
            }
        }
        names.into_iter().map(str::to_string).collect()
    }
}
