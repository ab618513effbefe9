//! Block dependency graph of one pipeline

use std::collections::{BTreeSet, HashMap};

use thiserror::Error;

use crate::model::{Block, Pipeline};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("Block name '{0}' is used more than once")]
    DuplicateBlock(String),
    #[error("Pipe references unknown block '{0}'")]
    UnknownBlock(String),
    #[error("Block '{0}' has more than one incoming pipe")]
    MultipleInputs(String),
    #[error("Pipeline contains a cycle through block '{0}'")]
    Cycle(String),
}

/// Blocks are addressed by declaration index internally
#[derive(Debug)]
pub struct PipelineGraph<'p> {
    pipeline: &'p Pipeline,
    index: HashMap<&'p str, usize>,
    predecessor: Vec<Option<usize>>,
    successors: Vec<Vec<usize>>,
    order: Vec<usize>,
}

impl<'p> PipelineGraph<'p> {
    pub fn build(pipeline: &'p Pipeline) -> Result<Self, GraphError> {
        let mut index = HashMap::with_capacity(pipeline.blocks.len());
        for (i, block) in pipeline.blocks.iter().enumerate() {
            if index.insert(block.name.as_str(), i).is_some() {
                return Err(GraphError::DuplicateBlock(block.name.clone()));
            }
        }

        let lookup = |name: &str| {
            index
                .get(name)
                .copied()
                .ok_or_else(|| GraphError::UnknownBlock(name.to_string()))
        };

        let mut predecessor = vec![None; pipeline.blocks.len()];
        let mut successors = vec![Vec::new(); pipeline.blocks.len()];
        for pipe in &pipeline.pipes {
            let from = lookup(&pipe.from)?;
            let to = lookup(&pipe.to)?;
            if predecessor[to].replace(from).is_some() {
                return Err(GraphError::MultipleInputs(pipe.to.clone()));
            }
            successors[from].push(to);
        }

        let order = topological_sort(&predecessor, &successors)
            .map_err(|stuck| GraphError::Cycle(pipeline.blocks[stuck].name.clone()))?;

        Ok(Self {
            pipeline,
            index,
            predecessor,
            successors,
            order,
        })
    }

    /// Every block, each after its predecessor; ties in declaration order
    pub fn topological_order(&self) -> impl Iterator<Item = &'p Block> + '_ {
        self.order.iter().map(|&i| &self.pipeline.blocks[i])
    }

    pub fn predecessor(&self, block: &str) -> Option<&'p Block> {
        let i = *self.index.get(block)?;
        self.predecessor[i].map(|p| &self.pipeline.blocks[p])
    }

    pub fn predecessors(&self, block: &str) -> Vec<&'p Block> {
        self.predecessor(block).into_iter().collect()
    }

    pub fn successors(&self, block: &str) -> Vec<&'p Block> {
        self.index
            .get(block)
            .map(|&i| {
                self.successors[i]
                    .iter()
                    .map(|&s| &self.pipeline.blocks[s])
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Transitive successors, in topological order
    pub fn descendants(&self, block: &str) -> Vec<&'p Block> {
        let Some(&start) = self.index.get(block) else {
            return Vec::new();
        };
        let mut reached = vec![false; self.pipeline.blocks.len()];
        let mut stack = self.successors[start].clone();
        while let Some(i) = stack.pop() {
            if !std::mem::replace(&mut reached[i], true) {
                stack.extend(&self.successors[i]);
            }
        }
        self.order
            .iter()
            .filter(|&&i| reached[i])
            .map(|&i| &self.pipeline.blocks[i])
            .collect()
    }
}

/// Kahn's algorithm; `Err` carries the first block left on a cycle
fn topological_sort(
    predecessor: &[Option<usize>],
    successors: &[Vec<usize>],
) -> Result<Vec<usize>, usize> {
    let mut in_degree: Vec<usize> = predecessor.iter().map(|p| usize::from(p.is_some())).collect();
    let mut ready: BTreeSet<usize> = (0..predecessor.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(predecessor.len());

    while let Some(next) = ready.pop_first() {
        order.push(next);
        for &successor in &successors[next] {
            in_degree[successor] -= 1;
            if in_degree[successor] == 0 {
                ready.insert(successor);
            }
        }
    }

    if order.len() < predecessor.len() {
        let stuck = (0..predecessor.len())
            .find(|&i| in_degree[i] > 0)
            .unwrap_or_default();
        return Err(stuck);
    }
    Ok(order)
}
