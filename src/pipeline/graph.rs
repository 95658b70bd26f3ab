//! A small DAG runner for named build steps.
//!
//! Steps declare the steps they depend on. Every step whose dependencies
//! are done runs at once on its own scoped thread; a step whose dependency
//! failed is skipped, and everything else keeps going.
//!
//! ```ignore
//! let report = StepGraph::new()
//!     .step("build-assets", &[], || build(Assets))
//!     .step("build-slides", &[], || build(Slides))
//!     .step("pdf", &["build-slides"], || export())
//!     .run()?;
//! ```

use std::panic::{AssertUnwindSafe, catch_unwind};

use anyhow::anyhow;
use crossbeam::channel;
use rustc_hash::FxHashMap;
use thiserror::Error;

type StepFn<'a> = Box<dyn FnOnce() -> anyhow::Result<()> + Send + 'a>;

/// The graph cannot run. Detected before any step starts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("duplicate step `{0}`")]
    Duplicate(String),

    #[error("step `{step}` depends on unknown step `{dependency}`")]
    UnknownDependency { step: String, dependency: String },

    #[error("steps form a cycle: {}", .0.join(", "))]
    Cycle(Vec<String>),
}

/// Final state of one step.
#[derive(Debug)]
pub enum StepState {
    Succeeded,
    Failed(anyhow::Error),
    /// Not run because `dependency` failed or was skipped.
    Skipped { dependency: String },
}

impl StepState {
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

/// States of all steps, in declaration order.
#[derive(Debug)]
pub struct GraphReport {
    pub steps: Vec<(String, StepState)>,
}

impl GraphReport {
    pub fn is_success(&self) -> bool {
        self.steps.iter().all(|(_, state)| state.is_success())
    }

    /// Names of the steps that failed or were skipped.
    pub fn unsuccessful(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|(_, state)| !state.is_success())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    #[cfg(test)]
    pub fn state(&self, name: &str) -> Option<&StepState> {
        self.steps
            .iter()
            .find(|(step, _)| step == name)
            .map(|(_, state)| state)
    }
}

struct Step<'a> {
    name: String,
    deps: Vec<String>,
    run: StepFn<'a>,
}

#[derive(Default)]
pub struct StepGraph<'a> {
    steps: Vec<Step<'a>>,
}

impl<'a> StepGraph<'a> {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn step<F>(mut self, name: &str, deps: &[&str], run: F) -> Self
    where
        F: FnOnce() -> anyhow::Result<()> + Send + 'a,
    {
        self.steps.push(Step {
            name: name.to_string(),
            deps: deps.iter().map(ToString::to_string).collect(),
            run: Box::new(run),
        });
        self
    }

    /// Resolve dependencies to indices and reject duplicates, unknown names
    /// and cycles.
    fn resolve(&self) -> Result<Vec<Vec<usize>>, GraphError> {
        let mut index: FxHashMap<&str, usize> = FxHashMap::default();
        for (i, step) in self.steps.iter().enumerate() {
            if index.insert(step.name.as_str(), i).is_some() {
                return Err(GraphError::Duplicate(step.name.clone()));
            }
        }

        let deps = self
            .steps
            .iter()
            .map(|step| {
                step.deps
                    .iter()
                    .map(|dep| {
                        index.get(dep.as_str()).copied().ok_or_else(|| {
                            GraphError::UnknownDependency {
                                step: step.name.clone(),
                                dependency: dep.clone(),
                            }
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        // Kahn: whatever cannot be ordered sits on a cycle.
        let mut remaining: Vec<usize> = deps.iter().map(Vec::len).collect();
        let mut ready: Vec<usize> = (0..deps.len()).filter(|&i| remaining[i] == 0).collect();
        let mut ordered = 0;
        while let Some(i) = ready.pop() {
            ordered += 1;
            for (j, step_deps) in deps.iter().enumerate() {
                for _ in step_deps.iter().filter(|&&d| d == i) {
                    remaining[j] -= 1;
                    if remaining[j] == 0 {
                        ready.push(j);
                    }
                }
            }
        }
        if ordered < deps.len() {
            let cycle = (0..deps.len())
                .filter(|&i| remaining[i] > 0)
                .map(|i| self.steps[i].name.clone())
                .collect();
            return Err(GraphError::Cycle(cycle));
        }

        Ok(deps)
    }

    /// Run every step. Returns once all steps have finished or were skipped.
    pub fn run(self) -> Result<GraphReport, GraphError> {
        let deps = self.resolve()?;
        let count = self.steps.len();

        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); count];
        for (i, step_deps) in deps.iter().enumerate() {
            for &d in step_deps {
                dependents[d].push(i);
            }
        }
        let mut remaining: Vec<usize> = deps.iter().map(Vec::len).collect();
        let mut blocked: Vec<Option<String>> = vec![None; count];
        let mut states: Vec<Option<StepState>> = (0..count).map(|_| None).collect();

        let mut names = Vec::with_capacity(count);
        let mut runs: Vec<Option<StepFn<'a>>> = Vec::with_capacity(count);
        for step in self.steps {
            names.push(step.name);
            runs.push(Some(step.run));
        }

        std::thread::scope(|scope| {
            let (tx, rx) = channel::unbounded::<(usize, anyhow::Result<()>)>();
            let mut spawn = |i: usize| {
                let Some(run) = runs[i].take() else { return };
                let tx = tx.clone();
                scope.spawn(move || {
                    let result = catch_unwind(AssertUnwindSafe(run))
                        .unwrap_or_else(|_| Err(anyhow!("step panicked")));
                    let _ = tx.send((i, result));
                });
            };

            for i in (0..count).filter(|&i| remaining[i] == 0) {
                spawn(i);
            }

            let mut finished = 0;
            while finished < count {
                let Ok((i, result)) = rx.recv() else { break };
                let ok = result.is_ok();
                states[i] = Some(match result {
                    Ok(()) => StepState::Succeeded,
                    Err(e) => StepState::Failed(e),
                });
                finished += 1;

                let mut settled = vec![(i, ok)];
                while let Some((done, ok)) = settled.pop() {
                    for &next in &dependents[done] {
                        if !ok && blocked[next].is_none() {
                            blocked[next] = Some(names[done].clone());
                        }
                        remaining[next] -= 1;
                        if remaining[next] > 0 {
                            continue;
                        }
                        match blocked[next].clone() {
                            Some(dependency) => {
                                states[next] = Some(StepState::Skipped { dependency });
                                finished += 1;
                                settled.push((next, false));
                            }
                            None => spawn(next),
                        }
                    }
                }
            }
        });

        let steps = names
            .into_iter()
            .zip(states)
            .map(|(name, state)| {
                let state = state.unwrap_or_else(|| StepState::Failed(anyhow!("step did not finish")));
                (name, state)
            })
            .collect();
        Ok(GraphReport { steps })
    }
}
