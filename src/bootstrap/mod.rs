// =============================================================================
// BOOTSTRAP - Build/start pipeline for the container image
// =============================================================================
//
// A deployment runs the same three steps in a fixed order: migrate, collectstatic, serve.
// The layout decides which of them happen while the image is built and which when the
// container starts. Execution is linear and stops at the first failing step, so the
// server never binds against a schema that failed to migrate.

mod runner;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, instrument};

pub use runner::LiveRunner;

/// When a bootstrap invocation runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// `RUN` in the image build
    Build,
    /// Container entry point
    Start,
}

/// One unit of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Migrate,
    CollectStatic,
    Serve,
}

/// Where migrate and collectstatic run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BootstrapLayout {
    /// Both at build time; start only serves
    Build,
    /// Everything at start
    Start,
    /// Assets baked at build time, schema synced at start
    #[default]
    Split,
}

impl BootstrapLayout {
    /// Steps for `phase`, in execution order
    pub fn steps(self, phase: Phase) -> Vec<Step> {
        match (self, phase) {
            (BootstrapLayout::Build, Phase::Build) => vec![Step::Migrate, Step::CollectStatic],
            (BootstrapLayout::Build, Phase::Start) => vec![Step::Serve],
            (BootstrapLayout::Start, Phase::Build) => Vec::new(),
            (BootstrapLayout::Start, Phase::Start) => {
                vec![Step::Migrate, Step::CollectStatic, Step::Serve]
            }
            (BootstrapLayout::Split, Phase::Build) => vec![Step::CollectStatic],
            (BootstrapLayout::Split, Phase::Start) => vec![Step::Migrate, Step::Serve],
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Build => "build",
            Phase::Start => "start",
        })
    }
}

impl FromStr for Phase {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "build" => Ok(Phase::Build),
            "start" => Ok(Phase::Start),
            other => anyhow::bail!("unknown phase '{other}' (expected build or start)"),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Step::Migrate => "migrate",
            Step::CollectStatic => "collectstatic",
            Step::Serve => "serve",
        })
    }
}

impl fmt::Display for BootstrapLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BootstrapLayout::Build => "build",
            BootstrapLayout::Start => "start",
            BootstrapLayout::Split => "split",
        })
    }
}

impl FromStr for BootstrapLayout {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "build" => Ok(BootstrapLayout::Build),
            "start" => Ok(BootstrapLayout::Start),
            "split" => Ok(BootstrapLayout::Split),
            other => anyhow::bail!("unknown bootstrap layout '{other}' (expected build, start or split)"),
        }
    }
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("{step} failed during the {phase} phase")]
    StepFailed {
        phase: Phase,
        step: Step,
        #[source]
        source: anyhow::Error,
    },
}

impl BootstrapError {
    pub fn step(&self) -> Step {
        match self {
            BootstrapError::StepFailed { step, .. } => *step,
        }
    }
}

/// Executes a single step
#[async_trait]
pub trait StepRunner: Send + Sync {
    async fn run(&self, step: Step) -> anyhow::Result<()>;
}

/// Steps that finished before the pipeline ended
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct BootstrapReport {
    pub completed: Vec<Step>,
}

pub struct Bootstrap<R> {
    layout: BootstrapLayout,
    runner: R,
}

impl<R: StepRunner> Bootstrap<R> {
    pub fn new(layout: BootstrapLayout, runner: R) -> Self {
        Self { layout, runner }
    }

    pub fn layout(&self) -> BootstrapLayout {
        self.layout
    }

    /// Runs the phase's steps in order; the first failure ends the pipeline
    #[instrument(name = "bootstrap", skip(self), fields(layout = %self.layout))]
    pub async fn run(&self, phase: Phase) -> Result<BootstrapReport, BootstrapError> {
        let steps: Vec<Step> = self.layout.steps(phase);
        let mut report = BootstrapReport::default();

        if steps.is_empty() {
            info!("Nothing to do for the {} phase", phase);
            return Ok(report);
        }

        info!(
            "Running {} phase: {}",
            phase,
            steps.iter().map(Step::to_string).collect::<Vec<_>>().join(" -> ")
        );

        for step in steps {
            info!("Starting step '{}'", step);

            if let Err(source) = self.runner.run(step).await {
                error!("Step '{}' failed: {:#}", step, source);
                return Err(BootstrapError::StepFailed { phase, step, source });
            }

            info!("Step '{}' finished", step);
            report.completed.push(step);
        }

        Ok(report)
    }
}
