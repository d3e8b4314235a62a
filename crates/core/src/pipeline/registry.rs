use crate::model::{Pass, PassKind};
use crate::pipeline::build::{BuildOptions, BuildOutcome};
use crate::pipeline::{Pintool, PintoolConfig, PipelineError, PipelineResult};

/// Passes in registration order. Codes are the registration index.
///
/// A predecessor must already be registered, so the predecessor relation is
/// always an acyclic chain.
#[derive(Debug, Clone, Default)]
pub struct PassRegistry {
    passes: Vec<Pass>,
}

impl PassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kind: PassKind, prev: Option<PassKind>) -> PipelineResult<Pass> {
        if self.get(kind).is_some() {
            return Err(PipelineError::Config(format!("pass {kind} registered twice")));
        }
        if let Some(prev) = prev {
            if prev == kind {
                return Err(PipelineError::Config(format!("pass {kind} cannot precede itself")));
            }
            if self.get(prev).is_none() {
                return Err(PipelineError::Config(format!(
                    "pass {kind} requires {prev}, which must be registered before it"
                )));
            }
        }
        let pass = Pass { kind, code: self.passes.len(), prev };
        self.passes.push(pass);
        Ok(pass)
    }

    pub fn get(&self, kind: PassKind) -> Option<&Pass> {
        self.passes.iter().find(|p| p.kind == kind)
    }

    pub fn passes(&self) -> &[Pass] {
        &self.passes
    }

    /// Every pass that must run before `kind`, earliest first.
    pub fn requirements(&self, kind: PassKind) -> Vec<PassKind> {
        let mut chain = Vec::new();
        let mut cur = self.get(kind).and_then(|p| p.prev);
        while let Some(prev) = cur {
            chain.push(prev);
            cur = self.get(prev).and_then(|p| p.prev);
        }
        chain.reverse();
        chain
    }
}

/// The configured chain of passes, ready to build and launch.
#[derive(Debug)]
pub struct Pipeline {
    registry: PassRegistry,
    tools: Vec<Pintool>,
}

impl Pipeline {
    /// Register `configs` in order and construct their pintools.
    pub fn new(configs: Vec<PintoolConfig>) -> PipelineResult<Self> {
        let mut registry = PassRegistry::new();
        let mut tools = Vec::with_capacity(configs.len());
        for config in configs {
            let kind: PassKind = config.name.parse().map_err(PipelineError::Config)?;
            let prev = config
                .prev_step
                .as_deref()
                .map(|p| p.parse::<PassKind>())
                .transpose()
                .map_err(PipelineError::Config)?;
            let pass = registry.register(kind, prev)?;
            tools.push(Pintool::new(config, pass)?);
        }
        Ok(Self { registry, tools })
    }

    pub fn registry(&self) -> &PassRegistry {
        &self.registry
    }

    pub fn pintools(&self) -> &[Pintool] {
        &self.tools
    }

    pub fn pintool(&self, kind: PassKind) -> PipelineResult<&Pintool> {
        self.tools
            .iter()
            .find(|t| t.pass().kind == kind)
            .ok_or(PipelineError::UnknownPass(kind))
    }

    /// Build every pass in registration order; stops at the first spawn error.
    pub fn build_all(&self, options: BuildOptions) -> PipelineResult<Vec<(PassKind, BuildOutcome)>> {
        self.tools.iter().map(|t| Ok((t.pass().kind, t.ensure_built(options)?))).collect()
    }
}
