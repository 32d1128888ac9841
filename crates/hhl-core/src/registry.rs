//! Name-keyed factories for the pluggable engines.
//!
//! The [`ComponentRegistry`] is consulted once, when a solver is configured,
//! to turn the names in [`HhlConfig`] into engine instances. The resolved
//! [`Components`] are then passed around explicitly.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::components::{
    CustomState, EigenvalueEstimator, LinearInversionFitter, LookupRotation, QpeEigenvalues,
    ReciprocalRotator, StatePreparer, TomographyFitter,
};
use crate::config::HhlConfig;
use crate::error::{HhlError, HhlResult};
use crate::problem::ValidatedProblem;

type EigsFactory = Box<
    dyn Fn(&HhlConfig, &ValidatedProblem) -> HhlResult<Box<dyn EigenvalueEstimator>> + Send + Sync,
>;
type InitStateFactory = Box<dyn Fn(&HhlConfig) -> HhlResult<Box<dyn StatePreparer>> + Send + Sync>;
type ReciprocalFactory = Box<
    dyn Fn(&HhlConfig, &dyn EigenvalueEstimator) -> HhlResult<Box<dyn ReciprocalRotator>>
        + Send
        + Sync,
>;
type FitterFactory = Box<dyn Fn(&HhlConfig) -> HhlResult<Box<dyn TomographyFitter>> + Send + Sync>;

/// Engines resolved for one configured problem.
#[derive(Debug)]
pub struct Components {
    /// Phase estimation.
    pub eigs: Box<dyn EigenvalueEstimator>,
    /// State preparation.
    pub init_state: Box<dyn StatePreparer>,
    /// Reciprocal rotation.
    pub reciprocal: Box<dyn ReciprocalRotator>,
    /// Tomography fitter.
    pub fitter: Box<dyn TomographyFitter>,
}

/// Central registry of engine factories.
pub struct ComponentRegistry {
    eigs: FxHashMap<String, EigsFactory>,
    init_state: FxHashMap<String, InitStateFactory>,
    reciprocal: FxHashMap<String, ReciprocalFactory>,
    fitters: FxHashMap<String, FitterFactory>,
}

fn key(name: &str) -> String {
    name.to_ascii_lowercase()
}

impl ComponentRegistry {
    /// A registry without any factory.
    pub fn new() -> Self {
        Self {
            eigs: FxHashMap::default(),
            init_state: FxHashMap::default(),
            reciprocal: FxHashMap::default(),
            fitters: FxHashMap::default(),
        }
    }

    /// A registry holding `qpe`, `custom`, `lookup` and `linear_inversion`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_eigs("qpe", |config, problem| {
            Ok(Box::new(QpeEigenvalues::new(problem, &config.eigs)?))
        });
        registry.register_init_state("custom", |_| Ok(Box::new(CustomState::new())));
        registry.register_reciprocal("lookup", |config, eigs| {
            Ok(Box::new(LookupRotation::new(
                eigs.negative_evals(),
                eigs.evo_time(),
                config.reciprocal.scale,
            )))
        });
        registry.register_fitter("linear_inversion", |_| {
            Ok(Box::new(LinearInversionFitter::new()))
        });
        registry
    }

    /// Register an eigenvalue estimator factory.
    pub fn register_eigs(
        &mut self,
        name: &str,
        factory: impl Fn(&HhlConfig, &ValidatedProblem) -> HhlResult<Box<dyn EigenvalueEstimator>>
        + Send
        + Sync
        + 'static,
    ) {
        debug!("Registering eigenvalue estimator: {}", name);
        self.eigs.insert(key(name), Box::new(factory));
    }

    /// Register a state preparer factory.
    pub fn register_init_state(
        &mut self,
        name: &str,
        factory: impl Fn(&HhlConfig) -> HhlResult<Box<dyn StatePreparer>> + Send + Sync + 'static,
    ) {
        debug!("Registering state preparer: {}", name);
        self.init_state.insert(key(name), Box::new(factory));
    }

    /// Register a reciprocal rotator factory.
    ///
    /// The factory receives the already resolved estimator.
    pub fn register_reciprocal(
        &mut self,
        name: &str,
        factory: impl Fn(&HhlConfig, &dyn EigenvalueEstimator) -> HhlResult<Box<dyn ReciprocalRotator>>
        + Send
        + Sync
        + 'static,
    ) {
        debug!("Registering reciprocal rotator: {}", name);
        self.reciprocal.insert(key(name), Box::new(factory));
    }

    /// Register a tomography fitter factory.
    pub fn register_fitter(
        &mut self,
        name: &str,
        factory: impl Fn(&HhlConfig) -> HhlResult<Box<dyn TomographyFitter>> + Send + Sync + 'static,
    ) {
        debug!("Registering tomography fitter: {}", name);
        self.fitters.insert(key(name), Box::new(factory));
    }

    /// Instantiate the engines named in `config` for `problem`.
    pub fn resolve(&self, config: &HhlConfig, problem: &ValidatedProblem) -> HhlResult<Components> {
        let eigs = lookup(&self.eigs, "eigenvalue estimator", &config.eigs.name)?(config, problem)?;
        let init_state =
            lookup(&self.init_state, "state preparer", &config.init_state.name)?(config)?;
        let reciprocal = lookup(
            &self.reciprocal,
            "reciprocal rotator",
            &config.reciprocal.name,
        )?(config, eigs.as_ref())?;
        let fitter = lookup(&self.fitters, "tomography fitter", &config.tomography.fitter)?(config)?;

        debug!(
            eigs = eigs.name(),
            init_state = init_state.name(),
            reciprocal = reciprocal.name(),
            fitter = fitter.name(),
            "resolved components"
        );
        Ok(Components {
            eigs,
            init_state,
            reciprocal,
            fitter,
        })
    }

    /// Registered names per kind, sorted.
    pub fn available(&self) -> Vec<(&'static str, Vec<String>)> {
        fn sorted<V>(map: &FxHashMap<String, V>) -> Vec<String> {
            let mut names: Vec<_> = map.keys().cloned().collect();
            names.sort();
            names
        }
        vec![
            ("eigs", sorted(&self.eigs)),
            ("init_state", sorted(&self.init_state)),
            ("reciprocal", sorted(&self.reciprocal)),
            ("tomography", sorted(&self.fitters)),
        ]
    }
}

fn lookup<'a, F>(
    map: &'a FxHashMap<String, F>,
    kind: &'static str,
    name: &str,
) -> HhlResult<&'a F> {
    map.get(&key(name)).ok_or_else(|| HhlError::UnknownComponent {
        kind,
        name: name.to_string(),
    })
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::real_problem;

    #[test]
    fn test_builtins_resolve() {
        let problem = real_problem(vec![vec![1.0, 0.0], vec![0.0, 2.0]], vec![1.0, 0.0]);
        let mut config = HhlConfig::default();
        config.eigs.name = "QPE".to_string();
        config.eigs.evo_time = Some(1.25);

        let components = ComponentRegistry::default().resolve(&config, &problem).unwrap();
        assert_eq!(components.eigs.name(), "qpe");
        assert_eq!(components.eigs.register_sizes(), (1, 6));
        assert_eq!(components.reciprocal.name(), "lookup");
        assert_eq!(components.fitter.name(), "linear_inversion");
    }

    #[test]
    fn test_unknown_component() {
        let problem = real_problem(vec![vec![1.0, 0.0], vec![0.0, 2.0]], vec![1.0, 0.0]);
        let mut config = HhlConfig::default();
        config.reciprocal.name = "long_division".to_string();

        let result = ComponentRegistry::with_builtins().resolve(&config, &problem);
        assert!(matches!(
            result,
            Err(HhlError::UnknownComponent { kind: "reciprocal rotator", name }) if name == "long_division"
        ));
        assert!(ComponentRegistry::new().resolve(&HhlConfig::default(), &problem).is_err());
    }

    #[test]
    fn test_reciprocal_sees_estimator() {
        let problem = real_problem(vec![vec![1.0, 0.0], vec![0.0, -1.0]], vec![1.0, 0.0]);
        let mut config = HhlConfig::default();
        config.eigs.negative_evals = true;
        config.eigs.evo_time = Some(0.5);

        let mut registry = ComponentRegistry::with_builtins();
        registry.register_reciprocal("probe", |_, eigs| {
            assert!(eigs.negative_evals());
            assert_eq!(eigs.evo_time(), 0.5);
            Ok(Box::new(LookupRotation::new(true, 0.5, 0.0)))
        });
        config.reciprocal.name = "probe".to_string();
        registry.resolve(&config, &problem).unwrap();

        let available = registry.available();
        assert_eq!(available[2], ("reciprocal", vec!["lookup".to_string(), "probe".to_string()]));
    }
}
