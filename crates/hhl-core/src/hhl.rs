//! The solver entry point.

use std::sync::Arc;

use hhl_hal::{Backend, ExecutionResult};
use hhl_ir::Circuit;
use tracing::{info, instrument};

use crate::components::state_tomography_circuits;
use crate::compose::{CircuitComposer, HhlCircuit};
use crate::config::HhlConfig;
use crate::diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
use crate::error::{HhlError, HhlResult};
use crate::extract::{
    density_diagonal, measure_ancilla, postselect, read_statevector, rescale, success_ratios,
};
use crate::linalg::{Vector, truncate_vector};
use crate::problem::{LinearSystemInput, ValidatedProblem};
use crate::registry::{ComponentRegistry, Components};
use crate::result::{HhlSolution, ProbabilityResult};

/// A configured HHL solver.
///
/// Configuration validates the system and resolves every engine up front;
/// [`run`](Self::run) then builds the circuit, executes it once (one batch
/// for tomography) and assembles an [`HhlSolution`].
pub struct Hhl {
    problem: ValidatedProblem,
    components: Components,
    sink: Arc<dyn DiagnosticSink>,
}

impl std::fmt::Debug for Hhl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hhl")
            .field("problem", &self.problem)
            .field("components", &self.components)
            .finish_non_exhaustive()
    }
}

impl Hhl {
    /// Configure a solver, reporting diagnostics through `tracing`.
    pub fn from_config(
        input: Option<&LinearSystemInput>,
        config: &HhlConfig,
        registry: &ComponentRegistry,
    ) -> HhlResult<Self> {
        Self::from_config_with_sink(input, config, registry, Arc::new(TracingSink))
    }

    /// Configure a solver with an explicit diagnostic sink.
    pub fn from_config_with_sink(
        input: Option<&LinearSystemInput>,
        config: &HhlConfig,
        registry: &ComponentRegistry,
        sink: Arc<dyn DiagnosticSink>,
    ) -> HhlResult<Self> {
        let problem = ValidatedProblem::from_input(
            input,
            config.algorithm.auto_hermitian,
            config.algorithm.auto_resize,
        )?;
        Self::with_problem(problem, config, registry, sink)
    }

    /// Configure a solver for an already validated problem.
    pub fn with_problem(
        problem: ValidatedProblem,
        config: &HhlConfig,
        registry: &ComponentRegistry,
        sink: Arc<dyn DiagnosticSink>,
    ) -> HhlResult<Self> {
        sink.emit(Diagnostic::ProblemConfigured {
            dimension: problem.dimension(),
            original_dimension: problem.original_dimension(),
            hermitian_embedded: problem.hermitian_embedded(),
            resized: problem.resized(),
        });
        let components = registry.resolve(config, &problem)?;
        Ok(Self {
            problem,
            components,
            sink,
        })
    }

    /// The validated system.
    pub fn problem(&self) -> &ValidatedProblem {
        &self.problem
    }

    /// The resolved engines.
    pub fn components(&self) -> &Components {
        &self.components
    }

    /// Build the HHL circuit, optionally measuring the ancilla.
    pub fn construct_circuit(&self, measurement: bool) -> HhlResult<HhlCircuit> {
        CircuitComposer::new(&self.problem, &self.components).construct(measurement)
    }

    /// Solve on `backend`.
    ///
    /// Statevector backends are read through the reciprocal engine's
    /// decoder; counting backends through state tomography of the io
    /// register, postselected on the ancilla.
    #[instrument(skip_all, fields(backend = backend.name()))]
    pub async fn run(&self, backend: &dyn Backend) -> HhlResult<HhlSolution> {
        let built = self.construct_circuit(false)?;
        let circuit_info = built.circuit.properties();
        self.sink
            .emit(Diagnostic::CircuitConstructed(circuit_info.clone()));

        let (decoded, probability_result) = if backend.is_statevector() {
            self.statevector_readout(backend, &built).await?
        } else {
            self.tomography_readout(backend, &built).await?
        };

        let original = self.problem.original_dimension();
        self.sink
            .emit(Diagnostic::VectorPreResize(decoded.to_vec()));
        let output = truncate_vector(&decoded, original);
        self.sink
            .emit(Diagnostic::VectorPostResize(output.to_vec()));

        let matrix = self.problem.truncated_matrix();
        let vector = self.problem.truncated_vector();
        let rescaled = rescale(&output, &matrix, &vector)?;
        self.sink.emit(Diagnostic::Rescaled {
            scale: rescaled.scale,
            phase: rescaled.phase,
        });

        info!(probability = %probability_result, "HHL run finished");
        Ok(HhlSolution::new(
            output,
            rescaled.solution,
            probability_result,
            matrix,
            vector,
            circuit_info,
        ))
    }

    async fn statevector_readout(
        &self,
        backend: &dyn Backend,
        built: &HhlCircuit,
    ) -> HhlResult<(Vector, ProbabilityResult)> {
        self.sink.emit(Diagnostic::StrategySelected {
            statevector: true,
            circuits: 1,
        });
        let result = execute(backend, std::slice::from_ref(&built.circuit)).await?;
        let experiment = &result.results[0];
        let amplitudes = experiment.data.statevector.as_deref().ok_or_else(|| {
            HhlError::MissingData {
                experiment: experiment.name().to_string(),
                kind: "statevector",
            }
        })?;

        let (num_q, _) = self.components.eigs.register_sizes();
        let decoded = self
            .components
            .reciprocal
            .decode_statevector(amplitudes, num_q)?;
        let readout = read_statevector(&decoded, self.problem.original_dimension())?;
        Ok((
            readout.normalized,
            ProbabilityResult::Scalar(readout.probability),
        ))
    }

    async fn tomography_readout(
        &self,
        backend: &dyn Backend,
        built: &HhlCircuit,
    ) -> HhlResult<(Vector, ProbabilityResult)> {
        let variants = state_tomography_circuits(&built.circuit, &built.io)?;
        let measured = measure_ancilla(&variants, built.ancilla)?;
        self.sink.emit(Diagnostic::StrategySelected {
            statevector: false,
            circuits: measured.len(),
        });
        let result = execute(backend, &measured).await?;

        let mut ratios = success_ratios(&result)?;
        ratios.truncate(self.problem.original_dimension());

        let selected = postselect(&result)?;
        let rho = self.components.fitter.fit(&selected, &variants)?;
        let decoded = density_diagonal(&rho)?;
        Ok((decoded, ProbabilityResult::PerBasis(ratios)))
    }
}

/// Execute one batch, checking one experiment came back per circuit.
async fn execute(backend: &dyn Backend, circuits: &[Circuit]) -> HhlResult<ExecutionResult> {
    let result = backend.execute(circuits).await?;
    if result.len() != circuits.len() {
        return Err(HhlError::ResultMismatch {
            expected: circuits.len(),
            got: result.len(),
        });
    }
    Ok(result)
}
