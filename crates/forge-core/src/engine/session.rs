//! Sesión de build: realización bajo demanda de steps.
//!
//! El scheduler externo pide outputs (`output_of`, `output_of_role`,
//! `realize`); la sesión realiza primero los upstream, calcula el
//! fingerprint (argumentos resueltos + hash de contenido de cada input) y
//! entrega el cuerpo del step a la `StepCache`. Cada step se realiza como
//! mucho una vez por sesión: el resultado (ruta o error) queda memorizado en
//! un `OnceCell` por step, por lo que la sesión puede compartirse entre
//! hilos del scheduler.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use indexmap::IndexMap;
use log::{debug, info, warn};
use once_cell::sync::OnceCell;
use uuid::Uuid;

use super::cache::{CacheRequest, StepCache};
use crate::constants::{ENGINE_VERSION, STEPS_DIR};
use crate::errors::CoreError;
use crate::event::{BuildEvent, BuildEventKind, EventStore, InMemoryEventStore};
use crate::hashing::hash_path;
use crate::model::{ExecutionContext, Fingerprint, InputHash, StepFingerprintInput};
use crate::runtime::{Definition, StepRole};
use crate::step::{InputArtifact, Step, StepStatus};

type Realized = Arc<OnceCell<Result<PathBuf, CoreError>>>;

pub struct BuildSession<E: EventStore = InMemoryEventStore> {
    id: Uuid,
    definition: Arc<dyn Definition>,
    cache: Arc<dyn StepCache>,
    work_dir: PathBuf,
    realized: DashMap<String, Realized>,
    events: Mutex<E>,
}

impl BuildSession<InMemoryEventStore> {
    pub fn new(definition: Arc<dyn Definition>, cache: Arc<dyn StepCache>, work_dir: impl Into<PathBuf>) -> Self {
        Self::with_event_store(definition, cache, work_dir, InMemoryEventStore::default())
    }
}

impl<E: EventStore> BuildSession<E> {
    pub fn with_event_store(definition: Arc<dyn Definition>,
                            cache: Arc<dyn StepCache>,
                            work_dir: impl Into<PathBuf>,
                            events: E)
                            -> Self {
        Self { id: Uuid::new_v4(),
               definition,
               cache,
               work_dir: work_dir.into(),
               realized: DashMap::new(),
               events: Mutex::new(events) }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn definition(&self) -> &Arc<dyn Definition> {
        &self.definition
    }

    /// Output del step visible con ese nombre.
    pub fn output_of(&self, step_name: &str) -> Result<PathBuf, CoreError> {
        let step = self.definition.require_step(step_name)?;
        self.realize(&step)
    }

    /// Output del step que cumple `role`.
    pub fn output_of_role(&self, role: StepRole) -> Result<PathBuf, CoreError> {
        let step = self.definition
                       .role(role)
                       .ok_or_else(|| CoreError::UnknownStep { definition: self.definition.name().to_string(),
                                                               step: role.to_string() })?;
        self.realize(&step)
    }

    /// Realiza `step` (y sus upstream). Idempotente dentro de la sesión.
    pub fn realize(&self, step: &Arc<Step>) -> Result<PathBuf, CoreError> {
        let cell = self.realized
                       .entry(step.qualified_name())
                       .or_insert_with(|| Arc::new(OnceCell::new()))
                       .clone();
        cell.get_or_init(|| self.realize_once(step)).clone()
    }

    /// Ruta donde se publica el output de `step` en esta sesión.
    pub fn output_path(&self, step: &Step) -> Result<PathBuf, CoreError> {
        Ok(self.work_dir
               .join(STEPS_DIR)
               .join(step.definition())
               .join(step.name())
               .join(step.output_file_name()?))
    }

    pub fn status(&self, step: &Step) -> StepStatus {
        let qualified = step.qualified_name();
        let events = self.events();
        let last = events.iter().rev().find(|e| e.kind.step() == qualified);
        match last.map(|e| &e.kind) {
            None => StepStatus::Pending,
            Some(BuildEventKind::StepStarted { .. }) => StepStatus::Running,
            Some(BuildEventKind::StepCached { .. }) => StepStatus::Cached,
            Some(BuildEventKind::StepFinished { .. }) => StepStatus::FinishedOk,
            Some(BuildEventKind::StepFailed { .. }) => StepStatus::Failed,
        }
    }

    pub fn events(&self) -> Vec<BuildEvent> {
        match self.events.lock() {
            Ok(store) => store.list(self.id),
            Err(poisoned) => poisoned.into_inner().list(self.id),
        }
    }

    fn emit(&self, kind: BuildEventKind) {
        match self.events.lock() {
            Ok(mut store) => {
                store.append_kind(self.id, kind);
            }
            Err(poisoned) => {
                poisoned.into_inner().append_kind(self.id, kind);
            }
        }
    }

    fn realize_once(&self, step: &Arc<Step>) -> Result<PathBuf, CoreError> {
        let qualified = step.qualified_name();
        self.emit(BuildEventKind::StepStarted { step: qualified.clone() });
        let mut fingerprint: Option<Fingerprint> = None;
        let result = self.execute(step, &qualified, &mut fingerprint);
        match &result {
            Ok(_) => {}
            Err(error) => {
                warn!("{qualified}: {error}");
                self.emit(BuildEventKind::StepFailed { step: qualified,
                                                       fingerprint: fingerprint.map(|f| f.to_string()),
                                                       error: error.clone() });
            }
        }
        result
    }

    fn execute(&self, step: &Arc<Step>, qualified: &str, fp_out: &mut Option<Fingerprint>) -> Result<PathBuf, CoreError> {
        let mut inputs: IndexMap<String, PathBuf> = IndexMap::with_capacity(step.inputs().len());
        for (name, input) in step.inputs() {
            let path = match input {
                InputArtifact::Path(p) => {
                    if !p.exists() {
                        return Err(CoreError::MissingInput { step: qualified.to_string(),
                                                             input: name.clone(),
                                                             path: p.display().to_string() });
                    }
                    p.clone()
                }
                InputArtifact::Step(upstream) => self.realize(upstream)?,
            };
            inputs.insert(name.clone(), path);
        }

        let arguments = step.arguments().resolve_all()?;
        let multi_arguments = step.multi_arguments().resolve_all()?;
        let input_hashes = inputs.iter()
                                 .map(|(name, path)| {
                                     Ok(InputHash { name: name.clone(),
                                                    hash: hash_path(path)? })
                                 })
                                 .collect::<Result<Vec<_>, CoreError>>()?;

        let body = step.body();
        let fingerprint_input = StepFingerprintInput { engine_version: ENGINE_VERSION,
                                                       step: step.name(),
                                                       implementation: body.implementation_id(),
                                                       kind: body.kind().as_str(),
                                                       arguments: &arguments,
                                                       multi_arguments: &multi_arguments,
                                                       inputs: &input_hashes };
        let fingerprint = Fingerprint::compute(&fingerprint_input);
        *fp_out = Some(fingerprint.clone());

        let target = self.output_path(step)?;
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CoreError::io(parent, e))?;
        }

        let warnings: Mutex<Vec<String>> = Mutex::new(Vec::new());
        let job = |paths: &crate::model::JobPaths| -> Result<(), CoreError> {
            info!("{qualified}: running {} ({})", body.implementation_id(), fingerprint.short());
            let ctx = ExecutionContext { step: step.name().to_string(),
                                         arguments: arguments.clone(),
                                         multi_arguments: multi_arguments.clone(),
                                         inputs: inputs.clone(),
                                         output: paths.output.clone(),
                                         scratch: paths.scratch.clone() };
            let produced = body.run(&ctx).into_result()?;
            if let Ok(mut w) = warnings.lock() {
                *w = produced;
            }
            Ok(())
        };

        let request = CacheRequest { step: qualified,
                                     fingerprint_input: &fingerprint_input,
                                     shape: step.output_shape(),
                                     target: &target };
        let output = self.cache
                         .cached(&request, &job)
                         .map_err(|e| e.into_step_failure(qualified, Some(fingerprint.as_str())))?;

        if output.hit {
            debug!("{qualified}: restored from cache ({})", fingerprint.short());
            self.emit(BuildEventKind::StepCached { step: qualified.to_string(),
                                                   fingerprint: fingerprint.to_string(),
                                                   output: display(&output.path) });
        } else {
            let warnings = warnings.into_inner().unwrap_or_default();
            self.emit(BuildEventKind::StepFinished { step: qualified.to_string(),
                                                     fingerprint: fingerprint.to_string(),
                                                     output: display(&output.path),
                                                     warnings });
        }
        Ok(output.path)
    }
}

fn display(path: &Path) -> String {
    path.display().to_string()
}
