use crate::errors::ExtractionError;
use crate::models::backend::{ConnectionStatus, Credential, ExtractionBackend};
use crate::models::config::TrackerConfig;
use crate::models::delay::{PhaseDelay, TokioDelay};
use crate::models::facilities::display_name;
use crate::models::format::{format_brl, format_elapsed};
use crate::models::live_stats::{BPA_C, BPA_I, LiveStats, REMOVED, TOTAL_API};
use crate::models::log_entry::Severity;
use crate::models::outcome::OperationResult;
use crate::models::payload::ExtractionResponse;
use crate::models::phase::Phase;
use crate::models::request::ExtractionRequest;
use crate::models::state::{TrackerAction, TrackerState};
use std::sync::Arc;
use std::time::Instant;

/// Called after every applied action with the resulting state
pub type TrackerObserver = Arc<dyn Fn(&TrackerAction, &TrackerState) + Send + Sync>;

const DEFAULT_SUMMARY: &str = "Extração concluída";
const CONNECTION_TEST_FAILED: &str = "Erro ao testar conexão com BiServer";

/// Drives one extract-and-separate call and narrates it as phases and
/// console lines
///
/// The backend does not stream progress: `connect` and the phases after the
/// download are synthesized around the single request, with short pauses so
/// each one is visible. `run` takes `&mut self`, so one tracker can never
/// have two runs interleaving.
pub struct ExtractionOrchestrator<B, D = TokioDelay> {
    backend: B,
    delay: D,
    config: TrackerConfig,
    state: TrackerState,
    observer: Option<TrackerObserver>,
}

impl<B: ExtractionBackend> ExtractionOrchestrator<B, TokioDelay> {
    pub fn new(backend: B) -> Self {
        Self::with_delay(backend, TokioDelay)
    }
}

impl<B: ExtractionBackend, D: PhaseDelay> ExtractionOrchestrator<B, D> {
    pub fn with_delay(backend: B, delay: D) -> Self {
        Self {
            backend,
            delay,
            config: TrackerConfig::default(),
            state: TrackerState::new(),
            observer: None,
        }
    }

    pub fn with_config(mut self, config: TrackerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_observer(mut self, observer: TrackerObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Empties the console (no-op while a run is active)
    pub fn clear_console(&mut self) {
        self.emit(TrackerAction::ConsoleCleared);
    }

    pub fn dismiss_result(&mut self) {
        self.emit(TrackerAction::ResultDismissed);
    }

    /// Run one extraction; never fails, errors end up in the returned result
    pub async fn run(&mut self, request: &ExtractionRequest, credential: &Credential) -> OperationResult {
        if let Err(err) = self.dispatch(TrackerAction::RunStarted) {
            log::warn!("Refusing to start extraction: {}", err);
            return OperationResult::failed(err.user_message(), Vec::new());
        }

        log::info!(
            "Starting extraction cnes={} competencia={}",
            request.cnes,
            request.competencia
        );

        let result = match self.execute(request, credential).await {
            Ok(result) => result,
            Err(err) => {
                if err.is_unauthorized() {
                    log::warn!("Backend rejected the session token");
                }
                let details = err.to_string();
                self.fail(err.user_message(), details, Vec::new())
            }
        };

        log::info!(
            "Extraction finished cnes={} success={} saved={}",
            request.cnes,
            result.success,
            result.saved_count
        );
        self.emit(TrackerAction::RunCompleted(result.clone()));
        result
    }

    /// Test the BiServer connection; does not touch the console state
    pub async fn check_connection(&self, credential: &Credential) -> ConnectionStatus {
        match self.backend.test_connection(credential).await {
            Ok(response) if response.success => ConnectionStatus::Connected {
                mock: response.mock,
                message: response.message,
            },
            Ok(response) => ConnectionStatus::Failed(
                response
                    .error
                    .or(response.message)
                    .unwrap_or_else(|| "Falha na conexão".to_string()),
            ),
            Err(err) if err.is_transport() => {
                log::warn!("Connection test failed: {}", err);
                ConnectionStatus::Failed(CONNECTION_TEST_FAILED.to_string())
            }
            Err(err) => ConnectionStatus::Failed(err.user_message()),
        }
    }

    async fn execute(
        &mut self,
        request: &ExtractionRequest,
        credential: &Credential,
    ) -> Result<OperationResult, ExtractionError> {
        let facility = display_name(request.cnes.as_str());

        self.advance(Phase::Connect);
        self.log(
            Phase::Connect,
            format!("Iniciando extração para {}", facility),
            Severity::Info,
            Some(format!(
                "CNES: {}, Competência: {}",
                request.cnes, request.competencia
            )),
        );
        self.log(Phase::Connect, "Conectando à API BiServer...", Severity::Info, None);
        self.delay.pause(self.config.connect_pause()).await;
        self.log(Phase::Connect, "Conexão estabelecida com bi.eSUS", Severity::Success, None);

        self.advance(Phase::Download);
        self.log(Phase::Download, "Iniciando download dos dados...", Severity::Info, None);
        self.log(
            Phase::Download,
            "Buscando páginas da API (10.000 registros por página)",
            Severity::Info,
            None,
        );

        let started = Instant::now();
        let response = self.backend.extract_and_separate(request, credential).await?;
        let elapsed = format_elapsed(started.elapsed());

        if !response.success {
            let message = response
                .message
                .clone()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| crate::errors::EXTRACTION_FALLBACK_MESSAGE.to_string());
            return Ok(self.fail(message.clone(), message, response.errors));
        }

        Ok(self.reconcile(response, &elapsed).await)
    }

    /// Replay a successful response as the filter/process/save/complete phases
    async fn reconcile(&mut self, response: ExtractionResponse, elapsed: &str) -> OperationResult {
        let stats = &response.stats;
        let total = stats.extracted.total;
        let removed = stats.extracted.removed_count();
        let converted = stats.extracted.converted;
        let bpa_i = stats.saved.bpa_i;
        let bpa_c = stats.saved.bpa_c;

        self.emit(TrackerAction::StatsUpdated(
            LiveStats::new()
                .with(TOTAL_API, total)
                .with(BPA_I, bpa_i)
                .with(BPA_C, bpa_c)
                .with(REMOVED, removed),
        ));
        self.log(
            Phase::Download,
            format!("Download concluído em {}s", elapsed),
            Severity::Success,
            Some(format!("{} registros da API", total)),
        );

        self.advance(Phase::Filter);
        self.log(Phase::Filter, "Aplicando filtros SIGTAP...", Severity::Info, None);
        if removed > 0 {
            self.log(
                Phase::Filter,
                format!("{} registros sem tipo BPA (e-SUS, RAAS, etc)", removed),
                Severity::Warning,
                None,
            );
        }
        self.log(
            Phase::Filter,
            "Classificando procedimentos por tipo de registro",
            Severity::Info,
            None,
        );
        self.delay.pause(self.config.step_pause()).await;
        self.log(Phase::Filter, "Filtro SIGTAP aplicado", Severity::Success, None);

        self.advance(Phase::Process);
        self.log(Phase::Process, "Separando BPA-I e BPA-C...", Severity::Info, None);
        if bpa_i > 0 {
            self.log(
                Phase::Process,
                format!("{} registros BPA Individualizado", bpa_i),
                Severity::Info,
                None,
            );
        }
        if bpa_c > 0 {
            self.log(
                Phase::Process,
                format!("{} registros BPA Consolidado (agregados)", bpa_c),
                Severity::Info,
                None,
            );
        }
        if converted > 0 {
            self.log(
                Phase::Process,
                format!("{} procedimentos dual convertidos para BPA-C", converted),
                Severity::Info,
                None,
            );
        }
        if let Some(corrections) = &stats.corrections.bpai {
            self.log(
                Phase::Process,
                format!("Correções BPA-I aplicadas ({})", corrections.describe()),
                Severity::Info,
                None,
            );
            if let Some(top) = corrections.top_types(self.config.top_correction_types) {
                self.log(
                    Phase::Process,
                    format!(
                        "Tipos de correção BPA-I (top {})",
                        self.config.top_correction_types
                    ),
                    Severity::Info,
                    Some(top),
                );
            }
        }
        if let Some(corrections) = &stats.corrections.bpac {
            self.log(
                Phase::Process,
                format!("Correções BPA-C aplicadas ({})", corrections.describe()),
                Severity::Info,
                None,
            );
        }

        self.advance(Phase::Save);
        self.log(Phase::Save, "Salvando no banco de dados...", Severity::Info, None);
        self.delay.pause(self.config.step_pause()).await;
        if bpa_i > 0 {
            self.log(Phase::Save, format!("{} registros BPA-I salvos", bpa_i), Severity::Success, None);
        }
        if bpa_c > 0 {
            self.log(Phase::Save, format!("{} registros BPA-C salvos", bpa_c), Severity::Success, None);
        }
        if stats.valores.total > 0.0 {
            self.log(
                Phase::Save,
                format!("Valor total estimado: {}", format_brl(stats.valores.total)),
                Severity::Success,
                None,
            );
        }

        self.advance(Phase::Complete);
        self.log(
            Phase::Complete,
            "Extração concluída com sucesso!",
            Severity::Success,
            Some(format!("Tempo total: {}s", elapsed)),
        );

        if !response.errors.is_empty() {
            log::warn!("Extraction reported {} warnings", response.errors.len());
            self.log(
                Phase::Complete,
                format!("{} erros durante o processo", response.errors.len()),
                Severity::Warning,
                None,
            );
            for warning in response.errors.iter().take(self.config.warning_log_cap) {
                self.log(Phase::Complete, warning.clone(), Severity::Warning, None);
            }
        }

        let summary = response
            .message
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SUMMARY.to_string());
        OperationResult::succeeded(summary, stats.saved.total(), response.errors)
    }

    fn fail(&mut self, summary: String, details: String, errors: Vec<String>) -> OperationResult {
        log::error!("Extraction failed: {}", details);
        self.advance(Phase::Error);
        self.log(Phase::Error, "Falha na extração", Severity::Error, Some(details));
        OperationResult::failed(summary, errors)
    }

    fn advance(&mut self, phase: Phase) {
        log::debug!("Phase -> {}", phase);
        self.emit(TrackerAction::PhaseAdvanced(phase));
    }

    fn log(&mut self, phase: Phase, message: impl Into<String>, severity: Severity, details: Option<String>) {
        self.emit(TrackerAction::log(phase, message, severity, details));
    }

    fn emit(&mut self, action: TrackerAction) {
        if let Err(err) = self.dispatch(action) {
            log::warn!("Tracker action rejected: {}", err);
        }
    }

    fn dispatch(&mut self, action: TrackerAction) -> Result<(), ExtractionError> {
        match &self.observer {
            Some(observer) => {
                let observed = action.clone();
                self.state.apply(action)?;
                observer(&observed, &self.state);
            }
            None => self.state.apply(action)?,
        }
        Ok(())
    }
}
