use bpa_extraction::models::live_stats::{BPA_C, BPA_I, REMOVED, TOTAL_API};
use bpa_extraction::{
    LogEntry, OperationResult, PHASE_SEQUENCE, Phase, PhaseStatus, Severity, TrackerAction,
    TrackerObserver, TrackerState,
};
use kdam::{Bar, BarExt, tqdm};
use std::sync::{Arc, Mutex};

fn severity_icon(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "·",
        Severity::Success => "✓",
        Severity::Warning => "⚠",
        Severity::Error => "✗",
    }
}

pub fn format_entry(entry: &LogEntry) -> String {
    let mut line = format!(
        "{} [{}] {:<8} {}",
        severity_icon(entry.severity),
        entry.time_label(),
        entry.phase.as_str(),
        entry.message
    );
    if let Some(details) = &entry.details {
        line.push_str(&format!("\n      {}", details));
    }
    line
}

/// Phase strip, e.g. `✓ Conectando → ▶ Baixando → · Filtrando SIGTAP ...`
pub fn phase_strip(state: &TrackerState) -> String {
    state
        .phase()
        .statuses()
        .into_iter()
        .map(|(phase, status)| {
            let mark = match status {
                PhaseStatus::Completed => "✓",
                PhaseStatus::Active => "▶",
                PhaseStatus::Pending => "·",
                PhaseStatus::Error => "✗",
            };
            format!("{} {}", mark, phase.label())
        })
        .collect::<Vec<_>>()
        .join(" → ")
}

/// Observer that prints console lines above a phase progress bar
pub fn live_console() -> TrackerObserver {
    let bar: Arc<Mutex<Bar>> = Arc::new(Mutex::new(tqdm!(
        total = PHASE_SEQUENCE.len(),
        desc = "Extração",
        position = 0
    )));

    Arc::new(move |action: &TrackerAction, state: &TrackerState| {
        let Ok(mut bar) = bar.lock() else {
            return;
        };
        let outcome = match action {
            TrackerAction::LogAppended { .. } => match state.ledger().last() {
                Some(entry) => bar.write(format_entry(entry)),
                None => Ok(()),
            },
            TrackerAction::PhaseAdvanced(Phase::Error) => {
                bar.set_description(Phase::Error.label());
                bar.refresh()
            }
            TrackerAction::PhaseAdvanced(phase) => {
                bar.set_description(phase.label());
                let position = phase.index().map(|i| i + 1).unwrap_or(0);
                bar.update_to(position).map(|_| ())
            }
            TrackerAction::RunCompleted(_) if state.phase().is_terminal() => {
                bar.write(phase_strip(state))
            }
            _ => Ok(()),
        };
        if let Err(e) = outcome {
            log::debug!("Progress bar write failed: {}", e);
        }
    })
}

/// Closing report for a finished run
pub fn summary_lines(result: &OperationResult, state: &TrackerState) -> Vec<String> {
    let mut lines = Vec::new();
    if result.success {
        lines.push(format!("✅ {}", result.summary_message));
    } else {
        lines.push(format!("❌ {}", result.summary_message));
    }

    let stats = state.stats();
    if stats.is_present() {
        lines.push("📊 Resultado".to_string());
        lines.push(format!("   Registros da API : {}", stats.display(TOTAL_API)));
        lines.push(format!("   Removidos (SIGTAP): {}", stats.display(REMOVED)));
        lines.push(format!("   BPA-I            : {}", stats.display(BPA_I)));
        lines.push(format!("   BPA-C            : {}", stats.display(BPA_C)));
    }
    if result.success {
        lines.push(format!("   Total salvo      : {}", result.saved_count));
    }

    if !result.errors.is_empty() {
        if result.has_warnings() {
            lines.push(format!("⚠️  {} avisos reportados:", result.errors.len()));
        } else {
            lines.push(format!("❌ {} erros reportados:", result.errors.len()));
        }
        lines.extend(result.errors.iter().map(|e| format!("   - {}", e)));
    }

    let ledger = state.ledger();
    lines.push(format!(
        "📝 Console: {} entradas ({} avisos, {} erros)",
        ledger.len(),
        ledger.count_by_severity(Severity::Warning),
        ledger.count_by_severity(Severity::Error)
    ));
    lines
}

pub fn print_summary(result: &OperationResult, state: &TrackerState) {
    println!();
    for line in summary_lines(result, state) {
        println!("{}", line);
    }
}
