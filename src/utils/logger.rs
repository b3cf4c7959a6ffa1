use std::collections::HashMap;
use serde::Serialize;

/// Structured logging helpers for the selection monitor
///
/// Every selection cycle (press, copy, popup, dismissal) goes through these
/// helpers so that a log excerpt from a user machine reads as one story.
///
/// ### Usage Guidelines
/// - **Lifecycle** (start/stop/pause): `log_operation_*`
/// - **Phase changes**: `log_state_transition`
/// - **Per-event details** (mouse/key hot path): `log_context!` at debug level
///
/// Selected text is never logged verbatim, only its length.

/// Structured log event types
#[derive(Debug, Clone, Serialize)]
pub enum LogEvent {
    Operation {
        name: String,
        phase: OperationPhase,
        #[serde(skip_serializing_if = "Option::is_none")]
        context: Option<LogContext>,
    },
    Selection {
        trigger: String,
        outcome: SelectionOutcome,
    },
}

#[derive(Debug, Clone, Serialize)]
pub enum OperationPhase {
    Start,
    Complete { duration_ms: u64 },
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub enum SelectionOutcome {
    Captured { chars: usize },
    Empty,
    Skipped { reason: String },
    Abandoned { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct LogContext {
    #[serde(flatten)]
    pub fields: HashMap<String, String>,
}

pub fn log_event(event: LogEvent) {
    match event {
        LogEvent::Operation { name, phase, context } => {
            let ctx_str = context.map(|c| format!(" | {:?}", c.fields)).unwrap_or_default();
            match phase {
                OperationPhase::Start => {
                    log::info!("🚀 {} STARTING{}", name, ctx_str);
                }
                OperationPhase::Complete { duration_ms } => {
                    log::info!("✅ {} COMPLETE in {}ms{}", name, duration_ms, ctx_str);
                }
                OperationPhase::Failed { error } => {
                    log::error!("❌ {} FAILED: {}{}", name, error, ctx_str);
                }
            }
        }
        LogEvent::Selection { trigger, outcome } => match outcome {
            SelectionOutcome::Captured { chars } => {
                log::info!("✂️ SELECTION [{}] captured {} chars", trigger, chars);
            }
            SelectionOutcome::Empty => {
                log::debug!("✂️ SELECTION [{}] copy produced no text", trigger);
            }
            SelectionOutcome::Skipped { reason } => {
                log::debug!("⏭️ SELECTION [{}] skipped: {}", trigger, reason);
            }
            SelectionOutcome::Abandoned { error } => {
                log::warn!("⚠️ SELECTION [{}] abandoned: {}", trigger, error);
            }
        },
    }
}

fn context_from(fields: &HashMap<String, String>) -> Option<LogContext> {
    if fields.is_empty() {
        None
    } else {
        Some(LogContext {
            fields: fields.clone(),
        })
    }
}

#[inline]
pub fn log_operation_start(operation: &str, params: &HashMap<String, String>) {
    log_event(LogEvent::Operation {
        name: operation.to_string(),
        phase: OperationPhase::Start,
        context: context_from(params),
    });
}

#[inline]
pub fn log_operation_complete(operation: &str, duration_ms: u64, results: &HashMap<String, String>) {
    log_event(LogEvent::Operation {
        name: operation.to_string(),
        phase: OperationPhase::Complete { duration_ms },
        context: context_from(results),
    });
}

pub fn log_operation_failed(operation: &str, error: &str, context: &HashMap<String, String>) {
    log_event(LogEvent::Operation {
        name: operation.to_string(),
        phase: OperationPhase::Failed {
            error: error.to_string(),
        },
        context: context_from(context),
    });
}

pub fn log_selection(trigger: &str, outcome: SelectionOutcome) {
    log_event(LogEvent::Selection {
        trigger: trigger.to_string(),
        outcome,
    });
}

/// Log state transitions with validation
pub fn log_state_transition(
    component: &str,
    from_state: &str,
    to_state: &str,
    valid: bool,
    context: Option<&HashMap<String, String>>,
) {
    if valid {
        log::debug!("🔄 STATE [{}]: {} → {}", component, from_state, to_state);
    } else {
        log::error!("🔄 STATE [{}]: {} → {} (⚠️  INVALID)", component, from_state, to_state);
    }

    if let Some(ctx) = context {
        if !ctx.is_empty() {
            log::debug!("   📋 State Context: {:?}", ctx);
        }
    }
}

/// Macro for quick context creation
/// Only allocates when debug logging is enabled
#[macro_export]
macro_rules! log_context {
    ($($key:expr => $value:expr),* $(,)?) => {
        {
            if log::log_enabled!(log::Level::Debug) {
                let mut context = std::collections::HashMap::new();
                $(
                    context.insert($key.to_string(), $value.to_string());
                )*
                context
            } else {
                std::collections::HashMap::<String, String>::new()
            }
        }
    };
}
