use std::env;

/// Execution contexts that influence how logging is routed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionContext {
    /// A person driving the console from a terminal.
    Interactive,
    /// Scripts consuming machine-readable output on stdout.
    Scripted,
}

impl ExecutionContext {
    /// Returns `true` when console sinks should be disabled by default.
    pub fn disables_console(self) -> bool {
        matches!(self, ExecutionContext::Scripted)
    }
}

/// Derive the active execution context from the output mode plus overrides.
pub fn detect_context(json_output: bool) -> ExecutionContext {
    if json_output || scripted_override_enabled() {
        ExecutionContext::Scripted
    } else {
        ExecutionContext::Interactive
    }
}

fn scripted_override_enabled() -> bool {
    env::var("DATAMATE_SCRIPTED")
        .map(|value| value.trim() == "1")
        .unwrap_or(false)
}
