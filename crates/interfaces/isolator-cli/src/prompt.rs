use std::io::{BufRead, Write};
use std::sync::Arc;

use isolator_app_core::{ConfirmationGate, ConfirmationRequest, Resolution};
use tokio::task::JoinHandle;
use tracing::debug;

/// Answers confirmation prompts for as long as it is alive.
pub struct PromptResponder {
    task: JoinHandle<()>,
}

impl PromptResponder {
    /// Bind `answer` to `gate`. `answer` may block; it runs off the async workers.
    pub fn spawn<F>(gate: &ConfirmationGate, answer: F) -> Self
    where
        F: Fn(&ConfirmationRequest) -> Resolution + Send + Sync + 'static,
    {
        let gate = gate.clone();
        let answer = Arc::new(answer);
        let mut prompts = gate.subscribe();

        let task = tokio::spawn(async move {
            loop {
                let request = match prompts.wait_for(Option::is_some).await {
                    Ok(current) => current.clone(),
                    Err(_) => break,
                };
                let Some(request) = request else { continue };

                let answer = answer.clone();
                let resolution = tokio::task::spawn_blocking(move || answer(&request))
                    .await
                    .unwrap_or(Resolution::Dismiss);
                if !gate.resolve(resolution) {
                    debug!("prompt was withdrawn before it was answered");
                }
            }
        });

        Self { task }
    }

    /// Confirm everything without asking.
    pub fn assume_yes(gate: &ConfirmationGate) -> Self {
        Self::spawn(gate, |_| Resolution::Confirm)
    }

    /// Ask on the terminal.
    pub fn interactive(gate: &ConfirmationGate) -> Self {
        Self::spawn(gate, |request| {
            let stdin = std::io::stdin();
            ask(request, &mut stdin.lock(), &mut std::io::stderr())
        })
    }
}

impl Drop for PromptResponder {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Print the prompt and read one answer line. End of input is a dismissal.
pub fn ask(
    request: &ConfirmationRequest,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Resolution {
    let _ = write!(output, "{}: {} [y/N] ", request.title, request.message);
    let _ = output.flush();

    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) | Err(_) => Resolution::Dismiss,
        Ok(_) => match line.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => Resolution::Confirm,
            _ => Resolution::Cancel,
        },
    }
}
