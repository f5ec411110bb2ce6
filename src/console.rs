//! Terminal implementations of the notification and confirmation surfaces

use std::io::{self, BufRead, Write};

use async_trait::async_trait;

use admin_records::screen::{
    ConfirmPrompt, Confirmation, Confirmer, Notification, Notifier, NotifyPhase, TracingNotifier,
};

/// Prints toast phases to stderr and mirrors them to the log
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: &Notification) {
        TracingNotifier.notify(notification);
        let marker = match notification.phase {
            NotifyPhase::Loading => "…",
            NotifyPhase::Success => "✓",
            NotifyPhase::Error => "✗",
        };
        eprintln!("{} {}", marker, notification.message);
    }
}

/// Asks on the terminal; anything but an explicit yes cancels
pub struct TerminalConfirmer;

#[async_trait]
impl Confirmer for TerminalConfirmer {
    async fn confirm(&self, prompt: &ConfirmPrompt) -> Confirmation {
        let prompt = prompt.clone();
        let answer = tokio::task::spawn_blocking(move || ask(&prompt)).await;
        match answer {
            Ok(Ok(confirmed)) => Confirmation::from_bool(confirmed),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Could not read confirmation, cancelling");
                Confirmation::Cancelled
            }
            Err(e) => {
                tracing::warn!(error = %e, "Confirmation prompt task failed, cancelling");
                Confirmation::Cancelled
            }
        }
    }
}

fn ask(prompt: &ConfirmPrompt) -> io::Result<bool> {
    let mut stderr = io::stderr();
    writeln!(stderr, "{}", prompt.title)?;
    write!(
        stderr,
        "{} [{}/{}] ",
        prompt.message, prompt.confirm_text, prompt.cancel_text
    )?;
    stderr.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(is_yes(&line, &prompt.confirm_text))
}

fn is_yes(answer: &str, confirm_text: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y")
        || answer.eq_ignore_ascii_case("yes")
        || answer.eq_ignore_ascii_case(confirm_text)
}
