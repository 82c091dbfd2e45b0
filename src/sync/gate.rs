use inquire::error::InquireError;
use inquire::Confirm;

use crate::error::SyncError;

/// Decides whether a reviewed run may touch the remote target
pub trait ConfirmationGate {
    /// `Ok(true)` to proceed, `Ok(false)` to abort cleanly
    fn confirm(&mut self, question: &str) -> Result<bool, SyncError>;
}

/// Check if we're running in an interactive terminal
pub fn is_interactive() -> bool {
    atty::is(atty::Stream::Stdin) && atty::is(atty::Stream::Stdout)
}

/// Asks the operator on the terminal.
///
/// Anything but yes/no is rejected and asked again. Escape or Ctrl-C count
/// as "no".
#[derive(Debug, Default)]
pub struct PromptGate;

impl ConfirmationGate for PromptGate {
    fn confirm(&mut self, question: &str) -> Result<bool, SyncError> {
        if !is_interactive() {
            return Err(SyncError::Configuration(
                "Confirmation required but no terminal is attached. Re-run with --force for unattended mode."
                    .to_string(),
            ));
        }

        match Confirm::new(question)
            .with_help_message("Answer y/yes or n/no")
            .prompt()
        {
            Ok(answer) => Ok(answer),
            Err(InquireError::OperationCanceled) | Err(InquireError::OperationInterrupted) => Ok(false),
            Err(e) => Err(SyncError::Configuration(format!(
                "Failed to read confirmation: {e}"
            ))),
        }
    }
}

/// Unattended mode: every question is answered with yes
#[derive(Debug, Default)]
pub struct Unattended;

impl ConfirmationGate for Unattended {
    fn confirm(&mut self, question: &str) -> Result<bool, SyncError> {
        log::info!("{} (answered yes, unattended mode)", question);
        Ok(true)
    }
}
