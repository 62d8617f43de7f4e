//! Interactive candidate entry for assignment sessions.
//!
//! Before each prompt the user sees the reviewers still available:
//!
//! ```text
//! Proposal 2: 2 slot(s) open
//!   4  Ada Lovelace
//!   9  Alan Turing
//! Enter a reviewer ID, or 'done' to finish.
//! assign>
//! ```
//!
//! Blank lines prompt again. End of input finishes the session.

use async_trait::async_trait;
use colored::Colorize;
use council_application::{CandidateSource, CandidateSourceError};
use council_domain::{AssignmentSession, CandidateInput};
use std::io::{self, BufRead, BufReader, Stdin, Stdout, Write};

/// Terminal [`CandidateSource`] that reads one reviewer id per line.
pub struct InteractiveCandidateSource<R, W> {
    reader: R,
    writer: W,
}

impl InteractiveCandidateSource<BufReader<Stdin>, Stdout> {
    /// Read from stdin and prompt on stdout.
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R: BufRead, W: Write> InteractiveCandidateSource<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    fn show_candidates(&mut self, session: &AssignmentSession) -> io::Result<()> {
        writeln!(self.writer)?;
        writeln!(
            self.writer,
            "{} {} slot(s) open",
            format!("Proposal {}:", session.proposal()).cyan().bold(),
            session.open_slots()
        )?;

        let mut any = false;
        for reviewer in session.remaining_candidates() {
            any = true;
            writeln!(self.writer, "  {:<4} {}", reviewer.id, reviewer.name)?;
        }
        if !any {
            writeln!(self.writer, "  {}", "(no reviewers left)".dimmed())?;
        }

        writeln!(self.writer, "Enter a reviewer ID, or 'done' to finish.")?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<Option<String>, CandidateSourceError> {
        write!(self.writer, "{} ", "assign>".magenta().bold())
            .and_then(|_| self.writer.flush())
            .map_err(|e| CandidateSourceError::IoError(format!("Failed to flush prompt: {}", e)))?;

        // The read blocks on the terminal; keep it off the async worker.
        let mut input = String::new();
        let reader = &mut self.reader;
        let read = tokio::task::block_in_place(|| reader.read_line(&mut input))
            .map_err(|e| CandidateSourceError::IoError(format!("Failed to read input: {}", e)))?;

        if read == 0 {
            Ok(None)
        } else {
            Ok(Some(input.trim().to_string()))
        }
    }
}

#[async_trait]
impl<R, W> CandidateSource for InteractiveCandidateSource<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    async fn next_candidate(
        &mut self,
        session: &AssignmentSession,
    ) -> Result<CandidateInput, CandidateSourceError> {
        self.show_candidates(session)
            .map_err(|e| CandidateSourceError::IoError(e.to_string()))?;

        loop {
            match self.read_line()? {
                None => return Err(CandidateSourceError::Closed),
                Some(line) if line.is_empty() => continue,
                Some(line) => return Ok(CandidateInput::parse(&line)),
            }
        }
    }
}
