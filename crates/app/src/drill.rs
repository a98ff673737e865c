use std::io::{self, BufRead, Write};

use drill_core::session::{ReviewSession, SessionState, Side};
use services::{CardFace, Library, SessionLoopError, SessionLoopService};

/// Counts shown after a drill ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrillSummary {
    pub answered: usize,
    pub correct: usize,
    pub completed: bool,
}

const HELP: &str = "[enter] flip  [y] knew it  [n] missed it  [s] star  [q] quit";

/// Drive `session` from line-based input until it completes or the user quits.
///
/// End of input abandons the session like `q`.
///
/// # Errors
///
/// Returns `io::Error` if reading input or writing output fails.
pub fn run_session<R: BufRead, W: Write>(
    loop_svc: &SessionLoopService,
    library: &mut Library,
    session: &mut ReviewSession,
    input: &mut R,
    out: &mut W,
) -> io::Result<DrillSummary> {
    let mut summary = DrillSummary::default();
    writeln!(out, "{HELP}")?;

    while session.is_active() {
        show_current(session, library, out)?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            loop_svc.abandon(session);
            break;
        }

        match line.trim().to_ascii_lowercase().as_str() {
            "" | "f" => {
                if let Err(e) = session.flip() {
                    writeln!(out, "{e}")?;
                }
            }
            answer @ ("y" | "n") => {
                let correct = answer == "y";
                match loop_svc.answer_current(library, session, correct) {
                    Ok(_) => {}
                    Err(SessionLoopError::PersistenceWriteFailed(e)) => {
                        writeln!(out, "warning: progress not saved ({e})")?;
                    }
                    Err(SessionLoopError::Session(_)) if session.side() == Side::Front => {
                        writeln!(out, "flip the card before answering")?;
                        continue;
                    }
                    Err(e) => {
                        writeln!(out, "{e}")?;
                        continue;
                    }
                }
                if let Some(outcome) = session.last_outcome() {
                    summary.answered += 1;
                    if outcome.correct {
                        summary.correct += 1;
                    }
                    let verdict = if outcome.correct { "correct" } else { "missed" };
                    writeln!(
                        out,
                        "{verdict}: box {} -> {}",
                        outcome.box_before, outcome.box_after
                    )?;
                    if let Some(milestone) = outcome.milestone {
                        writeln!(out, "{} in a row!", milestone.streak)?;
                    }
                }
                session.advance().map_err(io::Error::other)?;
            }
            "s" => match loop_svc.toggle_favorite(library, session) {
                Ok(true) => writeln!(out, "starred")?,
                Ok(false) => writeln!(out, "unstarred")?,
                Err(e) => writeln!(out, "{e}")?,
            },
            "q" => {
                loop_svc.abandon(session);
                break;
            }
            _ => writeln!(out, "{HELP}")?,
        }
    }

    summary.completed = session.state() == SessionState::Complete;
    writeln!(
        out,
        "{} of {} answered correctly{}",
        summary.correct,
        summary.answered,
        if summary.completed { "" } else { " (stopped early)" }
    )?;
    Ok(summary)
}

fn show_current<W: Write>(
    session: &ReviewSession,
    library: &Library,
    out: &mut W,
) -> io::Result<()> {
    let Some(face) = CardFace::current(session, library.store()) else {
        return Ok(());
    };
    let progress = session.progress();
    let star = if face.favorite { " *" } else { "" };
    writeln!(
        out,
        "[{}/{}] box {}{star}  {}",
        progress.position, progress.total, face.leitner_box, face.text
    )?;
    for example in &face.examples {
        writeln!(out, "    - {example}")?;
    }
    Ok(())
}
