use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use healthcheck_core::{write_atomic, InputField, InputValue};

use crate::controller::{FormController, FormError};
use crate::presenter;

const HELP: &str = "\
Comandi:
  fields                 elenco dei campi disponibili
  show                   valori attuali del form
  set <campo> <valore>   imposta un campo (valore vuoto = non noto)
  unset <campo>          azzera un campo
  run                    Avvia Health Check
  report                 mostra di nuovo l'ultimo report
  reset                  Nuova Analisi (i dati restano)
  export <file>          esporta il report (.json o Markdown)
  help                   questo aiuto
  quit                   esci";

#[derive(Debug, PartialEq)]
enum Command {
    Help,
    Fields,
    Show,
    Set(InputField, String),
    Unset(InputField),
    Run,
    Report,
    Reset,
    Export(PathBuf),
    Quit,
}

fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    let field = |name: &str| -> Result<InputField, String> {
        if name.is_empty() {
            return Err("specifica un campo (vedi 'fields')".to_string());
        }
        name.parse().map_err(|e: healthcheck_core::InputError| e.to_string())
    };

    let command = match verb.to_lowercase().as_str() {
        "help" | "?" => Command::Help,
        "fields" => Command::Fields,
        "show" => Command::Show,
        "set" => {
            let (name, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            Command::Set(field(name)?, value.trim().to_string())
        }
        "unset" => Command::Unset(field(rest)?),
        "run" | "avvia" => Command::Run,
        "report" => Command::Report,
        "reset" | "nuova" => Command::Reset,
        "export" => {
            if rest.is_empty() {
                return Err("specifica il file di destinazione".to_string());
            }
            Command::Export(PathBuf::from(rest))
        }
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("comando sconosciuto: {other} (prova 'help')")),
    };
    Ok(Some(command))
}

/// Write the report to `path`: JSON for `.json` files, Markdown otherwise.
pub fn export_report(report: &healthcheck_core::HealthCheckReport, path: &Path) -> Result<()> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let body = if is_json {
        serde_json::to_string_pretty(report).context("serialize report")?
    } else {
        presenter::render_markdown(report)
    };
    write_atomic(path, &body).with_context(|| format!("export to {}", path.display()))
}

/// Line-oriented form session. Returns on `quit` or end of input.
pub async fn run_session<R, W>(controller: &FormController, reader: R, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = reader.lines();

    writeln!(out, "mainsim CMMS HealthCheck - audit automatico per la manutenzione")?;
    writeln!(out, "Scrivi 'help' per l'elenco dei comandi.")?;

    loop {
        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            break;
        };

        let command = match parse_command(&line) {
            Ok(Some(c)) => c,
            Ok(None) => continue,
            Err(msg) => {
                writeln!(out, "{msg}")?;
                continue;
            }
        };

        match command {
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Fields => write!(out, "{}", presenter::render_fields())?,
            Command::Show => write!(out, "{}", presenter::render_form(&controller.inputs()))?,
            Command::Set(field, raw) => match controller.set_field_raw(field, &raw) {
                Ok(()) => writeln!(out, "{} = {}", field.key(), controller.inputs().get(field))?,
                Err(e) => writeln!(out, "{e}")?,
            },
            Command::Unset(field) => {
                controller.set_field(field, InputValue::unset(field))?;
                writeln!(out, "{} non impostato", field.key())?;
            }
            Command::Run => {
                writeln!(out, "Analisi in corso...")?;
                match controller.generate().await {
                    Ok(report) => writeln!(out, "{}", presenter::render_markdown(&report))?,
                    Err(FormError::Request(e)) => writeln!(out, "Errore: {e}")?,
                    Err(e) => writeln!(out, "{e}")?,
                }
            }
            Command::Report => match controller.report() {
                Some(report) => writeln!(out, "{}", presenter::render_markdown(&report))?,
                None => writeln!(out, "Nessun report disponibile: usa 'run'.")?,
            },
            Command::Reset => {
                controller.reset();
                writeln!(out, "Nuova analisi: i dati inseriti sono stati mantenuti.")?;
            }
            Command::Export(path) => match controller.report() {
                Some(report) => match export_report(&report, &path) {
                    Ok(()) => writeln!(out, "Report esportato in {}", path.display())?,
                    Err(e) => writeln!(out, "Esportazione fallita: {e:#}")?,
                },
                None => writeln!(out, "Nessun report da esportare.")?,
            },
            Command::Quit => break,
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(parse_command("  "), Ok(None));
        assert_eq!(parse_command("RUN"), Ok(Some(Command::Run)));
        assert_eq!(
            parse_command("set backlog 35"),
            Ok(Some(Command::Set(InputField::Backlog, "35".to_string())))
        );
        assert_eq!(
            parse_command("set avgLoginFrequency"),
            Ok(Some(Command::Set(InputField::AvgLoginFrequency, String::new())))
        );
        assert_eq!(
            parse_command("unset mttr"),
            Ok(Some(Command::Unset(InputField::Mttr)))
        );
        assert_eq!(
            parse_command("export out/report.md"),
            Ok(Some(Command::Export(PathBuf::from("out/report.md"))))
        );
    }

    #[test]
    fn rejects_bad_commands() {
        assert!(parse_command("set").is_err());
        assert!(parse_command("set uptime 3").is_err());
        assert!(parse_command("export").is_err());
        assert!(parse_command("dance").is_err());
    }
}
