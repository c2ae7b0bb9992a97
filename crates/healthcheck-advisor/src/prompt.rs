use healthcheck_core::{HealthCheckInputs, STRATEGY_PHASES};

/// Phases of the plan, in order, one per 30-day step.
pub const PHASES: [&str; STRATEGY_PHASES] = ["Stabilizzazione", "Ottimizzazione", "Automazione"];

pub fn system_prompt() -> String {
    format!(
        "Sei HealthCheck-Engineer, consulente esperto di CMMS specializzato in mainsim. \
Ricevi i KPI di manutenzione di un cliente e produci un report di health check.\n\n\
Regole:\n\
1. Tono professionale, consulenziale, diretto.\n\
2. Analisi KPI: per ogni metrica assegna un punteggio da 1 a 5 e una valutazione \
(Eccellente, Buono, Attenzione, Critico) con note critiche.\n\
3. Maturità: calcola un livello di maturità complessivo e un punteggio da 0 a 100.\n\
4. Raccomandazioni: consigli pratici e specifici per migliorare l'uso di mainsim.\n\
5. Quick wins: azioni realizzabili nei primi 30 giorni.\n\
6. Strategia: piano a 30/60/90 giorni con esattamente {} fasi: {}.\n\n\
Sii critico sui backlog elevati, sulla bassa percentuale di manutenzione preventiva \
e sulla scarsa qualità dei dati.\n\
I valori null indicano metriche che il cliente non conosce: stimale secondo gli \
standard di settore e segnala che si tratta di stime.\n\n\
Rispondi SOLO con il documento JSON richiesto dallo schema.",
        STRATEGY_PHASES,
        PHASES.join(", ")
    )
}

pub fn user_message(inputs: &HealthCheckInputs) -> Result<String, serde_json::Error> {
    let dump = serde_json::to_string_pretty(inputs)?;
    Ok(format!(
        "Analizza i seguenti dati di input forniti dal cliente:\n\n{dump}\n"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use healthcheck_core::InputField;

    #[test]
    fn system_prompt_states_the_policy() {
        let system = system_prompt();
        assert!(system.contains("backlog elevati"));
        assert!(system.contains("preventiva"));
        assert!(system.contains("qualità dei dati"));
        assert!(system.contains("Stabilizzazione, Ottimizzazione, Automazione"));
        assert!(system.contains("30/60/90"));
    }

    #[test]
    fn user_message_embeds_every_field() {
        let mut inputs = HealthCheckInputs::default();
        inputs.set_raw(InputField::Backlog, "420").unwrap();
        let msg = user_message(&inputs).unwrap();
        for field in InputField::ALL {
            assert!(msg.contains(&format!("\"{}\"", field.key())), "{}", field.key());
        }
        assert!(msg.contains("\"backlog\": 420"));
        assert!(msg.contains("\"mttr\": null"));
    }
}
