// Allow dead code: Language helpers for config round-trips
#![allow(dead_code)]

//! Localized text bundles.
//!
//! Three complete bundles (Spanish, English, French) held as immutable
//! statics, selected by a process-wide current-language value. The
//! selection is persisted through [`crate::config::Config`] and restored
//! at startup; nothing ever mutates a bundle.

use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::scoring::{Field, Severity};

/// Supported UI languages. Spanish is the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Es,
    En,
    Fr,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Es => "es",
            Language::En => "en",
            Language::Fr => "fr",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "es" => Some(Language::Es),
            "en" => Some(Language::En),
            "fr" => Some(Language::Fr),
            _ => None,
        }
    }

    /// Next language in the selector cycle.
    pub fn next(&self) -> Self {
        match self {
            Language::Es => Language::En,
            Language::En => Language::Fr,
            Language::Fr => Language::Es,
        }
    }
}

/// One sub-score section: title plus one label and one description per
/// selectable value (index 0 = score 1).
pub struct ScaleSection {
    pub title: &'static str,
    pub options: &'static [&'static str],
    pub descriptions: &'static [&'static str],
}

pub struct Interpretations {
    pub incomplete: &'static str,
    pub mild: &'static str,
    pub moderate: &'static str,
    pub severe: &'static str,
}

pub struct Protocols {
    pub title: &'static str,
    pub mild: &'static str,
    pub moderate: &'static str,
    pub severe: &'static str,
    pub critical: &'static str,
}

pub struct Bundle {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub ocular: ScaleSection,
    pub verbal: ScaleSection,
    pub motor: ScaleSection,
    pub score_total: &'static str,
    pub interpretation: Interpretations,
    pub alert_critical: &'static str,
    pub alert_severe: &'static str,
    pub protocols: Protocols,
    pub btn_validate: &'static str,
    pub btn_clear: &'static str,
    pub btn_language: &'static str,
    pub err_select_ocular: &'static str,
    pub err_select_verbal: &'static str,
    pub err_select_motor: &'static str,
}

impl Bundle {
    pub fn section(&self, field: Field) -> &ScaleSection {
        match field {
            Field::Ocular => &self.ocular,
            Field::Verbal => &self.verbal,
            Field::Motor => &self.motor,
        }
    }

    pub fn band_label(&self, severity: Severity) -> &'static str {
        match severity {
            Severity::Incomplete => self.interpretation.incomplete,
            Severity::Mild => self.interpretation.mild,
            Severity::Moderate => self.interpretation.moderate,
            Severity::Severe => self.interpretation.severe,
        }
    }

    pub fn validation_message(&self, field: Field) -> &'static str {
        match field {
            Field::Ocular => self.err_select_ocular,
            Field::Verbal => self.err_select_verbal,
            Field::Motor => self.err_select_motor,
        }
    }
}

static ES: Bundle = Bundle {
    title: "Escala de Coma de Glasgow",
    subtitle: "Herramienta profesional para la evaluación del nivel de consciencia. Funciona sin conexión.",
    ocular: ScaleSection {
        title: "Respuesta Ocular (1-4)",
        options: &["No responde", "Al dolor", "Al habla", "Espontánea"],
        descriptions: &[
            "No abre los ojos ante ningún estímulo",
            "Abre los ojos solo ante estímulo doloroso",
            "Abre los ojos cuando se le habla",
            "Abre los ojos espontáneamente",
        ],
    },
    verbal: ScaleSection {
        title: "Respuesta Verbal (1-5)",
        options: &["No responde", "Incomprensible", "Inapropiada", "Confusa", "Orientada"],
        descriptions: &[
            "No emite sonidos",
            "Sonidos incomprensibles, gemidos",
            "Palabras inapropiadas, no mantiene conversación",
            "Conversa pero está desorientado",
            "Conversación normal, orientado en tiempo y espacio",
        ],
    },
    motor: ScaleSection {
        title: "Respuesta Motora (1-6)",
        options: &[
            "No responde",
            "Extensión",
            "Flexión anormal",
            "Retirada",
            "Localiza dolor",
            "Obedece órdenes",
        ],
        descriptions: &[
            "No hay respuesta motora",
            "Extensión anormal (descerebración)",
            "Flexión anormal (decorticación)",
            "Retirada ante el dolor",
            "Localiza estímulos dolorosos",
            "Obedece órdenes simples",
        ],
    },
    score_total: "PUNTAJE TOTAL",
    interpretation: Interpretations {
        incomplete: "Incompleto",
        mild: "Leve",
        moderate: "Moderado",
        severe: "Severo",
    },
    alert_critical: "⚠️ CRÍTICO: Puntaje ≤8 indica coma. Considere intubación inmediata.",
    alert_severe: "⚠️ SEVERO: Traumatismo craneal severo. Monitoreo intensivo requerido.",
    protocols: Protocols {
        title: "Protocolo de Respuesta",
        mild: "• Observación cada 2 horas\n• TC si empeora\n• Alta con precauciones",
        moderate: "• Observación cada hora\n• TC cerebral urgente\n• Hospitalización 24-48h",
        severe: "• Monitoreo continuo\n• TC inmediata\n• UCI neurológica\n• Considerar PIC",
        critical: "• Intubación inmediata\n• Ventilación mecánica\n• TC urgente\n• UCI especializada\n• Monitoreo PIC",
    },
    btn_validate: "Validar Evaluación",
    btn_clear: "Limpiar",
    btn_language: "Idioma",
    err_select_ocular: "Seleccione una respuesta ocular",
    err_select_verbal: "Seleccione una respuesta verbal",
    err_select_motor: "Seleccione una respuesta motora",
};

static EN: Bundle = Bundle {
    title: "Glasgow Coma Scale",
    subtitle: "Professional tool for consciousness level assessment. Works offline.",
    ocular: ScaleSection {
        title: "Eye Opening (1-4)",
        options: &["No response", "To pain", "To speech", "Spontaneous"],
        descriptions: &[
            "Does not open eyes to any stimulus",
            "Opens eyes only to painful stimulus",
            "Opens eyes when spoken to",
            "Opens eyes spontaneously",
        ],
    },
    verbal: ScaleSection {
        title: "Verbal Response (1-5)",
        options: &["No response", "Incomprehensible", "Inappropriate", "Confused", "Oriented"],
        descriptions: &[
            "Makes no sounds",
            "Incomprehensible sounds, moaning",
            "Inappropriate words, no sustained conversation",
            "Converses but disoriented",
            "Normal conversation, oriented to time and place",
        ],
    },
    motor: ScaleSection {
        title: "Motor Response (1-6)",
        options: &[
            "No response",
            "Extension",
            "Abnormal flexion",
            "Withdrawal",
            "Localizes pain",
            "Obeys commands",
        ],
        descriptions: &[
            "No motor response",
            "Abnormal extension (decerebrate)",
            "Abnormal flexion (decorticate)",
            "Withdrawal from pain",
            "Localizes painful stimuli",
            "Obeys simple commands",
        ],
    },
    score_total: "TOTAL SCORE",
    interpretation: Interpretations {
        incomplete: "Incomplete",
        mild: "Mild",
        moderate: "Moderate",
        severe: "Severe",
    },
    alert_critical: "⚠️ CRITICAL: Score ≤8 indicates coma. Consider immediate intubation.",
    alert_severe: "⚠️ SEVERE: Severe head trauma. Intensive monitoring required.",
    protocols: Protocols {
        title: "Response Protocol",
        mild: "• Observation every 2 hours\n• CT if worsening\n• Discharge with precautions",
        moderate: "• Observation every hour\n• Urgent brain CT\n• Hospitalization 24-48h",
        severe: "• Continuous monitoring\n• Immediate CT\n• Neurological ICU\n• Consider ICP monitoring",
        critical: "• Immediate intubation\n• Mechanical ventilation\n• Urgent CT\n• Specialized ICU\n• ICP monitoring",
    },
    btn_validate: "Validate Assessment",
    btn_clear: "Clear",
    btn_language: "Language",
    err_select_ocular: "Select an eye response",
    err_select_verbal: "Select a verbal response",
    err_select_motor: "Select a motor response",
};

static FR: Bundle = Bundle {
    title: "Échelle de Coma de Glasgow",
    subtitle: "Outil professionnel pour l'évaluation du niveau de conscience. Fonctionne hors ligne.",
    ocular: ScaleSection {
        title: "Ouverture des Yeux (1-4)",
        options: &["Aucune réponse", "À la douleur", "À la parole", "Spontanée"],
        descriptions: &[
            "N'ouvre pas les yeux à aucun stimulus",
            "Ouvre les yeux seulement au stimulus douloureux",
            "Ouvre les yeux quand on lui parle",
            "Ouvre les yeux spontanément",
        ],
    },
    verbal: ScaleSection {
        title: "Réponse Verbale (1-5)",
        options: &["Aucune réponse", "Incompréhensible", "Inappropriée", "Confuse", "Orientée"],
        descriptions: &[
            "N'émet aucun son",
            "Sons incompréhensibles, gémissements",
            "Mots inappropriés, ne maintient pas la conversation",
            "Converse mais désorienté",
            "Conversation normale, orienté dans le temps et l'espace",
        ],
    },
    motor: ScaleSection {
        title: "Réponse Motrice (1-6)",
        options: &[
            "Aucune réponse",
            "Extension",
            "Flexion anormale",
            "Retrait",
            "Localise la douleur",
            "Obéit aux ordres",
        ],
        descriptions: &[
            "Aucune réponse motrice",
            "Extension anormale (décérébration)",
            "Flexion anormale (décortication)",
            "Retrait à la douleur",
            "Localise les stimuli douloureux",
            "Obéit aux ordres simples",
        ],
    },
    score_total: "SCORE TOTAL",
    interpretation: Interpretations {
        incomplete: "Incomplet",
        mild: "Léger",
        moderate: "Modéré",
        severe: "Sévère",
    },
    alert_critical: "⚠️ CRITIQUE: Score ≤8 indique un coma. Considérer l'intubation immédiate.",
    alert_severe: "⚠️ SÉVÈRE: Traumatisme crânien sévère. Surveillance intensive requise.",
    protocols: Protocols {
        title: "Protocole de Réponse",
        mild: "• Observation toutes les 2 heures\n• Scanner si aggravation\n• Sortie avec précautions",
        moderate: "• Observation toutes les heures\n• Scanner cérébral urgent\n• Hospitalisation 24-48h",
        severe: "• Surveillance continue\n• Scanner immédiat\n• USI neurologique\n• Considérer monitoring PIC",
        critical: "• Intubation immédiate\n• Ventilation mécanique\n• Scanner urgent\n• USI spécialisée\n• Monitoring PIC",
    },
    btn_validate: "Valider l'Évaluation",
    btn_clear: "Effacer",
    btn_language: "Langue",
    err_select_ocular: "Sélectionner une réponse oculaire",
    err_select_verbal: "Sélectionner une réponse verbale",
    err_select_motor: "Sélectionner une réponse motrice",
};

/// Process-wide current language.
static CURRENT: RwLock<Language> = RwLock::new(Language::Es);

/// Bundle for a specific language.
pub fn bundle(language: Language) -> &'static Bundle {
    match language {
        Language::Es => &ES,
        Language::En => &EN,
        Language::Fr => &FR,
    }
}

pub fn current() -> Language {
    *CURRENT.read().expect("language lock poisoned")
}

pub fn set_current(language: Language) {
    *CURRENT.write().expect("language lock poisoned") = language;
}

/// Bundle for the current language.
pub fn t() -> &'static Bundle {
    bundle(current())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_bundle_has_full_option_tables() {
        for lang in [Language::Es, Language::En, Language::Fr] {
            let b = bundle(lang);
            assert_eq!(b.ocular.options.len(), 4);
            assert_eq!(b.verbal.options.len(), 5);
            assert_eq!(b.motor.options.len(), 6);
            assert_eq!(b.ocular.descriptions.len(), b.ocular.options.len());
            assert_eq!(b.verbal.descriptions.len(), b.verbal.options.len());
            assert_eq!(b.motor.descriptions.len(), b.motor.options.len());
        }
    }

    #[test]
    fn test_band_labels() {
        assert_eq!(bundle(Language::Es).band_label(Severity::Mild), "Leve");
        assert_eq!(bundle(Language::En).band_label(Severity::Moderate), "Moderate");
        assert_eq!(bundle(Language::Fr).band_label(Severity::Severe), "Sévère");
    }

    #[test]
    fn test_language_codes_round_trip() {
        for lang in [Language::Es, Language::En, Language::Fr] {
            assert_eq!(Language::from_code(lang.code()), Some(lang));
        }
        assert_eq!(Language::from_code("de"), None);
    }

    #[test]
    fn test_language_cycle_covers_all() {
        let start = Language::Es;
        assert_eq!(start.next().next().next(), start);
    }
}
