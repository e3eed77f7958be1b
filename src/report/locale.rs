//! Report wording
//!
//! Every piece of text that appears on a report (bucket labels, the period
//! label, headings, legend and the narrative summary) comes from here.

use crate::report::aggregate::Totals;
use crate::store::EntityKind;
use serde::{Deserialize, Serialize};

const MONTHS_EN: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const MONTHS_ES: [&str; 12] = [
    "Ene", "Feb", "Mar", "Abr", "May", "Jun", "Jul", "Ago", "Sep", "Oct", "Nov", "Dic",
];

/// Language a report is written in
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportLocale {
    #[default]
    En,
    Es,
}

impl ReportLocale {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Some(ReportLocale::En),
            "es" | "spanish" | "espanol" | "español" => Some(ReportLocale::Es),
            _ => None,
        }
    }

    /// Month abbreviations, January first
    pub fn month_abbrevs(&self) -> &'static [&'static str; 12] {
        match self {
            ReportLocale::En => &MONTHS_EN,
            ReportLocale::Es => &MONTHS_ES,
        }
    }

    pub fn year_label(&self, year: i32) -> String {
        match self {
            ReportLocale::En => format!("Year {}", year),
            ReportLocale::Es => format!("Año {}", year),
        }
    }

    pub fn quarter_label(&self, quarter: u32, year: i32) -> String {
        match self {
            ReportLocale::En => format!("Quarter {} / {}", quarter, year),
            ReportLocale::Es => format!("Trimestre {} / {}", quarter, year),
        }
    }

    pub fn month_label(&self, month: u32, year: i32) -> String {
        match self {
            ReportLocale::En => format!("Month {}/{}", month, year),
            ReportLocale::Es => format!("Mes {}/{}", month, year),
        }
    }

    pub fn title(&self, hospital: &str) -> String {
        match self {
            ReportLocale::En => format!("Statistics Report - {}", hospital),
            ReportLocale::Es => format!("Reporte de Estadísticas - {}", hospital),
        }
    }

    pub fn period_line(&self, label: &str) -> String {
        match self {
            ReportLocale::En => format!("Period: {}", label),
            ReportLocale::Es => format!("Periodo: {}", label),
        }
    }

    pub fn generated_line(&self, timestamp: &str) -> String {
        match self {
            ReportLocale::En => format!("Generated: {}", timestamp),
            ReportLocale::Es => format!("Fecha de generación: {}", timestamp),
        }
    }

    pub fn totals_heading(&self) -> &'static str {
        match self {
            ReportLocale::En => "1. Totals for the period",
            ReportLocale::Es => "1. Totales Generales (en periodo)",
        }
    }

    pub fn chart_heading(&self) -> &'static str {
        match self {
            ReportLocale::En => "2. Comparative chart",
            ReportLocale::Es => "2. Gráfica Comparativa",
        }
    }

    pub fn summary_heading(&self, hospital: &str) -> String {
        match self {
            ReportLocale::En => format!("3. {} at a glance", hospital),
            ReportLocale::Es => "3. Resumen Breve del Hospital".to_string(),
        }
    }

    /// Bullet line in the totals section
    pub fn total_item(&self, kind: EntityKind, total: u64) -> String {
        let caption = match (self, kind) {
            (ReportLocale::En, EntityKind::Patient) => "New patients",
            (ReportLocale::En, EntityKind::Appointment) => "Appointments in range",
            (ReportLocale::En, EntityKind::Report) => "Reports generated",
            (ReportLocale::En, EntityKind::LabResult) => "Lab results",
            (ReportLocale::En, EntityKind::Prescription) => "Prescriptions",
            (ReportLocale::Es, EntityKind::Patient) => "Pacientes nuevos",
            (ReportLocale::Es, EntityKind::Appointment) => "Citas en rango",
            (ReportLocale::Es, EntityKind::Report) => "Reportes generados",
            (ReportLocale::Es, EntityKind::LabResult) => "Resultados de laboratorio",
            (ReportLocale::Es, EntityKind::Prescription) => "Prescripciones",
        };
        format!("{}: {}", caption, total)
    }

    pub fn legend_label(&self, kind: EntityKind) -> &'static str {
        match (self, kind) {
            (ReportLocale::En, EntityKind::Patient) => "Patients",
            (ReportLocale::En, EntityKind::Appointment) => "Appointments",
            (ReportLocale::En, EntityKind::Report) => "Reports",
            (ReportLocale::En, EntityKind::LabResult) => "Results",
            (ReportLocale::En, EntityKind::Prescription) => "Prescriptions",
            (ReportLocale::Es, EntityKind::Patient) => "Pacientes",
            (ReportLocale::Es, EntityKind::Appointment) => "Citas",
            (ReportLocale::Es, EntityKind::Report) => "Reportes",
            (ReportLocale::Es, EntityKind::LabResult) => "Resultados",
            (ReportLocale::Es, EntityKind::Prescription) => "Prescripciones",
        }
    }

    /// Narrative summary paragraphs
    pub fn summary(&self, label: &str, totals: &Totals, hospital: &str) -> Vec<String> {
        let patients = totals.get(EntityKind::Patient);
        let appointments = totals.get(EntityKind::Appointment);
        let reports = totals.get(EntityKind::Report);
        let results = totals.get(EntityKind::LabResult);
        let prescriptions = totals.get(EntityKind::Prescription);

        match self {
            ReportLocale::En => vec![
                format!(
                    "This report covers the period {}. During this time {} new patients, \
                     {} appointments, {} clinical reports, {} lab results and {} prescriptions \
                     were registered.",
                    label, patients, appointments, reports, results, prescriptions
                ),
                format!(
                    "The medical team at {} focuses on timely, personalised care. We thank all \
                     staff and our patients for the trust placed in us.",
                    hospital
                ),
            ],
            ReportLocale::Es => vec![
                format!(
                    "El presente reporte cubre el periodo {}. En este lapso se registraron {} \
                     pacientes nuevos, {} citas, {} reportes clínicos, {} resultados de \
                     laboratorio y {} prescripciones.",
                    label, patients, appointments, reports, results, prescriptions
                ),
                format!(
                    "El equipo médico de {} se enfoca en la atención oportuna y personalizada. \
                     Agradecemos a todo el personal y a nuestros pacientes por la confianza \
                     depositada en nosotros.",
                    hospital
                ),
            ],
        }
    }
}

impl std::fmt::Display for ReportLocale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportLocale::En => write!(f, "en"),
            ReportLocale::Es => write!(f, "es"),
        }
    }
}
